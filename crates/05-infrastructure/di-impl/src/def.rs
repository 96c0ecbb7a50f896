//! 组件定义
//!
//! 描述一个受容器管理的组件：类型、名称、作用域、绑定声明以及切面。
//! 定义注册后除切面和元数据外不可修改，单例实例缓存在定义上。

use crate::container::{Container, ContainerId, ContainerTree};
use aop_abstractions::{InterType, MethodInterceptor, Pointcut};
use di_abstractions::{DefId, Expression};
use infrastructure_common::{
    AutoBindingPolicy, BindingType, Describe, Instance, InstanceScope, TypeDescriptor, TypeInfo,
};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// 构造参数定义
#[derive(Debug, Clone, Default)]
pub struct ArgDef {
    /// 取值表达式，为空时按参数类型自动绑定
    pub expression: Option<Expression>,
    /// 绑定强度
    pub binding_type: BindingType,
}

impl ArgDef {
    /// 按类型自动绑定的参数
    pub fn auto() -> Self {
        Self::default()
    }

    /// 由表达式提供的参数
    pub fn expression(expression: Expression) -> Self {
        Self {
            expression: Some(expression),
            binding_type: BindingType::default(),
        }
    }

    /// 常量参数
    pub fn value<V: Send + Sync + 'static>(value: V) -> Self {
        Self::expression(Expression::value(value))
    }

    /// 设置绑定强度
    #[must_use]
    pub fn with_binding_type(mut self, binding_type: BindingType) -> Self {
        self.binding_type = binding_type;
        self
    }
}

/// 属性定义
#[derive(Debug, Clone)]
pub struct PropertyDef {
    /// 属性名
    pub name: String,
    /// 取值表达式，为空时按名称或类型自动绑定
    pub expression: Option<Expression>,
    /// 绑定强度
    pub binding_type: BindingType,
}

impl PropertyDef {
    /// 自动绑定的属性
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: None,
            binding_type: BindingType::default(),
        }
    }

    /// 常量属性
    pub fn value<V: Send + Sync + 'static>(name: impl Into<String>, value: V) -> Self {
        Self::new(name).with_expression(Expression::value(value))
    }

    /// 设置取值表达式
    #[must_use]
    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = Some(expression);
        self
    }

    /// 设置绑定强度
    #[must_use]
    pub fn with_binding_type(mut self, binding_type: BindingType) -> Self {
        self.binding_type = binding_type;
        self
    }
}

/// 方法定义，用于注入方法、初始化方法和销毁方法
#[derive(Debug, Clone)]
pub struct MethodDef {
    /// 方法名
    pub name: String,
    /// 显式参数，为空时按参数类型自动绑定
    pub args: Option<Vec<Expression>>,
}

impl MethodDef {
    /// 创建方法定义
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
        }
    }

    /// 设置显式参数
    #[must_use]
    pub fn with_args(mut self, args: Vec<Expression>) -> Self {
        self.args = Some(args);
        self
    }
}

/// 切面定义
///
/// 拦截器表达式在织入时求值，结果必须是 `Arc<dyn MethodInterceptor>`
#[derive(Debug, Clone)]
pub struct AspectDef {
    /// 切入点，为空时使用默认切入点
    pub pointcut: Option<Pointcut>,
    /// 拦截器表达式
    pub interceptor: Expression,
}

impl AspectDef {
    /// 由现成的拦截器创建切面定义
    pub fn new(interceptor: Arc<dyn MethodInterceptor>, pointcut: Option<Pointcut>) -> Self {
        Self {
            pointcut,
            interceptor: Expression::instance(interceptor),
        }
    }

    /// 由表达式创建切面定义
    pub const fn from_expression(interceptor: Expression, pointcut: Option<Pointcut>) -> Self {
        Self {
            pointcut,
            interceptor,
        }
    }
}

/// 类型间声明定义
///
/// 表达式在织入时求值，结果必须是 `Arc<dyn InterType>`
#[derive(Debug, Clone)]
pub struct InterTypeDef {
    /// 类型间声明表达式
    pub inter_type: Expression,
}

impl InterTypeDef {
    /// 由现成的类型间声明创建
    pub fn new(inter_type: Arc<dyn InterType>) -> Self {
        Self {
            inter_type: Expression::instance(inter_type),
        }
    }

    /// 由表达式创建
    pub const fn from_expression(inter_type: Expression) -> Self {
        Self { inter_type }
    }
}

/// 单例槽位
#[derive(Default)]
pub(crate) struct SingletonSlot {
    pub(crate) instance: RwLock<Option<Instance>>,
    pub(crate) constructing: AtomicBool,
}

/// 组件定义
pub struct ComponentDef {
    id: DefId,
    name: Option<String>,
    descriptor: Arc<TypeDescriptor>,
    scope: InstanceScope,
    auto_binding: AutoBindingPolicy,
    external_binding: bool,
    eager: bool,
    supplied: bool,
    args: Option<Vec<ArgDef>>,
    properties: Vec<PropertyDef>,
    injection_methods: Vec<MethodDef>,
    init_methods: Vec<MethodDef>,
    destroy_methods: Vec<MethodDef>,
    inter_types: Vec<InterTypeDef>,
    aspects: RwLock<Vec<AspectDef>>,
    metas: RwLock<HashMap<String, serde_json::Value>>,
    owner: OnceCell<(Weak<ContainerTree>, ContainerId)>,
    pub(crate) slot: SingletonSlot,
}

impl ComponentDef {
    /// 由类型描述符创建构建器
    pub fn builder(descriptor: Arc<TypeDescriptor>) -> ComponentDefBuilder {
        ComponentDefBuilder::new(descriptor)
    }

    /// 由可自描述类型创建构建器
    pub fn of<T: Describe>() -> ComponentDefBuilder {
        ComponentDefBuilder::new(Arc::new(T::describe()))
    }

    /// 由现成实例创建单例定义，实例不经过装配
    pub(crate) fn supplied(
        descriptor: Arc<TypeDescriptor>,
        name: Option<String>,
        instance: Instance,
    ) -> Self {
        let mut def = ComponentDefBuilder::new(descriptor)
            .with_auto_binding(AutoBindingPolicy::None)
            .build();
        def.name = name;
        def.supplied = true;
        *def.slot.instance.get_mut() = Some(instance);
        def
    }

    /// 定义标识
    pub const fn id(&self) -> DefId {
        self.id
    }

    /// 组件名称
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// 用于日志和错误信息的名称
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{name}({})", self.descriptor.key().short_name()),
            None => self.descriptor.key().short_name().to_string(),
        }
    }

    /// 组件类型
    pub fn component_type(&self) -> TypeInfo {
        self.descriptor.key()
    }

    /// 类型描述符
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// 实例作用域
    pub const fn scope(&self) -> InstanceScope {
        self.scope
    }

    /// 自动绑定策略
    pub const fn auto_binding(&self) -> AutoBindingPolicy {
        self.auto_binding
    }

    /// 是否启用外部绑定
    pub const fn external_binding(&self) -> bool {
        self.external_binding
    }

    /// 是否在容器初始化时创建
    pub const fn is_eager(&self) -> bool {
        self.eager
    }

    /// 实例是否由调用方提供
    pub const fn is_supplied(&self) -> bool {
        self.supplied
    }

    /// 显式构造参数
    pub fn args(&self) -> Option<&[ArgDef]> {
        self.args.as_deref()
    }

    /// 属性定义
    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    /// 按名称查找属性定义
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// 注入方法
    pub fn injection_methods(&self) -> &[MethodDef] {
        &self.injection_methods
    }

    /// 初始化方法
    pub fn init_methods(&self) -> &[MethodDef] {
        &self.init_methods
    }

    /// 销毁方法
    pub fn destroy_methods(&self) -> &[MethodDef] {
        &self.destroy_methods
    }

    /// 类型间声明
    pub fn inter_types(&self) -> &[InterTypeDef] {
        &self.inter_types
    }

    /// 切面定义快照
    pub fn aspects(&self) -> Vec<AspectDef> {
        self.aspects.read().clone()
    }

    /// 追加切面定义，只影响之后创建的实例
    pub fn add_aspect_def(&self, aspect: AspectDef) {
        self.aspects.write().push(aspect);
    }

    /// 是否需要织入
    pub fn requires_weaving(&self) -> bool {
        !self.inter_types.is_empty() || !self.aspects.read().is_empty()
    }

    /// 读取元数据
    pub fn meta(&self, name: &str) -> Option<serde_json::Value> {
        self.metas.read().get(name).cloned()
    }

    /// 添加或替换元数据
    pub fn add_meta_def(&self, name: impl Into<String>, value: serde_json::Value) {
        self.metas.write().insert(name.into(), value);
    }

    /// 所属容器
    pub fn container(&self) -> Option<Container> {
        self.owner
            .get()
            .and_then(|(tree, id)| tree.upgrade().map(|tree| Container::from_parts(tree, *id)))
    }

    /// 已缓存的单例实例
    pub fn cached_instance(&self) -> Option<Instance> {
        self.slot.instance.read().clone()
    }

    pub(crate) fn owner_id(&self) -> Option<ContainerId> {
        self.owner.get().map(|(_, id)| *id)
    }

    /// 绑定所属容器，已属于其他容器时返回 `false`
    pub(crate) fn attach(&self, tree: &Arc<ContainerTree>, id: ContainerId) -> bool {
        self.owner.set((Arc::downgrade(tree), id)).is_ok()
    }

    /// 标记开始构造，已在构造中时返回 `false`
    pub(crate) fn begin_construction(&self) -> bool {
        !self.slot.constructing.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn end_construction(&self) {
        self.slot.constructing.store(false, Ordering::Release);
    }
}

impl fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.descriptor.key())
            .field("scope", &self.scope)
            .field("auto_binding", &self.auto_binding)
            .field("eager", &self.eager)
            .field("aspects", &self.aspects.read().len())
            .field("cached", &self.slot.instance.read().is_some())
            .finish_non_exhaustive()
    }
}

/// 组件定义构建器
pub struct ComponentDefBuilder {
    name: Option<String>,
    descriptor: Arc<TypeDescriptor>,
    scope: InstanceScope,
    auto_binding: AutoBindingPolicy,
    external_binding: bool,
    eager: bool,
    args: Option<Vec<ArgDef>>,
    properties: Vec<PropertyDef>,
    injection_methods: Vec<MethodDef>,
    init_methods: Vec<MethodDef>,
    destroy_methods: Vec<MethodDef>,
    aspects: Vec<AspectDef>,
    inter_types: Vec<InterTypeDef>,
    metas: HashMap<String, serde_json::Value>,
}

impl ComponentDefBuilder {
    /// 创建构建器
    pub fn new(descriptor: Arc<TypeDescriptor>) -> Self {
        Self {
            name: None,
            descriptor,
            scope: InstanceScope::default(),
            auto_binding: AutoBindingPolicy::default(),
            external_binding: false,
            eager: false,
            args: None,
            properties: Vec::new(),
            injection_methods: Vec::new(),
            init_methods: Vec::new(),
            destroy_methods: Vec::new(),
            aspects: Vec::new(),
            inter_types: Vec::new(),
            metas: HashMap::new(),
        }
    }

    /// 设置组件名称
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 设置实例作用域
    #[must_use]
    pub fn with_scope(mut self, scope: InstanceScope) -> Self {
        self.scope = scope;
        self
    }

    /// 设置自动绑定策略
    #[must_use]
    pub fn with_auto_binding(mut self, policy: AutoBindingPolicy) -> Self {
        self.auto_binding = policy;
        self
    }

    /// 设置是否启用外部绑定
    #[must_use]
    pub fn with_external_binding(mut self, enabled: bool) -> Self {
        self.external_binding = enabled;
        self
    }

    /// 设置是否在容器初始化时创建
    #[must_use]
    pub fn with_eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    /// 追加显式构造参数
    #[must_use]
    pub fn with_arg(mut self, arg: ArgDef) -> Self {
        self.args.get_or_insert_with(Vec::new).push(arg);
        self
    }

    /// 声明显式的空参数列表，只使用无参构造函数
    #[must_use]
    pub fn with_no_args(mut self) -> Self {
        self.args = Some(Vec::new());
        self
    }

    /// 追加属性定义
    #[must_use]
    pub fn with_property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// 追加注入方法
    #[must_use]
    pub fn with_injection_method(mut self, method: MethodDef) -> Self {
        self.injection_methods.push(method);
        self
    }

    /// 追加初始化方法
    #[must_use]
    pub fn with_init_method(mut self, method: MethodDef) -> Self {
        self.init_methods.push(method);
        self
    }

    /// 追加销毁方法
    #[must_use]
    pub fn with_destroy_method(mut self, method: MethodDef) -> Self {
        self.destroy_methods.push(method);
        self
    }

    /// 追加切面
    #[must_use]
    pub fn with_aspect(mut self, aspect: AspectDef) -> Self {
        self.aspects.push(aspect);
        self
    }

    /// 追加类型间声明
    #[must_use]
    pub fn with_inter_type(mut self, inter_type: InterTypeDef) -> Self {
        self.inter_types.push(inter_type);
        self
    }

    /// 添加元数据
    #[must_use]
    pub fn with_meta(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.metas.insert(name.into(), value);
        self
    }

    /// 完成构建
    pub fn build(self) -> ComponentDef {
        ComponentDef {
            id: DefId::next(),
            name: self.name,
            descriptor: self.descriptor,
            scope: self.scope,
            auto_binding: self.auto_binding,
            external_binding: self.external_binding,
            eager: self.eager,
            supplied: false,
            args: self.args,
            properties: self.properties,
            injection_methods: self.injection_methods,
            init_methods: self.init_methods,
            destroy_methods: self.destroy_methods,
            inter_types: self.inter_types,
            aspects: RwLock::new(self.aspects),
            metas: RwLock::new(self.metas),
            owner: OnceCell::new(),
            slot: SingletonSlot::default(),
        }
    }
}
