//! 类型描述符
//!
//! 以能力接口的形式描述一个组件类型：可用的构造函数、可注入属性、可调用方法，
//! 以及它可以被视作哪些接口（`dyn Trait`）。容器和织入器只通过描述符操作实例，
//! 描述符可以手写，也可以由 `#[derive(Component)]` 生成。

use crate::component::{argument_type_id, handle_of, Argument, Handle, Instance, Value};
use crate::errors::{AopError, AopResult, DescriptorError, DescriptorResult};
use crate::metadata::TypeInfo;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 把实例转换为目标类型引用的函数
pub type CastFn = Arc<dyn Fn(Instance) -> Option<Handle> + Send + Sync>;

/// 构造函数体
pub type FactoryFn =
    Arc<dyn Fn(&[Argument]) -> DescriptorResult<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// 属性设置器
pub type SetterFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), &Argument) -> DescriptorResult<()> + Send + Sync>;

/// 共享接收者方法体
pub type SharedBody =
    Arc<dyn Fn(&(dyn Any + Send + Sync), &[Argument]) -> AopResult<Value> + Send + Sync>;

/// 独占接收者方法体
pub type ExclusiveBody =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), &[Argument]) -> AopResult<Value> + Send + Sync>;

/// 静态方法体
pub type StaticBody = Arc<dyn Fn(&[Argument]) -> AopResult<Value> + Send + Sync>;

/// 注入点
///
/// `value` 是参数中实际存放的值类型；组件类注入点的值类型为 `Arc<K>`，
/// 同时记录 `component = K` 以便按类型自动绑定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionPoint {
    /// 参数中存放的值类型
    pub value: TypeInfo,
    /// 可按类型自动绑定的组件类型
    pub component: Option<TypeInfo>,
}

impl InjectionPoint {
    /// 组件类注入点，值为 `Arc<K>`
    pub fn component<K: ?Sized + Send + Sync + 'static>() -> Self {
        Self {
            value: TypeInfo::of::<Arc<K>>(),
            component: Some(TypeInfo::of::<K>()),
        }
    }

    /// 值类注入点
    pub fn value<V: Send + Sync + 'static>() -> Self {
        Self {
            value: TypeInfo::of::<V>(),
            component: None,
        }
    }

    /// 参数是否可以填入该注入点
    pub fn accepts(&self, argument: &Argument) -> bool {
        argument_type_id(argument) == self.value.id
    }
}

impl fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.component {
            Some(component) => write!(f, "{}", component.short_name()),
            None => write!(f, "{}", self.value.short_name()),
        }
    }
}

/// 接口描述
#[derive(Clone)]
pub struct InterfaceDesc {
    /// 接口类型
    pub key: TypeInfo,
    /// 接口声明的方法名
    pub methods: Vec<String>,
    /// 从具体实例到接口引用的转换
    pub cast: Option<CastFn>,
    /// 从代理实例到接口引用的转换
    pub enhancer: Option<CastFn>,
}

/// 构造函数描述
#[derive(Clone)]
pub struct ConstructorDesc {
    /// 参数注入点
    pub params: Vec<InjectionPoint>,
    factory: FactoryFn,
}

impl ConstructorDesc {
    /// 创建构造函数描述
    pub fn new(params: Vec<InjectionPoint>, factory: FactoryFn) -> Self {
        Self { params, factory }
    }

    /// 参数个数
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// 调用构造函数
    pub fn construct(
        &self,
        type_name: &str,
        args: &[Argument],
    ) -> DescriptorResult<Box<dyn Any + Send + Sync>> {
        check_arguments(type_name, &self.params, args)?;
        (self.factory)(args)
    }
}

/// 属性描述
#[derive(Clone)]
pub struct PropertyDesc {
    /// 属性名
    pub name: String,
    /// 注入点
    pub point: InjectionPoint,
    setter: SetterFn,
}

impl PropertyDesc {
    /// 创建属性描述
    pub fn new(name: impl Into<String>, point: InjectionPoint, setter: SetterFn) -> Self {
        Self {
            name: name.into(),
            point,
            setter,
        }
    }

    /// 设置属性值
    pub fn apply(
        &self,
        type_name: &str,
        target: &mut (dyn Any + Send + Sync),
        value: &Argument,
    ) -> DescriptorResult<()> {
        if !self.point.accepts(value) {
            return Err(DescriptorError::PropertyTypeMismatch {
                type_name: type_name.to_string(),
                property: self.name.clone(),
                expected: self.point.value.name.to_string(),
            });
        }
        (self.setter)(target, value)
    }
}

/// 方法修饰信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodModifiers {
    /// 不可被织入
    pub is_final: bool,
    /// 编译器或宏生成的辅助方法
    pub synthetic: bool,
    /// 从基础对象类型原样继承
    pub inherited: bool,
}

/// 方法接收者
#[derive(Clone)]
pub enum Receiver {
    /// `&self`
    Shared(SharedBody),
    /// `&mut self`，只能在实例发布前调用
    Exclusive(ExclusiveBody),
    /// 无接收者
    Static(StaticBody),
}

/// 方法描述
#[derive(Clone)]
pub struct MethodDesc {
    name: String,
    declaring: TypeInfo,
    params: Vec<InjectionPoint>,
    modifiers: MethodModifiers,
    receiver: Receiver,
}

impl MethodDesc {
    /// 创建方法描述
    pub fn new(
        declaring: TypeInfo,
        name: impl Into<String>,
        params: Vec<InjectionPoint>,
        receiver: Receiver,
    ) -> Self {
        Self {
            name: name.into(),
            declaring,
            params,
            modifiers: MethodModifiers::default(),
            receiver,
        }
    }

    /// 设置修饰信息
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: MethodModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// 方法名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 声明该方法的类型
    pub const fn declaring_type(&self) -> TypeInfo {
        self.declaring
    }

    /// 参数注入点
    pub fn params(&self) -> &[InjectionPoint] {
        &self.params
    }

    /// 修饰信息
    pub const fn modifiers(&self) -> MethodModifiers {
        self.modifiers
    }

    /// 是否为静态方法
    pub const fn is_static(&self) -> bool {
        matches!(self.receiver, Receiver::Static(_))
    }

    /// 是否需要独占接收者
    pub const fn is_exclusive(&self) -> bool {
        matches!(self.receiver, Receiver::Exclusive(_))
    }

    /// 是否可以被织入拦截器
    pub const fn is_weavable(&self) -> bool {
        !self.modifiers.is_final
            && !self.modifiers.synthetic
            && matches!(self.receiver, Receiver::Shared(_))
    }

    /// 通过共享引用调用
    pub fn invoke(&self, target: &(dyn Any + Send + Sync), args: &[Argument]) -> AopResult<Value> {
        check_arguments(&self.name, &self.params, args)?;
        match &self.receiver {
            Receiver::Shared(body) => body(target, args),
            Receiver::Static(body) => body(args),
            Receiver::Exclusive(_) => Err(AopError::NotInvocable {
                type_name: self.declaring.name.to_string(),
                method: self.name.clone(),
                reason: "方法需要独占接收者".to_string(),
            }),
        }
    }

    /// 通过独占引用调用
    pub fn invoke_mut(
        &self,
        target: &mut (dyn Any + Send + Sync),
        args: &[Argument],
    ) -> AopResult<Value> {
        check_arguments(&self.name, &self.params, args)?;
        match &self.receiver {
            Receiver::Shared(body) => body(&*target, args),
            Receiver::Exclusive(body) => body(target, args),
            Receiver::Static(body) => body(args),
        }
    }
}

impl fmt::Debug for MethodDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDesc")
            .field("name", &self.name)
            .field("declaring", &self.declaring)
            .field("params", &self.params)
            .field("modifiers", &self.modifiers)
            .field("static", &self.is_static())
            .field("exclusive", &self.is_exclusive())
            .finish()
    }
}

fn check_arguments(
    owner: &str,
    params: &[InjectionPoint],
    args: &[Argument],
) -> DescriptorResult<()> {
    if params.len() != args.len() {
        return Err(DescriptorError::ArityMismatch {
            type_name: owner.to_string(),
            expected: params.len(),
            actual: args.len(),
        });
    }
    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        if !param.accepts(arg) {
            return Err(DescriptorError::ArgumentMismatch {
                type_name: owner.to_string(),
                index,
                expected: param.value.name.to_string(),
            });
        }
    }
    Ok(())
}

/// 类型描述符
pub struct TypeDescriptor {
    key: TypeInfo,
    self_cast: CastFn,
    interfaces: Vec<InterfaceDesc>,
    constructors: Vec<ConstructorDesc>,
    properties: Vec<PropertyDesc>,
    methods: Vec<MethodDesc>,
}

impl TypeDescriptor {
    /// 创建类型描述符构建器
    pub fn builder<T: Any + Send + Sync>() -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder::new()
    }

    /// 只包含类型本身的最小描述符
    pub fn of_type<T: Any + Send + Sync>() -> Self {
        Self::builder::<T>().build()
    }

    /// 描述的类型
    pub const fn key(&self) -> TypeInfo {
        self.key
    }

    /// 接口列表
    pub fn interfaces(&self) -> &[InterfaceDesc] {
        &self.interfaces
    }

    /// 构造函数列表
    pub fn constructors(&self) -> &[ConstructorDesc] {
        &self.constructors
    }

    /// 属性列表
    pub fn properties(&self) -> &[PropertyDesc] {
        &self.properties
    }

    /// 方法列表
    pub fn methods(&self) -> &[MethodDesc] {
        &self.methods
    }

    /// 按名称查找属性
    pub fn property(&self, name: &str) -> Option<&PropertyDesc> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// 按名称查找方法（同名时取第一个）
    pub fn method(&self, name: &str) -> Option<&MethodDesc> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// 按名称和参数个数查找方法
    pub fn method_with_arity(&self, name: &str, arity: usize) -> Option<&MethodDesc> {
        self.methods
            .iter()
            .find(|method| method.name == name && method.params.len() == arity)
    }

    /// 类型可赋值的全部键：自身及所有接口
    pub fn assignable_keys(&self) -> Vec<TypeInfo> {
        std::iter::once(self.key)
            .chain(self.interfaces.iter().map(|interface| interface.key))
            .collect()
    }

    /// 是否可以视作目标类型
    pub fn is_assignable_to(&self, target: &TypeInfo) -> bool {
        self.key == *target || self.interfaces.iter().any(|interface| interface.key == *target)
    }

    /// 接口声明的全部方法名，保持声明顺序并去重
    pub fn interface_method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.interfaces.iter().flat_map(|interface| &interface.methods) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// 把具体实例转换为目标类型引用
    pub fn cast(&self, instance: &Instance, target: &TypeInfo) -> Option<Handle> {
        if self.key == *target {
            return (self.self_cast)(Arc::clone(instance));
        }
        self.interfaces
            .iter()
            .find(|interface| interface.key == *target)
            .and_then(|interface| interface.cast.as_ref())
            .and_then(|cast| cast(Arc::clone(instance)))
    }

    /// 把代理实例转换为目标接口引用
    pub fn enhance(&self, proxy: &Instance, target: &TypeInfo) -> Option<Handle> {
        self.interfaces
            .iter()
            .find(|interface| interface.key == *target)
            .and_then(|interface| interface.enhancer.as_ref())
            .and_then(|enhancer| enhancer(Arc::clone(proxy)))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("key", &self.key)
            .field(
                "interfaces",
                &self.interfaces.iter().map(|i| i.key).collect::<Vec<_>>(),
            )
            .field("constructors", &self.constructors.len())
            .field(
                "properties",
                &self.properties.iter().map(|p| &p.name).collect::<Vec<_>>(),
            )
            .field(
                "methods",
                &self.methods.iter().map(|m| &m.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// 可自描述的组件类型
pub trait Describe: Any + Send + Sync + Sized {
    /// 生成类型描述符
    fn describe() -> TypeDescriptor;
}

fn component_at<K: ?Sized + Send + Sync + 'static>(
    owner: &'static str,
    args: &[Argument],
    index: usize,
) -> DescriptorResult<Arc<K>> {
    args.get(index)
        .and_then(|arg| arg.downcast_ref::<Arc<K>>())
        .cloned()
        .ok_or_else(|| DescriptorError::ArgumentMismatch {
            type_name: owner.to_string(),
            index,
            expected: std::any::type_name::<Arc<K>>().to_string(),
        })
}

fn value_at<V: Clone + Send + Sync + 'static>(
    owner: &'static str,
    args: &[Argument],
    index: usize,
) -> DescriptorResult<V> {
    args.get(index)
        .and_then(|arg| arg.downcast_ref::<V>())
        .cloned()
        .ok_or_else(|| DescriptorError::ArgumentMismatch {
            type_name: owner.to_string(),
            index,
            expected: std::any::type_name::<V>().to_string(),
        })
}

fn receiver_ref<T: Any>(target: &(dyn Any + Send + Sync)) -> DescriptorResult<&T> {
    target
        .downcast_ref::<T>()
        .ok_or_else(|| DescriptorError::ReceiverMismatch {
            expected: std::any::type_name::<T>().to_string(),
        })
}

fn receiver_mut<T: Any>(target: &mut (dyn Any + Send + Sync)) -> DescriptorResult<&mut T> {
    target
        .downcast_mut::<T>()
        .ok_or_else(|| DescriptorError::ReceiverMismatch {
            expected: std::any::type_name::<T>().to_string(),
        })
}

fn boxed<T: Any + Send + Sync>(value: T) -> Box<dyn Any + Send + Sync> {
    Box::new(value)
}

/// 类型描述符构建器
pub struct TypeDescriptorBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeDescriptorBuilder<T> {
    fn new() -> Self {
        let self_cast: CastFn = Arc::new(|instance: Instance| {
            instance.downcast::<T>().ok().map(handle_of::<T>)
        });
        Self {
            descriptor: TypeDescriptor {
                key: TypeInfo::of::<T>(),
                self_cast,
                interfaces: Vec::new(),
                constructors: Vec::new(),
                properties: Vec::new(),
                methods: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    fn type_name(&self) -> &'static str {
        self.descriptor.key.name
    }

    fn interface_entry(&mut self, key: TypeInfo) -> &mut InterfaceDesc {
        let interfaces = &mut self.descriptor.interfaces;
        let index = match interfaces.iter().position(|interface| interface.key == key) {
            Some(index) => index,
            None => {
                interfaces.push(InterfaceDesc {
                    key,
                    methods: Vec::new(),
                    cast: None,
                    enhancer: None,
                });
                interfaces.len() - 1
            }
        };
        &mut interfaces[index]
    }

    /// 声明实现的接口及其方法名
    #[must_use]
    pub fn implements<I: ?Sized + Send + Sync + 'static>(
        mut self,
        cast: fn(Arc<T>) -> Arc<I>,
        methods: &[&str],
    ) -> Self {
        let cast_fn: CastFn = Arc::new(move |instance: Instance| {
            instance
                .downcast::<T>()
                .ok()
                .map(|concrete| handle_of::<I>(cast(concrete)))
        });
        let entry = self.interface_entry(TypeInfo::of::<I>());
        entry.cast = Some(cast_fn);
        entry.methods = methods.iter().map(|name| (*name).to_string()).collect();
        self
    }

    /// 声明接口在代理上的门面，`P` 通常是 AOP 代理类型
    #[must_use]
    pub fn enhance<I, P>(mut self, enhancer: fn(Arc<P>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        P: Any + Send + Sync,
    {
        let enhancer_fn: CastFn = Arc::new(move |instance: Instance| {
            instance
                .downcast::<P>()
                .ok()
                .map(|proxy| handle_of::<I>(enhancer(proxy)))
        });
        self.interface_entry(TypeInfo::of::<I>()).enhancer = Some(enhancer_fn);
        self
    }

    /// 无参构造函数
    #[must_use]
    pub fn constructor0(mut self, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        let factory: FactoryFn = Arc::new(move |_args: &[Argument]| Ok(boxed(factory())));
        self.descriptor
            .constructors
            .push(ConstructorDesc::new(Vec::new(), factory));
        self
    }

    /// 单组件参数构造函数
    #[must_use]
    pub fn constructor1<A>(mut self, factory: impl Fn(Arc<A>) -> T + Send + Sync + 'static) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
    {
        let owner = self.type_name();
        let factory: FactoryFn = Arc::new(move |args: &[Argument]| {
            let a = component_at::<A>(owner, args, 0)?;
            Ok(boxed(factory(a)))
        });
        self.descriptor.constructors.push(ConstructorDesc::new(
            vec![InjectionPoint::component::<A>()],
            factory,
        ));
        self
    }

    /// 双组件参数构造函数
    #[must_use]
    pub fn constructor2<A, B>(
        mut self,
        factory: impl Fn(Arc<A>, Arc<B>) -> T + Send + Sync + 'static,
    ) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        B: ?Sized + Send + Sync + 'static,
    {
        let owner = self.type_name();
        let factory: FactoryFn = Arc::new(move |args: &[Argument]| {
            let a = component_at::<A>(owner, args, 0)?;
            let b = component_at::<B>(owner, args, 1)?;
            Ok(boxed(factory(a, b)))
        });
        self.descriptor.constructors.push(ConstructorDesc::new(
            vec![InjectionPoint::component::<A>(), InjectionPoint::component::<B>()],
            factory,
        ));
        self
    }

    /// 三组件参数构造函数
    #[must_use]
    pub fn constructor3<A, B, C>(
        mut self,
        factory: impl Fn(Arc<A>, Arc<B>, Arc<C>) -> T + Send + Sync + 'static,
    ) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        B: ?Sized + Send + Sync + 'static,
        C: ?Sized + Send + Sync + 'static,
    {
        let owner = self.type_name();
        let factory: FactoryFn = Arc::new(move |args: &[Argument]| {
            let a = component_at::<A>(owner, args, 0)?;
            let b = component_at::<B>(owner, args, 1)?;
            let c = component_at::<C>(owner, args, 2)?;
            Ok(boxed(factory(a, b, c)))
        });
        self.descriptor.constructors.push(ConstructorDesc::new(
            vec![
                InjectionPoint::component::<A>(),
                InjectionPoint::component::<B>(),
                InjectionPoint::component::<C>(),
            ],
            factory,
        ));
        self
    }

    /// 单值参数构造函数，参数只能由显式表达式提供
    #[must_use]
    pub fn value_constructor1<V>(mut self, factory: impl Fn(V) -> T + Send + Sync + 'static) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        let owner = self.type_name();
        let factory: FactoryFn = Arc::new(move |args: &[Argument]| {
            let value = value_at::<V>(owner, args, 0)?;
            Ok(boxed(factory(value)))
        });
        self.descriptor
            .constructors
            .push(ConstructorDesc::new(vec![InjectionPoint::value::<V>()], factory));
        self
    }

    /// 自定义参数列表的构造函数
    #[must_use]
    pub fn constructor_with(
        mut self,
        params: Vec<InjectionPoint>,
        factory: impl Fn(&[Argument]) -> DescriptorResult<T> + Send + Sync + 'static,
    ) -> Self {
        let factory: FactoryFn = Arc::new(move |args: &[Argument]| factory(args).map(boxed));
        self.descriptor
            .constructors
            .push(ConstructorDesc::new(params, factory));
        self
    }

    /// 组件类属性
    #[must_use]
    pub fn property<K>(
        mut self,
        name: &str,
        setter: impl Fn(&mut T, Arc<K>) + Send + Sync + 'static,
    ) -> Self
    where
        K: ?Sized + Send + Sync + 'static,
    {
        let owner = self.type_name();
        let setter: SetterFn = Arc::new(
            move |target: &mut (dyn Any + Send + Sync), value: &Argument| {
                let this = receiver_mut::<T>(target)?;
                let component = component_at::<K>(owner, std::slice::from_ref(value), 0)?;
                setter(this, component);
                Ok(())
            },
        );
        self.descriptor.properties.push(PropertyDesc::new(
            name,
            InjectionPoint::component::<K>(),
            setter,
        ));
        self
    }

    /// 值类属性，只能由显式表达式或外部参数提供
    #[must_use]
    pub fn value_property<V>(
        mut self,
        name: &str,
        setter: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        let owner = self.type_name();
        let setter: SetterFn = Arc::new(
            move |target: &mut (dyn Any + Send + Sync), value: &Argument| {
                let this = receiver_mut::<T>(target)?;
                let value = value_at::<V>(owner, std::slice::from_ref(value), 0)?;
                setter(this, value);
                Ok(())
            },
        );
        self.descriptor
            .properties
            .push(PropertyDesc::new(name, InjectionPoint::value::<V>(), setter));
        self
    }

    fn push_method(mut self, name: &str, params: Vec<InjectionPoint>, receiver: Receiver) -> Self {
        let declaring = self.descriptor.key;
        self.descriptor
            .methods
            .push(MethodDesc::new(declaring, name, params, receiver));
        self
    }

    /// 无参方法
    #[must_use]
    pub fn method0<R: Send + 'static>(
        self,
        name: &str,
        body: impl Fn(&T) -> R + Send + Sync + 'static,
    ) -> Self {
        let body: SharedBody = Arc::new(
            move |target: &(dyn Any + Send + Sync), _args: &[Argument]| {
                let this = receiver_ref::<T>(target)?;
                Ok(Box::new(body(this)) as Value)
            },
        );
        self.push_method(name, Vec::new(), Receiver::Shared(body))
    }

    /// 单参数方法
    #[must_use]
    pub fn method1<A, R>(self, name: &str, body: impl Fn(&T, A) -> R + Send + Sync + 'static) -> Self
    where
        A: Clone + Send + Sync + 'static,
        R: Send + 'static,
    {
        let owner = self.type_name();
        let body: SharedBody = Arc::new(
            move |target: &(dyn Any + Send + Sync), args: &[Argument]| {
                let this = receiver_ref::<T>(target)?;
                let a = value_at::<A>(owner, args, 0)?;
                Ok(Box::new(body(this, a)) as Value)
            },
        );
        self.push_method(name, vec![InjectionPoint::value::<A>()], Receiver::Shared(body))
    }

    /// 双参数方法
    #[must_use]
    pub fn method2<A, B, R>(
        self,
        name: &str,
        body: impl Fn(&T, A, B) -> R + Send + Sync + 'static,
    ) -> Self
    where
        A: Clone + Send + Sync + 'static,
        B: Clone + Send + Sync + 'static,
        R: Send + 'static,
    {
        let owner = self.type_name();
        let body: SharedBody = Arc::new(
            move |target: &(dyn Any + Send + Sync), args: &[Argument]| {
                let this = receiver_ref::<T>(target)?;
                let a = value_at::<A>(owner, args, 0)?;
                let b = value_at::<B>(owner, args, 1)?;
                Ok(Box::new(body(this, a, b)) as Value)
            },
        );
        self.push_method(
            name,
            vec![InjectionPoint::value::<A>(), InjectionPoint::value::<B>()],
            Receiver::Shared(body),
        )
    }

    /// 可能失败的无参方法
    #[must_use]
    pub fn try_method0<R, E>(
        self,
        name: &str,
        body: impl Fn(&T) -> Result<R, E> + Send + Sync + 'static,
    ) -> Self
    where
        R: Send + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = name.to_string();
        let body: SharedBody = Arc::new(
            move |target: &(dyn Any + Send + Sync), _args: &[Argument]| {
                let this = receiver_ref::<T>(target)?;
                body(this)
                    .map(|value| Box::new(value) as Value)
                    .map_err(|e| AopError::invocation_failed(method.clone(), e))
            },
        );
        self.push_method(name, Vec::new(), Receiver::Shared(body))
    }

    /// 需要独占接收者的无参方法，只能用作初始化方法
    #[must_use]
    pub fn mut_method0<R: Send + 'static>(
        self,
        name: &str,
        body: impl Fn(&mut T) -> R + Send + Sync + 'static,
    ) -> Self {
        let body: ExclusiveBody = Arc::new(
            move |target: &mut (dyn Any + Send + Sync), _args: &[Argument]| {
                let this = receiver_mut::<T>(target)?;
                Ok(Box::new(body(this)) as Value)
            },
        );
        self.push_method(name, Vec::new(), Receiver::Exclusive(body))
    }

    /// 方法注入点：接收一个组件参数的独占方法
    #[must_use]
    pub fn injector<K>(self, name: &str, body: impl Fn(&mut T, Arc<K>) + Send + Sync + 'static) -> Self
    where
        K: ?Sized + Send + Sync + 'static,
    {
        let owner = self.type_name();
        let body: ExclusiveBody = Arc::new(
            move |target: &mut (dyn Any + Send + Sync), args: &[Argument]| {
                let this = receiver_mut::<T>(target)?;
                let component = component_at::<K>(owner, args, 0)?;
                body(this, component);
                Ok(Box::new(()) as Value)
            },
        );
        self.push_method(
            name,
            vec![InjectionPoint::component::<K>()],
            Receiver::Exclusive(body),
        )
    }

    /// 静态无参方法
    #[must_use]
    pub fn static_method0<R: Send + 'static>(
        self,
        name: &str,
        body: impl Fn() -> R + Send + Sync + 'static,
    ) -> Self {
        let body: StaticBody =
            Arc::new(move |_args: &[Argument]| Ok(Box::new(body()) as Value));
        self.push_method(name, Vec::new(), Receiver::Static(body))
    }

    /// 添加现成的方法描述
    #[must_use]
    pub fn with_method(mut self, method: MethodDesc) -> Self {
        self.descriptor.methods.push(method);
        self
    }

    fn update_modifiers(mut self, name: &str, update: impl Fn(&mut MethodModifiers)) -> Self {
        for method in self
            .descriptor
            .methods
            .iter_mut()
            .filter(|method| method.name == name)
        {
            update(&mut method.modifiers);
        }
        self
    }

    /// 标记方法为 final，不参与织入
    #[must_use]
    pub fn mark_final(self, name: &str) -> Self {
        self.update_modifiers(name, |modifiers| modifiers.is_final = true)
    }

    /// 标记方法为生成的辅助方法
    #[must_use]
    pub fn mark_synthetic(self, name: &str) -> Self {
        self.update_modifiers(name, |modifiers| modifiers.synthetic = true)
    }

    /// 标记方法为从基础类型原样继承
    #[must_use]
    pub fn mark_inherited(self, name: &str) -> Self {
        self.update_modifiers(name, |modifiers| modifiers.inherited = true)
    }

    /// 完成构建
    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

/// 类型描述符缓存
///
/// 按类型ID缓存内省结果，由容器树持有
#[derive(Default)]
pub struct DescriptorCache {
    entries: DashMap<TypeId, Arc<TypeDescriptor>>,
}

impl DescriptorCache {
    /// 创建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取类型描述符，未缓存时调用 [`Describe::describe`]
    pub fn get_or_describe<T: Describe>(&self) -> Arc<TypeDescriptor> {
        self.entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(T::describe()))
            .value()
            .clone()
    }

    /// 放入外部构建的描述符，已存在时保留原值
    pub fn insert(&self, descriptor: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        self.entries
            .entry(descriptor.key().id)
            .or_insert(descriptor)
            .value()
            .clone()
    }

    /// 查找已缓存的描述符
    pub fn get(&self, key: &TypeInfo) -> Option<Arc<TypeDescriptor>> {
        self.entries.get(&key.id).map(|entry| entry.value().clone())
    }

    /// 已缓存数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
