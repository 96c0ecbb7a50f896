//! 层次化组件容器
//!
//! 同一容器树中的全部容器存放在 [`ContainerTree`] 中，以 [`ContainerId`] 寻址；
//! [`Container`] 只是 `(树, 标识)` 句柄，克隆代价很低。
//!
//! 查找规则：
//! - 从当前容器开始沿包含关系广度优先搜索，第一个存在匹配的容器决定结果
//! - 类型键在该容器中匹配到多个定义时报告 `TooManyRegistration`，名称键取第一个
//! - 开启 `search_ancestors` 时，向下找不到再广度优先搜索祖先容器自身的定义

use crate::def::{ComponentDef, ComponentDefBuilder};
use crate::deployer;
use crate::traversal::{self, Direction};
use crate::weaving;
use aop_impl::Weaver;
use di_abstractions::{
    ComponentKey, ContainerConfig, ContainerStats, ExpressionEvaluator, ExternalContext,
    ResolveContext,
};
use infrastructure_common::{
    ContainerError, ContainerResult, DescriptorCache, Describe, Instance, InstanceScope,
    TypeDescriptor, TypeInfo,
};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 容器标识，在所属容器树内有效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(usize);

impl ContainerId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// 在容器树中的位置
    pub const fn index(self) -> usize {
        self.0
    }
}

/// 容器树中的一个节点
pub(crate) struct ContainerNode {
    pub(crate) path: Option<String>,
    pub(crate) namespace: Option<String>,
    pub(crate) parents: Vec<ContainerId>,
    pub(crate) children: Vec<ContainerId>,
    defs: Vec<Arc<ComponentDef>>,
    by_name: HashMap<String, Vec<usize>>,
    by_type: HashMap<TypeInfo, Vec<usize>>,
    initialized: bool,
}

impl ContainerNode {
    pub(crate) fn new(path: Option<String>, namespace: Option<String>) -> Self {
        Self {
            path,
            namespace,
            parents: Vec::new(),
            children: Vec::new(),
            defs: Vec::new(),
            by_name: HashMap::new(),
            by_type: HashMap::new(),
            initialized: false,
        }
    }

    fn add(&mut self, def: Arc<ComponentDef>) {
        let index = self.defs.len();
        if let Some(name) = def.name() {
            self.by_name.entry(name.to_string()).or_default().push(index);
        }
        for key in def.descriptor().assignable_keys() {
            self.by_type.entry(key).or_default().push(index);
        }
        self.defs.push(def);
    }

    /// 本容器内的匹配定义，保持注册顺序
    fn matches(&self, key: &ComponentKey) -> Vec<Arc<ComponentDef>> {
        let mut indices: Vec<usize> = match key {
            ComponentKey::Type(type_info) => self.by_type.get(type_info).cloned().unwrap_or_default(),
            ComponentKey::Name(name) => {
                let mut found = self.by_name.get(name).cloned().unwrap_or_default();
                let qualified = self
                    .namespace
                    .as_deref()
                    .and_then(|namespace| name.strip_prefix(namespace))
                    .and_then(|rest| rest.strip_prefix('.'));
                if let Some(local) = qualified.and_then(|local| self.by_name.get(local)) {
                    found.extend(local);
                }
                found
            }
        };
        indices.sort_unstable();
        indices.dedup();
        indices
            .into_iter()
            .map(|index| Arc::clone(&self.defs[index]))
            .collect()
    }
}

/// 容器树
///
/// 持有全部容器节点以及树范围共享的状态
pub(crate) struct ContainerTree {
    pub(crate) nodes: RwLock<Vec<ContainerNode>>,
    pub(crate) descendants: RwLock<HashMap<String, ContainerId>>,
    /// 单例创建顺序，销毁时逆序执行
    pub(crate) creation_log: Mutex<Vec<Arc<ComponentDef>>>,
    /// 单例构造锁，可重入以支持构造过程中解析其他单例
    pub(crate) construction: ReentrantMutex<()>,
    pub(crate) config: ContainerConfig,
    pub(crate) external_context: RwLock<Option<Arc<dyn ExternalContext>>>,
    pub(crate) evaluator: RwLock<Option<Arc<dyn ExpressionEvaluator>>>,
    pub(crate) descriptors: DescriptorCache,
    pub(crate) weaver: Weaver,
}

/// 容器构建器
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    path: Option<String>,
    namespace: Option<String>,
    config: ContainerConfig,
}

impl ContainerBuilder {
    /// 创建构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置根容器路径
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// 设置根容器命名空间
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// 设置容器配置
    #[must_use]
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 创建新的容器树并返回根容器
    pub fn build(self) -> Container {
        let tree = ContainerTree {
            nodes: RwLock::new(vec![ContainerNode::new(self.path, self.namespace)]),
            descendants: RwLock::new(HashMap::new()),
            creation_log: Mutex::new(Vec::new()),
            construction: ReentrantMutex::new(()),
            config: self.config,
            external_context: RwLock::new(None),
            evaluator: RwLock::new(None),
            descriptors: DescriptorCache::new(),
            weaver: Weaver::new(),
        };
        Container::from_parts(Arc::new(tree), ContainerId::new(0))
    }
}

/// 组件容器
#[derive(Clone)]
pub struct Container {
    tree: Arc<ContainerTree>,
    id: ContainerId,
}

impl Container {
    /// 使用默认配置创建根容器
    pub fn new() -> Self {
        ContainerBuilder::new().build()
    }

    /// 创建容器构建器
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) const fn from_parts(tree: Arc<ContainerTree>, id: ContainerId) -> Self {
        Self { tree, id }
    }

    pub(crate) const fn tree(&self) -> &Arc<ContainerTree> {
        &self.tree
    }

    /// 在同一容器树中创建新容器，新容器尚未被任何容器包含
    pub fn create_container(&self, path: Option<&str>, namespace: Option<&str>) -> Self {
        let mut nodes = self.tree.nodes.write();
        let id = ContainerId::new(nodes.len());
        nodes.push(ContainerNode::new(
            path.map(str::to_string),
            namespace.map(str::to_string),
        ));
        drop(nodes);
        debug!("创建容器: {}", path.unwrap_or("<anonymous>"));
        Self::from_parts(Arc::clone(&self.tree), id)
    }

    /// 容器标识
    pub const fn id(&self) -> ContainerId {
        self.id
    }

    /// 容器路径
    pub fn path(&self) -> Option<String> {
        self.tree.nodes.read()[self.id.index()].path.clone()
    }

    /// 命名空间
    pub fn namespace(&self) -> Option<String> {
        self.tree.nodes.read()[self.id.index()].namespace.clone()
    }

    /// 容器配置（整棵容器树共享）
    pub fn config(&self) -> &ContainerConfig {
        &self.tree.config
    }

    /// 是否属于同一容器树
    pub fn same_tree(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
    }

    pub(crate) fn describe(&self) -> String {
        self.path()
            .unwrap_or_else(|| format!("container#{}", self.id.index()))
    }

    pub(crate) fn new_context(&self) -> ResolveContext {
        ResolveContext::new(self.tree.config.max_resolution_depth)
    }

    // ---- 注册 ----

    /// 注册组件定义
    ///
    /// 不检查可解析性；同名或同类型的重复注册是合法的，只在需要唯一匹配的查找时报告
    pub fn register(&self, def: impl Into<Arc<ComponentDef>>) -> ContainerResult<Arc<ComponentDef>> {
        let def = def.into();
        if !def.attach(&self.tree, self.id) {
            return Err(ContainerError::AlreadyRegistered {
                component: def.display_name(),
            });
        }
        self.tree.nodes.write()[self.id.index()].add(Arc::clone(&def));
        debug!("注册组件: {} -> {}", def.display_name(), self.describe());
        Ok(def)
    }

    /// 取得类型描述符（按容器树缓存）
    pub fn descriptor_of<T: Describe>(&self) -> Arc<TypeDescriptor> {
        self.tree.descriptors.get_or_describe::<T>()
    }

    /// 使用缓存的类型描述符创建组件定义构建器
    pub fn def_builder<T: Describe>(&self) -> ComponentDefBuilder {
        ComponentDef::builder(self.descriptor_of::<T>())
    }

    /// 以默认设置注册类型
    pub fn register_type<T: Describe>(&self, name: Option<&str>) -> ContainerResult<Arc<ComponentDef>> {
        let builder = self.def_builder::<T>();
        let builder = match name {
            Some(name) => builder.with_name(name),
            None => builder,
        };
        self.register(builder.build())
    }

    /// 注册现成的实例，作为单例使用，不参与装配和销毁
    pub fn register_instance<T: Describe>(
        &self,
        instance: Arc<T>,
        name: Option<&str>,
    ) -> ContainerResult<Arc<ComponentDef>> {
        self.register_instance_with_descriptor(self.descriptor_of::<T>(), instance, name)
    }

    /// 使用指定描述符注册现成的实例
    pub fn register_instance_with_descriptor(
        &self,
        descriptor: Arc<TypeDescriptor>,
        instance: Instance,
        name: Option<&str>,
    ) -> ContainerResult<Arc<ComponentDef>> {
        let actual = (*instance).type_id();
        if actual != descriptor.key().id {
            return Err(ContainerError::ClassUnmatch {
                expected: descriptor.key().name.to_string(),
                actual: format!("{actual:?}"),
            });
        }
        let def = ComponentDef::supplied(descriptor, name.map(str::to_string), instance);
        self.register(def)
    }

    // ---- 组件定义查找 ----

    fn first_matches(&self, key: &ComponentKey) -> Vec<Arc<ComponentDef>> {
        let nodes = self.tree.nodes.read();
        for id in traversal::breadth_first(&nodes, self.id, Direction::Children) {
            let found = nodes[id.index()].matches(key);
            if !found.is_empty() {
                return found;
            }
        }
        if self.tree.config.search_ancestors {
            for id in traversal::breadth_first(&nodes, self.id, Direction::Parents)
                .into_iter()
                .skip(1)
            {
                let found = nodes[id.index()].matches(key);
                if !found.is_empty() {
                    return found;
                }
            }
        }
        Vec::new()
    }

    pub(crate) fn lookup_def(&self, key: &ComponentKey) -> ContainerResult<Arc<ComponentDef>> {
        let mut matches = self.first_matches(key);
        match matches.len() {
            0 => Err(ContainerError::not_found(key)),
            1 => Ok(matches.remove(0)),
            _ if key.as_name().is_some() => Ok(matches.remove(0)),
            _ => Err(ContainerError::TooManyRegistration {
                key: key.to_string(),
                component_types: matches.iter().map(|def| def.display_name()).collect(),
            }),
        }
    }

    /// 获取唯一匹配的组件定义
    pub fn get_component_def(&self, key: impl Into<ComponentKey>) -> ContainerResult<Arc<ComponentDef>> {
        self.lookup_def(&key.into())
    }

    /// 是否存在匹配的组件定义
    pub fn has_component_def(&self, key: impl Into<ComponentKey>) -> bool {
        !self.first_matches(&key.into()).is_empty()
    }

    /// 第一个存在匹配的容器中的全部定义
    pub fn find_component_defs(&self, key: impl Into<ComponentKey>) -> Vec<Arc<ComponentDef>> {
        self.first_matches(&key.into())
    }

    /// 自身及全部后代容器中的匹配定义，按广度优先顺序
    pub fn find_all_component_defs(&self, key: impl Into<ComponentKey>) -> Vec<Arc<ComponentDef>> {
        let key = key.into();
        let nodes = self.tree.nodes.read();
        let mut seen = HashSet::new();
        traversal::breadth_first(&nodes, self.id, Direction::Children)
            .into_iter()
            .flat_map(|id| nodes[id.index()].matches(&key))
            .filter(|def| seen.insert(def.id()))
            .collect()
    }

    /// 只在本容器中查找
    pub fn find_local_component_defs(&self, key: impl Into<ComponentKey>) -> Vec<Arc<ComponentDef>> {
        self.tree.nodes.read()[self.id.index()].matches(&key.into())
    }

    /// 本容器注册的全部组件定义
    pub fn component_defs(&self) -> Vec<Arc<ComponentDef>> {
        self.tree.nodes.read()[self.id.index()].defs.clone()
    }

    // ---- 组件获取 ----

    pub(crate) fn resolve(
        &self,
        key: &ComponentKey,
        context: &mut ResolveContext,
    ) -> ContainerResult<Instance> {
        let def = self.lookup_def(key)?;
        deployer::deploy(&self.tree, &def, context)
    }

    /// 获取组件实例
    pub fn get_component(&self, key: impl Into<ComponentKey>) -> ContainerResult<Instance> {
        let mut context = self.new_context();
        self.resolve(&key.into(), &mut context)
    }

    /// 按类型获取组件，`K` 可以是具体类型或 `dyn Trait`
    pub fn get<K: ?Sized + Send + Sync + 'static>(&self) -> ContainerResult<Arc<K>> {
        self.get_as::<K>(ComponentKey::of::<K>())
    }

    /// 按名称获取组件并转换为 `K`
    pub fn get_named<K: ?Sized + Send + Sync + 'static>(&self, name: &str) -> ContainerResult<Arc<K>> {
        self.get_as::<K>(ComponentKey::name(name))
    }

    /// 按任意键获取组件并转换为 `K`
    pub fn get_as<K: ?Sized + Send + Sync + 'static>(
        &self,
        key: impl Into<ComponentKey>,
    ) -> ContainerResult<Arc<K>> {
        let def = self.lookup_def(&key.into())?;
        let mut context = self.new_context();
        let instance = deployer::deploy(&self.tree, &def, &mut context)?;
        weaving::typed::<K>(&def, &instance)
    }

    fn materialize(&self, defs: &[Arc<ComponentDef>]) -> ContainerResult<Vec<Instance>> {
        let mut context = self.new_context();
        defs.iter()
            .map(|def| deployer::deploy(&self.tree, def, &mut context))
            .collect()
    }

    /// 获取第一个存在匹配的容器中的全部组件
    pub fn find_components(&self, key: impl Into<ComponentKey>) -> ContainerResult<Vec<Instance>> {
        self.materialize(&self.find_component_defs(key))
    }

    /// 获取自身及全部后代容器中的匹配组件
    pub fn find_all_components(&self, key: impl Into<ComponentKey>) -> ContainerResult<Vec<Instance>> {
        self.materialize(&self.find_all_component_defs(key))
    }

    /// 获取本容器中的匹配组件
    pub fn find_local_components(&self, key: impl Into<ComponentKey>) -> ContainerResult<Vec<Instance>> {
        self.materialize(&self.find_local_component_defs(key))
    }

    /// 获取自身及全部后代容器中可视作 `K` 的全部组件
    pub fn find_all<K: ?Sized + Send + Sync + 'static>(&self) -> ContainerResult<Vec<Arc<K>>> {
        let defs = self.find_all_component_defs(ComponentKey::of::<K>());
        let mut context = self.new_context();
        defs.iter()
            .map(|def| {
                let instance = deployer::deploy(&self.tree, def, &mut context)?;
                weaving::typed::<K>(def, &instance)
            })
            .collect()
    }

    // ---- 外部组件注入 ----

    /// 向外部创建的实例注入依赖，组件定义必须是 outer 作用域
    pub fn inject_dependency<T: Any + Send + Sync>(&self, outer: &mut T) -> ContainerResult<()> {
        let def = self.lookup_def(&ComponentKey::of::<T>())?;
        deployer::inject_outer(&self.tree, &def, outer, std::any::type_name::<T>())
    }

    /// 按指定键向外部创建的实例注入依赖
    pub fn inject_dependency_with_key(
        &self,
        outer: &mut (dyn Any + Send + Sync),
        key: impl Into<ComponentKey>,
    ) -> ContainerResult<()> {
        let def = self.lookup_def(&key.into())?;
        let actual = format!("{:?}", (*outer).type_id());
        deployer::inject_outer(&self.tree, &def, outer, &actual)
    }

    // ---- 层次结构 ----

    /// 包含子容器
    ///
    /// 同一子容器可以被多个父容器包含；重复包含到同一父容器不产生效果
    pub fn include(&self, child: &Self) -> ContainerResult<()> {
        if !self.same_tree(child) {
            return Err(ContainerError::configuration(format!(
                "只能包含同一容器树中的容器: {} <- {}",
                self.describe(),
                child.describe()
            )));
        }
        if child.id == self.id {
            return Err(ContainerError::configuration(format!(
                "容器不能包含自身: {}",
                self.describe()
            )));
        }

        let mut nodes = self.tree.nodes.write();
        if nodes[self.id.index()].children.contains(&child.id) {
            return Ok(());
        }
        nodes[self.id.index()].children.push(child.id);
        nodes[child.id.index()].parents.push(self.id);
        let child_path = nodes[child.id.index()].path.clone();
        drop(nodes);

        if let Some(path) = child_path {
            self.tree.descendants.write().entry(path).or_insert(child.id);
        }
        debug!("包含容器: {} <- {}", self.describe(), child.describe());
        Ok(())
    }

    /// 把容器登记为根容器的后代，之后可以按路径获取
    pub fn register_descendant(&self, descendant: &Self) -> ContainerResult<()> {
        if !self.same_tree(descendant) {
            return Err(ContainerError::configuration(
                "只能登记同一容器树中的容器".to_string(),
            ));
        }
        let path = descendant.path().ok_or_else(|| {
            ContainerError::configuration(format!(
                "没有路径的容器无法登记为后代: {}",
                descendant.describe()
            ))
        })?;
        self.tree.descendants.write().insert(path, descendant.id);
        Ok(())
    }

    /// 按路径获取后代容器
    pub fn get_descendant(&self, path: &str) -> ContainerResult<Self> {
        self.tree
            .descendants
            .read()
            .get(path)
            .map(|id| Self::from_parts(Arc::clone(&self.tree), *id))
            .ok_or_else(|| ContainerError::ContainerNotRegistered {
                path: path.to_string(),
            })
    }

    /// 是否登记了指定路径的后代容器
    pub fn has_descendant(&self, path: &str) -> bool {
        self.tree.descendants.read().contains_key(path)
    }

    /// 第 `index` 个父容器
    pub fn parent(&self, index: usize) -> Option<Self> {
        let parent = self.tree.nodes.read()[self.id.index()].parents.get(index).copied();
        parent.map(|id| Self::from_parts(Arc::clone(&self.tree), id))
    }

    /// 父容器数量
    pub fn parent_count(&self) -> usize {
        self.tree.nodes.read()[self.id.index()].parents.len()
    }

    /// 第 `index` 个子容器
    pub fn child(&self, index: usize) -> Option<Self> {
        let child = self.tree.nodes.read()[self.id.index()].children.get(index).copied();
        child.map(|id| Self::from_parts(Arc::clone(&self.tree), id))
    }

    /// 子容器数量
    pub fn child_count(&self) -> usize {
        self.tree.nodes.read()[self.id.index()].children.len()
    }

    /// 根容器
    pub fn root(&self) -> Self {
        Self::from_parts(Arc::clone(&self.tree), ContainerId::new(0))
    }

    /// 是否为根容器
    pub const fn is_root(&self) -> bool {
        self.id.0 == 0
    }

    // ---- 外部协作者 ----

    /// 设置外部上下文（整棵容器树共享）
    pub fn set_external_context(&self, context: Arc<dyn ExternalContext>) {
        *self.tree.external_context.write() = Some(context);
    }

    /// 外部上下文
    pub fn external_context(&self) -> Option<Arc<dyn ExternalContext>> {
        self.tree.external_context.read().clone()
    }

    /// 设置表达式求值器（整棵容器树共享）
    pub fn set_expression_evaluator(&self, evaluator: Arc<dyn ExpressionEvaluator>) {
        *self.tree.evaluator.write() = Some(evaluator);
    }

    // ---- 生命周期 ----

    /// 初始化容器
    ///
    /// 先初始化子容器（后序、去重），再按注册顺序创建本容器的预创建组件。重复调用无效果，
    /// 并发调用时只有一个线程执行初始化
    pub fn init(&self) -> ContainerResult<()> {
        let order = traversal::post_order(&self.tree.nodes.read(), self.id);
        for id in order {
            Self::from_parts(Arc::clone(&self.tree), id).init_local()?;
        }
        Ok(())
    }

    fn init_local(&self) -> ContainerResult<()> {
        let _guard = self.tree.construction.lock();
        let defs = {
            let nodes = self.tree.nodes.read();
            let node = &nodes[self.id.index()];
            if node.initialized {
                return Ok(());
            }
            node.defs.clone()
        };

        let all_singletons = self.tree.config.initialize_singletons_on_init;
        let mut created = 0;
        for def in &defs {
            let wanted = def.is_eager()
                || (all_singletons && def.scope() == InstanceScope::Singleton);
            if !wanted || def.scope() == InstanceScope::Outer {
                continue;
            }
            let mut context = self.new_context();
            deployer::deploy(&self.tree, def, &mut context)?;
            created += 1;
        }

        self.tree.nodes.write()[self.id.index()].initialized = true;
        info!("容器初始化完成: {}，预创建组件 {} 个", self.describe(), created);
        Ok(())
    }

    /// 销毁容器
    ///
    /// 按创建顺序的逆序调用本容器及后代容器中已缓存单例的销毁方法，然后清空缓存。
    /// 单个销毁方法失败只记录日志；重复调用无效果。
    /// 销毁方法 panic 时，尚未处理的单例仍留在创建记录中，可以再次调用销毁
    pub fn destroy(&self) {
        let _guard = self.tree.construction.lock();
        let subtree: HashSet<ContainerId> =
            traversal::breadth_first(&self.tree.nodes.read(), self.id, Direction::Children)
                .into_iter()
                .collect();

        let mut destroyed = 0;
        while let Some(def) = self.take_latest_created(&subtree) {
            deployer::destroy_singleton(&self.tree, &def);
            destroyed += 1;
        }

        let mut nodes = self.tree.nodes.write();
        for id in &subtree {
            nodes[id.index()].initialized = false;
        }
        drop(nodes);
        info!("容器销毁完成: {}，销毁单例 {} 个", self.describe(), destroyed);
    }

    /// 从创建记录中取出子树内最后创建的单例，一次只取一个
    fn take_latest_created(&self, subtree: &HashSet<ContainerId>) -> Option<Arc<ComponentDef>> {
        let mut log = self.tree.creation_log.lock();
        let index = log
            .iter()
            .rposition(|def| def.owner_id().is_some_and(|id| subtree.contains(&id)))?;
        Some(log.remove(index))
    }

    /// 统计信息
    pub fn stats(&self) -> ContainerStats {
        let nodes = self.tree.nodes.read();
        let node = &nodes[self.id.index()];
        ContainerStats {
            registered_components: node.defs.len(),
            cached_singletons: node
                .defs
                .iter()
                .filter(|def| def.cached_instance().is_some())
                .count(),
            child_count: node.children.len(),
            descendant_count: self.tree.descendants.read().len(),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.same_tree(other) && self.id == other.id
    }
}

impl Eq for Container {}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("path", &self.path())
            .finish()
    }
}
