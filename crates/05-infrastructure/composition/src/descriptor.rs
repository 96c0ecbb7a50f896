//! 容器描述
//!
//! 描述文件的解析不在本 crate 内完成。外部解析器把每个描述文件转换为
//! [`ContainerDescriptor`]，再通过 [`DescriptorSource`] 交给 [`ContainerFactory`](crate::ContainerFactory)

use dashmap::DashMap;
use di_impl::ComponentDef;
use infrastructure_common::{ContainerError, ContainerResult};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 单个容器的描述：路径、命名空间、组件定义和包含的其他描述
pub struct ContainerDescriptor {
    path: String,
    namespace: Option<String>,
    includes: Vec<String>,
    components: Vec<ComponentDef>,
}

impl ContainerDescriptor {
    /// 创建描述
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            namespace: None,
            includes: Vec::new(),
            components: Vec::new(),
        }
    }

    /// 设置命名空间
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// 追加包含路径，按追加顺序处理
    #[must_use]
    pub fn include(mut self, path: impl Into<String>) -> Self {
        self.includes.push(path.into());
        self
    }

    /// 追加组件定义
    #[must_use]
    pub fn component(mut self, def: ComponentDef) -> Self {
        self.components.push(def);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub(crate) fn into_components(self) -> Vec<ComponentDef> {
        self.components
    }
}

impl fmt::Debug for ContainerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerDescriptor")
            .field("path", &self.path)
            .field("namespace", &self.namespace)
            .field("includes", &self.includes)
            .field("components", &self.components.len())
            .finish()
    }
}

/// 容器描述来源
///
/// 每次调用都返回新的描述，组件定义只能注册到一个容器
pub trait DescriptorSource: Send + Sync {
    /// 加载指定路径的描述
    fn load(&self, path: &str) -> ContainerResult<ContainerDescriptor>;

    /// 是否存在指定路径的描述
    fn contains(&self, path: &str) -> bool;
}

type DescriptorFactory = Arc<dyn Fn() -> ContainerDescriptor + Send + Sync>;

/// 内存中的描述来源，按路径保存描述的构造函数
#[derive(Default)]
pub struct InMemoryDescriptorSource {
    factories: DashMap<String, DescriptorFactory>,
}

impl InMemoryDescriptorSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记描述构造函数（链式）
    #[must_use]
    pub fn with_descriptor<F>(self, path: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> ContainerDescriptor + Send + Sync + 'static,
    {
        self.add(path, factory);
        self
    }

    /// 登记描述构造函数，同一路径重复登记时覆盖
    pub fn add<F>(&self, path: impl Into<String>, factory: F)
    where
        F: Fn() -> ContainerDescriptor + Send + Sync + 'static,
    {
        let path = path.into();
        debug!("登记容器描述: {}", path);
        self.factories.insert(path, Arc::new(factory));
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl DescriptorSource for InMemoryDescriptorSource {
    fn load(&self, path: &str) -> ContainerResult<ContainerDescriptor> {
        // 先克隆出构造函数再调用，避免构造期间持有分片锁
        let factory = self
            .factories
            .get(path)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ContainerError::ContainerNotRegistered {
                path: path.to_string(),
            })?;
        let descriptor = factory();
        if descriptor.path() != path {
            return Err(ContainerError::configuration(format!(
                "描述路径不一致: 登记为 {path}，实际为 {}",
                descriptor.path()
            )));
        }
        Ok(descriptor)
    }

    fn contains(&self, path: &str) -> bool {
        self.factories.contains_key(path)
    }
}

impl fmt::Debug for InMemoryDescriptorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<String> = self.factories.iter().map(|entry| entry.key().clone()).collect();
        paths.sort();
        f.debug_struct("InMemoryDescriptorSource")
            .field("paths", &paths)
            .finish()
    }
}
