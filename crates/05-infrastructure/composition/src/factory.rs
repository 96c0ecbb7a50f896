//! 容器工厂
//!
//! 从 [`DescriptorSource`] 读取描述，按包含关系构建容器图：
//!
//! - 同一路径在整棵容器树中只构建一次，菱形包含复用已构建的容器
//! - 正在处理中的路径再次出现时报告 [`ContainerError::CircularInclude`]
//! - 有路径的容器登记为根容器的后代，可以通过 [`Container::get_descendant`] 获取

use crate::descriptor::{ContainerDescriptor, DescriptorSource};
use di_abstractions::ContainerConfig;
use di_impl::Container;
use infrastructure_common::{ContainerError, ContainerResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 容器工厂
pub struct ContainerFactory {
    source: Arc<dyn DescriptorSource>,
    config: ContainerConfig,
}

impl ContainerFactory {
    /// 使用默认容器配置创建工厂
    pub fn new(source: Arc<dyn DescriptorSource>) -> Self {
        Self {
            source,
            config: ContainerConfig::default(),
        }
    }

    /// 设置新建容器树使用的配置
    #[must_use]
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 新建容器树使用的配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 以 `path` 的描述为根构建新的容器树
    pub fn create(&self, path: &str) -> ContainerResult<Container> {
        info!("开始构建容器: {}", path);
        let descriptor = self.source.load(path)?;

        let mut builder = Container::builder()
            .with_path(path)
            .with_config(self.config.clone());
        if let Some(namespace) = descriptor.namespace() {
            builder = builder.with_namespace(namespace);
        }
        let root = builder.build();

        let mut processing = vec![path.to_string()];
        self.assemble(&root, descriptor, &mut processing)?;

        let stats = root.stats();
        info!(
            "容器构建完成: {}，组件 {} 个，后代容器 {} 个",
            path, stats.registered_components, stats.descendant_count
        );
        Ok(root)
    }

    /// 把 `path` 描述的容器包含到已有容器中并返回被包含的容器
    ///
    /// 已构建过的路径直接复用
    pub fn include(&self, parent: &Container, path: &str) -> ContainerResult<Container> {
        let mut processing: Vec<String> = parent.path().into_iter().collect();
        self.include_path(parent, path, &mut processing)
    }

    fn assemble(
        &self,
        container: &Container,
        descriptor: ContainerDescriptor,
        processing: &mut Vec<String>,
    ) -> ContainerResult<()> {
        let includes = descriptor.includes().to_vec();
        for include in &includes {
            self.include_path(container, include, processing)?;
        }
        for def in descriptor.into_components() {
            container.register(def)?;
        }
        Ok(())
    }

    fn include_path(
        &self,
        parent: &Container,
        path: &str,
        processing: &mut Vec<String>,
    ) -> ContainerResult<Container> {
        if processing.iter().any(|current| current == path) {
            let mut chain = processing.clone();
            chain.push(path.to_string());
            return Err(ContainerError::CircularInclude {
                path: path.to_string(),
                chain: chain.join(" -> "),
            });
        }

        let root = parent.root();
        if root.has_descendant(path) {
            let child = root.get_descendant(path)?;
            parent.include(&child)?;
            debug!("复用已构建的容器: {}", path);
            return Ok(child);
        }

        let descriptor = self.source.load(path)?;
        let child = parent.create_container(Some(path), descriptor.namespace());
        root.register_descendant(&child)?;

        processing.push(path.to_string());
        let assembled = self.assemble(&child, descriptor, processing);
        processing.pop();
        assembled?;

        parent.include(&child)?;
        debug!("构建被包含的容器: {}", path);
        Ok(child)
    }
}

impl fmt::Debug for ContainerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
