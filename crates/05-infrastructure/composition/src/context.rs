//! 应用上下文
//!
//! 持有根容器的显式应用对象：`start` 初始化容器，`stop` 销毁容器，
//! 状态和统计信息可以随时查询

use crate::config::{ApplicationConfig, ConfigLoader};
use crate::descriptor::DescriptorSource;
use crate::factory::ContainerFactory;
use crate::logging::{initialize_logging, LoggingConfig};
use chrono::{DateTime, Utc};
use di_abstractions::{ComponentKey, ContainerConfig, ExpressionEvaluator, ExternalContext};
use di_impl::Container;
use infrastructure_common::{
    ContainerResult, Instance, InfrastructureError, InfrastructureResult, LifecycleState,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

type Configurer = Box<dyn FnOnce(&Container) -> ContainerResult<()> + Send>;

/// 应用上下文构建器
pub struct ApplicationContextBuilder {
    config: ApplicationConfig,
    source: Option<Arc<dyn DescriptorSource>>,
    logging_enabled: bool,
    external_context: Option<Arc<dyn ExternalContext>>,
    evaluator: Option<Arc<dyn ExpressionEvaluator>>,
    configurers: Vec<Configurer>,
}

impl ApplicationContextBuilder {
    pub fn new() -> Self {
        Self {
            config: ApplicationConfig::default(),
            source: None,
            logging_enabled: false,
            external_context: None,
            evaluator: None,
            configurers: Vec::new(),
        }
    }

    /// 设置应用名称
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// 使用完整的应用配置
    #[must_use]
    pub fn with_config(mut self, config: ApplicationConfig) -> Self {
        self.config = config;
        self
    }

    /// 从配置源加载应用配置
    pub fn load_config(mut self, loader: &ConfigLoader) -> InfrastructureResult<Self> {
        self.config = loader.load_application()?;
        Ok(self)
    }

    /// 设置容器配置
    #[must_use]
    pub fn with_container_config(mut self, config: ContainerConfig) -> Self {
        self.config.container = config;
        self
    }

    /// 从描述来源构建容器树，`root` 为根描述路径
    #[must_use]
    pub fn with_descriptor_source(
        mut self,
        source: Arc<dyn DescriptorSource>,
        root: impl Into<String>,
    ) -> Self {
        self.source = Some(source);
        self.config.root = Some(root.into());
        self
    }

    /// 构建时初始化日志
    #[must_use]
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.config.logging = config;
        self.logging_enabled = true;
        self
    }

    #[must_use]
    pub fn with_external_context(mut self, context: Arc<dyn ExternalContext>) -> Self {
        self.external_context = Some(context);
        self
    }

    #[must_use]
    pub fn with_expression_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// 构建完成后对根容器执行的配置，例如注册组件
    #[must_use]
    pub fn configure<F>(mut self, configurer: F) -> Self
    where
        F: FnOnce(&Container) -> ContainerResult<()> + Send + 'static,
    {
        self.configurers.push(Box::new(configurer));
        self
    }

    /// 构建应用上下文
    pub fn build(self) -> InfrastructureResult<ApplicationContext> {
        self.config.validate()?;

        // 只有在明确配置了日志时才初始化，避免测试中重复初始化
        if self.logging_enabled {
            initialize_logging(&self.config.logging)?;
        }
        info!("开始构建应用上下文: {}", self.config.name);

        let container = match &self.source {
            Some(source) => {
                let root = self.config.root.as_deref().ok_or_else(|| {
                    InfrastructureError::BootstrapFailed {
                        message: "未指定根容器描述路径".to_string(),
                    }
                })?;
                ContainerFactory::new(Arc::clone(source))
                    .with_config(self.config.container.clone())
                    .create(root)?
            }
            None => {
                let mut builder = Container::builder().with_config(self.config.container.clone());
                if let Some(root) = &self.config.root {
                    builder = builder.with_path(root.clone());
                }
                builder.build()
            }
        };

        if let Some(context) = self.external_context {
            container.set_external_context(context);
        }
        if let Some(evaluator) = self.evaluator {
            container.set_expression_evaluator(evaluator);
        }
        for configurer in self.configurers {
            configurer(&container)?;
        }

        let context = ApplicationContext {
            id: Uuid::new_v4(),
            name: self.config.name,
            container,
            state: RwLock::new(LifecycleState::Uninitialized),
            metrics: RwLock::new(ContextMetrics::default()),
        };
        info!("应用上下文构建完成: {} ({})", context.name, context.id);
        Ok(context)
    }
}

impl Default for ApplicationContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ApplicationContextBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationContextBuilder")
            .field("config", &self.config)
            .field("has_source", &self.source.is_some())
            .field("logging_enabled", &self.logging_enabled)
            .field("configurers", &self.configurers.len())
            .finish_non_exhaustive()
    }
}

/// 应用上下文
pub struct ApplicationContext {
    id: Uuid,
    name: String,
    container: Container,
    state: RwLock<LifecycleState>,
    metrics: RwLock<ContextMetrics>,
}

impl ApplicationContext {
    /// 创建应用上下文构建器
    pub fn builder() -> ApplicationContextBuilder {
        ApplicationContextBuilder::new()
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 根容器
    pub const fn container(&self) -> &Container {
        &self.container
    }

    /// 当前生命周期状态
    pub fn state(&self) -> LifecycleState {
        *self.state.read()
    }

    /// 启动：初始化整棵容器树
    pub fn start(&self) -> InfrastructureResult<()> {
        self.transition(LifecycleState::can_start, LifecycleState::Initializing, "start")?;
        info!("启动应用上下文: {}", self.name);

        if let Err(e) = self.container.init() {
            error!("容器初始化失败: {}", e);
            *self.state.write() = LifecycleState::Error;
            return Err(e.into());
        }

        *self.state.write() = LifecycleState::Running;
        let mut metrics = self.metrics.write();
        metrics.started_at = Some(Utc::now());
        metrics.stopped_at = None;
        metrics.start_count += 1;
        drop(metrics);
        info!("应用上下文启动完成: {}", self.name);
        Ok(())
    }

    /// 停止：销毁容器中已创建的单例
    pub fn stop(&self) -> InfrastructureResult<()> {
        self.transition(LifecycleState::can_stop, LifecycleState::Stopping, "stop")?;
        info!("停止应用上下文: {}", self.name);

        self.container.destroy();

        *self.state.write() = LifecycleState::Stopped;
        self.metrics.write().stopped_at = Some(Utc::now());
        info!("应用上下文停止完成: {}", self.name);
        Ok(())
    }

    fn transition(
        &self,
        allowed: fn(LifecycleState) -> bool,
        next: LifecycleState,
        operation: &str,
    ) -> InfrastructureResult<()> {
        let mut state = self.state.write();
        if !allowed(*state) {
            warn!("应用上下文状态不允许 {}: {}", operation, *state);
            return Err(InfrastructureError::InvalidState {
                current: state.to_string(),
                operation: operation.to_string(),
            });
        }
        *state = next;
        Ok(())
    }

    /// 按类型获取组件
    pub fn get<K: ?Sized + Send + Sync + 'static>(&self) -> InfrastructureResult<Arc<K>> {
        self.record_resolution();
        Ok(self.container.get::<K>()?)
    }

    /// 按名称获取组件
    pub fn get_named<K: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> InfrastructureResult<Arc<K>> {
        self.record_resolution();
        Ok(self.container.get_named::<K>(name)?)
    }

    /// 按键获取类型擦除的组件实例
    pub fn get_component(&self, key: impl Into<ComponentKey>) -> InfrastructureResult<Instance> {
        self.record_resolution();
        Ok(self.container.get_component(key)?)
    }

    fn record_resolution(&self) {
        self.metrics.write().resolution_count += 1;
    }

    /// 状态快照
    pub fn status(&self) -> ContextStatus {
        let metrics = self.metrics.read().clone();
        let stats = self.container.stats();
        ContextStatus {
            id: self.id,
            name: self.name.clone(),
            state: self.state(),
            uptime_seconds: metrics.uptime().map(|uptime| uptime.num_seconds()),
            started_at: metrics.started_at,
            stopped_at: metrics.stopped_at,
            start_count: metrics.start_count,
            resolution_count: metrics.resolution_count,
            registered_components: stats.registered_components,
            cached_singletons: stats.cached_singletons,
            descendant_count: stats.descendant_count,
        }
    }
}

impl Drop for ApplicationContext {
    fn drop(&mut self) {
        if self.state.get_mut().can_stop() {
            self.container.destroy();
        }
    }
}

impl fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .field("container", &self.container)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
struct ContextMetrics {
    started_at: Option<DateTime<Utc>>,
    stopped_at: Option<DateTime<Utc>>,
    start_count: u64,
    resolution_count: u64,
}

impl ContextMetrics {
    fn uptime(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => Some(stop - start),
            (Some(start), None) => Some(Utc::now() - start),
            _ => None,
        }
    }
}

/// 应用上下文状态快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextStatus {
    pub id: Uuid,
    pub name: String,
    pub state: LifecycleState,
    pub uptime_seconds: Option<i64>,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    /// 启动次数，停止后可以再次启动
    pub start_count: u64,
    /// 通过上下文获取组件的次数
    pub resolution_count: u64,
    /// 根容器注册的组件数量
    pub registered_components: usize,
    /// 根容器已缓存的单例数量
    pub cached_singletons: usize,
    pub descendant_count: usize,
}
