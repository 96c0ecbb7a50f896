//! 内存外部上下文

use dashmap::DashMap;
use di_abstractions::ExternalContext;
use infrastructure_common::{argument_of, Argument, Instance, InstanceScope};
use tracing::debug;

/// 基于内存的外部上下文
///
/// 请求、会话和应用作用域的实例按 `(作用域, 组件名)` 缓存；
/// 宿主可以在请求开始前放入参数，请求结束时调用 [`clear_scope`](Self::clear_scope)
#[derive(Default)]
pub struct SimpleExternalContext {
    instances: DashMap<(InstanceScope, String), Instance>,
    parameters: DashMap<String, Argument>,
}

impl SimpleExternalContext {
    /// 创建空的外部上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置参数（构建时使用）
    #[must_use]
    pub fn with_parameter<V: Send + Sync + 'static>(self, name: impl Into<String>, value: V) -> Self {
        self.set_parameter(name, value);
        self
    }

    /// 设置参数
    pub fn set_parameter<V: Send + Sync + 'static>(&self, name: impl Into<String>, value: V) {
        self.parameters.insert(name.into(), argument_of(value));
    }

    /// 移除参数
    pub fn remove_parameter(&self, name: &str) -> bool {
        self.parameters.remove(name).is_some()
    }

    /// 清空某个作用域中缓存的实例，返回清除的数量
    pub fn clear_scope(&self, scope: InstanceScope) -> usize {
        let before = self.instances.len();
        self.instances.retain(|(cached_scope, _), _| *cached_scope != scope);
        let cleared = before - self.instances.len();
        debug!("清空外部作用域: {}，实例 {} 个", scope, cleared);
        cleared
    }

    /// 缓存的实例数量
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// 是否没有缓存任何实例
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl ExternalContext for SimpleExternalContext {
    fn get(&self, scope: InstanceScope, name: &str) -> Option<Instance> {
        self.instances
            .get(&(scope, name.to_string()))
            .map(|entry| entry.value().clone())
    }

    fn put(&self, scope: InstanceScope, name: &str, instance: Instance) {
        self.instances.insert((scope, name.to_string()), instance);
    }

    fn parameter(&self, name: &str) -> Option<Argument> {
        self.parameters.get(name).map(|entry| entry.value().clone())
    }
}
