//! 外部上下文接口

use infrastructure_common::{Argument, InstanceScope, Instance};

/// 外部上下文
///
/// 由宿主环境提供，负责缓存请求、会话和应用作用域的组件实例，
/// 并可以提供请求参数用于外部绑定
pub trait ExternalContext: Send + Sync {
    /// 读取作用域中缓存的实例
    fn get(&self, scope: InstanceScope, name: &str) -> Option<Instance>;

    /// 把实例放入作用域缓存
    fn put(&self, scope: InstanceScope, name: &str, instance: Instance);

    /// 读取请求参数
    fn parameter(&self, _name: &str) -> Option<Argument> {
        None
    }
}
