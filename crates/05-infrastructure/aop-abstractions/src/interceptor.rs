//! 方法拦截器抽象接口

use crate::invocation::MethodInvocation;
use infrastructure_common::{AopResult, Value};

/// 方法拦截器 trait
///
/// 包裹在目标方法周围执行横切逻辑
pub trait MethodInterceptor: Send + Sync {
    /// 拦截一次方法调用
    fn invoke(&self, invocation: &mut dyn MethodInvocation) -> AopResult<Value>;

    /// 拦截器名称，用于日志
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
