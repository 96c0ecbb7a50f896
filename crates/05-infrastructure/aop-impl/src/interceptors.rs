//! 内置拦截器

use aop_abstractions::{MethodInterceptor, MethodInvocation};
use infrastructure_common::{AopResult, Value};
use std::time::Instant;
use tracing::{debug, debug_span, warn};

/// 调用跟踪拦截器
///
/// 记录方法的进入、退出和耗时
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceInterceptor;

impl TraceInterceptor {
    /// 创建调用跟踪拦截器
    pub const fn new() -> Self {
        Self
    }
}

impl MethodInterceptor for TraceInterceptor {
    fn invoke(&self, invocation: &mut dyn MethodInvocation) -> AopResult<Value> {
        let target = invocation.target_type().short_name();
        let method = invocation.method().name().to_string();
        let span = debug_span!("aop_invoke", component = target, method = %method);
        let _guard = span.enter();

        debug!("开始调用 {}.{}，参数个数: {}", target, method, invocation.arguments().len());
        let started = Instant::now();
        let result = invocation.proceed();
        let elapsed = started.elapsed();

        match &result {
            Ok(_) => debug!("调用完成 {}.{}，耗时 {:?}", target, method, elapsed),
            Err(e) => warn!("调用失败 {}.{}，耗时 {:?}，原因: {}", target, method, elapsed, e),
        }
        result
    }

    fn name(&self) -> &str {
        "TraceInterceptor"
    }
}

/// 闭包拦截器
pub struct FnInterceptor<F> {
    name: String,
    body: F,
}

impl<F> FnInterceptor<F>
where
    F: Fn(&mut dyn MethodInvocation) -> AopResult<Value> + Send + Sync,
{
    /// 由闭包创建拦截器
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> MethodInterceptor for FnInterceptor<F>
where
    F: Fn(&mut dyn MethodInvocation) -> AopResult<Value> + Send + Sync,
{
    fn invoke(&self, invocation: &mut dyn MethodInvocation) -> AopResult<Value> {
        (self.body)(invocation)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
