//! 拦截器链

use crate::invocation::NestedMethodInvocation;
use aop_abstractions::{MethodInterceptor, MethodInvocation};
use infrastructure_common::{AopResult, Value};
use std::sync::Arc;

/// 由多个拦截器组成的复合拦截器
///
/// 作为单个拦截器挂在外层调用链上，内部按添加顺序执行，
/// 最后一个拦截器的 `proceed` 交还给外层链继续执行
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn MethodInterceptor>>,
}

impl InterceptorChain {
    /// 创建空的拦截器链
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加拦截器
    pub fn add(&mut self, interceptor: Arc<dyn MethodInterceptor>) {
        self.interceptors.push(interceptor);
    }

    /// 追加拦截器（构建者风格）
    #[must_use]
    pub fn with(mut self, interceptor: Arc<dyn MethodInterceptor>) -> Self {
        self.add(interceptor);
        self
    }

    /// 拦截器数量
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// 全部拦截器
    pub fn interceptors(&self) -> &[Arc<dyn MethodInterceptor>] {
        &self.interceptors
    }
}

impl MethodInterceptor for InterceptorChain {
    fn invoke(&self, invocation: &mut dyn MethodInvocation) -> AopResult<Value> {
        NestedMethodInvocation::new(invocation, &self.interceptors).proceed()
    }

    fn name(&self) -> &str {
        "InterceptorChain"
    }
}
