//! 拦截器链上的方法调用实现

use aop_abstractions::{MethodInterceptor, MethodInvocation};
use infrastructure_common::{Argument, AopResult, MethodDesc, TypeInfo, Value};
use std::any::Any;
use std::sync::Arc;

/// 代理方法调用
///
/// 依次执行拦截器，链尾调用目标对象上的原始方法
pub struct ProxyInvocation<'a> {
    target: &'a (dyn Any + Send + Sync),
    target_type: TypeInfo,
    method: &'a MethodDesc,
    arguments: Vec<Argument>,
    interceptors: &'a [Arc<dyn MethodInterceptor>],
    index: usize,
}

impl<'a> ProxyInvocation<'a> {
    /// 创建代理方法调用
    pub fn new(
        target: &'a (dyn Any + Send + Sync),
        target_type: TypeInfo,
        method: &'a MethodDesc,
        arguments: Vec<Argument>,
        interceptors: &'a [Arc<dyn MethodInterceptor>],
    ) -> Self {
        Self {
            target,
            target_type,
            method,
            arguments,
            interceptors,
            index: 0,
        }
    }
}

impl MethodInvocation for ProxyInvocation<'_> {
    fn method(&self) -> &MethodDesc {
        self.method
    }

    fn this(&self) -> &(dyn Any + Send + Sync) {
        self.target
    }

    fn target_type(&self) -> TypeInfo {
        self.target_type
    }

    fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    fn arguments_mut(&mut self) -> &mut Vec<Argument> {
        &mut self.arguments
    }

    fn proceed(&mut self) -> AopResult<Value> {
        let interceptors = self.interceptors;
        let current = self.index;
        match interceptors.get(current) {
            Some(interceptor) => {
                self.index = current + 1;
                let result = interceptor.invoke(self);
                // 允许拦截器多次调用 proceed
                self.index = current;
                result
            }
            None => self.method.invoke(self.target, &self.arguments),
        }
    }
}

/// 嵌套方法调用
///
/// 执行自己的拦截器序列，链尾把调用交还给外层调用上下文
pub struct NestedMethodInvocation<'p, 'i> {
    parent: &'p mut (dyn MethodInvocation + 'i),
    interceptors: &'p [Arc<dyn MethodInterceptor>],
    index: usize,
}

impl<'p, 'i> NestedMethodInvocation<'p, 'i> {
    /// 创建嵌套方法调用
    pub fn new(
        parent: &'p mut (dyn MethodInvocation + 'i),
        interceptors: &'p [Arc<dyn MethodInterceptor>],
    ) -> Self {
        Self {
            parent,
            interceptors,
            index: 0,
        }
    }
}

impl MethodInvocation for NestedMethodInvocation<'_, '_> {
    fn method(&self) -> &MethodDesc {
        self.parent.method()
    }

    fn this(&self) -> &(dyn Any + Send + Sync) {
        self.parent.this()
    }

    fn target_type(&self) -> TypeInfo {
        self.parent.target_type()
    }

    fn arguments(&self) -> &[Argument] {
        self.parent.arguments()
    }

    fn arguments_mut(&mut self) -> &mut Vec<Argument> {
        self.parent.arguments_mut()
    }

    fn proceed(&mut self) -> AopResult<Value> {
        let interceptors = self.interceptors;
        let current = self.index;
        match interceptors.get(current) {
            Some(interceptor) => {
                self.index = current + 1;
                let result = interceptor.invoke(self);
                self.index = current;
                result
            }
            None => self.parent.proceed(),
        }
    }
}
