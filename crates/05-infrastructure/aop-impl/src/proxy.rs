//! AOP 代理

use crate::invocation::ProxyInvocation;
use aop_abstractions::{MethodInterceptor, MethodInvocation};
use infrastructure_common::{
    Argument, AopError, AopResult, Instance, MethodDesc, TypeDescriptor, TypeInfo, Value,
};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 代理上的一个方法入口
pub(crate) struct ProxyMethod {
    pub(crate) method: MethodDesc,
    pub(crate) interceptors: Arc<[Arc<dyn MethodInterceptor>]>,
}

/// AOP 代理
///
/// 持有目标实例和按方法分配好的拦截器序列。没有拦截器的方法直接委托给目标。
pub struct AopProxy {
    descriptor: Arc<TypeDescriptor>,
    target: Instance,
    methods: Vec<ProxyMethod>,
}

impl AopProxy {
    pub(crate) fn new(
        descriptor: Arc<TypeDescriptor>,
        target: Instance,
        methods: Vec<ProxyMethod>,
    ) -> Self {
        Self {
            descriptor,
            target,
            methods,
        }
    }

    /// 目标实例
    pub fn target(&self) -> &Instance {
        &self.target
    }

    /// 以具体类型取得目标实例
    pub fn target_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.target).downcast::<T>().ok()
    }

    /// 目标类型
    pub fn target_type(&self) -> TypeInfo {
        self.descriptor.key()
    }

    /// 目标类型描述符
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// 代理上可调用的全部方法名
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|entry| entry.method.name()).collect()
    }

    /// 是否存在指定方法（包括引入的方法）
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|entry| entry.method.name() == name)
    }

    /// 方法是否被织入了拦截器
    ///
    /// 只看同名方法中的第一个重载，区分重载时使用 [`Self::is_woven_with_arity`]
    pub fn is_woven(&self, name: &str) -> bool {
        self.interceptor_count(name) > 0
    }

    /// 指定参数个数的重载是否被织入了拦截器
    pub fn is_woven_with_arity(&self, name: &str, arity: usize) -> bool {
        self.interceptor_count_with_arity(name, arity) > 0
    }

    /// 方法上的拦截器数量，只看同名方法中的第一个重载
    pub fn interceptor_count(&self, name: &str) -> usize {
        self.methods
            .iter()
            .find(|entry| entry.method.name() == name)
            .map_or(0, |entry| entry.interceptors.len())
    }

    /// 指定参数个数的重载上的拦截器数量
    pub fn interceptor_count_with_arity(&self, name: &str, arity: usize) -> usize {
        self.overload(name, arity)
            .map_or(0, |entry| entry.interceptors.len())
    }

    fn overload(&self, name: &str, arity: usize) -> Option<&ProxyMethod> {
        self.methods
            .iter()
            .find(|entry| entry.method.name() == name && entry.method.params().len() == arity)
    }

    fn entry(&self, name: &str, arity: usize) -> AopResult<&ProxyMethod> {
        self.overload(name, arity)
            .or_else(|| self.methods.iter().find(|entry| entry.method.name() == name))
            .ok_or_else(|| AopError::MethodNotFound {
                type_name: self.descriptor.key().name.to_string(),
                method: name.to_string(),
            })
    }

    /// 调用方法
    ///
    /// 有拦截器时构建调用链执行，否则直接调用目标方法
    pub fn invoke(&self, name: &str, arguments: Vec<Argument>) -> AopResult<Value> {
        let entry = self.entry(name, arguments.len())?;
        if entry.interceptors.is_empty() {
            return entry.method.invoke(&*self.target, &arguments);
        }
        let mut invocation = ProxyInvocation::new(
            &*self.target,
            self.descriptor.key(),
            &entry.method,
            arguments,
            &entry.interceptors,
        );
        invocation.proceed()
    }

    /// 调用方法并取得指定类型的返回值
    pub fn invoke_as<R: Any>(&self, name: &str, arguments: Vec<Argument>) -> AopResult<R> {
        self.invoke(name, arguments)?
            .downcast::<R>()
            .map(|value| *value)
            .map_err(|_| AopError::ReturnTypeMismatch {
                method: name.to_string(),
                expected: std::any::type_name::<R>().to_string(),
            })
    }
}

impl fmt::Debug for AopProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let woven: Vec<(&str, usize)> = self
            .methods
            .iter()
            .map(|entry| (entry.method.name(), entry.interceptors.len()))
            .collect();
        f.debug_struct("AopProxy")
            .field("target_type", &self.descriptor.key())
            .field("methods", &woven)
            .finish()
    }
}
