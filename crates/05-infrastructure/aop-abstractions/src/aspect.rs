//! 切面与类型间声明

use crate::interceptor::MethodInterceptor;
use crate::pointcut::Pointcut;
use infrastructure_common::{MethodDesc, TypeDescriptor};
use std::fmt;
use std::sync::Arc;

/// 切面：切入点与拦截器的组合
///
/// 没有切入点时由织入器按目标类型推导默认切入点
#[derive(Clone)]
pub struct Aspect {
    pointcut: Option<Arc<Pointcut>>,
    interceptor: Arc<dyn MethodInterceptor>,
}

impl Aspect {
    /// 创建切面
    pub fn new(interceptor: Arc<dyn MethodInterceptor>, pointcut: Option<Pointcut>) -> Self {
        Self {
            pointcut: pointcut.map(Arc::new),
            interceptor,
        }
    }

    /// 使用默认切入点的切面
    pub fn with_default_pointcut(interceptor: Arc<dyn MethodInterceptor>) -> Self {
        Self::new(interceptor, None)
    }

    /// 切入点
    pub fn pointcut(&self) -> Option<&Pointcut> {
        self.pointcut.as_deref()
    }

    /// 拦截器
    pub fn interceptor(&self) -> &Arc<dyn MethodInterceptor> {
        &self.interceptor
    }
}

impl fmt::Debug for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aspect")
            .field("pointcut", &self.pointcut)
            .field("interceptor", &self.interceptor.name())
            .finish()
    }
}

/// 类型间声明 trait
///
/// 在织入前向代理引入额外的方法，引入的方法同样可以被切面拦截
pub trait InterType: Send + Sync {
    /// 为目标类型生成需要引入的方法
    fn introduce(&self, target: &TypeDescriptor) -> Vec<MethodDesc>;
}
