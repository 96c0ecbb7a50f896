//! 方法调用上下文

use infrastructure_common::{Argument, AopResult, MethodDesc, TypeInfo, Value};
use std::any::Any;

/// 方法调用 trait
///
/// 拦截器通过 [`proceed`](MethodInvocation::proceed) 把调用交给链上的下一个拦截器，
/// 最后一个拦截器之后执行原始方法体。不调用 `proceed` 即短路整条链。
pub trait MethodInvocation {
    /// 被调用的方法
    fn method(&self) -> &MethodDesc;

    /// 目标对象
    fn this(&self) -> &(dyn Any + Send + Sync);

    /// 目标对象类型
    fn target_type(&self) -> TypeInfo;

    /// 调用参数
    fn arguments(&self) -> &[Argument];

    /// 可修改的调用参数
    fn arguments_mut(&mut self) -> &mut Vec<Argument>;

    /// 继续执行调用链
    fn proceed(&mut self) -> AopResult<Value>;
}

impl<'a> dyn MethodInvocation + 'a {
    /// 按位置读取参数值
    pub fn argument<V: Any>(&self, index: usize) -> Option<&V> {
        self.arguments()
            .get(index)
            .and_then(|argument| argument.downcast_ref::<V>())
    }

    /// 目标对象的具体类型引用
    pub fn this_as<T: Any>(&self) -> Option<&T> {
        self.this().downcast_ref::<T>()
    }
}
