//! # AOP 具体实现
//!
//! 提供代理织入器、拦截器链调用以及内置拦截器
//!
//! 织入器为目标类型的每个可织入方法计算匹配的拦截器序列，生成 [`AopProxy`]；
//! 代理上的调用按洋葱顺序穿过拦截器，最后委托给原始方法体。

pub mod chain;
pub mod interceptors;
pub mod inter_type;
pub mod invocation;
pub mod proxy;
pub mod weaver;

pub use chain::InterceptorChain;
pub use interceptors::{FnInterceptor, TraceInterceptor};
pub use inter_type::MethodInterType;
pub use invocation::{NestedMethodInvocation, ProxyInvocation};
pub use proxy::AopProxy;
pub use weaver::Weaver;
