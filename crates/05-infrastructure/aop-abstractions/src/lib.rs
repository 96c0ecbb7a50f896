//! # AOP Abstractions
//!
//! 面向切面编程抽象层，定义拦截器、方法调用和切入点的核心接口。
//!
//! ## 核心接口
//!
//! - [`MethodInterceptor`] - 方法拦截器
//! - [`MethodInvocation`] - 方法调用上下文，通过 `proceed` 推进拦截器链
//! - [`Pointcut`] - 切入点，决定切面作用于哪些方法
//! - [`Aspect`] - 切入点与拦截器的组合
//! - [`InterType`] - 向代理引入额外方法

pub mod aspect;
pub mod interceptor;
pub mod invocation;
pub mod pointcut;

pub use aspect::*;
pub use interceptor::*;
pub use invocation::*;
pub use pointcut::*;
