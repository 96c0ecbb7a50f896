//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件查找键、取值表达式和外部协作者的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentKey`] - 组件查找键（名称或类型）
//! - [`Expression`] - 属性、参数和拦截器的取值表达式
//! - [`ExpressionEvaluator`] - 可插拔的表达式求值器
//! - [`ComponentLookup`] - 绑定到当前解析上下文的组件查找接口
//! - [`ExternalContext`] - 请求/会话/应用作用域的外部缓存
//! - [`ResolveContext`] - 单次顶层解析的循环引用检测状态
//! - [`ContainerConfig`] - 容器配置

pub mod container;
pub mod expression;
pub mod external;
pub mod key;
pub mod resolver;

pub use container::*;
pub use expression::*;
pub use external::*;
pub use key::*;
pub use resolver::*;
