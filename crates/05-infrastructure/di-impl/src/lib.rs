//! # 依赖注入具体实现
//!
//! 提供层次化组件容器、组件定义、作用域部署器和装配器
//!
//! ## 核心组件
//!
//! - [`Container`] - 组件容器句柄，支持包含关系、命名空间和后代容器
//! - [`ComponentDef`] - 组件定义：作用域、绑定策略、构造参数、属性、方法和切面
//! - [`SimpleExternalContext`] - 请求、会话和应用作用域的内存缓存
//! - [`VariableEvaluator`] - 支持组件引用和变量替换的表达式求值器
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use di_impl::Container;
//!
//! let container = Container::new();
//! container.register_type::<Logic>(Some("logic"))?;
//! container.init()?;
//! let logic = container.get::<Logic>()?;
//! ```

mod assembler;
pub mod container;
pub mod def;
mod deployer;
pub mod evaluator;
pub mod external;
mod traversal;
mod weaving;

pub use container::{Container, ContainerBuilder, ContainerId};
pub use def::{
    ArgDef, AspectDef, ComponentDef, ComponentDefBuilder, InterTypeDef, MethodDef, PropertyDef,
};
pub use evaluator::VariableEvaluator;
pub use external::SimpleExternalContext;
