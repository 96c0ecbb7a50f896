//! # Infrastructure Common
//!
//! 这个 crate 提供了 Lorn 容器各层共享的基础类型。
//!
//! ## 核心组件
//!
//! - [`TypeInfo`] - 类型标识，可描述具体类型和 `dyn Trait`
//! - [`TypeDescriptor`] - 类型描述符：构造函数、属性、方法和接口
//! - [`Describe`] - 可自描述组件 trait
//! - [`InstanceScope`] / [`AutoBindingPolicy`] / [`BindingType`] - 组件策略
//! - [`ContainerError`] / [`AopError`] - 错误类型
//!
//! ## 设计原则
//!
//! - 容器内部使用类型擦除的实例，对外恢复为 `Arc<K>`
//! - 内省结果按类型缓存，不依赖进程级全局状态

pub mod component;
pub mod descriptor;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use component::*;
pub use descriptor::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
