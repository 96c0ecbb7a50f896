//! # 基础设施组合层
//!
//! 这个 crate 把容器、配置和日志组合成一个可运行的应用上下文。
//!
//! ## 主要功能
//!
//! - **容器描述**: [`ContainerDescriptor`] 和可插拔的 [`DescriptorSource`]
//! - **容器工厂**: [`ContainerFactory`] 按包含关系构建容器图，检测循环包含
//! - **配置加载**: [`ConfigLoader`] 合并 TOML/JSON 文件和环境变量
//! - **生命周期管理**: [`ApplicationContext`] 负责容器的启动和关闭
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{ApplicationContext, ConfigLoader};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::new()
//!         .add_toml_file("config/app.toml")?
//!         .with_env_prefix("LORN");
//!
//!     let context = ApplicationContext::builder()
//!         .load_config(&loader)?
//!         .build()?;
//!
//!     context.start()?;
//!     println!("应用状态: {:?}", context.status());
//!     context.stop()?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod descriptor;
pub mod factory;
pub mod logging;

pub use config::{ApplicationConfig, ConfigLoader, ENV_SEPARATOR};
pub use context::{ApplicationContext, ApplicationContextBuilder, ContextStatus};
pub use descriptor::{ContainerDescriptor, DescriptorSource, InMemoryDescriptorSource};
pub use factory::ContainerFactory;
pub use logging::{initialize_logging, LoggingConfig};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;

#[cfg(test)]
mod tests;
