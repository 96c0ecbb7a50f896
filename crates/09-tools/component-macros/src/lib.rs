//! # Component Macros
//!
//! 为容器组件生成 `infrastructure_common::Describe` 实现的过程宏。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::Component;
//! use std::sync::Arc;
//!
//! #[derive(Default, Component)]
//! #[component(default, implements(Greeter(greet)), methods(greet))]
//! pub struct Reception {
//!     #[inject]
//!     dao: Option<Arc<Dao>>,
//!     #[inject(name = "english")]
//!     greeter: Option<Arc<dyn Greeter>>,
//!     #[value]
//!     port: u16,
//! }
//! ```
//!
//! ## 结构体参数
//!
//! - `default` / `new` - 使用 `Default::default` 或 `Self::new` 作为无参构造函数
//! - `implements(Trait(method, ...), ...)` - 声明实现的接口及接口方法
//! - `methods(name, ...)` - 暴露无参方法，可用于初始化、销毁和 AOP 调用
//! - `try_methods(name, ...)` - 暴露返回 `Result` 的无参方法
//! - `customize = path` - 对生成的描述符构建器做进一步补充，例如带参数的构造函数
//!
//! ## 字段参数
//!
//! - `#[inject]` - `Option<Arc<K>>` 或 `Arc<K>` 字段作为组件属性
//! - `#[value]` - 值类属性，只能由表达式或外部参数提供
//! - 两者都支持 `name = "..."` 覆盖属性名

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod component;
mod utils;

/// 组件派生宏
///
/// 生成 `infrastructure_common::Describe` 实现，使用方需要依赖 `infrastructure-common`。
#[proc_macro_derive(Component, attributes(component, inject, value))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
