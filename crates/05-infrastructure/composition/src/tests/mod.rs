//! 组合层测试


use infrastructure_common::{Describe, TypeDescriptor};
use std::sync::Arc;

/// 无依赖的数据访问组件
pub(crate) struct Dao;

impl Describe for Dao {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>().constructor0(|| Self).build()
    }
}

/// 通过构造函数依赖 [`Dao`]
pub(crate) struct Service {
    pub(crate) dao: Arc<Dao>,
}

impl Describe for Service {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor1::<Dao>(|dao| Self { dao })
            .build()
    }
}
