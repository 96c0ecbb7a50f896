//! 组件查找键与组件定义标识

use infrastructure_common::TypeInfo;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// 组件查找键
///
/// 名称键在命名空间容器中也可以写成 `namespace.name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKey {
    /// 按组件名称查找
    Name(String),
    /// 按类型（具体类型或 `dyn Trait`）查找
    Type(TypeInfo),
}

impl ComponentKey {
    /// 类型键
    pub fn of<K: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<K>())
    }

    /// 名称键
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// 名称键的名称
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Type(_) => None,
        }
    }

    /// 类型键的类型
    pub const fn as_type(&self) -> Option<TypeInfo> {
        match self {
            Self::Name(_) => None,
            Self::Type(type_info) => Some(*type_info),
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "'{name}'"),
            Self::Type(type_info) => write!(f, "{type_info}"),
        }
    }
}

impl From<&str> for ComponentKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ComponentKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<TypeInfo> for ComponentKey {
    fn from(type_info: TypeInfo) -> Self {
        Self::Type(type_info)
    }
}

static NEXT_DEF_ID: AtomicU64 = AtomicU64::new(1);

/// 组件定义标识，进程内唯一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(u64);

impl DefId {
    /// 分配新的标识
    pub fn next() -> Self {
        Self(NEXT_DEF_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 标识数值
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
