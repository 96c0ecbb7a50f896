//! 组件生命周期与绑定策略

use crate::errors::ContainerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件实例作用域
///
/// 决定实例何时创建以及缓存在哪里
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceScope {
    /// 单例模式，容器生命周期内只创建一个实例
    #[default]
    Singleton,
    /// 原型模式，每次获取都创建新实例
    Prototype,
    /// 外部模式，实例由调用方创建，容器只负责注入
    Outer,
    /// 请求作用域，由外部上下文缓存
    Request,
    /// 会话作用域，由外部上下文缓存
    Session,
    /// 应用作用域，由外部上下文缓存
    Application,
}

impl InstanceScope {
    /// 是否需要外部上下文提供缓存
    pub const fn is_external(self) -> bool {
        matches!(self, Self::Request | Self::Session | Self::Application)
    }

    /// 作用域名称
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::Prototype => "prototype",
            Self::Outer => "outer",
            Self::Request => "request",
            Self::Session => "session",
            Self::Application => "application",
        }
    }
}

impl fmt::Display for InstanceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InstanceScope {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" => Ok(Self::Singleton),
            "prototype" => Ok(Self::Prototype),
            "outer" => Ok(Self::Outer),
            "request" => Ok(Self::Request),
            "session" => Ok(Self::Session),
            "application" => Ok(Self::Application),
            _ => Err(ContainerError::configuration(format!(
                "未知的实例作用域: {s}"
            ))),
        }
    }
}

/// 自动绑定策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoBindingPolicy {
    /// 构造函数和属性都自动绑定
    #[default]
    Auto,
    /// 只处理显式声明的绑定，未声明的属性不自动绑定
    SemiAuto,
    /// 构造函数自动绑定，属性只处理显式声明
    Constructor,
    /// 属性自动绑定，构造函数使用无参构造
    Property,
    /// 完全不自动绑定
    None,
}

impl AutoBindingPolicy {
    /// 是否按参数类型自动选择构造函数
    pub const fn autowires_constructor(self) -> bool {
        matches!(self, Self::Auto | Self::Constructor)
    }

    /// 是否自动绑定未声明的属性
    pub const fn autowires_properties(self) -> bool {
        matches!(self, Self::Auto | Self::Property)
    }
}

impl std::str::FromStr for AutoBindingPolicy {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "semiauto" => Ok(Self::SemiAuto),
            "constructor" => Ok(Self::Constructor),
            "property" => Ok(Self::Property),
            "none" => Ok(Self::None),
            _ => Err(ContainerError::configuration(format!(
                "未知的自动绑定策略: {s}"
            ))),
        }
    }
}

/// 绑定强度
///
/// 控制无法绑定时是报错、警告还是静默跳过
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingType {
    /// 必须绑定，失败即报错
    Must,
    /// 应该绑定，失败时记录警告
    #[default]
    Should,
    /// 可以绑定，失败时静默跳过
    May,
    /// 不进行自动绑定
    None,
}

impl BindingType {
    /// 是否允许自动绑定
    pub const fn allows_auto_binding(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::str::FromStr for BindingType {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "must" => Ok(Self::Must),
            "should" => Ok(Self::Should),
            "may" => Ok(Self::May),
            "none" => Ok(Self::None),
            _ => Err(ContainerError::configuration(format!(
                "未知的绑定类型: {s}"
            ))),
        }
    }
}

/// 容器生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    /// 未初始化
    #[default]
    Uninitialized,
    /// 初始化中
    Initializing,
    /// 运行中
    Running,
    /// 停止中
    Stopping,
    /// 已停止
    Stopped,
    /// 错误状态
    Error,
}

impl LifecycleState {
    /// 是否可以启动
    pub const fn can_start(self) -> bool {
        matches!(self, Self::Uninitialized | Self::Stopped)
    }

    /// 是否可以停止
    pub const fn can_stop(self) -> bool {
        matches!(self, Self::Running | Self::Error)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
