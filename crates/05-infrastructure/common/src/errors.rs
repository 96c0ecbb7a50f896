//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },

    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },
}

impl ConfigError {
    /// 创建解析错误
    pub fn parse_error(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::ParseError {
            source: source.into(),
        }
    }

    /// 创建验证错误
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// 类型描述符错误
///
/// 由构造函数、属性设置器和方法体在类型不匹配时产生
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("参数不匹配: {type_name}, 位置 {index}, 期望 {expected}")]
    ArgumentMismatch {
        type_name: String,
        index: usize,
        expected: String,
    },

    #[error("参数个数不匹配: {type_name}, 期望 {expected}, 实际 {actual}")]
    ArityMismatch {
        type_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("属性类型不匹配: {type_name}.{property}, 期望 {expected}")]
    PropertyTypeMismatch {
        type_name: String,
        property: String,
        expected: String,
    },

    #[error("目标对象类型不匹配: 期望 {expected}")]
    ReceiverMismatch { expected: String },

    #[error("实例构造失败: {type_name}, 原因: {source}")]
    ConstructionFailed {
        type_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// AOP 错误类型
#[derive(Error, Debug)]
pub enum AopError {
    #[error("方法不存在: {type_name}.{method}")]
    MethodNotFound { type_name: String, method: String },

    #[error("方法无法通过代理调用: {type_name}.{method}, 原因: {reason}")]
    NotInvocable {
        type_name: String,
        method: String,
        reason: String,
    },

    #[error("方法返回值类型不匹配: {method}, 期望 {expected}")]
    ReturnTypeMismatch { method: String, expected: String },

    #[error("切入点表达式无效: {pattern}, 原因: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("方法调用失败: {method}, 原因: {source}")]
    InvocationFailed {
        method: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

impl AopError {
    /// 创建方法调用失败错误
    pub fn invocation_failed(
        method: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::InvocationFailed {
            method: method.into(),
            source: source.into(),
        }
    }
}

/// 容器错误类型
///
/// 组件查找、装配和容器层次结构相关的全部失败情形
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("组件未找到: {key}")]
    ComponentNotFound { key: String },

    #[error("组件注册过多: {key}, 候选类型: {component_types:?}")]
    TooManyRegistration {
        key: String,
        component_types: Vec<String>,
    },

    #[error("检测到循环引用: {chain}")]
    CyclicReference { chain: String },

    #[error("组件类型不匹配: 期望 {expected}, 实际 {actual}")]
    ClassUnmatch { expected: String, actual: String },

    #[error("属性无法自动绑定: {component}.{property}")]
    IllegalAutoBindingProperty { component: String, property: String },

    #[error("构造参数无法自动绑定: {component}, 位置 {index}, 类型 {arg_type}")]
    IllegalAutoBindingArgument {
        component: String,
        index: usize,
        arg_type: String,
    },

    #[error("属性不存在: {component}.{property}")]
    PropertyNotFound { component: String, property: String },

    #[error("找不到可用的构造函数: {component}, 原因: {reason}")]
    ConstructorNotFound { component: String, reason: String },

    #[error("方法不存在: {component}.{method}")]
    MethodNotFound { component: String, method: String },

    #[error("方法无法调用: {component}.{method}, 原因: {reason}")]
    IllegalMethod {
        component: String,
        method: String,
        reason: String,
    },

    #[error("容器未注册: {path}")]
    ContainerNotRegistered { path: String },

    #[error("检测到循环包含: {path}, 包含链: {chain}")]
    CircularInclude { path: String, chain: String },

    #[error("组件不支持该操作: {component}, 操作: {operation}")]
    UnsupportedOperation { component: String, operation: String },

    #[error("组件已属于其他容器: {component}")]
    AlreadyRegistered { component: String },

    #[error("容器配置错误: {message}")]
    Configuration { message: String },

    #[error("解析深度超出限制: {depth}, 解析链: {chain}")]
    ResolutionDepthExceeded { depth: usize, chain: String },

    #[error("组件创建失败: {component}, 原因: {source}")]
    ComponentCreationFailed {
        component: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Aop(#[from] AopError),
}

impl ContainerError {
    /// 创建组件未找到错误
    pub fn not_found(key: impl std::fmt::Display) -> Self {
        Self::ComponentNotFound {
            key: key.to_string(),
        }
    }

    /// 创建配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 创建不支持操作错误
    pub fn unsupported(component: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            component: component.into(),
            operation: operation.into(),
        }
    }

    /// 查找阶段的失败（未找到或不唯一），自动绑定时按绑定强度降级处理
    pub const fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            Self::ComponentNotFound { .. } | Self::TooManyRegistration { .. }
        )
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("容器错误: {source}")]
    ContainerError {
        #[from]
        source: ContainerError,
    },

    #[error("应用上下文启动失败: {message}")]
    BootstrapFailed { message: String },

    #[error("应用上下文状态无效: 当前 {current}, 操作: {operation}")]
    InvalidState { current: String, operation: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ContainerResult<T> = Result<T, ContainerError>;
pub type AopResult<T> = Result<T, AopError>;
pub type DescriptorResult<T> = Result<T, DescriptorError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
