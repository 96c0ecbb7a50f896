//! 切入点定义

use infrastructure_common::{AopError, AopResult, MethodDesc, TypeDescriptor, TypeInfo};
use regex::Regex;

/// 显式方法引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    /// 声明方法的类型
    pub declaring: TypeInfo,
    /// 方法名
    pub name: String,
}

/// 切入点
///
/// 显式方法引用按相等性比较；模式切入点按方法简单名称完整匹配任一正则表达式
#[derive(Debug, Clone)]
pub enum Pointcut {
    /// 单个方法
    Method(MethodRef),
    /// 方法名正则表达式列表
    Patterns(Vec<Regex>),
}

impl Pointcut {
    /// 指向某个类型上的具体方法
    pub fn for_method<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::Method(MethodRef {
            declaring: TypeInfo::of::<T>(),
            name: name.into(),
        })
    }

    /// 由正则表达式构造，表达式会被锚定为整体匹配
    pub fn from_patterns<I, S>(patterns: I) -> AopResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(&format!("^(?:{pattern})$")).map_err(|source| AopError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<AopResult<Vec<_>>>()?;
        Ok(Self::Patterns(compiled))
    }

    /// 由方法名列表构造
    pub fn from_method_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = names
            .into_iter()
            .filter_map(|name| Regex::new(&format!("^{}$", regex::escape(name.as_ref()))).ok())
            .collect();
        Self::Patterns(compiled)
    }

    /// 默认切入点
    ///
    /// 有接口时取接口声明的全部方法，否则取非 final、非静态、非继承的方法
    pub fn default_for(descriptor: &TypeDescriptor) -> Self {
        let interface_methods = descriptor.interface_method_names();
        if !interface_methods.is_empty() {
            return Self::from_method_names(interface_methods);
        }
        let mut names: Vec<&str> = Vec::new();
        for method in descriptor.methods() {
            let modifiers = method.modifiers();
            if modifiers.is_final || modifiers.synthetic || modifiers.inherited || method.is_static()
            {
                continue;
            }
            if !names.contains(&method.name()) {
                names.push(method.name());
            }
        }
        Self::from_method_names(names)
    }

    /// 判断切入点是否作用于方法
    pub fn is_applied(&self, method: &MethodDesc) -> bool {
        match self {
            Self::Method(reference) => {
                reference.declaring == method.declaring_type() && reference.name == method.name()
            }
            Self::Patterns(patterns) => patterns.iter().any(|re| re.is_match(method.name())),
        }
    }

    /// 是否为显式方法引用
    pub const fn is_explicit_method(&self) -> bool {
        matches!(self, Self::Method(_))
    }
}
