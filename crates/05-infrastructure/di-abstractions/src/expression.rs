//! 取值表达式与求值器接口

use crate::key::ComponentKey;
use infrastructure_common::{
    argument_of, component_argument, Argument, ContainerResult, InjectionPoint, Instance,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 取值表达式
///
/// 常量直接作为参数使用；组件引用由容器解析并转换为注入点类型；
/// 源码表达式交给 [`ExpressionEvaluator`] 求值
#[derive(Clone)]
pub enum Expression {
    /// 常量参数
    Constant(Argument),
    /// 组件引用
    Component(ComponentKey),
    /// 由表达式求值器解释的源码
    Source(String),
}

impl Expression {
    /// 值常量
    pub fn value<V: Send + Sync + 'static>(value: V) -> Self {
        Self::Constant(argument_of(value))
    }

    /// 现成的组件引用常量，注入点类型为 `Arc<K>`
    pub fn instance<K: ?Sized + Send + Sync + 'static>(reference: Arc<K>) -> Self {
        Self::Constant(component_argument(reference))
    }

    /// 按名称引用组件
    pub fn component(name: impl Into<String>) -> Self {
        Self::Component(ComponentKey::Name(name.into()))
    }

    /// 按类型引用组件
    pub fn component_of<K: ?Sized + 'static>() -> Self {
        Self::Component(ComponentKey::of::<K>())
    }

    /// 源码表达式
    pub fn source(source: impl Into<String>) -> Self {
        Self::Source(source.into())
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(_) => f.write_str("Constant(..)"),
            Self::Component(key) => write!(f, "Component({key})"),
            Self::Source(source) => write!(f, "Source({source:?})"),
        }
    }
}

/// 求值上下文
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// 容器配置中的变量
    pub variables: &'a HashMap<String, String>,
    /// 正在装配的组件
    pub component: &'a str,
}

impl<'a> EvaluationContext<'a> {
    /// 创建求值上下文
    pub const fn new(variables: &'a HashMap<String, String>, component: &'a str) -> Self {
        Self {
            variables,
            component,
        }
    }

    /// 读取变量
    pub fn variable(&self, name: &str) -> Option<&'a str> {
        self.variables.get(name).map(String::as_str)
    }
}

/// 组件查找接口
///
/// 求值器通过它访问容器，查找沿用当前的解析上下文，因此同样参与循环引用检测
pub trait ComponentLookup {
    /// 获取组件实例
    fn lookup(&mut self, key: &ComponentKey) -> ContainerResult<Instance>;

    /// 获取组件并转换为注入点要求的参数
    fn lookup_for(&mut self, key: &ComponentKey, point: &InjectionPoint)
        -> ContainerResult<Argument>;

    /// 是否存在匹配的组件定义
    fn contains(&self, key: &ComponentKey) -> bool;
}

/// 表达式求值器
pub trait ExpressionEvaluator: Send + Sync {
    /// 对源码求值，结果必须能填入 `expected`
    fn evaluate(
        &self,
        source: &str,
        context: &EvaluationContext<'_>,
        lookup: &mut dyn ComponentLookup,
        expected: &InjectionPoint,
    ) -> ContainerResult<Argument>;
}
