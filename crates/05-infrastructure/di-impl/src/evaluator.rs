//! 变量表达式求值器
//!
//! 支持的写法：
//! - `#name` 引用名为 `name` 的组件
//! - `${var}` 替换为容器配置中的变量，可以嵌在文本中
//! - 其余文本按注入点的值类型解析（字符串、布尔、整数、浮点数）

use di_abstractions::{ComponentKey, ComponentLookup, EvaluationContext, ExpressionEvaluator};
use infrastructure_common::{argument_of, Argument, ContainerError, ContainerResult, InjectionPoint};
use std::str::FromStr;
use tracing::debug;

/// 变量表达式求值器
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableEvaluator;

impl VariableEvaluator {
    /// 创建求值器
    pub const fn new() -> Self {
        Self
    }

    /// 替换文本中的 `${var}` 引用
    pub fn interpolate(source: &str, context: &EvaluationContext<'_>) -> ContainerResult<String> {
        let mut output = String::with_capacity(source.len());
        let mut rest = source;
        while let Some(start) = rest.find("${") {
            output.push_str(&rest[..start]);
            let tail = &rest[start + 2..];
            let end = tail.find('}').ok_or_else(|| {
                ContainerError::configuration(format!("变量引用缺少右括号: {source}"))
            })?;
            let name = tail[..end].trim();
            let value = context.variable(name).ok_or_else(|| {
                ContainerError::configuration(format!(
                    "变量未定义: {name}，组件: {}",
                    context.component
                ))
            })?;
            output.push_str(value);
            rest = &tail[end + 1..];
        }
        output.push_str(rest);
        Ok(output)
    }
}

fn parse<V>(text: &str, expected: &InjectionPoint) -> ContainerResult<Argument>
where
    V: FromStr + Send + Sync + 'static,
    V::Err: std::fmt::Display,
{
    text.parse::<V>().map(argument_of).map_err(|e| {
        ContainerError::configuration(format!(
            "无法把 '{text}' 解析为 {}: {e}",
            expected.value.short_name()
        ))
    })
}

fn literal(text: &str, expected: &InjectionPoint) -> ContainerResult<Argument> {
    let value = expected.value;
    if value.is::<String>() {
        Ok(argument_of(text.to_string()))
    } else if value.is::<bool>() {
        parse::<bool>(text, expected)
    } else if value.is::<i32>() {
        parse::<i32>(text, expected)
    } else if value.is::<i64>() {
        parse::<i64>(text, expected)
    } else if value.is::<u16>() {
        parse::<u16>(text, expected)
    } else if value.is::<u32>() {
        parse::<u32>(text, expected)
    } else if value.is::<u64>() {
        parse::<u64>(text, expected)
    } else if value.is::<usize>() {
        parse::<usize>(text, expected)
    } else if value.is::<f64>() {
        parse::<f64>(text, expected)
    } else {
        Err(ContainerError::ClassUnmatch {
            expected: value.name.to_string(),
            actual: "文本表达式".to_string(),
        })
    }
}

impl ExpressionEvaluator for VariableEvaluator {
    fn evaluate(
        &self,
        source: &str,
        context: &EvaluationContext<'_>,
        lookup: &mut dyn ComponentLookup,
        expected: &InjectionPoint,
    ) -> ContainerResult<Argument> {
        let text = Self::interpolate(source.trim(), context)?;
        if let Some(name) = text.strip_prefix('#') {
            debug!("表达式引用组件: {}，组件: {}", name, context.component);
            return lookup.lookup_for(&ComponentKey::name(name), expected);
        }
        if expected.component.is_some() {
            return Err(ContainerError::ClassUnmatch {
                expected: expected.value.name.to_string(),
                actual: format!("文本表达式 '{text}'"),
            });
        }
        literal(&text, expected)
    }
}
