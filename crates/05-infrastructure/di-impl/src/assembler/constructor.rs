//! 构造函数装配
//!
//! - 有显式参数时，在参数个数相同的构造函数中选择第一个所有参数都能填入的
//! - 否则在自动绑定构造函数的策略下，优先选择参数最多且参数全部可解析的构造函数
//! - 其余情况使用无参构造函数

use super::binding;
use crate::container::Container;
use crate::def::{ArgDef, ComponentDef};
use di_abstractions::{ComponentKey, ResolveContext};
use infrastructure_common::{Argument, ConstructorDesc, ContainerError, ContainerResult};
use std::any::Any;
use std::cmp::Reverse;
use tracing::debug;

pub(super) fn construct(
    container: &Container,
    def: &ComponentDef,
    context: &mut ResolveContext,
) -> ContainerResult<Box<dyn Any + Send + Sync>> {
    if let Some(args) = def.args() {
        return construct_explicit(container, def, args, context);
    }
    if def.auto_binding().autowires_constructor() {
        return construct_auto(container, def, context);
    }
    construct_default(def)
}

fn not_found(def: &ComponentDef, reason: impl Into<String>) -> ContainerError {
    ContainerError::ConstructorNotFound {
        component: def.display_name(),
        reason: reason.into(),
    }
}

fn construct_default(def: &ComponentDef) -> ContainerResult<Box<dyn Any + Send + Sync>> {
    let descriptor = def.descriptor();
    let constructor = descriptor
        .constructors()
        .iter()
        .find(|constructor| constructor.arity() == 0)
        .ok_or_else(|| not_found(def, "缺少无参构造函数"))?;
    Ok(constructor.construct(descriptor.key().name, &[])?)
}

fn construct_auto(
    container: &Container,
    def: &ComponentDef,
    context: &mut ResolveContext,
) -> ContainerResult<Box<dyn Any + Send + Sync>> {
    let descriptor = def.descriptor();
    let mut candidates: Vec<&ConstructorDesc> = descriptor.constructors().iter().collect();
    candidates.sort_by_key(|constructor| Reverse(constructor.arity()));

    for constructor in candidates {
        // 存在多个匹配的参数也算可解析，由 auto_bind 报告 TooManyRegistration
        let resolvable = constructor.params.iter().all(|param| {
            param
                .component
                .is_some_and(|component| container.has_component_def(ComponentKey::Type(component)))
        });
        if !resolvable {
            continue;
        }

        let mut args = Vec::with_capacity(constructor.arity());
        for param in &constructor.params {
            args.push(binding::auto_bind(container, param, context)?);
        }
        debug!(
            "自动选择构造函数: {}，参数个数 {}",
            def.display_name(),
            constructor.arity()
        );
        return Ok(constructor.construct(descriptor.key().name, &args)?);
    }

    Err(not_found(def, "没有参数可以全部自动绑定的构造函数"))
}

fn construct_explicit(
    container: &Container,
    def: &ComponentDef,
    args: &[ArgDef],
    context: &mut ResolveContext,
) -> ContainerResult<Box<dyn Any + Send + Sync>> {
    let descriptor = def.descriptor();
    let candidates: Vec<&ConstructorDesc> = descriptor
        .constructors()
        .iter()
        .filter(|constructor| constructor.arity() == args.len())
        .collect();
    if candidates.is_empty() {
        return Err(not_found(def, format!("没有 {} 个参数的构造函数", args.len())));
    }

    for constructor in candidates {
        if let Some(values) = bind_arguments(container, def, constructor, args, context)? {
            return Ok(constructor.construct(descriptor.key().name, &values)?);
        }
    }
    Err(not_found(def, "显式参数与构造函数的参数类型不匹配"))
}

/// 为候选构造函数准备参数，参数无法填入时返回 `None`
fn bind_arguments(
    container: &Container,
    def: &ComponentDef,
    constructor: &ConstructorDesc,
    args: &[ArgDef],
    context: &mut ResolveContext,
) -> ContainerResult<Option<Vec<Argument>>> {
    let component = def.display_name();
    let mut values = Vec::with_capacity(args.len());

    for (index, (param, arg)) in constructor.params.iter().zip(args).enumerate() {
        let value = match &arg.expression {
            Some(expression) => {
                match binding::evaluate(container, expression, param, &component, context) {
                    Ok(value) => Some(value),
                    Err(ContainerError::ClassUnmatch { .. }) => None,
                    Err(e) => return Err(e),
                }
            }
            None if arg.binding_type.allows_auto_binding() => binding::downgrade(
                binding::auto_bind(container, param, context),
                arg.binding_type,
                || format!("{component} 的构造参数 {index}"),
                || ContainerError::IllegalAutoBindingArgument {
                    component: component.clone(),
                    index,
                    arg_type: param.to_string(),
                },
            )?,
            None => None,
        };

        match value {
            Some(value) if param.accepts(&value) => values.push(value),
            _ => return Ok(None),
        }
    }
    Ok(Some(values))
}
