//! 方法装配

use super::binding;
use crate::container::Container;
use crate::def::{ComponentDef, MethodDef};
use di_abstractions::ResolveContext;
use infrastructure_common::{Argument, ContainerError, ContainerResult, MethodDesc};
use std::any::Any;
use tracing::debug;

/// 依次调用方法，用于注入方法和初始化方法
pub(super) fn invoke_all(
    container: &Container,
    def: &ComponentDef,
    methods: &[MethodDef],
    target: &mut (dyn Any + Send + Sync),
    context: &mut ResolveContext,
) -> ContainerResult<()> {
    for method_def in methods {
        let (method, args) = prepare(container, def, method_def, context)?;
        method.invoke_mut(target, &args)?;
        debug!("方法调用完成: {}.{}", def.display_name(), method.name());
    }
    Ok(())
}

/// 在已发布的实例上调用方法
pub(super) fn invoke_published(
    container: &Container,
    def: &ComponentDef,
    method_def: &MethodDef,
    target: &(dyn Any + Send + Sync),
) -> ContainerResult<()> {
    let mut context = container.new_context();
    let (method, args) = prepare(container, def, method_def, &mut context)?;
    if method.is_exclusive() {
        return Err(ContainerError::IllegalMethod {
            component: def.display_name(),
            method: method_def.name.clone(),
            reason: "实例发布后无法调用需要独占接收者的方法".to_string(),
        });
    }
    method.invoke(target, &args)?;
    Ok(())
}

/// 查找方法并准备参数：显式参数按表达式求值，否则按参数类型自动绑定
fn prepare<'d>(
    container: &Container,
    def: &'d ComponentDef,
    method_def: &MethodDef,
    context: &mut ResolveContext,
) -> ContainerResult<(&'d MethodDesc, Vec<Argument>)> {
    let descriptor = def.descriptor();
    let component = def.display_name();
    let missing = || ContainerError::MethodNotFound {
        component: component.clone(),
        method: method_def.name.clone(),
    };

    match &method_def.args {
        Some(expressions) => {
            let method = descriptor
                .method_with_arity(&method_def.name, expressions.len())
                .ok_or_else(missing)?;
            let mut args = Vec::with_capacity(expressions.len());
            for (param, expression) in method.params().iter().zip(expressions) {
                args.push(binding::evaluate(container, expression, param, &component, context)?);
            }
            Ok((method, args))
        }
        None => {
            let method = descriptor.method(&method_def.name).ok_or_else(missing)?;
            let mut args = Vec::with_capacity(method.params().len());
            for (index, param) in method.params().iter().enumerate() {
                match binding::auto_bind(container, param, context) {
                    Ok(argument) => args.push(argument),
                    Err(e) if e.is_lookup_miss() => {
                        return Err(ContainerError::IllegalMethod {
                            component,
                            method: method_def.name.clone(),
                            reason: format!("参数 {index} ({param}) 无法自动绑定: {e}"),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok((method, args))
        }
    }
}
