//! 取值与自动绑定

use crate::container::Container;
use crate::def::ComponentDef;
use crate::deployer;
use crate::weaving;
use di_abstractions::{ComponentKey, ComponentLookup, EvaluationContext, Expression, ResolveContext};
use infrastructure_common::{
    Argument, BindingType, ContainerError, ContainerResult, InjectionPoint, Instance,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// 对表达式求值，结果用于填入 `point`
pub(crate) fn evaluate(
    container: &Container,
    expression: &Expression,
    point: &InjectionPoint,
    component: &str,
    context: &mut ResolveContext,
) -> ContainerResult<Argument> {
    match expression {
        Expression::Constant(argument) => Ok(Arc::clone(argument)),
        Expression::Component(key) => resolve_for_point(container, key, point, context),
        Expression::Source(source) => {
            let evaluator = container.tree().evaluator.read().clone().ok_or_else(|| {
                ContainerError::configuration(format!(
                    "未设置表达式求值器，无法求值: {source}，组件: {component}"
                ))
            })?;
            let evaluation = EvaluationContext::new(&container.config().variables, component);
            let mut lookup = ContextLookup { container, context };
            evaluator.evaluate(source, &evaluation, &mut lookup, point)
        }
    }
}

/// 解析组件并转换为注入点要求的参数
pub(crate) fn resolve_for_point(
    container: &Container,
    key: &ComponentKey,
    point: &InjectionPoint,
    context: &mut ResolveContext,
) -> ContainerResult<Argument> {
    let def = container.lookup_def(key)?;
    resolve_def_for_point(container, &def, point, context)
}

/// 部署指定的组件定义并转换为注入点要求的参数
pub(crate) fn resolve_def_for_point(
    container: &Container,
    def: &Arc<ComponentDef>,
    point: &InjectionPoint,
    context: &mut ResolveContext,
) -> ContainerResult<Argument> {
    let instance = deployer::deploy(container.tree(), def, context)?;
    convert(def, &instance, point)
}

fn convert(def: &ComponentDef, instance: &Instance, point: &InjectionPoint) -> ContainerResult<Argument> {
    let expected = point.component.unwrap_or(point.value);
    point
        .component
        .and_then(|component| weaving::cast(def, instance, &component))
        .map(Argument::from)
        .ok_or_else(|| ContainerError::ClassUnmatch {
            expected: expected.name.to_string(),
            actual: def.component_type().name.to_string(),
        })
}

/// 按注入点的组件类型自动绑定；值类注入点无法自动绑定，视为未找到
pub(crate) fn auto_bind(
    container: &Container,
    point: &InjectionPoint,
    context: &mut ResolveContext,
) -> ContainerResult<Argument> {
    let Some(component) = point.component else {
        return Err(ContainerError::not_found(point.value));
    };
    resolve_for_point(container, &ComponentKey::Type(component), point, context)
}

/// 按绑定强度处理查找失败
///
/// must 报告 `must_error`，should 记录警告，may/none 静默跳过；其他错误原样返回
pub(crate) fn downgrade(
    result: ContainerResult<Argument>,
    binding_type: BindingType,
    target: impl FnOnce() -> String,
    must_error: impl FnOnce() -> ContainerError,
) -> ContainerResult<Option<Argument>> {
    match result {
        Ok(argument) => Ok(Some(argument)),
        Err(e) if e.is_lookup_miss() => match binding_type {
            BindingType::Must => Err(must_error()),
            BindingType::Should => {
                warn!("无法自动绑定 {}: {}", target(), e);
                Ok(None)
            }
            BindingType::May | BindingType::None => {
                debug!("跳过自动绑定 {}: {}", target(), e);
                Ok(None)
            }
        },
        Err(e) => Err(e),
    }
}

/// 绑定到当前解析上下文的组件查找
struct ContextLookup<'a> {
    container: &'a Container,
    context: &'a mut ResolveContext,
}

impl ComponentLookup for ContextLookup<'_> {
    fn lookup(&mut self, key: &ComponentKey) -> ContainerResult<Instance> {
        self.container.resolve(key, self.context)
    }

    fn lookup_for(
        &mut self,
        key: &ComponentKey,
        point: &InjectionPoint,
    ) -> ContainerResult<Argument> {
        resolve_for_point(self.container, key, point, self.context)
    }

    fn contains(&self, key: &ComponentKey) -> bool {
        self.container.has_component_def(key.clone())
    }
}
