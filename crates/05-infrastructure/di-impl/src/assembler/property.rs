//! 属性装配
//!
//! 声明的属性依次尝试外部绑定、显式表达式、按名称自动绑定、按类型自动绑定；
//! 自动绑定属性的策略下，未声明的组件类属性按容器默认绑定强度自动绑定

use super::binding;
use crate::container::Container;
use crate::def::{ComponentDef, PropertyDef};
use di_abstractions::{ComponentKey, ResolveContext};
use infrastructure_common::{
    Argument, AutoBindingPolicy, BindingType, ContainerError, ContainerResult, PropertyDesc,
};
use std::any::Any;
use tracing::debug;

pub(super) fn assemble(
    container: &Container,
    def: &ComponentDef,
    target: &mut (dyn Any + Send + Sync),
    context: &mut ResolveContext,
) -> ContainerResult<()> {
    let descriptor = def.descriptor();
    let type_name = descriptor.key().name;

    for property_def in def.properties() {
        let property = descriptor.property(&property_def.name).ok_or_else(|| {
            ContainerError::PropertyNotFound {
                component: def.display_name(),
                property: property_def.name.clone(),
            }
        })?;
        if let Some(value) = resolve_declared(container, def, property_def, property, context)? {
            property.apply(type_name, target, &value)?;
            debug!("属性注入完成: {}.{}", def.display_name(), property.name);
        }
    }

    let policy = def.auto_binding();
    if policy == AutoBindingPolicy::None {
        return Ok(());
    }
    let default_binding = container.config().default_binding_type;
    for property in descriptor
        .properties()
        .iter()
        .filter(|property| def.property(&property.name).is_none())
    {
        let value = match external_value(container, def, &property.name) {
            Some(value) => Some(value),
            None if policy.autowires_properties() && property.point.component.is_some() => {
                auto_bind(container, def, property, default_binding, context)?
            }
            None => None,
        };
        if let Some(value) = value {
            property.apply(type_name, target, &value)?;
            debug!("属性自动注入完成: {}.{}", def.display_name(), property.name);
        }
    }
    Ok(())
}

fn external_value(container: &Container, def: &ComponentDef, name: &str) -> Option<Argument> {
    if !def.external_binding() {
        return None;
    }
    container.external_context()?.parameter(name)
}

fn resolve_declared(
    container: &Container,
    def: &ComponentDef,
    property_def: &PropertyDef,
    property: &PropertyDesc,
    context: &mut ResolveContext,
) -> ContainerResult<Option<Argument>> {
    if let Some(value) = external_value(container, def, &property.name) {
        return Ok(Some(value));
    }
    if let Some(expression) = &property_def.expression {
        return binding::evaluate(container, expression, &property.point, &def.display_name(), context)
            .map(Some);
    }
    auto_bind(container, def, property, property_def.binding_type, context)
}

fn auto_bind(
    container: &Container,
    def: &ComponentDef,
    property: &PropertyDesc,
    binding_type: BindingType,
    context: &mut ResolveContext,
) -> ContainerResult<Option<Argument>> {
    if !binding_type.allows_auto_binding() {
        return Ok(None);
    }
    let result = match by_name(container, def, property, context) {
        Some(result) => result,
        None => by_type(container, def, property, context),
    };
    binding::downgrade(
        result,
        binding_type,
        || format!("{}.{}", def.display_name(), property.name),
        || ContainerError::IllegalAutoBindingProperty {
            component: def.display_name(),
            property: property.name.clone(),
        },
    )
}

/// 与属性同名且类型可赋值的组件
fn by_name(
    container: &Container,
    def: &ComponentDef,
    property: &PropertyDesc,
    context: &mut ResolveContext,
) -> Option<ContainerResult<Argument>> {
    let component = property.point.component?;
    let candidate = container
        .lookup_def(&ComponentKey::Name(property.name.clone()))
        .ok()?;
    if candidate.id() == def.id() || !candidate.descriptor().is_assignable_to(&component) {
        return None;
    }
    Some(binding::resolve_def_for_point(container, &candidate, &property.point, context))
}

/// 按属性类型查找，不绑定到自身
fn by_type(
    container: &Container,
    def: &ComponentDef,
    property: &PropertyDesc,
    context: &mut ResolveContext,
) -> ContainerResult<Argument> {
    let Some(component) = property.point.component else {
        return Err(ContainerError::not_found(property.point.value));
    };
    let candidate = container.lookup_def(&ComponentKey::Type(component))?;
    if candidate.id() == def.id() {
        return Err(ContainerError::not_found(component));
    }
    binding::resolve_def_for_point(container, &candidate, &property.point, context)
}
