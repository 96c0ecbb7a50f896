//! 装配器
//!
//! 装配顺序：构造函数、属性、注入方法、初始化方法，然后发布实例并按需织入

pub(crate) mod binding;
mod constructor;
mod method;
mod property;

use crate::container::Container;
use crate::def::{ComponentDef, MethodDef};
use crate::weaving;
use di_abstractions::ResolveContext;
use infrastructure_common::{ContainerResult, Instance};
use std::any::Any;
use std::sync::Arc;

/// 创建并装配实例
pub(crate) fn assemble(
    container: &Container,
    def: &ComponentDef,
    context: &mut ResolveContext,
) -> ContainerResult<Instance> {
    let mut object = constructor::construct(container, def, context)?;
    inject(container, def, object.as_mut(), context)?;
    let instance: Instance = Arc::from(object);
    if def.requires_weaving() {
        weaving::weave(container, def, instance, context)
    } else {
        Ok(instance)
    }
}

/// 对已构造但未发布的实例执行属性、注入方法和初始化方法装配
pub(crate) fn inject(
    container: &Container,
    def: &ComponentDef,
    target: &mut (dyn Any + Send + Sync),
    context: &mut ResolveContext,
) -> ContainerResult<()> {
    property::assemble(container, def, target, context)?;
    method::invoke_all(container, def, def.injection_methods(), target, context)?;
    method::invoke_all(container, def, def.init_methods(), target, context)
}

/// 在已发布的实例上调用方法，只支持共享接收者
pub(crate) fn invoke_published(
    container: &Container,
    def: &ComponentDef,
    method: &MethodDef,
    target: &(dyn Any + Send + Sync),
) -> ContainerResult<()> {
    method::invoke_published(container, def, method, target)
}
