//! 作用域部署器
//!
//! 按组件定义的作用域决定创建还是复用实例：
//! - singleton：双重检查缓存，构造在容器树的可重入锁内进行，每个定义最多构造一次
//! - prototype：每次都构造
//! - outer：实例由调用方创建，只能通过 `inject_dependency` 注入
//! - request/session/application：由外部上下文按组件名缓存

use crate::assembler;
use crate::container::{Container, ContainerTree};
use crate::def::ComponentDef;
use crate::weaving;
use di_abstractions::ResolveContext;
use infrastructure_common::{ContainerError, ContainerResult, Instance, InstanceScope};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, error};

fn owner(tree: &Arc<ContainerTree>, def: &ComponentDef) -> ContainerResult<Container> {
    def.owner_id()
        .map(|id| Container::from_parts(Arc::clone(tree), id))
        .ok_or_else(|| {
            ContainerError::configuration(format!("组件定义未注册到容器: {}", def.display_name()))
        })
}

/// 按作用域获取或创建实例
pub(crate) fn deploy(
    tree: &Arc<ContainerTree>,
    def: &Arc<ComponentDef>,
    context: &mut ResolveContext,
) -> ContainerResult<Instance> {
    match def.scope() {
        InstanceScope::Singleton => deploy_singleton(tree, def, context),
        InstanceScope::Prototype => create(tree, def, context),
        InstanceScope::Outer => Err(ContainerError::unsupported(
            def.display_name(),
            "outer 作用域的组件只能通过 inject_dependency 注入",
        )),
        InstanceScope::Request | InstanceScope::Session | InstanceScope::Application => {
            deploy_external(tree, def, context)
        }
    }
}

fn create(
    tree: &Arc<ContainerTree>,
    def: &Arc<ComponentDef>,
    context: &mut ResolveContext,
) -> ContainerResult<Instance> {
    let container = owner(tree, def)?;
    context.enter(def.id(), &def.display_name())?;
    let result = assembler::assemble(&container, def, context);
    context.leave(def.id());
    if let Err(e) = &result {
        debug!("组件创建失败: {}，原因: {}", def.display_name(), e);
    }
    result
}

fn deploy_singleton(
    tree: &Arc<ContainerTree>,
    def: &Arc<ComponentDef>,
    context: &mut ResolveContext,
) -> ContainerResult<Instance> {
    if let Some(instance) = def.cached_instance() {
        return Ok(instance);
    }

    let _guard = tree.construction.lock();
    if let Some(instance) = def.cached_instance() {
        return Ok(instance);
    }
    // 同一线程在构造完成前再次进入
    if !def.begin_construction() {
        return Err(ContainerError::CyclicReference {
            chain: context.describe_with(&def.display_name()),
        });
    }
    let result = create(tree, def, context);
    def.end_construction();
    let instance = result?;

    *def.slot.instance.write() = Some(Arc::clone(&instance));
    tree.creation_log.lock().push(Arc::clone(def));
    debug!("单例创建完成: {}", def.display_name());
    Ok(instance)
}

fn deploy_external(
    tree: &Arc<ContainerTree>,
    def: &Arc<ComponentDef>,
    context: &mut ResolveContext,
) -> ContainerResult<Instance> {
    let scope = def.scope();
    let name = def.name().ok_or_else(|| {
        ContainerError::configuration(format!(
            "{scope} 作用域的组件必须有名称: {}",
            def.display_name()
        ))
    })?;
    let external = tree.external_context.read().clone().ok_or_else(|| {
        ContainerError::configuration(format!(
            "{scope} 作用域需要外部上下文: {}",
            def.display_name()
        ))
    })?;

    if let Some(instance) = external.get(scope, name) {
        return Ok(instance);
    }
    let instance = create(tree, def, context)?;
    external.put(scope, name, Arc::clone(&instance));
    debug!("外部作用域实例创建完成: {} ({})", def.display_name(), scope);
    Ok(instance)
}

/// 向外部创建的实例注入依赖
pub(crate) fn inject_outer(
    tree: &Arc<ContainerTree>,
    def: &Arc<ComponentDef>,
    outer: &mut (dyn Any + Send + Sync),
    actual: &str,
) -> ContainerResult<()> {
    if def.scope() != InstanceScope::Outer {
        return Err(ContainerError::unsupported(
            def.display_name(),
            format!("{} 作用域的组件不支持 inject_dependency", def.scope()),
        ));
    }
    if (*outer).type_id() != def.component_type().id {
        return Err(ContainerError::ClassUnmatch {
            expected: def.component_type().name.to_string(),
            actual: actual.to_string(),
        });
    }

    let container = owner(tree, def)?;
    let mut context = container.new_context();
    context.enter(def.id(), &def.display_name())?;
    let result = assembler::inject(&container, def, outer, &mut context);
    context.leave(def.id());
    result
}

/// 销毁单例：清除缓存并调用销毁方法，失败只记录日志
pub(crate) fn destroy_singleton(tree: &Arc<ContainerTree>, def: &Arc<ComponentDef>) {
    let Some(instance) = def.slot.instance.write().take() else {
        return;
    };
    if def.destroy_methods().is_empty() {
        return;
    }
    let container = match owner(tree, def) {
        Ok(container) => container,
        Err(e) => {
            error!("组件销毁失败: {}，原因: {}", def.display_name(), e);
            return;
        }
    };

    let target = weaving::unwrap_target(def, &instance);
    for method in def.destroy_methods() {
        if let Err(e) = assembler::invoke_published(&container, def, method, &*target) {
            error!(
                "组件销毁方法执行失败: {}.{}，原因: {}",
                def.display_name(),
                method.name,
                e
            );
        } else {
            debug!("组件销毁方法执行完成: {}.{}", def.display_name(), method.name);
        }
    }
}
