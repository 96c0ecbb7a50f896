//! 织入与类型化访问
//!
//! 织入后的实例是 [`AopProxy`]。按类型访问时：
//! - 请求 `AopProxy` 本身时返回代理
//! - 描述符为目标接口提供了增强转换时返回经过代理的接口视图
//! - 否则退回到原始目标实例的转换，此时的调用不经过拦截器

use crate::assembler::binding;
use crate::container::Container;
use crate::def::ComponentDef;
use aop_abstractions::{Aspect, InterType, MethodInterceptor};
use aop_impl::AopProxy;
use di_abstractions::ResolveContext;
use infrastructure_common::{
    downcast_handle, handle_of, Argument, ContainerError, ContainerResult, Handle, InjectionPoint,
    Instance, TypeInfo,
};
use std::sync::Arc;
use tracing::debug;

fn mismatch(point: &InjectionPoint, def: &ComponentDef) -> ContainerError {
    ContainerError::ClassUnmatch {
        expected: point.value.name.to_string(),
        actual: def.component_type().name.to_string(),
    }
}

fn extract<K: ?Sized + Send + Sync + 'static>(argument: &Argument) -> Option<Arc<K>> {
    argument.downcast_ref::<Arc<K>>().cloned()
}

/// 求值切面和类型间声明并生成代理
pub(crate) fn weave(
    container: &Container,
    def: &ComponentDef,
    instance: Instance,
    context: &mut ResolveContext,
) -> ContainerResult<Instance> {
    let component = def.display_name();

    let point = InjectionPoint::component::<dyn MethodInterceptor>();
    let mut aspects = Vec::new();
    for aspect in def.aspects() {
        let argument = binding::evaluate(container, &aspect.interceptor, &point, &component, context)?;
        let interceptor =
            extract::<dyn MethodInterceptor>(&argument).ok_or_else(|| mismatch(&point, def))?;
        aspects.push(Aspect::new(interceptor, aspect.pointcut));
    }

    let point = InjectionPoint::component::<dyn InterType>();
    let mut inter_types = Vec::new();
    for inter_type in def.inter_types() {
        let argument =
            binding::evaluate(container, &inter_type.inter_type, &point, &component, context)?;
        inter_types.push(extract::<dyn InterType>(&argument).ok_or_else(|| mismatch(&point, def))?);
    }

    let proxy = container.tree().weaver.weave(
        Arc::clone(def.descriptor()),
        instance,
        &aspects,
        &inter_types,
    );
    debug!(
        "组件织入完成: {}，切面 {} 个，类型间声明 {} 个",
        component,
        aspects.len(),
        inter_types.len()
    );
    let woven: Instance = Arc::new(proxy);
    Ok(woven)
}

fn as_proxy<'a>(def: &ComponentDef, instance: &'a Instance) -> Option<&'a AopProxy> {
    if def.component_type().is::<AopProxy>() {
        return None;
    }
    instance.downcast_ref::<AopProxy>()
}

/// 把实例转换为目标类型引用
pub(crate) fn cast(def: &ComponentDef, instance: &Instance, target: &TypeInfo) -> Option<Handle> {
    let descriptor = def.descriptor();
    let Some(proxy) = as_proxy(def, instance) else {
        return descriptor.cast(instance, target);
    };

    if target.is::<AopProxy>() {
        return Arc::clone(instance).downcast::<AopProxy>().ok().map(handle_of);
    }
    if let Some(handle) = descriptor.enhance(instance, target) {
        return Some(handle);
    }
    debug!(
        "代理没有 {} 的增强视图，使用原始目标: {}",
        target.short_name(),
        def.display_name()
    );
    descriptor.cast(proxy.target(), target)
}

/// 取得代理背后的原始实例
pub(crate) fn unwrap_target(def: &ComponentDef, instance: &Instance) -> Instance {
    as_proxy(def, instance).map_or_else(|| Arc::clone(instance), |proxy| Arc::clone(proxy.target()))
}

/// 把实例转换为 `Arc<K>`
pub(crate) fn typed<K: ?Sized + Send + Sync + 'static>(
    def: &ComponentDef,
    instance: &Instance,
) -> ContainerResult<Arc<K>> {
    cast(def, instance, &TypeInfo::of::<K>())
        .and_then(|handle| downcast_handle::<K>(handle).ok())
        .ok_or_else(|| ContainerError::ClassUnmatch {
            expected: std::any::type_name::<K>().to_string(),
            actual: def.component_type().name.to_string(),
        })
}
