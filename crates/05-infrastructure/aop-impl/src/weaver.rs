//! 织入器

use crate::proxy::{AopProxy, ProxyMethod};
use aop_abstractions::{Aspect, InterType, MethodInterceptor, Pointcut};
use infrastructure_common::{Instance, MethodDesc, TypeDescriptor};
use std::sync::Arc;
use tracing::{debug, warn};

/// 织入器
///
/// 为目标类型的每个方法计算有序的拦截器序列并生成代理。
/// final、静态、生成的以及需要独占接收者的方法不会被织入。
#[derive(Debug, Clone, Copy, Default)]
pub struct Weaver;

impl Weaver {
    /// 创建织入器
    pub const fn new() -> Self {
        Self
    }

    /// 织入切面和类型间声明，生成代理
    pub fn weave(
        &self,
        descriptor: Arc<TypeDescriptor>,
        target: Instance,
        aspects: &[Aspect],
        inter_types: &[Arc<dyn InterType>],
    ) -> AopProxy {
        let type_name = descriptor.key().short_name();
        let mut methods: Vec<MethodDesc> = descriptor.methods().to_vec();

        for inter_type in inter_types {
            for introduced in inter_type.introduce(&descriptor) {
                let exists = methods.iter().any(|method| {
                    method.name() == introduced.name()
                        && method.params().len() == introduced.params().len()
                });
                if exists {
                    warn!("引入的方法与已有方法重名，已忽略: {}.{}", type_name, introduced.name());
                    continue;
                }
                debug!("引入方法: {}.{}", type_name, introduced.name());
                methods.push(introduced);
            }
        }

        let default_pointcut = aspects
            .iter()
            .any(|aspect| aspect.pointcut().is_none())
            .then(|| Pointcut::default_for(&descriptor));

        let proxy_methods: Vec<ProxyMethod> = methods
            .into_iter()
            .map(|method| {
                let interceptors = Self::interceptors_for(
                    type_name,
                    &method,
                    aspects,
                    default_pointcut.as_ref(),
                );
                ProxyMethod {
                    method,
                    interceptors: interceptors.into(),
                }
            })
            .collect();

        let woven = proxy_methods
            .iter()
            .filter(|entry| !entry.interceptors.is_empty())
            .count();
        debug!(
            "织入完成: {}，切面 {} 个，织入方法 {}/{}",
            type_name,
            aspects.len(),
            woven,
            proxy_methods.len()
        );

        AopProxy::new(descriptor, target, proxy_methods)
    }

    fn interceptors_for(
        type_name: &str,
        method: &MethodDesc,
        aspects: &[Aspect],
        default_pointcut: Option<&Pointcut>,
    ) -> Vec<Arc<dyn MethodInterceptor>> {
        let mut interceptors = Vec::new();
        for aspect in aspects {
            let Some(pointcut) = aspect.pointcut().or(default_pointcut) else {
                continue;
            };
            if !pointcut.is_applied(method) {
                continue;
            }
            if !method.is_weavable() {
                if aspect.pointcut().is_some() {
                    warn!(
                        "方法不可织入，已跳过拦截器 {}: {}.{}",
                        aspect.interceptor().name(),
                        type_name,
                        method.name()
                    );
                }
                continue;
            }
            interceptors.push(Arc::clone(aspect.interceptor()));
        }
        interceptors
    }
}
