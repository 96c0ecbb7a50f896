//! 集成测试共享的组件类型

#![allow(dead_code)]

use aop_impl::AopProxy;
use infrastructure_common::{Describe, TypeDescriptor};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_LOGIC_ID: AtomicUsize = AtomicUsize::new(1);

/// 无依赖的业务逻辑，每次构造分配新的编号
pub struct Logic {
    pub id: usize,
}

impl Describe for Logic {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor0(|| Self {
                id: NEXT_LOGIC_ID.fetch_add(1, Ordering::SeqCst),
            })
            .method0("id", |logic: &Self| logic.id)
            .build()
    }
}

/// 通过构造函数依赖 [`Logic`]
pub struct Service {
    pub logic: Arc<Logic>,
}

impl Service {
    pub fn logic(&self) -> &Arc<Logic> {
        &self.logic
    }
}

impl Describe for Service {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor1::<Logic>(|logic| Self { logic })
            .build()
    }
}

pub trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

pub struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

/// 代理上的 [`Greeter`] 视图，调用经过拦截器
pub struct GreeterFacade(pub Arc<AopProxy>);

impl Greeter for GreeterFacade {
    fn greet(&self) -> String {
        self.0
            .invoke_as::<String>("greet", Vec::new())
            .unwrap_or_default()
    }
}

fn greeter_facade(proxy: Arc<AopProxy>) -> Arc<dyn Greeter> {
    Arc::new(GreeterFacade(proxy))
}

fn english_as_greeter(english: Arc<English>) -> Arc<dyn Greeter> {
    english
}

impl Describe for English {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor0(|| Self)
            .implements::<dyn Greeter>(english_as_greeter, &["greet"])
            .enhance::<dyn Greeter, AopProxy>(greeter_facade)
            .method0("greet", |english: &Self| english.greet())
            .method0("language", |_: &Self| "en".to_string())
            .build()
    }
}

pub struct French;

impl Greeter for French {
    fn greet(&self) -> String {
        "bonjour".to_string()
    }
}

fn french_as_greeter(french: Arc<French>) -> Arc<dyn Greeter> {
    french
}

impl Describe for French {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor0(|| Self)
            .implements::<dyn Greeter>(french_as_greeter, &["greet"])
            .method0("greet", |french: &Self| french.greet())
            .build()
    }
}

/// 通过属性依赖 [`Greeter`]
#[derive(Default)]
pub struct Reception {
    pub greeter: Option<Arc<dyn Greeter>>,
    pub port: u16,
}

impl Describe for Reception {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor0(Self::default)
            .property::<dyn Greeter>("greeter", |reception, greeter| {
                reception.greeter = Some(greeter);
            })
            .value_property::<u16>("port", |reception, port| reception.port = port)
            .build()
    }
}

/// 记录生命周期事件
#[derive(Default)]
pub struct Recorder {
    entries: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

impl Describe for Recorder {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor0(Self::default)
            .build()
    }
}
