//! 初始化、销毁、外部组件与外部作用域的集成测试

mod common;

use common::{English, Greeter, Logic, Reception, Recorder};
use di_abstractions::{ComponentKey, ContainerConfig};
use di_impl::{ArgDef, ComponentDef, Container, MethodDef, SimpleExternalContext};
use infrastructure_common::{ContainerError, Describe, InstanceScope, TypeDescriptor};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Closable {
    name: String,
    recorder: Option<Arc<Recorder>>,
}

impl Closable {
    fn record(&self, event: &str) {
        if let Some(recorder) = &self.recorder {
            recorder.record(format!("{}-{event}", self.name));
        }
    }
}

impl Describe for Closable {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .value_constructor1::<String>(|name| Self {
                name,
                recorder: None,
            })
            .property::<Recorder>("recorder", |closable, recorder| {
                closable.recorder = Some(recorder);
            })
            .method0("close", |closable: &Self| closable.record("close"))
            .try_method0("explode", |_: &Self| Err::<(), _>("boom"))
            .method0::<()>("crash", |_: &Self| panic!("销毁时崩溃"))
            .build()
    }
}

fn closable(container: &Container, name: &str, destroy: &str) -> ComponentDef {
    container
        .def_builder::<Closable>()
        .with_name(name)
        .with_arg(ArgDef::value(name.to_string()))
        .with_eager(true)
        .with_destroy_method(MethodDef::new(destroy))
        .build()
}

fn with_recorder() -> (Container, Arc<Recorder>) {
    let container = Container::new();
    let recorder = Arc::new(Recorder::default());
    container
        .register_instance(Arc::clone(&recorder), None)
        .expect("注册实例应该成功");
    (container, recorder)
}

#[test]
fn test_destroy_runs_in_reverse_creation_order_despite_failures() {
    let (container, recorder) = with_recorder();
    for (name, destroy) in [("first", "close"), ("faulty", "explode"), ("second", "close")] {
        container
            .register(closable(&container, name, destroy))
            .expect("注册应该成功");
    }

    container.init().expect("初始化应该成功");
    assert_eq!(container.stats().cached_singletons, 4);

    container.destroy();
    assert_eq!(recorder.entries(), vec!["second-close", "first-close"]);
    assert_eq!(container.stats().cached_singletons, 1);

    container.destroy();
    assert_eq!(recorder.entries().len(), 2);

    let still_there = container.get::<Recorder>().expect("外部提供的实例不应该被销毁");
    assert!(Arc::ptr_eq(&still_there, &recorder));

    container.init().expect("重新初始化应该成功");
    assert_eq!(container.stats().cached_singletons, 4);
}

#[test]
fn test_panicking_destroy_method_keeps_remaining_singletons() {
    let (container, recorder) = with_recorder();
    container
        .register(closable(&container, "first", "close"))
        .expect("注册应该成功");
    container
        .register(closable(&container, "bomb", "crash"))
        .expect("注册应该成功");
    container.init().expect("初始化应该成功");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| container.destroy()));
    assert!(outcome.is_err());
    assert!(recorder.entries().is_empty());

    container.destroy();
    assert_eq!(recorder.entries(), vec!["first-close"]);
    assert_eq!(container.stats().cached_singletons, 1);
}

#[test]
fn test_concurrent_init_creates_eager_prototype_once() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructions);
    let descriptor = TypeDescriptor::builder::<Logic>()
        .constructor0(move || {
            std::thread::sleep(Duration::from_millis(20));
            Logic {
                id: counter.fetch_add(1, Ordering::SeqCst),
            }
        })
        .build();

    let container = Container::new();
    container
        .register(
            ComponentDef::builder(Arc::new(descriptor))
                .with_scope(InstanceScope::Prototype)
                .with_eager(true)
                .build(),
        )
        .expect("注册应该成功");

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let container = container.clone();
                scope.spawn(move || container.init())
            })
            .collect();
        for handle in handles {
            handle
                .join()
                .expect("线程不应该 panic")
                .expect("初始化应该成功");
        }
    });

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_init_creates_children_first_and_is_idempotent() {
    let (root, recorder) = with_recorder();
    let child = root.create_container(Some("child"), None);
    root.include(&child).expect("包含应该成功");
    child
        .register_instance(Arc::clone(&recorder), None)
        .expect("注册实例应该成功");

    let root_def = root
        .register(closable(&root, "root", "close"))
        .expect("注册应该成功");
    let child_def = child
        .register(closable(&child, "child", "close"))
        .expect("注册应该成功");

    root.init().expect("初始化应该成功");
    let root_instance = root_def.cached_instance().expect("应该已预创建");
    let child_instance = child_def.cached_instance().expect("应该已预创建");

    root.init().expect("重复初始化应该成功");
    assert!(Arc::ptr_eq(&root_instance, &root_def.cached_instance().expect("实例仍在")));
    assert!(Arc::ptr_eq(&child_instance, &child_def.cached_instance().expect("实例仍在")));

    child.destroy();
    assert_eq!(recorder.entries(), vec!["child-close"]);
    assert!(root_def.cached_instance().is_some());

    root.destroy();
    assert_eq!(recorder.entries(), vec!["child-close", "root-close"]);
}

#[test]
fn test_initialize_all_singletons_on_init() {
    let container = Container::builder()
        .with_config(ContainerConfig::new().with_initialize_singletons_on_init(true))
        .build();
    let singleton = container.register_type::<Logic>(Some("singleton")).expect("注册应该成功");
    let prototype = container
        .register(
            container
                .def_builder::<Logic>()
                .with_name("prototype")
                .with_scope(InstanceScope::Prototype)
                .build(),
        )
        .expect("注册应该成功");

    container.init().expect("初始化应该成功");
    assert!(singleton.cached_instance().is_some());
    assert!(prototype.cached_instance().is_none());
}

#[derive(Default)]
struct Page {
    greeter: Option<Arc<dyn Greeter>>,
    prepared: bool,
}

impl Describe for Page {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor0(Self::default)
            .property::<dyn Greeter>("greeter", |page, greeter| page.greeter = Some(greeter))
            .mut_method0("prepare", |page: &mut Self| page.prepared = true)
            .build()
    }
}

#[test]
fn test_outer_component_injection() {
    let container = Container::new();
    container.register_type::<English>(None).expect("注册应该成功");
    container
        .register(
            container
                .def_builder::<Page>()
                .with_scope(InstanceScope::Outer)
                .with_init_method(MethodDef::new("prepare"))
                .build(),
        )
        .expect("注册应该成功");

    let mut page = Page::default();
    container.inject_dependency(&mut page).expect("注入应该成功");
    assert!(page.prepared);
    assert_eq!(page.greeter.as_ref().map(|greeter| greeter.greet()).as_deref(), Some("hello"));

    assert!(matches!(
        container.get_component(ComponentKey::of::<Page>()),
        Err(ContainerError::UnsupportedOperation { .. })
    ));

    let mut wrong = English;
    assert!(matches!(
        container.inject_dependency_with_key(&mut wrong, ComponentKey::of::<Page>()),
        Err(ContainerError::ClassUnmatch { .. })
    ));

    let mut english = English;
    assert!(matches!(
        container.inject_dependency(&mut english),
        Err(ContainerError::UnsupportedOperation { .. })
    ));
}

#[test]
fn test_external_scopes() {
    let container = Container::new();
    container
        .register(
            container
                .def_builder::<Logic>()
                .with_name("cart")
                .with_scope(InstanceScope::Request)
                .build(),
        )
        .expect("注册应该成功");

    assert!(matches!(
        container.get_named::<Logic>("cart"),
        Err(ContainerError::Configuration { .. })
    ));

    let external = Arc::new(SimpleExternalContext::new());
    container.set_external_context(external.clone());

    let first = container.get_named::<Logic>("cart").expect("获取应该成功");
    let second = container.get_named::<Logic>("cart").expect("获取应该成功");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(external.len(), 1);

    assert_eq!(external.clear_scope(InstanceScope::Request), 1);
    let fresh = container.get_named::<Logic>("cart").expect("获取应该成功");
    assert!(!Arc::ptr_eq(&first, &fresh));

    let anonymous = Container::new();
    anonymous
        .register(
            anonymous
                .def_builder::<Logic>()
                .with_scope(InstanceScope::Session)
                .build(),
        )
        .expect("注册应该成功");
    anonymous.set_external_context(external);
    assert!(matches!(
        anonymous.get::<Logic>(),
        Err(ContainerError::Configuration { .. })
    ));
}

#[test]
fn test_external_binding_reads_request_parameters() {
    let container = Container::new();
    container
        .register(
            container
                .def_builder::<Reception>()
                .with_scope(InstanceScope::Prototype)
                .with_external_binding(true)
                .build(),
        )
        .expect("注册应该成功");
    container.set_external_context(Arc::new(
        SimpleExternalContext::new().with_parameter("port", 8081_u16),
    ));

    let reception = container.get::<Reception>().expect("获取应该成功");
    assert_eq!(reception.port, 8081);
    assert!(reception.greeter.is_none());
}
