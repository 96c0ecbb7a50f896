//! 组件派生宏集成测试

use component_macros::Component;
use di_impl::{ComponentDef, Container, MethodDef, PropertyDef};
use infrastructure_common::{Describe, TypeDescriptorBuilder, TypeInfo};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

#[derive(Default, Component)]
#[component(default, implements(Greeter(greet)), methods(greet))]
struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

#[derive(Default, Component)]
#[component(default)]
struct Dao;

#[derive(Default, Component)]
#[component(default, methods(summary))]
struct Reception {
    #[inject]
    greeter: Option<Arc<dyn Greeter>>,
    #[inject(name = "dao")]
    repository: Option<Arc<Dao>>,
    #[value]
    port: u16,
    visits: usize,
}

impl Reception {
    fn summary(&self) -> String {
        format!("{}:{}", self.port, self.visits)
    }
}

static CLOSED: AtomicUsize = AtomicUsize::new(0);

#[derive(Component)]
#[component(new, try_methods(close), customize = counter_extras)]
struct Counter {
    hits: AtomicUsize,
}

impl Counter {
    fn new() -> Self {
        Self {
            hits: AtomicUsize::new(0),
        }
    }

    fn hit(&self) -> usize {
        self.hits.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn close(&self) -> Result<(), std::io::Error> {
        CLOSED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn counter_extras(builder: TypeDescriptorBuilder<Counter>) -> TypeDescriptorBuilder<Counter> {
    builder.method0("hit", Counter::hit)
}

#[test]
fn test_derived_descriptor_shape() {
    let descriptor = Reception::describe();

    assert_eq!(descriptor.constructors().len(), 1);
    assert!(descriptor.property("greeter").is_some());
    assert!(descriptor.property("dao").is_some());
    assert!(descriptor.property("repository").is_none());
    assert!(descriptor.property("port").is_some());
    assert!(descriptor.property("visits").is_none());
    assert!(descriptor.method("summary").is_some());
}

#[test]
fn test_derived_interfaces() {
    let descriptor = English::describe();

    assert!(descriptor.is_assignable_to(&TypeInfo::of::<dyn Greeter>()));
    assert_eq!(descriptor.interface_method_names(), vec!["greet".to_string()]);
    assert!(!Dao::describe().is_assignable_to(&TypeInfo::of::<dyn Greeter>()));
}

#[test]
fn test_container_wires_derived_components() {
    let container = Container::new();
    container.register_type::<English>(None).expect("注册应该成功");
    container.register_type::<Dao>(Some("dao")).expect("注册应该成功");
    container
        .register(
            ComponentDef::of::<Reception>()
                .with_property(PropertyDef::value("port", 8080_u16))
                .build(),
        )
        .expect("注册应该成功");

    let reception = container.get::<Reception>().expect("获取组件应该成功");
    let greeter = reception.greeter.as_ref().expect("greeter 应该被注入");
    assert_eq!(greeter.greet(), "hello");
    assert!(reception.repository.is_some());
    assert_eq!(reception.port, 8080);
    assert_eq!(reception.summary(), "8080:0");

    let dao = container.get_named::<Dao>("dao").expect("获取组件应该成功");
    assert!(Arc::ptr_eq(
        reception.repository.as_ref().expect("dao 应该被注入"),
        &dao
    ));

    let by_interface = container.get::<dyn Greeter>().expect("按接口获取应该成功");
    assert_eq!(by_interface.greet(), "hello");
}

#[test]
fn test_constructor_methods_and_customize() {
    let descriptor = Counter::describe();
    assert!(descriptor.method("close").is_some());
    assert!(descriptor.method("hit").is_some());

    let container = Container::new();
    container
        .register(
            ComponentDef::of::<Counter>()
                .with_destroy_method(MethodDef::new("close"))
                .build(),
        )
        .expect("注册应该成功");

    let counter = container.get::<Counter>().expect("获取组件应该成功");
    assert_eq!(counter.hit(), 1);

    container.destroy();
    assert_eq!(CLOSED.load(Ordering::SeqCst), 1);
}
