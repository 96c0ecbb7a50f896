//! 组件解析、作用域与装配的集成测试

mod common;

use common::{English, French, Greeter, Logic, Reception, Recorder, Service};
use di_abstractions::{ComponentKey, ContainerConfig, Expression};
use di_impl::{ArgDef, ComponentDef, Container, MethodDef, PropertyDef, VariableEvaluator};
use infrastructure_common::{
    AutoBindingPolicy, BindingType, ContainerError, Describe, InstanceScope, TypeDescriptor,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn logic_service_container() -> Container {
    let container = Container::new();
    container
        .register(
            container
                .def_builder::<Logic>()
                .with_scope(InstanceScope::Prototype)
                .build(),
        )
        .expect("注册 Logic 应该成功");
    container
        .register_type::<Service>(None)
        .expect("注册 Service 应该成功");
    container
}

#[test]
fn test_logic_service_scenario() -> anyhow::Result<()> {
    let container = logic_service_container();

    let first = container.get::<Service>()?;
    let second = container.get::<Service>()?;
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(first.logic(), second.logic()));
    assert_eq!(first.logic().id, second.logic().id);
    Ok(())
}

#[test]
fn test_singleton_identity_and_prototype_freshness() {
    let container = logic_service_container();

    let service_a = container
        .get_component(ComponentKey::of::<Service>())
        .expect("获取单例应该成功");
    let service_b = container
        .get_component(ComponentKey::of::<Service>())
        .expect("获取单例应该成功");
    assert!(Arc::ptr_eq(&service_a, &service_b));

    let logic_a = container.get::<Logic>().expect("获取原型应该成功");
    let logic_b = container.get::<Logic>().expect("获取原型应该成功");
    assert!(!Arc::ptr_eq(&logic_a, &logic_b));
    assert_ne!(logic_a.id, logic_b.id);
}

#[test]
fn test_ambiguity_detection_and_find_order() {
    let container = Container::new();
    container.register_type::<English>(None).expect("注册应该成功");
    container.register_type::<French>(None).expect("注册应该成功");

    let result = container.get_component_def(ComponentKey::of::<dyn Greeter>());
    assert!(matches!(result, Err(ContainerError::TooManyRegistration { .. })));

    let defs = container.find_component_defs(ComponentKey::of::<dyn Greeter>());
    let types: Vec<_> = defs.iter().map(|def| def.component_type().short_name()).collect();
    assert_eq!(types, vec!["English", "French"]);

    let greetings: Vec<String> = container
        .find_all::<dyn Greeter>()
        .expect("按接口获取全部组件应该成功")
        .iter()
        .map(|greeter| greeter.greet())
        .collect();
    assert_eq!(greetings, vec!["hello", "bonjour"]);

    assert!(container
        .find_component_defs(ComponentKey::name("missing"))
        .is_empty());
    assert!(container.find_components("missing").expect("空结果不应该失败").is_empty());
}

#[test]
fn test_name_lookup_takes_first_registration() {
    let container = Container::new();
    container.register_type::<English>(Some("greeter")).expect("注册应该成功");
    container.register_type::<French>(Some("greeter")).expect("注册应该成功");

    let greeter = container
        .get_named::<dyn Greeter>("greeter")
        .expect("按名称获取应该成功");
    assert_eq!(greeter.greet(), "hello");
    assert!(container.has_component_def("greeter"));
    assert!(!container.has_component_def("farewell"));
}

struct CycleA {
    _b: Arc<CycleB>,
}

struct CycleB {
    _a: Arc<CycleA>,
}

impl Describe for CycleA {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor1::<CycleB>(|b| Self { _b: b })
            .build()
    }
}

impl Describe for CycleB {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor1::<CycleA>(|a| Self { _a: a })
            .build()
    }
}

#[test]
fn test_constructor_cycle_detection() {
    for scope in [InstanceScope::Singleton, InstanceScope::Prototype] {
        let container = Container::new();
        container
            .register(container.def_builder::<CycleA>().with_scope(scope).build())
            .expect("注册应该成功");
        container
            .register(container.def_builder::<CycleB>().with_scope(scope).build())
            .expect("注册应该成功");

        let result = container.get::<CycleA>();
        let Err(ContainerError::CyclicReference { chain }) = result else {
            panic!("{scope} 作用域应该检测到循环引用");
        };
        assert!(chain.contains("CycleA"));
        assert!(chain.contains("CycleB"));
    }
}

#[test]
fn test_resolution_depth_limit() {
    let container = Container::builder()
        .with_config(ContainerConfig::new().with_max_resolution_depth(1))
        .build();
    container.register_type::<Logic>(None).expect("注册应该成功");
    container.register_type::<Service>(None).expect("注册应该成功");

    assert!(container.get::<Logic>().is_ok());
    assert!(matches!(
        container.get::<Service>(),
        Err(ContainerError::ResolutionDepthExceeded { depth: 1, .. })
    ));
}

#[test]
fn test_constructor_selection() {
    let container = Container::new();
    container.register_type::<Logic>(Some("logic")).expect("注册应该成功");

    let explicit = container
        .register(
            container
                .def_builder::<Service>()
                .with_name("explicit")
                .with_arg(ArgDef::expression(Expression::component("logic")))
                .build(),
        )
        .expect("注册应该成功");
    let service = container
        .get_named::<Service>("explicit")
        .expect("显式参数构造应该成功");
    let logic = container.get::<Logic>().expect("获取 Logic 应该成功");
    assert!(Arc::ptr_eq(service.logic(), &logic));
    assert!(explicit.cached_instance().is_some());

    container
        .register(
            container
                .def_builder::<Service>()
                .with_name("no-args")
                .with_no_args()
                .build(),
        )
        .expect("注册应该成功");
    assert!(matches!(
        container.get_named::<Service>("no-args"),
        Err(ContainerError::ConstructorNotFound { .. })
    ));

    container
        .register(
            container
                .def_builder::<Service>()
                .with_name("manual")
                .with_auto_binding(AutoBindingPolicy::None)
                .build(),
        )
        .expect("注册应该成功");
    assert!(matches!(
        container.get_named::<Service>("manual"),
        Err(ContainerError::ConstructorNotFound { .. })
    ));
}

#[test]
fn test_auto_constructor_requires_resolvable_parameters() {
    let container = Container::new();
    container.register_type::<Service>(None).expect("注册应该成功");
    assert!(matches!(
        container.get::<Service>(),
        Err(ContainerError::ConstructorNotFound { .. })
    ));
}

#[test]
fn test_must_argument_reports_illegal_auto_binding() {
    let container = Container::new();
    container
        .register(
            container
                .def_builder::<Service>()
                .with_arg(ArgDef::auto().with_binding_type(BindingType::Must))
                .build(),
        )
        .expect("注册应该成功");
    assert!(matches!(
        container.get::<Service>(),
        Err(ContainerError::IllegalAutoBindingArgument { index: 0, .. })
    ));
}

#[test]
fn test_property_binding_prefers_name_over_type() {
    let container = Container::new();
    container.register_type::<English>(Some("greeter")).expect("注册应该成功");
    container.register_type::<French>(None).expect("注册应该成功");
    container.register_type::<Reception>(None).expect("注册应该成功");

    let reception = container.get::<Reception>().expect("获取应该成功");
    let greeter = reception.greeter.as_ref().expect("属性应该已注入");
    assert_eq!(greeter.greet(), "hello");
}

#[test]
fn test_should_property_downgrades_ambiguity() {
    let container = Container::new();
    container.register_type::<English>(None).expect("注册应该成功");
    container.register_type::<French>(None).expect("注册应该成功");
    container.register_type::<Reception>(None).expect("注册应该成功");

    let reception = container.get::<Reception>().expect("should 绑定失败不应该报错");
    assert!(reception.greeter.is_none());
}

#[test]
fn test_must_property_reports_illegal_auto_binding() {
    let container = Container::new();
    container
        .register(
            container
                .def_builder::<Reception>()
                .with_property(PropertyDef::new("greeter").with_binding_type(BindingType::Must))
                .build(),
        )
        .expect("注册应该成功");
    assert!(matches!(
        container.get::<Reception>(),
        Err(ContainerError::IllegalAutoBindingProperty { .. })
    ));

    let strict = Container::new();
    strict
        .register(
            strict
                .def_builder::<Reception>()
                .with_property(PropertyDef::new("lobby"))
                .build(),
        )
        .expect("注册应该成功");
    assert!(matches!(
        strict.get::<Reception>(),
        Err(ContainerError::PropertyNotFound { .. })
    ));
}

#[test]
fn test_value_properties_from_constants_and_expressions() {
    let container = Container::builder()
        .with_config(ContainerConfig::new().with_variable("port", "9090"))
        .build();
    container
        .register(
            container
                .def_builder::<Reception>()
                .with_name("constant")
                .with_property(PropertyDef::value("port", 8080_u16))
                .build(),
        )
        .expect("注册应该成功");
    container
        .register(
            container
                .def_builder::<Reception>()
                .with_name("expression")
                .with_property(
                    PropertyDef::new("port").with_expression(Expression::source("${port}")),
                )
                .build(),
        )
        .expect("注册应该成功");

    let constant = container.get_named::<Reception>("constant").expect("获取应该成功");
    assert_eq!(constant.port, 8080);

    assert!(matches!(
        container.get_named::<Reception>("expression"),
        Err(ContainerError::Configuration { .. })
    ));
    container.set_expression_evaluator(Arc::new(VariableEvaluator::new()));
    let evaluated = container.get_named::<Reception>("expression").expect("获取应该成功");
    assert_eq!(evaluated.port, 9090);
}

#[derive(Default)]
struct Holder {
    logic: Option<Arc<Logic>>,
    ready: bool,
}

impl Describe for Holder {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor0(Self::default)
            .injector::<Logic>("set_logic", |holder, logic| holder.logic = Some(logic))
            .mut_method0("prepare", |holder: &mut Self| holder.ready = true)
            .build()
    }
}

#[test]
fn test_injection_and_init_methods() {
    let container = Container::new();
    container.register_type::<Logic>(None).expect("注册应该成功");
    container
        .register(
            container
                .def_builder::<Holder>()
                .with_auto_binding(AutoBindingPolicy::None)
                .with_injection_method(MethodDef::new("set_logic"))
                .with_init_method(MethodDef::new("prepare"))
                .build(),
        )
        .expect("注册应该成功");

    let holder = container.get::<Holder>().expect("获取应该成功");
    assert!(holder.ready);
    let logic = container.get::<Logic>().expect("获取应该成功");
    assert!(Arc::ptr_eq(holder.logic.as_ref().expect("应该已注入"), &logic));
}

#[test]
fn test_method_assembly_errors() {
    let container = Container::new();
    container
        .register(
            container
                .def_builder::<Holder>()
                .with_name("unresolved")
                .with_injection_method(MethodDef::new("set_logic"))
                .build(),
        )
        .expect("注册应该成功");
    container
        .register(
            container
                .def_builder::<Holder>()
                .with_name("unknown")
                .with_init_method(MethodDef::new("launch"))
                .build(),
        )
        .expect("注册应该成功");

    assert!(matches!(
        container.get_named::<Holder>("unresolved"),
        Err(ContainerError::IllegalMethod { .. })
    ));
    assert!(matches!(
        container.get_named::<Holder>("unknown"),
        Err(ContainerError::MethodNotFound { .. })
    ));
}

#[test]
fn test_registration_rules() {
    let container = Container::new();
    let def = container.register_type::<Logic>(None).expect("注册应该成功");
    assert!(matches!(
        container.register(Arc::clone(&def)),
        Err(ContainerError::AlreadyRegistered { .. })
    ));
    assert_eq!(def.container(), Some(container.clone()));

    let recorder = Arc::new(Recorder::default());
    container
        .register_instance(Arc::clone(&recorder), Some("recorder"))
        .expect("注册实例应该成功");
    let resolved = container.get_named::<Recorder>("recorder").expect("获取应该成功");
    assert!(Arc::ptr_eq(&resolved, &recorder));

    let stats = container.stats();
    assert_eq!(stats.registered_components, 2);
    assert_eq!(stats.cached_singletons, 1);
}

struct Slow {
    serial: usize,
}

#[test]
fn test_concurrent_singleton_construction_happens_once() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructions);
    let descriptor = TypeDescriptor::builder::<Slow>()
        .constructor0(move || {
            std::thread::sleep(Duration::from_millis(20));
            Slow {
                serial: counter.fetch_add(1, Ordering::SeqCst),
            }
        })
        .build();

    let container = Container::new();
    container
        .register(ComponentDef::builder(Arc::new(descriptor)).build())
        .expect("注册应该成功");

    let instances: Vec<Arc<Slow>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                scope.spawn(move || container.get::<Slow>().expect("并发获取应该成功"))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("线程不应该 panic"))
            .collect()
    });

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert!(instances.iter().all(|slow| slow.serial == 0));
    assert!(instances.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

/// 既有无参构造函数又有接口参数构造函数的组件
struct Host {
    greeter: Option<Arc<dyn Greeter>>,
}

/// 只有接口参数构造函数的组件
#[allow(dead_code)]
struct StrictHost {
    greeter: Arc<dyn Greeter>,
}

#[test]
fn test_auto_constructor_reports_ambiguous_parameter() {
    let container = Container::new();
    container.register_type::<English>(None).expect("注册应该成功");
    container.register_type::<French>(None).expect("注册应该成功");

    let host = TypeDescriptor::builder::<Host>()
        .constructor0(|| Host { greeter: None })
        .constructor1::<dyn Greeter>(|greeter| Host {
            greeter: Some(greeter),
        })
        .build();
    let strict = TypeDescriptor::builder::<StrictHost>()
        .constructor1::<dyn Greeter>(|greeter| StrictHost { greeter })
        .build();
    container
        .register(ComponentDef::builder(Arc::new(host)).build())
        .expect("注册应该成功");
    container
        .register(ComponentDef::builder(Arc::new(strict)).build())
        .expect("注册应该成功");

    let host = container.get::<Host>();
    assert!(
        matches!(host, Err(ContainerError::TooManyRegistration { .. })),
        "接口有两个实现时不应该退回无参构造函数"
    );
    let strict = container.get::<StrictHost>();
    assert!(matches!(
        strict,
        Err(ContainerError::TooManyRegistration { .. })
    ));
}

#[test]
fn test_auto_constructor_injects_unique_parameter() {
    let container = Container::new();
    container.register_type::<English>(None).expect("注册应该成功");

    let host = TypeDescriptor::builder::<Host>()
        .constructor0(|| Host { greeter: None })
        .constructor1::<dyn Greeter>(|greeter| Host {
            greeter: Some(greeter),
        })
        .build();
    container
        .register(ComponentDef::builder(Arc::new(host)).build())
        .expect("注册应该成功");

    let host = container.get::<Host>().expect("获取组件应该成功");
    let greeter = host.greeter.as_ref().expect("greeter 应该通过构造函数注入");
    assert_eq!(greeter.greet(), "hello");
}
