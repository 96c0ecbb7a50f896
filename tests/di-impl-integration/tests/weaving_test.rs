//! 容器织入 AOP 代理的集成测试

mod common;

use aop_abstractions::{MethodInterceptor, MethodInvocation, Pointcut};
use aop_impl::{AopProxy, FnInterceptor, InterceptorChain, MethodInterType, TraceInterceptor};
use common::{English, Greeter};
use di_abstractions::{ComponentKey, Expression};
use di_impl::{AspectDef, Container, InterTypeDef};
use infrastructure_common::{
    AopError, AopResult, Argument, Describe, MethodDesc, Receiver, SharedBody, TypeDescriptor,
    TypeInfo, Value,
};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Log = Arc<Mutex<Vec<String>>>;

fn recording(name: &'static str, log: &Log) -> Arc<dyn MethodInterceptor> {
    let log = Arc::clone(log);
    Arc::new(FnInterceptor::new(
        name,
        move |invocation: &mut dyn MethodInvocation| -> AopResult<Value> {
            log.lock().push(format!("{name}-before"));
            let result = invocation.proceed();
            log.lock().push(format!("{name}-after"));
            result
        },
    ))
}

fn greet_only() -> Option<Pointcut> {
    Some(Pointcut::from_method_names(["greet"]))
}

#[test]
fn test_typed_access_to_woven_component() {
    let log: Log = Arc::default();
    let container = Container::new();
    container
        .register(
            container
                .def_builder::<English>()
                .with_aspect(AspectDef::new(recording("x", &log), None))
                .build(),
        )
        .expect("注册应该成功");

    let instance = container
        .get_component(ComponentKey::of::<English>())
        .expect("获取应该成功");
    assert!(instance.downcast_ref::<AopProxy>().is_some());

    let greeter = container.get::<dyn Greeter>().expect("接口视图应该可用");
    assert_eq!(greeter.greet(), "hello");
    assert_eq!(*log.lock(), vec!["x-before", "x-after"]);

    let proxy = container.get::<AopProxy>().expect("应该可以取得代理");
    assert!(proxy.is_woven("greet"));
    assert!(!proxy.is_woven("language"));
    assert_eq!(proxy.target_type(), TypeInfo::of::<English>());

    log.lock().clear();
    let raw = container.get::<English>().expect("应该退回到原始目标");
    assert_eq!(raw.greet(), "hello");
    assert!(log.lock().is_empty());
}

#[test]
fn test_aspect_onion_ordering_and_scoping() {
    let log: Log = Arc::default();
    let container = Container::new();
    let def = container
        .register(
            container
                .def_builder::<English>()
                .with_aspect(AspectDef::new(recording("x", &log), greet_only()))
                .build(),
        )
        .expect("注册应该成功");
    def.add_aspect_def(AspectDef::new(recording("y", &log), greet_only()));

    let proxy = container.get::<AopProxy>().expect("获取应该成功");
    assert_eq!(proxy.interceptor_count("greet"), 2);

    let language: String = proxy.invoke_as("language", Vec::new()).expect("调用应该成功");
    assert_eq!(language, "en");
    assert!(log.lock().is_empty());

    let greeting: String = proxy.invoke_as("greet", Vec::new()).expect("调用应该成功");
    assert_eq!(greeting, "hello");
    assert_eq!(
        *log.lock(),
        vec!["x-before", "y-before", "y-after", "x-after"]
    );
}

#[derive(Default)]
struct CallCounter {
    calls: AtomicUsize,
}

impl MethodInterceptor for CallCounter {
    fn invoke(&self, invocation: &mut dyn MethodInvocation) -> AopResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        invocation.proceed()
    }
}

fn counter_as_interceptor(counter: Arc<CallCounter>) -> Arc<dyn MethodInterceptor> {
    counter
}

impl Describe for CallCounter {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor0(Self::default)
            .implements::<dyn MethodInterceptor>(counter_as_interceptor, &[])
            .build()
    }
}

#[test]
fn test_interceptor_resolved_from_container() {
    let container = Container::new();
    container
        .register_type::<CallCounter>(Some("counter"))
        .expect("注册应该成功");
    container
        .register(
            container
                .def_builder::<English>()
                .with_aspect(AspectDef::from_expression(
                    Expression::component("counter"),
                    greet_only(),
                ))
                .build(),
        )
        .expect("注册应该成功");

    let greeter = container.get::<dyn Greeter>().expect("获取应该成功");
    greeter.greet();
    greeter.greet();

    let counter = container
        .get_named::<CallCounter>("counter")
        .expect("获取应该成功");
    assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_nested_chain_and_trace_interceptor() {
    let log: Log = Arc::default();
    let chain = InterceptorChain::new()
        .with(recording("a", &log))
        .with(recording("b", &log));
    let container = Container::new();
    container
        .register(
            container
                .def_builder::<English>()
                .with_aspect(AspectDef::new(Arc::new(TraceInterceptor::new()), greet_only()))
                .with_aspect(AspectDef::new(Arc::new(chain), greet_only()))
                .with_aspect(AspectDef::new(recording("c", &log), greet_only()))
                .build(),
        )
        .expect("注册应该成功");

    let greeter = container.get::<dyn Greeter>().expect("获取应该成功");
    assert_eq!(greeter.greet(), "hello");
    assert_eq!(
        *log.lock(),
        vec!["a-before", "b-before", "c-before", "c-after", "b-after", "a-after"]
    );
}

#[test]
fn test_inter_type_introduces_interceptable_method() {
    let log: Log = Arc::default();
    let shout: SharedBody = Arc::new(
        |target: &(dyn Any + Send + Sync), _args: &[Argument]| -> AopResult<Value> {
            let english = target
                .downcast_ref::<English>()
                .ok_or_else(|| AopError::NotInvocable {
                    type_name: "English".to_string(),
                    method: "shout".to_string(),
                    reason: "目标类型不匹配".to_string(),
                })?;
            Ok(Box::new(english.greet().to_uppercase()) as Value)
        },
    );
    let introduced = MethodDesc::new(
        TypeInfo::of::<English>(),
        "shout",
        Vec::new(),
        Receiver::Shared(shout),
    );

    let container = Container::new();
    container
        .register(
            container
                .def_builder::<English>()
                .with_inter_type(InterTypeDef::new(Arc::new(MethodInterType::new(introduced))))
                .with_aspect(AspectDef::new(
                    recording("x", &log),
                    Some(Pointcut::from_method_names(["shout"])),
                ))
                .build(),
        )
        .expect("注册应该成功");

    let proxy = container.get::<AopProxy>().expect("获取应该成功");
    assert!(proxy.has_method("shout"));
    let shouted: String = proxy.invoke_as("shout", Vec::new()).expect("调用应该成功");
    assert_eq!(shouted, "HELLO");
    assert_eq!(*log.lock(), vec!["x-before", "x-after"]);
}

#[test]
fn test_weaving_rejects_non_interceptor_expression() {
    let container = Container::new();
    container
        .register(
            container
                .def_builder::<English>()
                .with_aspect(AspectDef::from_expression(Expression::value(7_u32), None))
                .build(),
        )
        .expect("注册应该成功");

    assert!(matches!(
        container.get::<dyn Greeter>(),
        Err(infrastructure_common::ContainerError::ClassUnmatch { .. })
    ));
}
