//! # 示例应用程序
//!
//! 演示如何通过容器描述、派生宏和切面组装一个应用：
//!
//! - `app` 容器包含 `greeting` 容器
//! - `Service` 通过构造函数注入原型组件 `Logic`
//! - `English` 的 `greet` 方法经过调用计数和跟踪两个拦截器
//! - `Reception` 通过属性注入问候组件，端口来自配置变量

use aop_abstractions::{MethodInterceptor, MethodInvocation, Pointcut};
use aop_impl::{AopProxy, FnInterceptor, TraceInterceptor};
use clap::Parser;
use component_macros::Component;
use di_abstractions::Expression;
use di_impl::{AspectDef, ComponentDef, MethodDef, PropertyDef, VariableEvaluator};
use infrastructure_common::{AopResult, InstanceScope, TypeDescriptorBuilder, Value};
use infrastructure_composition::{
    ApplicationContext, ConfigLoader, ContainerDescriptor, InMemoryDescriptorSource, LoggingConfig,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn 容器示例应用")]
struct Args {
    /// 配置文件路径（TOML 或 JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别，覆盖配置文件
    #[arg(long)]
    log_level: Option<String>,

    /// 使用 JSON 格式输出日志
    #[arg(long)]
    json_logs: bool,

    /// 获取 Service 的次数
    #[arg(long, default_value_t = 3)]
    requests: usize,
}

static NEXT_LOGIC_ID: AtomicUsize = AtomicUsize::new(1);

/// 原型组件，每次注入分配新的编号
#[derive(Component)]
#[component(new, methods(id))]
struct Logic {
    id: usize,
}

impl Logic {
    fn new() -> Self {
        Self {
            id: NEXT_LOGIC_ID.fetch_add(1, Ordering::SeqCst),
        }
    }

    fn id(&self) -> usize {
        self.id
    }
}

#[derive(Component)]
#[component(customize = service_constructor)]
struct Service {
    logic: Arc<Logic>,
}

fn service_constructor(builder: TypeDescriptorBuilder<Service>) -> TypeDescriptorBuilder<Service> {
    builder.constructor1::<Logic>(|logic| Service { logic })
}

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

#[derive(Default, Component)]
#[component(default, implements(Greeter(greet)), methods(greet), customize = greeter_facade)]
struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

/// 代理上的 [`Greeter`] 视图
struct GreeterFacade(Arc<AopProxy>);

impl Greeter for GreeterFacade {
    fn greet(&self) -> String {
        self.0
            .invoke_as::<String>("greet", Vec::new())
            .unwrap_or_else(|e| format!("<{e}>"))
    }
}

fn facade(proxy: Arc<AopProxy>) -> Arc<dyn Greeter> {
    Arc::new(GreeterFacade(proxy))
}

fn greeter_facade(builder: TypeDescriptorBuilder<English>) -> TypeDescriptorBuilder<English> {
    builder.enhance::<dyn Greeter, AopProxy>(facade)
}

#[derive(Default, Component)]
#[component(default, methods(open, close))]
struct Reception {
    #[inject]
    greeter: Option<Arc<dyn Greeter>>,
    #[value]
    port: u16,
}

impl Reception {
    fn open(&self) {
        info!("接待处开放，端口 {}", self.port);
    }

    fn close(&self) {
        info!("接待处关闭，端口 {}", self.port);
    }

    fn welcome(&self) -> String {
        self.greeter
            .as_ref()
            .map_or_else(|| "<no greeter>".to_string(), |greeter| greeter.greet())
    }
}

fn counting_interceptor(calls: &Arc<AtomicUsize>) -> Arc<dyn MethodInterceptor> {
    let calls = Arc::clone(calls);
    Arc::new(FnInterceptor::new(
        "CallCounter",
        move |invocation: &mut dyn MethodInvocation| -> AopResult<Value> {
            calls.fetch_add(1, Ordering::SeqCst);
            invocation.proceed()
        },
    ))
}

fn descriptor_source(calls: Arc<AtomicUsize>) -> InMemoryDescriptorSource {
    InMemoryDescriptorSource::new()
        .with_descriptor("app", || {
            ContainerDescriptor::new("app")
                .include("greeting")
                .component(
                    ComponentDef::of::<Logic>()
                        .with_scope(InstanceScope::Prototype)
                        .build(),
                )
                .component(
                    ComponentDef::of::<Service>()
                        .with_scope(InstanceScope::Prototype)
                        .build(),
                )
                .component(
                    ComponentDef::of::<Reception>()
                        .with_eager(true)
                        .with_property(
                            PropertyDef::new("port").with_expression(Expression::source("${port}")),
                        )
                        .with_init_method(MethodDef::new("open"))
                        .with_destroy_method(MethodDef::new("close"))
                        .build(),
                )
        })
        .with_descriptor("greeting", move || {
            let greet_only = Some(Pointcut::from_method_names(["greet"]));
            ContainerDescriptor::new("greeting")
                .with_namespace("greeting")
                .component(
                    ComponentDef::of::<English>()
                        .with_name("english")
                        .with_aspect(AspectDef::new(counting_interceptor(&calls), greet_only.clone()))
                        .with_aspect(AspectDef::new(Arc::new(TraceInterceptor::new()), greet_only))
                        .build(),
                )
        })
}

fn load_config(args: &Args) -> anyhow::Result<ConfigLoader> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => loader.add_json_file(path)?,
            _ => loader.add_toml_file(path)?,
        };
    }
    Ok(loader.with_env_prefix("LORN"))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let loader = load_config(&args)?;
    let mut config = loader.load_application()?;
    if config.root.is_none() {
        config.root = Some("app".to_string());
    }
    config
        .container
        .variables
        .entry("port".to_string())
        .or_insert_with(|| "8080".to_string());

    let mut logging = if args.json_logs {
        LoggingConfig::production()
    } else {
        config.logging.clone()
    };
    if let Some(level) = &args.log_level {
        logging.level.clone_from(level);
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let root = config.root.clone().unwrap_or_default();
    let context = ApplicationContext::builder()
        .with_config(config)
        .with_logging(logging)
        .with_descriptor_source(Arc::new(descriptor_source(Arc::clone(&calls))), root)
        .with_expression_evaluator(Arc::new(VariableEvaluator::new()))
        .build()?;

    context.start()?;
    info!("应用上下文已启动: {} ({})", context.name(), context.id());

    for round in 1..=args.requests {
        let service = context.get::<Service>()?;
        info!("第 {} 次获取 Service，Logic 编号 {}", round, service.logic.id());
    }

    let greeter = context.get_named::<dyn Greeter>("greeting.english")?;
    info!("问候: {}", greeter.greet());

    let reception = context.get::<Reception>()?;
    info!("接待处: {}", reception.welcome());
    info!("greet 被拦截 {} 次", calls.load(Ordering::SeqCst));

    let status = context.status();
    info!(
        "组件 {} 个，已缓存单例 {} 个，后代容器 {} 个",
        status.registered_components, status.cached_singletons, status.descendant_count
    );

    context.stop()?;
    info!("应用已关闭");
    Ok(())
}
