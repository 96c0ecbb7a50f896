//! 容器层次结构与查找范围的集成测试

mod common;

use common::{English, French, Greeter, Logic};
use di_abstractions::{ComponentKey, ContainerConfig};
use di_impl::Container;
use infrastructure_common::ContainerError;

#[test]
fn test_find_all_versus_find_local() {
    let parent = Container::new();
    let child = parent.create_container(Some("child"), None);
    let grandchild = parent.create_container(Some("grandchild"), None);
    parent.include(&child).expect("包含应该成功");
    child.include(&grandchild).expect("包含应该成功");
    grandchild.register_type::<Logic>(None).expect("注册应该成功");

    let key = ComponentKey::of::<Logic>();
    assert_eq!(parent.find_all_component_defs(key.clone()).len(), 1);
    assert!(parent.find_local_component_defs(key.clone()).is_empty());
    assert_eq!(grandchild.find_local_component_defs(key.clone()).len(), 1);
    assert!(parent.has_component_def(key.clone()));
    assert!(parent.get::<Logic>().is_ok());
    assert!(!grandchild.has_component_def(ComponentKey::name("missing")));
}

#[test]
fn test_first_container_in_breadth_first_order_decides() {
    let root = Container::new();
    let left = root.create_container(Some("left"), None);
    let right = root.create_container(Some("right"), None);
    let deep = root.create_container(Some("deep"), None);
    root.include(&left).expect("包含应该成功");
    root.include(&right).expect("包含应该成功");
    left.include(&deep).expect("包含应该成功");

    deep.register_type::<French>(None).expect("注册应该成功");
    right.register_type::<English>(None).expect("注册应该成功");

    let greeter = root.get::<dyn Greeter>().expect("广度优先应该先找到 right");
    assert_eq!(greeter.greet(), "hello");

    let all = root.find_all_component_defs(ComponentKey::of::<dyn Greeter>());
    let types: Vec<_> = all.iter().map(|def| def.component_type().short_name()).collect();
    assert_eq!(types, vec!["English", "French"]);
}

#[test]
fn test_diamond_inclusion_is_deduplicated() {
    let root = Container::new();
    let left = root.create_container(Some("left"), None);
    let right = root.create_container(Some("right"), None);
    let shared = root.create_container(Some("shared"), None);
    root.include(&left).expect("包含应该成功");
    root.include(&right).expect("包含应该成功");
    left.include(&shared).expect("包含应该成功");
    right.include(&shared).expect("包含应该成功");
    shared.include(&root).expect("环形包含在运行期是合法的");
    shared.register_type::<Logic>(None).expect("注册应该成功");

    assert_eq!(shared.parent_count(), 2);
    assert_eq!(root.find_all_component_defs(ComponentKey::of::<Logic>()).len(), 1);
    assert_eq!(root.find_all::<Logic>().expect("获取应该成功").len(), 1);
    root.init().expect("初始化应该成功");

    left.include(&shared).expect("重复包含应该没有效果");
    assert_eq!(left.child_count(), 1);
}

#[test]
fn test_namespace_qualified_lookup() {
    let root = Container::new();
    let web = root.create_container(Some("web"), Some("web"));
    root.include(&web).expect("包含应该成功");
    web.register_type::<Logic>(Some("logic")).expect("注册应该成功");

    assert!(root.get_named::<Logic>("web.logic").is_ok());
    assert!(root.get_named::<Logic>("logic").is_ok());
    assert!(matches!(
        root.get_named::<Logic>("api.logic"),
        Err(ContainerError::ComponentNotFound { .. })
    ));
    assert_eq!(web.namespace().as_deref(), Some("web"));
}

#[test]
fn test_ancestor_search_is_opt_in() {
    let plain = Container::new();
    let plain_child = plain.create_container(None, None);
    plain.include(&plain_child).expect("包含应该成功");
    plain.register_type::<Logic>(None).expect("注册应该成功");
    assert!(matches!(
        plain_child.get::<Logic>(),
        Err(ContainerError::ComponentNotFound { .. })
    ));

    let searching = Container::builder()
        .with_config(ContainerConfig::new().with_search_ancestors(true))
        .build();
    let child = searching.create_container(None, None);
    searching.include(&child).expect("包含应该成功");
    searching.register_type::<Logic>(None).expect("注册应该成功");
    assert!(child.get::<Logic>().is_ok());
}

#[test]
fn test_hierarchy_accessors_and_descendants() {
    let root = Container::builder().with_path("app").build();
    let service = root.create_container(Some("app/service"), None);
    let orphan = root.create_container(Some("app/orphan"), None);
    root.include(&service).expect("包含应该成功");

    assert!(root.is_root());
    assert_eq!(service.root(), root);
    assert_eq!(root.child(0), Some(service.clone()));
    assert_eq!(service.parent(0), Some(root.clone()));
    assert!(service.parent(1).is_none());

    assert!(root.has_descendant("app/service"));
    assert_eq!(root.get_descendant("app/service").expect("应该已登记"), service);
    assert!(matches!(
        root.get_descendant("app/orphan"),
        Err(ContainerError::ContainerNotRegistered { .. })
    ));
    root.register_descendant(&orphan).expect("登记应该成功");
    assert_eq!(root.get_descendant("app/orphan").expect("应该已登记"), orphan);
    assert_eq!(root.stats().descendant_count, 2);

    assert!(matches!(
        root.include(&root),
        Err(ContainerError::Configuration { .. })
    ));
    let stranger = Container::new();
    assert!(matches!(
        root.include(&stranger),
        Err(ContainerError::Configuration { .. })
    ));
}
