use component_macros::Component;
use infrastructure_common::Describe;
use std::sync::Arc;

#[derive(Default, Component)]
#[component(default)]
struct Repository;

#[derive(Default, Component)]
#[component(default, methods(size))]
struct Catalog {
    #[inject]
    repository: Option<Arc<Repository>>,
    #[value(name = "limit")]
    size: usize,
}

impl Catalog {
    fn size(&self) -> usize {
        self.size
    }
}

fn main() {
    let descriptor = Catalog::describe();
    assert_eq!(descriptor.constructors().len(), 1);
    assert!(descriptor.property("repository").is_some());
    assert!(descriptor.property("limit").is_some());
    assert!(descriptor.method("size").is_some());
    assert!(Repository::describe().properties().is_empty());
}
