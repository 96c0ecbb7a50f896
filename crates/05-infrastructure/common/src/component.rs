//! 组件实例与取值的动态表示
//!
//! 容器内部以类型擦除的形式传递组件实例、参数和返回值，
//! 对外再通过 [`TypeInfo`](crate::TypeInfo) 描述的转换恢复为具体类型

use std::any::{Any, TypeId};
use std::sync::Arc;

/// 已发布的组件实例（具体类型或 AOP 代理）
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 类型化引用，内部总是持有某个 `Arc<K>`，`K` 可以是 `dyn Trait`
pub type Handle = Box<dyn Any + Send + Sync>;

/// 注入点取值或方法参数
///
/// 组件类注入点持有 `Arc<K>`，值类注入点直接持有值
pub type Argument = Arc<dyn Any + Send + Sync>;

/// 方法返回值
pub type Value = Box<dyn Any + Send>;

/// 把类型化引用包装为 [`Handle`]
pub fn handle_of<K: ?Sized + Send + Sync + 'static>(reference: Arc<K>) -> Handle {
    Box::new(reference)
}

/// 从 [`Handle`] 取回 `Arc<K>`，类型不符时原样返回
pub fn downcast_handle<K: ?Sized + Send + Sync + 'static>(handle: Handle) -> Result<Arc<K>, Handle> {
    handle.downcast::<Arc<K>>().map(|reference| *reference)
}

/// 参数实际持有值的类型ID
pub fn argument_type_id(argument: &Argument) -> TypeId {
    (**argument).type_id()
}

/// 把值包装为参数
pub fn argument_of<V: Send + Sync + 'static>(value: V) -> Argument {
    Arc::new(value)
}

/// 把组件引用包装为组件类参数
pub fn component_argument<K: ?Sized + Send + Sync + 'static>(reference: Arc<K>) -> Argument {
    Arc::new(reference)
}

/// 把返回值包装为 [`Value`]
pub fn value_of<R: Send + 'static>(value: R) -> Value {
    Box::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    struct Fixed;

    impl Named for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_handle_roundtrip_for_trait_object() {
        let reference: Arc<dyn Named> = Arc::new(Fixed);
        let handle = handle_of(reference);
        let restored = downcast_handle::<dyn Named>(handle).expect("应该能取回 trait 对象");
        assert_eq!(restored.name(), "fixed");
    }

    #[test]
    fn test_argument_type_id_reports_inner_value() {
        let argument = argument_of(42_u32);
        assert_eq!(argument_type_id(&argument), TypeId::of::<u32>());
        let component = component_argument(Arc::new(Fixed));
        assert_eq!(argument_type_id(&component), TypeId::of::<Arc<Fixed>>());
    }
}
