//! 内置类型间声明

use aop_abstractions::InterType;
use infrastructure_common::{MethodDesc, TypeDescriptor};

/// 方法引入
///
/// 把一组现成的方法引入到代理上，方法体以目标对象为接收者
#[derive(Clone, Default)]
pub struct MethodInterType {
    methods: Vec<MethodDesc>,
}

impl MethodInterType {
    /// 创建只引入一个方法的类型间声明
    pub fn new(method: MethodDesc) -> Self {
        Self {
            methods: vec![method],
        }
    }

    /// 追加需要引入的方法
    #[must_use]
    pub fn with_method(mut self, method: MethodDesc) -> Self {
        self.methods.push(method);
        self
    }
}

impl InterType for MethodInterType {
    fn introduce(&self, _target: &TypeDescriptor) -> Vec<MethodDesc> {
        self.methods.clone()
    }
}
