//! 容器配置与统计信息

use infrastructure_common::{BindingType, ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 默认最大解析深度
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 64;

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 在自身及子容器中找不到时是否继续搜索祖先容器
    pub search_ancestors: bool,
    /// 未声明属性自动绑定时使用的绑定强度
    pub default_binding_type: BindingType,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 初始化时是否创建全部单例
    pub initialize_singletons_on_init: bool,
    /// 表达式求值可用的变量
    pub variables: HashMap<String, String>,
}

impl ContainerConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置是否搜索祖先容器
    #[must_use]
    pub fn with_search_ancestors(mut self, enabled: bool) -> Self {
        self.search_ancestors = enabled;
        self
    }

    /// 设置默认绑定强度
    #[must_use]
    pub fn with_default_binding_type(mut self, binding_type: BindingType) -> Self {
        self.default_binding_type = binding_type;
        self
    }

    /// 设置最大解析深度
    #[must_use]
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// 设置初始化时是否创建全部单例
    #[must_use]
    pub fn with_initialize_singletons_on_init(mut self, enabled: bool) -> Self {
        self.initialize_singletons_on_init = enabled;
        self
    }

    /// 添加变量
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::validation_error("max_resolution_depth 必须大于 0"));
        }
        Ok(())
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            search_ancestors: false,
            default_binding_type: BindingType::Should,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
            initialize_singletons_on_init: false,
            variables: HashMap::new(),
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    /// 本容器注册的组件定义数量
    pub registered_components: usize,
    /// 本容器已缓存的单例数量
    pub cached_singletons: usize,
    /// 直接包含的子容器数量
    pub child_count: usize,
    /// 容器树中登记的后代容器数量
    pub descendant_count: usize,
}
