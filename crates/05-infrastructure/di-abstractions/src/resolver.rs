//! 解析上下文
//!
//! 记录一次顶层解析调用中正在解析的组件定义，用于检测循环引用和限制解析深度

use crate::key::DefId;
use infrastructure_common::{ContainerError, ContainerResult};

/// 解析上下文
///
/// 每次顶层 `get_component` 创建一个，显式传递给所有递归解析调用
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前解析链
    resolution_chain: Vec<(DefId, String)>,
    /// 最大解析深度
    max_depth: usize,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub const fn new(max_depth: usize) -> Self {
        Self {
            resolution_chain: Vec::new(),
            max_depth,
        }
    }

    /// 进入组件定义的解析
    pub fn enter(&mut self, id: DefId, name: &str) -> ContainerResult<()> {
        if self.resolution_chain.iter().any(|(entry, _)| *entry == id) {
            return Err(ContainerError::CyclicReference {
                chain: self.describe_with(name),
            });
        }
        if self.resolution_chain.len() >= self.max_depth {
            return Err(ContainerError::ResolutionDepthExceeded {
                depth: self.max_depth,
                chain: self.describe_with(name),
            });
        }
        self.resolution_chain.push((id, name.to_string()));
        Ok(())
    }

    /// 离开组件定义的解析
    pub fn leave(&mut self, id: DefId) {
        if let Some(position) = self.resolution_chain.iter().rposition(|(entry, _)| *entry == id) {
            self.resolution_chain.truncate(position);
        }
    }

    /// 是否正在解析指定组件定义
    pub fn is_resolving(&self, id: DefId) -> bool {
        self.resolution_chain.iter().any(|(entry, _)| *entry == id)
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    /// 当前解析链描述，末尾追加 `next`
    pub fn describe_with(&self, next: &str) -> String {
        self.resolution_chain
            .iter()
            .map(|(_, name)| name.as_str())
            .chain(std::iter::once(next))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new(crate::container::DEFAULT_MAX_RESOLUTION_DEPTH)
    }
}
