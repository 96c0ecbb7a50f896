//! 容器图遍历
//!
//! 包含关系可以形成菱形甚至环，所有遍历都维护已访问集合

use crate::container::{ContainerId, ContainerNode};
use std::collections::{HashSet, VecDeque};

/// 遍历方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// 沿包含关系向下
    Children,
    /// 沿包含关系向上
    Parents,
}

fn edges(node: &ContainerNode, direction: Direction) -> &[ContainerId] {
    match direction {
        Direction::Children => &node.children,
        Direction::Parents => &node.parents,
    }
}

/// 广度优先遍历，结果包含起点
pub(crate) fn breadth_first(
    nodes: &[ContainerNode],
    start: ContainerId,
    direction: Direction,
) -> Vec<ContainerId> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::from([start]);
    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        order.push(id);
        queue.extend(
            edges(&nodes[id.index()], direction)
                .iter()
                .copied()
                .filter(|next| !visited.contains(next)),
        );
    }
    order
}

/// 后序遍历子容器（子容器先于父容器），结果包含起点
pub(crate) fn post_order(nodes: &[ContainerNode], start: ContainerId) -> Vec<ContainerId> {
    fn visit(
        nodes: &[ContainerNode],
        id: ContainerId,
        visited: &mut HashSet<ContainerId>,
        order: &mut Vec<ContainerId>,
    ) {
        if !visited.insert(id) {
            return;
        }
        for child in &nodes[id.index()].children {
            visit(nodes, *child, visited, order);
        }
        order.push(id);
    }

    let mut visited = HashSet::new();
    let mut order = Vec::new();
    visit(nodes, start, &mut visited, &mut order);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(usize, usize)], size: usize) -> Vec<ContainerNode> {
        let mut nodes: Vec<ContainerNode> = (0..size).map(|_| ContainerNode::new(None, None)).collect();
        for (parent, child) in edges {
            nodes[*parent].children.push(ContainerId::new(*child));
            nodes[*child].parents.push(ContainerId::new(*parent));
        }
        nodes
    }

    fn indices(ids: &[ContainerId]) -> Vec<usize> {
        ids.iter().map(|id| id.index()).collect()
    }

    #[test]
    fn test_breadth_first_handles_diamond_and_cycle() {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3, 3 -> 0
        let nodes = graph(&[(0, 1), (0, 2), (1, 3), (2, 3), (3, 0)], 4);
        let order = breadth_first(&nodes, ContainerId::new(0), Direction::Children);
        assert_eq!(indices(&order), vec![0, 1, 2, 3]);

        let ancestors = breadth_first(&nodes, ContainerId::new(3), Direction::Parents);
        assert_eq!(indices(&ancestors), vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_post_order_visits_children_first() {
        let nodes = graph(&[(0, 1), (0, 2), (1, 3), (2, 3)], 4);
        let order = post_order(&nodes, ContainerId::new(0));
        assert_eq!(indices(&order), vec![3, 1, 2, 0]);
    }
}
