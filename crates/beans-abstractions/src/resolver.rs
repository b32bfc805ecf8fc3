//! depends-on 依赖图与循环依赖检测

use beans_common::{BeansError, BeansResult};
use std::collections::{HashMap, HashSet};

/// 依赖图节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraphNode {
    /// bean 名称
    pub name: String,
    /// depends-on 声明的 bean 名称
    pub dependencies: Vec<String>,
}

impl DependencyGraphNode {
    /// 创建新节点
    pub fn new(name: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            dependencies,
        }
    }
}

/// 循环依赖检测器
pub trait CircularDependencyDetector: Send + Sync {
    /// 检测循环依赖
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> BeansResult<()>;
}

/// 默认循环依赖检测器
#[derive(Debug, Default)]
pub struct DefaultCircularDependencyDetector;

impl CircularDependencyDetector for DefaultCircularDependencyDetector {
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> BeansResult<()> {
        // 使用深度优先搜索检测循环依赖
        let index: HashMap<&str, &DependencyGraphNode> =
            graph.iter().map(|node| (node.name.as_str(), node)).collect();
        let mut visited = HashSet::new();
        let mut path = Vec::new();

        for node in graph {
            if !visited.contains(node.name.as_str()) {
                Self::dfs_check(&node.name, &index, &mut visited, &mut path)?;
            }
        }

        Ok(())
    }
}

impl DefaultCircularDependencyDetector {
    fn dfs_check<'a>(
        current: &'a str,
        index: &HashMap<&'a str, &'a DependencyGraphNode>,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> BeansResult<()> {
        if let Some(start) = path.iter().position(|name| *name == current) {
            let mut chain: Vec<&str> = path[start..].to_vec();
            chain.push(current);
            return Err(BeansError::CircularDependency {
                chain: chain.join(" -> "),
            });
        }

        if visited.contains(current) {
            return Ok(());
        }

        path.push(current);

        // 不在图中的依赖视为叶子节点
        if let Some(node) = index.get(current).copied() {
            for dep in &node.dependencies {
                Self::dfs_check(dep, index, visited, path)?;
            }
        }

        path.pop();
        visited.insert(current);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, deps: &[&str]) -> DependencyGraphNode {
        DependencyGraphNode::new(name, deps.iter().map(|d| d.to_string()).collect())
    }

    #[test]
    fn test_acyclic_graph_passes() {
        let graph = vec![
            node("a", &["b", "c"]),
            node("b", &["c"]),
            node("c", &[]),
            node("d", &["external"]),
        ];
        assert!(DefaultCircularDependencyDetector
            .detect_circular_dependencies(&graph)
            .is_ok());
    }

    #[test]
    fn test_cycle_reports_chain() {
        let graph = vec![node("a", &["b"]), node("b", &["c"]), node("c", &["a"])];
        let error = DefaultCircularDependencyDetector
            .detect_circular_dependencies(&graph)
            .unwrap_err();
        match error {
            BeansError::CircularDependency { chain } => assert_eq!(chain, "a -> b -> c -> a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let graph = vec![node("a", &["a"])];
        assert!(matches!(
            DefaultCircularDependencyDetector.detect_circular_dependencies(&graph),
            Err(BeansError::CircularDependency { .. })
        ));
    }
}
