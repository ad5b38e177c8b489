//! Module dependency graph
//!
//! Modules declare the names of the modules they depend on. The graph
//! answers dependency queries, detects cycles, produces a topological order
//! and validates that a declared load order respects every edge.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{GuideError, Result};

/// A node in the dependency graph
#[derive(Debug, Clone)]
pub struct ModuleNode {
    pub name: String,
    pub depends_on: Vec<String>,
}

/// An edge in the dependency graph (from -> to means "from depends on to")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    nodes: HashMap<String, ModuleNode>,
    /// Insertion order, used as the declared order.
    order: Vec<String>,
    edges: Vec<DependencyEdge>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(name, dependencies)` pairs in declared order.
    pub fn from_declared<'a, I, D>(modules: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, D)>,
        D: IntoIterator<Item = &'a str>,
    {
        let mut graph = Self::new();
        for (name, deps) in modules {
            graph.add_module(name, deps.into_iter().map(str::to_string).collect());
        }
        graph
    }

    pub fn add_module(&mut self, name: &str, depends_on: Vec<String>) {
        if !self.nodes.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.edges.retain(|edge| edge.from != name);
        for dep in &depends_on {
            self.edges.push(DependencyEdge {
                from: name.to_string(),
                to: dep.clone(),
            });
        }
        self.nodes.insert(
            name.to_string(),
            ModuleNode {
                name: name.to_string(),
                depends_on,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&ModuleNode> {
        self.nodes.get(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Get direct dependencies of a module
    pub fn direct_dependencies(&self, name: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.from == name)
            .map(|e| e.to.as_str())
            .collect()
    }

    /// Get modules that directly depend on this module
    pub fn direct_dependents(&self, name: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.to == name)
            .map(|e| e.from.as_str())
            .collect()
    }

    /// Every module that depends on `name`, directly or transitively.
    pub fn transitive_dependents(&self, name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([name.to_string()]);
        let mut found = Vec::new();
        while let Some(current) = queue.pop_front() {
            for dependent in self.direct_dependents(&current) {
                if seen.insert(dependent.to_string()) {
                    found.push(dependent.to_string());
                    queue.push_back(dependent.to_string());
                }
            }
        }
        found
    }

    /// Dependencies naming modules that are not in the graph, as
    /// `(module, missing)` pairs.
    pub fn missing_dependencies(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .flat_map(|name| {
                self.direct_dependencies(name)
                    .into_iter()
                    .filter(|dep| !self.nodes.contains_key(*dep))
                    .map(|dep| (name.clone(), dep.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Detect cycles using DFS with back-edge detection
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for name in &self.order {
            if !visited.contains(name) {
                self.dfs_detect_cycles(name, &mut visited, &mut rec_stack, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn dfs_detect_cycles(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        rec_stack: &mut HashSet<String>,
        path: &mut Vec<String>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visited.insert(node.to_string());
        rec_stack.insert(node.to_string());
        path.push(node.to_string());

        for dep in self.direct_dependencies(node) {
            if !self.nodes.contains_key(dep) {
                continue;
            }

            if !visited.contains(dep) {
                self.dfs_detect_cycles(dep, visited, rec_stack, path, cycles);
            } else if rec_stack.contains(dep) {
                // Found a cycle - extract it from the path
                if let Some(cycle_start) = path.iter().position(|x| x == dep) {
                    let mut cycle: Vec<String> = path[cycle_start..].to_vec();
                    cycle.push(dep.to_string());
                    cycles.push(cycle);
                }
            }
        }

        path.pop();
        rec_stack.remove(node);
    }

    /// Topological sort using Kahn's algorithm, dependencies first. Ties
    /// keep declared order. Fails on cycles.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        if let Some(cycle) = self.detect_cycles().into_iter().next() {
            return Err(GuideError::CyclicDependency { cycle });
        }

        let mut remaining: HashMap<&str, usize> = self
            .order
            .iter()
            .map(|name| {
                let known = self
                    .direct_dependencies(name)
                    .into_iter()
                    .filter(|dep| self.nodes.contains_key(*dep))
                    .count();
                (name.as_str(), known)
            })
            .collect();

        let mut queue: VecDeque<&str> = self
            .order
            .iter()
            .map(String::as_str)
            .filter(|name| remaining.get(name) == Some(&0))
            .collect();

        let mut result = Vec::with_capacity(self.order.len());
        while let Some(name) = queue.pop_front() {
            result.push(name.to_string());
            for dependent in self.order.iter().map(String::as_str) {
                if !self.direct_dependencies(dependent).contains(&name) {
                    continue;
                }
                if let Some(count) = remaining.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        Ok(result)
    }

    /// Check the declared order: every dependency exists, there are no
    /// cycles, and each module comes after all of its dependencies.
    pub fn validate_declared_order(&self) -> Result<()> {
        if let Some((module, dependency)) = self.missing_dependencies().into_iter().next() {
            return Err(GuideError::Dependency { module, dependency });
        }
        if let Some(cycle) = self.detect_cycles().into_iter().next() {
            return Err(GuideError::CyclicDependency { cycle });
        }

        let position: HashMap<&str, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();
        for (idx, name) in self.order.iter().enumerate() {
            for dep in self.direct_dependencies(name) {
                if position.get(dep).is_some_and(|&dep_idx| dep_idx > idx) {
                    return Err(GuideError::Dependency {
                        module: name.clone(),
                        dependency: dep.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
