//! Dependency resolver
//!
//! Orders services so that every dependency is handled before its
//! dependents. Ordering is a stable topological sort: among services that
//! are ready at the same time, declaration order wins.

use std::collections::BTreeSet;

use crate::domain::entities::{ServiceGraph, ServiceSpec};
use crate::error::{ReconcileError, ReconcileResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Resolves the service order for one invocation
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'g> {
    graph: &'g ServiceGraph,
}

impl<'g> DependencyResolver<'g> {
    pub fn new(graph: &'g ServiceGraph) -> Self {
        Self { graph }
    }

    /// Resolve the ordered service list
    ///
    /// An empty `requested` slice selects every service. With
    /// `include_dependencies` the transitive dependencies of the requested
    /// services are added and edges drive the order; without it only the
    /// requested services come back, in declaration order.
    ///
    /// The dependency closure of the request is always checked for cycles,
    /// so a broken graph fails the same way whichever mode is used.
    pub fn order(
        &self,
        requested: &[String],
        include_dependencies: bool,
    ) -> ReconcileResult<Vec<&'g ServiceSpec>> {
        let roots = self.requested_indices(requested)?;
        let closure = self.closure(&roots);

        if let Some(cycle) = self.find_cycle(&closure) {
            let trace = cycle
                .into_iter()
                .filter_map(|i| self.graph.service_at(i))
                .map(|s| s.name().to_string())
                .collect();
            return Err(ReconcileError::Cycle { trace });
        }

        let order = if include_dependencies {
            self.topological(&closure)
        } else {
            roots.into_iter().collect()
        };

        Ok(order
            .into_iter()
            .filter_map(|i| self.graph.service_at(i))
            .collect())
    }

    fn requested_indices(&self, requested: &[String]) -> ReconcileResult<BTreeSet<usize>> {
        if requested.is_empty() {
            return Ok((0..self.graph.len()).collect());
        }
        requested
            .iter()
            .map(|name| {
                self.graph
                    .index_of(name)
                    .ok_or_else(|| ReconcileError::unknown_service(name.clone()))
            })
            .collect()
    }

    fn closure(&self, roots: &BTreeSet<usize>) -> BTreeSet<usize> {
        let edges = self.graph.dependency_indices();
        let mut seen = roots.clone();
        let mut pending: Vec<usize> = roots.iter().copied().collect();
        while let Some(node) = pending.pop() {
            for &dep in &edges[node] {
                if seen.insert(dep) {
                    pending.push(dep);
                }
            }
        }
        seen
    }

    /// Depth-first coloring walk; returns the first cycle found, with the
    /// entry node repeated at the end (`a -> b -> a`).
    fn find_cycle(&self, nodes: &BTreeSet<usize>) -> Option<Vec<usize>> {
        let edges = self.graph.dependency_indices();
        let mut marks = vec![Mark::Unvisited; edges.len()];
        let mut stack = Vec::new();

        for &root in nodes {
            if marks[root] == Mark::Unvisited {
                if let Some(cycle) = visit(root, edges, &mut marks, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    /// Kahn's algorithm restricted to `nodes`, always emitting the lowest
    /// declaration index among the ready services.
    fn topological(&self, nodes: &BTreeSet<usize>) -> Vec<usize> {
        let edges = self.graph.dependency_indices();
        let mut pending_deps = vec![0usize; edges.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); edges.len()];

        for &node in nodes {
            for &dep in &edges[node] {
                if nodes.contains(&dep) {
                    pending_deps[node] += 1;
                    dependents[dep].push(node);
                }
            }
        }

        let mut ready: BTreeSet<usize> = nodes
            .iter()
            .copied()
            .filter(|&n| pending_deps[n] == 0)
            .collect();
        let mut order = Vec::with_capacity(nodes.len());

        while let Some(node) = ready.pop_first() {
            order.push(node);
            for &dependent in &dependents[node] {
                pending_deps[dependent] -= 1;
                if pending_deps[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        order
    }
}

fn visit(
    node: usize,
    edges: &[Vec<usize>],
    marks: &mut [Mark],
    stack: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    marks[node] = Mark::InProgress;
    stack.push(node);

    for &dep in &edges[node] {
        match marks[dep] {
            Mark::InProgress => {
                let start = stack.iter().position(|&n| n == dep).unwrap_or(0);
                let mut cycle = stack[start..].to_vec();
                cycle.push(dep);
                return Some(cycle);
            }
            Mark::Unvisited => {
                if let Some(cycle) = visit(dep, edges, marks, stack) {
                    return Some(cycle);
                }
            }
            Mark::Done => {}
        }
    }

    stack.pop();
    marks[node] = Mark::Done;
    None
}
