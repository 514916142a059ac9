//! Step dependency graph.
//!
//! Step B depends on step A when one of B's `uses` or `requires` references is
//! the state A produces. References to ingredients add no edges.

use crate::types::Step;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Dependency structure of a step list, indexed by step position.
#[derive(Debug, Clone)]
pub struct StepGraph {
    dependencies: Vec<Vec<usize>>,
    order: Vec<usize>,
    cyclic: Vec<usize>,
}

/// Map each produced state to the first step producing it.
pub fn producer_index(steps: &[Step]) -> HashMap<&str, usize> {
    let mut producers = HashMap::new();
    for (idx, step) in steps.iter().enumerate() {
        if !step.produces.is_empty() {
            producers.entry(step.produces.as_str()).or_insert(idx);
        }
    }
    producers
}

impl StepGraph {
    pub fn build(steps: &[Step]) -> Self {
        let producers = producer_index(steps);

        let dependencies: Vec<Vec<usize>> = steps
            .iter()
            .map(|step| {
                let mut deps: Vec<usize> = step
                    .references()
                    .filter_map(|r| producers.get(r.as_str()).copied())
                    .collect();
                deps.sort_unstable();
                deps.dedup();
                deps
            })
            .collect();

        let (order, cyclic) = kahn_order(&dependencies);
        Self {
            dependencies,
            order,
            cyclic,
        }
    }

    /// Steps that must finish before step `idx` starts.
    pub fn dependencies(&self, idx: usize) -> &[usize] {
        &self.dependencies[idx]
    }

    /// Topological order; lowest step index first among ready steps.
    ///
    /// Steps on or downstream of a cycle are absent.
    pub fn topological_order(&self) -> &[usize] {
        &self.order
    }

    /// Steps that could not be ordered because they sit on or behind a cycle.
    pub fn cycle_members(&self) -> &[usize] {
        &self.cyclic
    }

    pub fn has_cycle(&self) -> bool {
        !self.cyclic.is_empty()
    }
}

fn kahn_order(dependencies: &[Vec<usize>]) -> (Vec<usize>, Vec<usize>) {
    let n = dependencies.len();
    let mut in_degree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

    for (idx, deps) in dependencies.iter().enumerate() {
        in_degree[idx] = deps.len();
        for &dep in deps {
            dependents[dep].push(idx);
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(idx, _)| Reverse(idx))
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(idx)) = ready.pop() {
        order.push(idx);
        for &next in &dependents[idx] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    let cyclic = (0..n).filter(|idx| in_degree[*idx] > 0).collect();
    (order, cyclic)
}
