//! Calculation ordering over the dependency relation.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use hvac_core::NodeId;

use crate::error::{GraphError, GraphResult};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Depth-first topological sort: every node appears after all of its
/// dependencies. Roots are visited in id order so the result is deterministic.
///
/// Dependencies on nodes absent from `deps` are ignored. A back edge yields
/// `CycleDetected` naming the node that closed the cycle.
pub fn topological_order(deps: &BTreeMap<NodeId, BTreeSet<NodeId>>) -> GraphResult<Vec<NodeId>> {
    let mut marks: HashMap<NodeId, Mark> = HashMap::with_capacity(deps.len());
    let mut order = Vec::with_capacity(deps.len());
    // Explicit stack of (node, remaining dependencies) keeps deep chains off the call stack.
    let mut stack: Vec<(NodeId, Vec<NodeId>)> = Vec::new();

    for &root in deps.keys() {
        if marks.contains_key(&root) {
            continue;
        }
        marks.insert(root, Mark::InProgress);
        stack.push((root, pending(deps, root)));

        while let Some((node, remaining)) = stack.last_mut() {
            let node = *node;
            match remaining.pop() {
                Some(dep) => match marks.get(&dep).copied() {
                    Some(Mark::Done) => {}
                    Some(Mark::InProgress) => return Err(GraphError::CycleDetected { node: dep }),
                    None => {
                        marks.insert(dep, Mark::InProgress);
                        let next = pending(deps, dep);
                        stack.push((dep, next));
                    }
                },
                None => {
                    marks.insert(node, Mark::Done);
                    order.push(node);
                    stack.pop();
                }
            }
        }
    }
    Ok(order)
}

/// Dependencies of `node` that are themselves in the graph, reversed so
/// popping visits them in ascending id order.
fn pending(deps: &BTreeMap<NodeId, BTreeSet<NodeId>>, node: NodeId) -> Vec<NodeId> {
    deps.get(&node)
        .map(|d| d.iter().rev().copied().filter(|n| deps.contains_key(n)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(i: u32) -> NodeId {
        NodeId::from_index(i)
    }

    fn graph(n: u32, edges: &[(u32, u32)]) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
        let mut deps: BTreeMap<NodeId, BTreeSet<NodeId>> =
            (0..n).map(|i| (id(i), BTreeSet::new())).collect();
        for &(up, down) in edges {
            deps.entry(id(down)).or_default().insert(id(up));
        }
        deps
    }

    #[test]
    fn chain_is_ordered_upstream_first() {
        let deps = graph(3, &[(2, 1), (1, 0)]);
        assert_eq!(topological_order(&deps).unwrap(), vec![id(2), id(1), id(0)]);
    }

    #[test]
    fn cycle_is_reported() {
        let deps = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        assert!(matches!(
            topological_order(&deps),
            Err(GraphError::CycleDetected { .. })
        ));
    }

    #[test]
    fn missing_dependencies_are_ignored() {
        let mut deps = graph(1, &[]);
        deps.get_mut(&id(0)).unwrap().insert(id(9));
        assert_eq!(topological_order(&deps).unwrap(), vec![id(0)]);
    }

    #[test]
    fn long_chain_does_not_recurse() {
        let n = 50_000;
        let edges: Vec<(u32, u32)> = (1..n).map(|i| (i, i - 1)).collect();
        let order = topological_order(&graph(n, &edges)).unwrap();
        assert_eq!(order.first(), Some(&id(n - 1)));
        assert_eq!(order.len(), n as usize);
    }

    proptest! {
        #[test]
        fn dependencies_precede_dependents(
            n in 1u32..24,
            raw in prop::collection::vec((0u32..24, 0u32..24), 0..60),
        ) {
            // Only forward edges (low -> high) so the graph is acyclic.
            let edges: Vec<(u32, u32)> = raw
                .into_iter()
                .map(|(a, b)| (a % n, b % n))
                .filter(|(a, b)| a < b)
                .collect();
            let deps = graph(n, &edges);
            let order = topological_order(&deps).unwrap();
            prop_assert_eq!(order.len(), n as usize);
            let pos: HashMap<NodeId, usize> =
                order.iter().enumerate().map(|(i, n)| (*n, i)).collect();
            for (up, down) in edges {
                prop_assert!(pos[&id(up)] < pos[&id(down)]);
            }
        }
    }
}
