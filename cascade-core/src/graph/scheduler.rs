//! Update Scheduler
//!
//! The scheduler computes the single global execution order used by every
//! update. It ensures that dependencies always run before their dependents.
//!
//! # Algorithm
//!
//! The order is built by insertion and reversed once at the end:
//!
//! 1. Visit nodes in reverse registration order.
//! 2. For each node, find the earliest position already occupied by a member
//!    of its resolved closure (itself excluded).
//! 3. Insert the node at that position, or append it if no member is placed.
//! 4. Reverse the list.
//!
//! Before the reversal every node sits ahead of everything it reaches, so
//! afterwards every node sits behind it. Unrelated nodes are appended and
//! therefore come out in registration order.

use super::node::{ItemId, Node};

/// Immutable, dependency-first execution order over every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    order: Vec<ItemId>,
    /// positions[id.index()] is the node's slot in `order`.
    positions: Vec<usize>,
}

impl Schedule {
    /// Compute the schedule for a fully resolved set of nodes.
    pub fn compute(nodes: &[Node]) -> Self {
        let mut order: Vec<ItemId> = Vec::with_capacity(nodes.len());

        for node in nodes.iter().rev() {
            let reached = node.transitive_dependencies();
            match order.iter().position(|placed| reached.contains(placed)) {
                Some(at) => order.insert(at, node.id()),
                None => order.push(node.id()),
            }
        }
        order.reverse();

        let mut positions = vec![0; nodes.len()];
        for (slot, id) in order.iter().enumerate() {
            positions[id.index()] = slot;
        }

        Self { order, positions }
    }

    /// Number of scheduled nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Nodes in execution order.
    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.order.iter().copied()
    }

    /// The execution order as a slice.
    pub fn as_slice(&self) -> &[ItemId] {
        &self.order
    }

    /// Slot of `id` in the order.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.positions.get(id.index()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::closure::resolve_closures;
    use crate::graph::node::NodeKind;

    fn resolved(deps: &[&[usize]]) -> Vec<Node> {
        let mut nodes: Vec<Node> = deps
            .iter()
            .enumerate()
            .map(|(i, d)| {
                Node::new(
                    ItemId::new(i),
                    NodeKind::Producer,
                    d.iter().map(|&j| ItemId::new(j)),
                )
            })
            .collect();
        resolve_closures(&mut nodes, ItemId::new(0)).unwrap();
        nodes
    }

    fn raw(schedule: &Schedule) -> Vec<usize> {
        schedule.iter().map(|id| id.index()).collect()
    }

    #[test]
    fn unrelated_nodes_keep_registration_order() {
        let nodes = resolved(&[&[], &[], &[], &[]]);
        let schedule = Schedule::compute(&nodes);

        assert_eq!(raw(&schedule), vec![0, 1, 2, 3]);
    }

    #[test]
    fn dependency_runs_before_dependent() {
        // root 0, a = 1, b = 2 depends on a, c = 3
        let nodes = resolved(&[&[], &[], &[1], &[]]);
        let schedule = Schedule::compute(&nodes);

        assert_eq!(raw(&schedule), vec![0, 1, 2, 3]);
    }

    #[test]
    fn forward_references_are_ordered() {
        // 0 = e, 1 = x depends on 2, 2 = d depends on 0
        let nodes = resolved(&[&[], &[2], &[0]]);
        let schedule = Schedule::compute(&nodes);

        let pos = |i: usize| schedule.position(ItemId::new(i)).unwrap();
        assert!(pos(0) < pos(2));
        assert!(pos(2) < pos(1));
    }

    #[test]
    fn root_depending_on_everything_runs_last() {
        let nodes = resolved(&[&[1, 2], &[3], &[], &[]]);
        let schedule = Schedule::compute(&nodes);

        assert_eq!(schedule.as_slice().last(), Some(&ItemId::new(0)));
        assert!(schedule.position(ItemId::new(3)) < schedule.position(ItemId::new(1)));
    }

    #[test]
    fn positions_match_order() {
        let nodes = resolved(&[&[2], &[], &[1]]);
        let schedule = Schedule::compute(&nodes);

        assert_eq!(schedule.len(), 3);
        for (slot, id) in schedule.iter().enumerate() {
            assert_eq!(schedule.position(id), Some(slot));
        }
    }
}
