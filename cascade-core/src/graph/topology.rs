//! Resolved Topology
//!
//! The immutable half of an engine: nodes with resolved closures plus the
//! schedule. Built once, never mutated afterwards.

use super::closure::{resolve_closures, CycleDetected};
use super::node::{ItemId, Node, NodeKind};
use super::scheduler::Schedule;

#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<Node>,
    schedule: Schedule,
    root: ItemId,
}

impl Topology {
    /// Resolve closures and compute the schedule.
    ///
    /// `nodes[i]` must carry id `i` and `root` must be one of them.
    pub fn resolve(mut nodes: Vec<Node>, root: ItemId) -> Result<Self, CycleDetected> {
        resolve_closures(&mut nodes, root)?;
        let schedule = Schedule::compute(&nodes);
        Ok(Self {
            nodes,
            schedule,
            root,
        })
    }

    pub fn root(&self) -> ItemId {
        self.root
    }

    pub fn node(&self, id: ItemId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Producers and the root whose closure contains a changed node, in
    /// schedule order.
    ///
    /// `changed[i]` flags node `i`. Plain sources are never returned since
    /// they have nothing to run.
    pub fn affected<'a>(&'a self, changed: &'a [bool]) -> impl Iterator<Item = ItemId> + 'a {
        self.schedule.iter().filter(move |id| {
            let node = &self.nodes[id.index()];
            node.kind() != NodeKind::Source
                && node
                    .closure()
                    .iter()
                    .any(|member| changed.get(member.index()).copied().unwrap_or(false))
        })
    }
}
