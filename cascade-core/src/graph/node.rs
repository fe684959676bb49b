//! Graph Nodes
//!
//! This module defines the topology record for a single registered item.
//! Values live elsewhere (see `state::store`); a node only knows who it is,
//! what it depends on, and what its resolved closure is.

use smallvec::SmallVec;

/// Dense identifier for an item: its registration position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u32);

impl ItemId {
    /// Create an id from a registration index.
    pub fn new(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Index into per-item arenas.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for ItemId {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

/// The role of an item in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The distinguished item that owns the round-count function.
    Root,

    /// A plain data item. It holds a value but runs nothing.
    Source,

    /// An item with an effect that replays when its closure changes.
    Producer,
}

/// A node in the dependency graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: ItemId,
    kind: NodeKind,

    /// Direct dependencies, in declaration order.
    dependencies: SmallVec<[ItemId; 4]>,

    /// Resolved closure: this node first, then every transitive dependency
    /// in first-discovery order. Empty until resolution.
    closure: Vec<ItemId>,
}

impl Node {
    /// Create an unresolved node.
    pub fn new(id: ItemId, kind: NodeKind, dependencies: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            id,
            kind,
            dependencies: dependencies.into_iter().collect(),
            closure: Vec::new(),
        }
    }

    /// Get the node's id.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Get the node's kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Direct dependencies as declared.
    pub fn dependencies(&self) -> &[ItemId] {
        &self.dependencies
    }

    /// Resolved closure, self-inclusive. Empty if not yet resolved.
    pub fn closure(&self) -> &[ItemId] {
        &self.closure
    }

    /// The closure without the node itself.
    pub fn transitive_dependencies(&self) -> &[ItemId] {
        self.closure.get(1..).unwrap_or(&[])
    }

    /// Whether the closure has been resolved.
    pub fn is_resolved(&self) -> bool {
        !self.closure.is_empty()
    }

    /// Whether `other` is in this node's resolved closure.
    pub fn reaches(&self, other: ItemId) -> bool {
        self.closure.contains(&other)
    }

    pub(crate) fn set_closure(&mut self, closure: Vec<ItemId>) {
        debug_assert_eq!(closure.first(), Some(&self.id), "closure must start with the node");
        self.closure = closure;
    }
}
