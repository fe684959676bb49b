//! Dependency Graph
//!
//! This module holds the static topology of a registry: which items exist,
//! what each one depends on, the transitive closure of every item and the
//! global execution order.
//!
//! # Overview
//!
//! The graph is a directed acyclic graph where:
//!
//! - Nodes are registered items, addressed by a dense [`ItemId`]
//! - Edges are declared dependencies: if A depends on B, B is in A's list
//!
//! Resolution runs once. Each node gains its closure (itself plus every
//! transitive dependency) and the [`Schedule`] orders all nodes so that
//! dependencies come first. An update then only needs to ask which closures
//! contain a changed node and walk the schedule.
//!
//! # Design Decisions
//!
//! 1. Topology is kept apart from values. Nothing in this module changes
//!    after [`Topology::resolve`] returns.
//!
//! 2. Nodes are stored in a `Vec` indexed by [`ItemId`], which is the
//!    registration position, so lookups are O(1) and the order is stable.
//!
//! 3. Cycles are rejected during resolution, never at update time.

mod closure;
mod node;
mod scheduler;
mod topology;

pub use closure::{resolve_closures, CycleDetected};
pub use node::{ItemId, Node, NodeKind};
pub use scheduler::Schedule;
pub use topology::Topology;
