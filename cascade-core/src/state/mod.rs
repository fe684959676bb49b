//! State Items and Update Dispatch
//!
//! This module is the runtime side of Cascade: declaring items, holding
//! their values and replaying their effects when an update touches them.
//!
//! # Concepts
//!
//! ## Items
//!
//! Every item has a key, a list of direct dependencies and an optional
//! value. A *source* only holds data. A *producer* also carries an effect,
//! such as uploading a buffer or binding a uniform.
//!
//! ## Root
//!
//! Exactly one item is the root. Its round-count function runs on every
//! update and decides how many times the affected effects replay. An
//! optional prepass hook runs unconditionally alongside it (a full clear,
//! for instance).
//!
//! ## Patches
//!
//! An update receives a [`Patch`]: a literal set of new values, or a
//! function computing them from the current state. Only producers whose
//! closure contains a patched key run.
//!
//! # Implementation Notes
//!
//! Values live in an arena indexed by registration position; the topology
//! in [`crate::graph`] never changes after [`Registry::build`]. The engine
//! owns the external context and lends it to effects, so effects carry no
//! handles of their own.

mod effect;
mod engine;
mod patch;
mod registry;
mod store;

pub use effect::{Effect, Round};
pub use engine::{Engine, UpdateReport};
pub use patch::Patch;
pub use registry::Registry;
pub use store::State;

use std::fmt::Debug;
use std::hash::Hash;

/// Requirements on item keys.
///
/// Typically a fieldless enum or `&'static str`.
pub trait Key: Copy + Eq + Hash + Debug + 'static {}

impl<T> Key for T where T: Copy + Eq + Hash + Debug + 'static {}
