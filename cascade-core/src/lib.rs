//! Cascade Core
//!
//! This crate provides the dependency-driven state propagation engine used
//! by the Cascade rendering demos. It implements:
//!
//! - A fixed registry of named state items with declared dependencies
//! - Transitive closure resolution with cycle rejection
//! - A single global, dependency-first schedule
//! - Change-gated effect replay, repeated for a root-controlled number of
//!   rounds
//!
//! The engine owns no external resources and runs no loop. Collaborators
//! build it once and push every state change through [`Engine::update`].
//!
//! # Architecture
//!
//! - `graph`: Static topology (nodes, closures, schedule)
//! - `state`: Registry builder, value store, patches, effects and the engine
//! - `config`: Engine settings loadable from JSON
//! - `logging`: Optional `tracing` subscriber setup
//!
//! # Example
//!
//! ```rust
//! use cascade_core::{Patch, Registry};
//!
//! #[derive(Default)]
//! struct Gl {
//!     uploads: Vec<i32>,
//!     clears: usize,
//! }
//!
//! let mut update = cascade_core::build(
//!     Registry::<&str, i32, Gl>::new()
//!         .root("draw", ["buffer"], |_| 1)
//!         .prepass(|_, gl| {
//!             gl.clears += 1;
//!             Ok(())
//!         })
//!         .source("size", 4)
//!         .producer("buffer", ["size"], |state, _round, gl| {
//!             gl.uploads.push(*state.get(&"size").unwrap_or(&0));
//!             Ok(())
//!         }),
//!     Gl::default(),
//! )
//! .unwrap();
//!
//! // Resize: the buffer is re-uploaded.
//! let report = update(Patch::from([("size", 8)])).unwrap();
//! assert_eq!(report.affected, vec!["buffer"]);
//!
//! // Nothing changed: only the root runs.
//! let report = update(Patch::empty()).unwrap();
//! assert_eq!(report.invocations, 0);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod state;

pub use config::EngineConfig;
pub use error::{BuildError, ConfigurationError, EffectError, EffectResult, UpdateError};
pub use state::{Effect, Engine, Key, Patch, Registry, Round, State, UpdateReport};

/// Build a registry and return its update function.
///
/// Equivalent to `registry.build(cx)?.into_update_fn()`.
pub fn build<K, V, C>(
    registry: Registry<K, V, C>,
    cx: C,
) -> Result<impl FnMut(Patch<'_, K, V>) -> Result<UpdateReport<K>, UpdateError>, BuildError>
where
    K: Key,
{
    Ok(registry.build(cx)?.into_update_fn())
}
