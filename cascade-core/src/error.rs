//! Error Types
//!
//! Construction failures ([`BuildError`]) and update failures
//! ([`UpdateError`]). Keys are rendered with their `Debug` form so that the
//! error types do not carry the registry's key type parameter.

use thiserror::Error;

/// Boxed error returned by effects and prepass hooks.
pub type EffectError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by effects and prepass hooks.
pub type EffectResult = Result<(), EffectError>;

/// A registry whose declared topology cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// An item names a dependency that was never registered.
    #[error("item {item} depends on unknown key {dependency}")]
    UnknownDependency { item: String, dependency: String },

    /// An item lists itself as a direct dependency.
    #[error("item {item} lists itself as a dependency")]
    SelfDependency { item: String },

    /// The same key was registered twice.
    #[error("key {key} is registered more than once")]
    DuplicateKey { key: String },

    /// A second root was registered.
    #[error("root already declared as {first}, cannot also declare {second}")]
    DuplicateRoot { first: String, second: String },

    /// A root hook was attached before any root was declared.
    #[error("{hook} was attached before a root was declared")]
    HookWithoutRoot { hook: &'static str },

    /// The direct-dependency graph contains a cycle.
    ///
    /// `path` starts and ends on the same key.
    #[error("dependency cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },
}

/// Failure to build an engine from a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid registry: {0}")]
    Configuration(#[from] ConfigurationError),

    /// No root item (and therefore no round-count function) was declared.
    #[error("registry has no root item")]
    MissingRoot,
}

/// Failure during a single update call.
///
/// Values written before an `Effect` or `Prepass` failure stay written.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("patch names unknown key {key}")]
    UnknownKey { key: String },

    #[error("patch targets root key {key}, which holds no value")]
    RootNotPatchable { key: String },

    #[error("round count {rounds} exceeds the configured limit of {limit}")]
    RoundLimit { rounds: usize, limit: usize },

    #[error("root prepass failed")]
    Prepass {
        #[source]
        source: EffectError,
    },

    #[error("effect for {key} failed in round {round}")]
    Effect {
        key: String,
        round: usize,
        #[source]
        source: EffectError,
    },
}

impl UpdateError {
    /// Whether the failure happened after the patch was written to the store.
    pub fn state_written(&self) -> bool {
        !matches!(self, Self::UnknownKey { .. } | Self::RootNotPatchable { .. })
    }
}

pub(crate) fn key_name<K: std::fmt::Debug>(key: &K) -> String {
    format!("{key:?}")
}
