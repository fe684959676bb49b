//! Registry
//!
//! The declaration side of an engine. A registry lists every item once:
//! its key, direct dependencies, initial value and optional effect, plus the
//! single root that decides how many rounds an update runs.
//!
//! Nothing is validated until [`Registry::build`], which checks keys and
//! dependencies, resolves closures, computes the schedule and hands back an
//! [`Engine`].

use indexmap::IndexSet;
use smallvec::SmallVec;

use crate::config::EngineConfig;
use crate::error::{key_name, BuildError, ConfigurationError, EffectResult};
use crate::graph::{ItemId, Node, NodeKind, Topology};

use super::effect::{BoxedEffect, Effect, PrepassFn, Round, RoundCountFn};
use super::engine::Engine;
use super::store::{State, Store};
use super::Key;

struct Entry<K, V, C> {
    key: K,
    kind: NodeKind,
    dependencies: SmallVec<[K; 4]>,
    value: Option<V>,
    effect: Option<BoxedEffect<K, V, C>>,
}

struct RootEntry<K, V, C> {
    key: K,
    round_count: RoundCountFn<K, V>,
    prepass: Option<PrepassFn<K, V, C>>,
}

/// Builder for an [`Engine`].
///
/// `K` is the key type, `V` the value type shared by all items and `C` the
/// context handed to effects.
///
/// # Example
///
/// ```rust
/// use cascade_core::{Patch, Registry};
///
/// let mut engine = Registry::<&str, f32, Vec<String>>::new()
///     .root("frame", ["mesh"], |_| 1)
///     .source("width", 640.0)
///     .producer("mesh", ["width"], |state, _round, log| {
///         log.push(format!("mesh {:?}", state.get(&"width")));
///         Ok(())
///     })
///     .build(Vec::new())
///     .unwrap();
///
/// engine.update([("width", 800.0)]).unwrap();
/// assert_eq!(engine.context(), &["mesh Some(800.0)".to_string()]);
/// ```
pub struct Registry<K, V, C> {
    entries: Vec<Entry<K, V, C>>,
    root: Option<RootEntry<K, V, C>>,
    pending: Option<ConfigurationError>,
    config: EngineConfig,
}

impl<K: Key, V, C> Default for Registry<K, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V, C> Registry<K, V, C> {
    /// Empty registry with the default [`EngineConfig`].
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            root: None,
            pending: None,
            config: EngineConfig::default(),
        }
    }

    /// Replace the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Declare the root item and its round-count function.
    ///
    /// The round count is evaluated once per update against the merged
    /// post-update state.
    pub fn root<D, F>(mut self, key: K, dependencies: D, round_count: F) -> Self
    where
        D: IntoIterator<Item = K>,
        F: Fn(&State<'_, K, V>) -> usize + 'static,
    {
        if let Some(first) = self.root.as_ref().map(|root| root.key) {
            self.reject(ConfigurationError::DuplicateRoot {
                first: key_name(&first),
                second: key_name(&key),
            });
            return self;
        }
        self.root = Some(RootEntry {
            key,
            round_count: Box::new(round_count),
            prepass: None,
        });
        self.push(key, NodeKind::Root, dependencies, None, None)
    }

    /// Unconditional hook run once per update, after the round count and
    /// before the first round, whether or not anything changed.
    ///
    /// Applies to the root declared so far; call after [`root`](Self::root).
    pub fn prepass<F>(mut self, prepass: F) -> Self
    where
        F: FnMut(&State<'_, K, V>, &mut C) -> EffectResult + 'static,
    {
        match self.root.as_mut() {
            Some(root) => root.prepass = Some(Box::new(prepass)),
            None => self.reject(ConfigurationError::HookWithoutRoot { hook: "prepass" }),
        }
        self
    }

    /// Change-gated effect on the root itself.
    ///
    /// Filtered like any producer: it only runs when a key in the root's
    /// closure changed. Call after [`root`](Self::root).
    pub fn root_effect<F>(mut self, effect: F) -> Self
    where
        F: FnMut(&State<'_, K, V>, Round, &mut C) -> EffectResult + 'static,
    {
        let Some(root_key) = self.root.as_ref().map(|root| root.key) else {
            self.reject(ConfigurationError::HookWithoutRoot { hook: "root_effect" });
            return self;
        };
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.key == root_key && entry.kind == NodeKind::Root)
        {
            entry.effect = Some(Box::new(effect));
        }
        self
    }

    /// A raw data item with no dependencies and nothing to run.
    pub fn source(self, key: K, value: V) -> Self {
        self.push(key, NodeKind::Source, [], Some(value), None)
    }

    /// A data item, optionally valued, that groups other keys.
    ///
    /// It never runs anything, but producers depending on it see changes to
    /// anything in its closure.
    pub fn item<D>(self, key: K, dependencies: D, value: Option<V>) -> Self
    where
        D: IntoIterator<Item = K>,
    {
        self.push(key, NodeKind::Source, dependencies, value, None)
    }

    /// An item whose effect replays when any key in its closure changes.
    pub fn producer<D, F>(self, key: K, dependencies: D, effect: F) -> Self
    where
        D: IntoIterator<Item = K>,
        F: FnMut(&State<'_, K, V>, Round, &mut C) -> EffectResult + 'static,
    {
        self.push(key, NodeKind::Producer, dependencies, None, Some(Box::new(effect)))
    }

    /// A producer that also holds an initial value.
    pub fn producer_with_value<D, F>(self, key: K, dependencies: D, value: V, effect: F) -> Self
    where
        D: IntoIterator<Item = K>,
        F: FnMut(&State<'_, K, V>, Round, &mut C) -> EffectResult + 'static,
    {
        self.push(key, NodeKind::Producer, dependencies, Some(value), Some(Box::new(effect)))
    }

    /// A producer driven by any [`Effect`] implementation.
    pub fn producer_effect<D, E>(self, key: K, dependencies: D, effect: E) -> Self
    where
        D: IntoIterator<Item = K>,
        E: Effect<K, V, C> + 'static,
    {
        self.push(key, NodeKind::Producer, dependencies, None, Some(Box::new(effect)))
    }

    /// Number of declared items, root included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been declared yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push<D>(
        mut self,
        key: K,
        kind: NodeKind,
        dependencies: D,
        value: Option<V>,
        effect: Option<BoxedEffect<K, V, C>>,
    ) -> Self
    where
        D: IntoIterator<Item = K>,
    {
        self.entries.push(Entry {
            key,
            kind,
            dependencies: dependencies.into_iter().collect(),
            value,
            effect,
        });
        self
    }

    fn reject(&mut self, error: ConfigurationError) {
        if self.pending.is_none() {
            self.pending = Some(error);
        }
    }

    /// Validate, resolve and schedule, taking ownership of the context.
    pub fn build(self, cx: C) -> Result<Engine<K, V, C>, BuildError> {
        if let Some(error) = self.pending {
            return Err(error.into());
        }
        let root = self.root.ok_or(BuildError::MissingRoot)?;

        let mut keys = IndexSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !keys.insert(entry.key) {
                return Err(ConfigurationError::DuplicateKey {
                    key: key_name(&entry.key),
                }
                .into());
            }
        }

        let mut nodes = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            let mut dependencies = SmallVec::<[ItemId; 4]>::new();
            for dependency in &entry.dependencies {
                if *dependency == entry.key {
                    return Err(ConfigurationError::SelfDependency {
                        item: key_name(&entry.key),
                    }
                    .into());
                }
                let dep_index = keys.get_index_of(dependency).ok_or_else(|| {
                    ConfigurationError::UnknownDependency {
                        item: key_name(&entry.key),
                        dependency: key_name(dependency),
                    }
                })?;
                dependencies.push(ItemId::new(dep_index));
            }
            nodes.push(Node::new(ItemId::new(index), entry.kind, dependencies));
        }

        let root_id = keys
            .get_index_of(&root.key)
            .map(ItemId::new)
            .ok_or(BuildError::MissingRoot)?;

        let topology = Topology::resolve(nodes, root_id).map_err(|cycle| {
            let path = cycle
                .path
                .iter()
                .filter_map(|id| keys.get_index(id.index()))
                .map(key_name)
                .collect();
            ConfigurationError::Cycle { path }
        })?;

        let mut values = Vec::with_capacity(self.entries.len());
        let mut effects = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            values.push(entry.value);
            effects.push(entry.effect);
        }

        tracing::debug!(
            engine = self.config.label(),
            items = topology.len(),
            producers = effects.iter().filter(|effect| effect.is_some()).count(),
            "registry built"
        );

        Ok(Engine::new(
            topology,
            Store::new(keys, values),
            effects,
            root.round_count,
            root.prepass,
            cx,
            self.config,
        ))
    }
}

impl<K: Key, V, C> std::fmt::Debug for Registry<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("keys", &self.entries.iter().map(|entry| entry.key).collect::<Vec<_>>())
            .field("root", &self.root.as_ref().map(|root| root.key))
            .field("config", &self.config)
            .finish()
    }
}
