//! Update Engine
//!
//! The engine is the runtime built from a [`Registry`](super::Registry). It
//! owns the resolved topology, the value store, every effect and the
//! injected context, and exposes a single operation: [`Engine::update`].
//!
//! # How an Update Works
//!
//! 1. The patch is resolved against the pre-update state (derived patches
//!    see the old values) and validated against the fixed key set.
//! 2. Every patched value is written to the store.
//! 3. The root's round count is evaluated on the merged state, then the
//!    root prepass (if any) runs. Both happen on every update, even an
//!    empty one.
//! 4. The affected producers are every item whose closure contains a
//!    patched key, taken in schedule order.
//! 5. For each round `0..N` every affected effect runs once, in order.
//!
//! An effect error aborts the remaining effects and rounds. Values written
//! in step 2 stay written.

use smallvec::SmallVec;

use crate::config::EngineConfig;
use crate::error::{key_name, UpdateError};
use crate::graph::{ItemId, Topology};

use super::effect::{BoxedEffect, PrepassFn, Round, RoundCountFn};
use super::patch::Patch;
use super::store::{State, Store};
use super::Key;

/// Summary of one completed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport<K> {
    /// Round count returned by the root.
    pub rounds: usize,

    /// Patched keys, in patch order.
    pub changed: Vec<K>,

    /// Items whose closure holds a changed key, in schedule order.
    ///
    /// Listed even when the round count is zero and nothing ran.
    pub affected: Vec<K>,

    /// Total effect invocations across all rounds.
    pub invocations: usize,
}

/// A built state graph, ready to receive patches.
pub struct Engine<K, V, C> {
    topology: Topology,
    store: Store<K, V>,
    /// effects[id.index()] is the item's effect, if it has one.
    effects: Vec<Option<BoxedEffect<K, V, C>>>,
    round_count: RoundCountFn<K, V>,
    prepass: Option<PrepassFn<K, V, C>>,
    context: C,
    config: EngineConfig,
    updates: u64,
}

impl<K: Key, V, C> Engine<K, V, C> {
    pub(crate) fn new(
        topology: Topology,
        store: Store<K, V>,
        effects: Vec<Option<BoxedEffect<K, V, C>>>,
        round_count: RoundCountFn<K, V>,
        prepass: Option<PrepassFn<K, V, C>>,
        context: C,
        config: EngineConfig,
    ) -> Self {
        Self {
            topology,
            store,
            effects,
            round_count,
            prepass,
            context,
            config,
            updates: 0,
        }
    }

    /// Apply a patch and replay every affected effect.
    ///
    /// Accepts anything convertible to a [`Patch`]: `()`, `None`, arrays or
    /// vectors of pairs, an `IndexMap`, or [`Patch::derive`].
    pub fn update<'p>(&mut self, patch: impl Into<Patch<'p, K, V>>) -> Result<UpdateReport<K>, UpdateError> {
        let span = tracing::debug_span!("update", engine = self.config.label(), seq = self.updates);
        let _guard = span.enter();
        self.updates += 1;

        let values = patch.into().resolve(&self.store.view());

        let mut targets = Vec::with_capacity(values.len());
        for key in values.keys() {
            let id = self
                .store
                .id_of(key)
                .ok_or_else(|| UpdateError::UnknownKey { key: key_name(key) })?;
            if id == self.topology.root() {
                return Err(UpdateError::RootNotPatchable { key: key_name(key) });
            }
            targets.push(id);
        }

        let mut changed = vec![false; self.store.len()];
        let mut changed_keys = Vec::with_capacity(targets.len());
        for (&id, (key, value)) in targets.iter().zip(values) {
            self.store.write(id, value);
            changed[id.index()] = true;
            changed_keys.push(key);
        }

        let state = self.store.view();
        let rounds = (self.round_count)(&state);
        if let Some(limit) = self.config.max_rounds {
            if rounds > limit {
                tracing::warn!(rounds, limit, "round count over limit");
                return Err(UpdateError::RoundLimit { rounds, limit });
            }
        }

        if let Some(prepass) = self.prepass.as_mut() {
            prepass(&state, &mut self.context).map_err(|source| {
                tracing::warn!(error = %source, "prepass failed");
                UpdateError::Prepass { source }
            })?;
        }

        let effects = &self.effects;
        let affected: SmallVec<[ItemId; 16]> = self
            .topology
            .affected(&changed)
            .filter(|id| effects[id.index()].is_some())
            .collect();

        tracing::debug!(
            changed = changed_keys.len(),
            affected = affected.len(),
            rounds,
            "dispatching"
        );

        let mut invocations = 0;
        for index in 0..rounds {
            let round = Round::new(index, rounds);
            for &id in &affected {
                let Some(effect) = self.effects[id.index()].as_mut() else {
                    continue;
                };
                let key = self.store.key(id);
                tracing::trace!(item = ?key, round = index, "effect");
                effect.run(&state, round, &mut self.context).map_err(|source| {
                    tracing::warn!(item = ?key, round = index, error = %source, "effect failed");
                    UpdateError::Effect {
                        key: key.map(key_name).unwrap_or_default(),
                        round: index,
                        source,
                    }
                })?;
                invocations += 1;
            }
        }

        Ok(UpdateReport {
            rounds,
            changed: changed_keys,
            affected: affected.iter().filter_map(|&id| self.store.key(id).copied()).collect(),
            invocations,
        })
    }

    /// Run an update with an empty patch.
    ///
    /// The round count and prepass still run; no effect does.
    pub fn refresh(&mut self) -> Result<UpdateReport<K>, UpdateError> {
        self.update(Patch::empty())
    }

    /// Consume the engine into a plain update closure.
    pub fn into_update_fn(mut self) -> impl FnMut(Patch<'_, K, V>) -> Result<UpdateReport<K>, UpdateError> {
        move |patch| self.update(patch)
    }

    /// Merged state as of the last update.
    pub fn state(&self) -> State<'_, K, V> {
        self.store.view()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.store.view().get(key)
    }

    /// The root key.
    pub fn root(&self) -> &K {
        self.key_of(self.topology.root())
    }

    /// Every key in execution order.
    pub fn schedule(&self) -> impl Iterator<Item = &K> + '_ {
        self.topology.schedule().iter().map(|id| self.key_of(id))
    }

    /// Resolved closure of `key`: itself first, then every transitive
    /// dependency in discovery order.
    pub fn closure(&self, key: &K) -> Option<Vec<&K>> {
        let node = self.topology.node(self.store.id_of(key)?)?;
        Some(node.closure().iter().map(|&id| self.key_of(id)).collect())
    }

    /// Direct dependencies of `key`, as declared.
    pub fn direct_dependencies(&self, key: &K) -> Option<Vec<&K>> {
        let node = self.topology.node(self.store.id_of(key)?)?;
        Some(node.dependencies().iter().map(|&id| self.key_of(id)).collect())
    }

    /// Resolved topology backing this engine.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared context lent to effects.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Mutable access to the context between updates.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Consume the engine and return its context.
    pub fn into_context(self) -> C {
        self.context
    }

    /// Number of updates started so far, failed ones included.
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// Number of registered items, root included.
    pub fn len(&self) -> usize {
        self.topology.len()
    }

    /// Whether the engine has no items.
    pub fn is_empty(&self) -> bool {
        self.topology.is_empty()
    }

    fn key_of(&self, id: ItemId) -> &K {
        // Ids come from the topology, which was built from the same key set.
        match self.store.key(id) {
            Some(key) => key,
            None => unreachable!("item id {id:?} outside the key set"),
        }
    }
}

impl<K: Key, V, C> std::fmt::Debug for Engine<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("root", self.root())
            .field("schedule", &self.schedule().collect::<Vec<_>>())
            .field("updates", &self.updates)
            .finish()
    }
}
