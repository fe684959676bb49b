//! Effects
//!
//! An effect is the side-effecting half of an item: uploading a buffer,
//! binding a uniform, writing to a log. It runs when an update changes any
//! key in the item's closure, once per round.
//!
//! # Return values
//!
//! An effect returns [`EffectResult`]. `Ok(())` means nothing to the engine;
//! every collected effect runs in every round. An `Err` stops the update on
//! the spot and is reported as [`UpdateError::Effect`](crate::UpdateError).
//!
//! # Context
//!
//! Effects never capture the external resource they drive. The engine owns
//! it (the `C` parameter) and lends it as `&mut C` on every call.

use crate::error::EffectResult;

use super::store::State;

/// Position of the current pass within one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Round {
    index: usize,
    total: usize,
}

impl Round {
    pub(crate) fn new(index: usize, total: usize) -> Self {
        debug_assert!(index < total, "round index out of range");
        Self { index, total }
    }

    /// Zero-based round index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of rounds in this update.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

/// A change-gated side effect attached to an item.
///
/// Implemented for every `FnMut(&State, Round, &mut C) -> EffectResult`.
pub trait Effect<K, V, C> {
    fn run(&mut self, state: &State<'_, K, V>, round: Round, cx: &mut C) -> EffectResult;
}

impl<K, V, C, F> Effect<K, V, C> for F
where
    F: FnMut(&State<'_, K, V>, Round, &mut C) -> EffectResult,
{
    fn run(&mut self, state: &State<'_, K, V>, round: Round, cx: &mut C) -> EffectResult {
        self(state, round, cx)
    }
}

pub(crate) type BoxedEffect<K, V, C> = Box<dyn Effect<K, V, C>>;

/// Computes how many rounds an update performs.
pub(crate) type RoundCountFn<K, V> = Box<dyn Fn(&State<'_, K, V>) -> usize>;

/// Unconditional root hook, run once per update before any round.
pub(crate) type PrepassFn<K, V, C> = Box<dyn FnMut(&State<'_, K, V>, &mut C) -> EffectResult>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::Store;
    use indexmap::IndexSet;

    struct Counter {
        seen: usize,
    }

    impl Effect<&'static str, i32, Vec<usize>> for Counter {
        fn run(&mut self, _state: &State<'_, &'static str, i32>, round: Round, cx: &mut Vec<usize>) -> EffectResult {
            self.seen += 1;
            cx.push(round.index());
            Ok(())
        }
    }

    #[test]
    fn round_reports_position() {
        let first = Round::new(0, 3);
        let last = Round::new(2, 3);

        assert!(first.is_first());
        assert!(!first.is_last());
        assert!(last.is_last());
        assert_eq!(last.index(), 2);
        assert_eq!(last.total(), 3);
    }

    #[test]
    fn closures_and_structs_are_effects() {
        let keys: IndexSet<_> = ["a"].into_iter().collect();
        let store: Store<&'static str, i32> = Store::new(keys, vec![Some(1)]);
        let mut log = Vec::new();

        let mut closure = |state: &State<'_, &'static str, i32>, round: Round, cx: &mut Vec<usize>| -> EffectResult {
            cx.push(round.index() * 10 + *state.get(&"a").unwrap_or(&0) as usize);
            Ok(())
        };
        let mut counter = Counter { seen: 0 };

        let effects: [&mut dyn Effect<&'static str, i32, Vec<usize>>; 2] = [&mut closure, &mut counter];
        for effect in effects {
            effect.run(&store.view(), Round::new(1, 2), &mut log).unwrap();
        }

        assert_eq!(log, vec![11, 1]);
        assert_eq!(counter.seen, 1);
    }
}
