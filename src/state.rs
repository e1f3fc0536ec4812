//! Per-bag states and the deduplicating state collection.
//!
//! A [`State`] is one flat run of integers holding every logical object's
//! slice back to back, addressed through the [`Slot`] the engine assigned to
//! that object. Equality and hashing look only at this run, never at the
//! accumulated value or the assignment, so two partial solutions that agree
//! on every bag-local label are interchangeable for the rest of the program.

use crate::structure::Vertex;
use crate::symbol::Symbol;
use hashbrown::HashTable;
use roaring::RoaringBitmap;
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// Storage for all slices of a state.
pub type Slots = SmallVec<[i32; 16]>;

/// Position of one logical object's slice inside a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    pub offset: usize,
    pub len: usize,
}

impl Slot {
    pub fn range(self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Second-order variables and the universe elements committed to them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    sets: BTreeMap<Symbol, RoaringBitmap>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, var: Symbol, v: Vertex) {
        self.sets.entry(var).or_default().insert(v as u32);
    }

    pub fn contains(&self, var: Symbol, v: Vertex) -> bool {
        self.sets
            .get(&var)
            .is_some_and(|set| set.contains(v as u32))
    }

    pub fn get(&self, var: Symbol) -> Option<&RoaringBitmap> {
        self.sets.get(&var)
    }

    /// Elements of `var` in ascending order.
    pub fn members(&self, var: Symbol) -> Vec<Vertex> {
        self.sets
            .get(&var)
            .map(|set| set.iter().map(|v| v as Vertex).collect())
            .unwrap_or_default()
    }

    pub fn union_with(&mut self, other: &Assignment) {
        for (&var, set) in &other.sets {
            *self.sets.entry(var).or_default() |= set;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &RoaringBitmap)> + '_ {
        self.sets.iter().map(|(&var, set)| (var, set))
    }
}

/// One partial solution for the current bag.
#[derive(Clone, Debug)]
pub struct State {
    slots: Slots,
    /// Accumulated objective value.
    pub value: i64,
    pub assignment: Assignment,
}

impl State {
    /// All-zero state of the given total slice length.
    pub fn zeroed(len: usize) -> Self {
        Self {
            slots: SmallVec::from_elem(0, len),
            value: 0,
            assignment: Assignment::new(),
        }
    }

    pub fn slots(&self) -> &[i32] {
        &self.slots
    }

    pub fn slot(&self, slot: Slot) -> &[i32] {
        &self.slots[slot.range()]
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut [i32] {
        &mut self.slots[slot.range()]
    }

    /// Hash over the slot contents, consistent with `==`.
    pub fn exact_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.slots.hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slots.hash(state);
    }
}

/// Decides which of two exactly-equal states a [`StateSet`] keeps.
///
/// Returns `true` when `incoming` should replace `existing`.
pub type Reducer = fn(existing: &State, incoming: &State) -> bool;

/// Keep the state with the smaller value; ties keep the earlier one.
pub fn keep_min_value(existing: &State, incoming: &State) -> bool {
    incoming.value < existing.value
}

/// Always keep the state inserted first.
pub fn keep_first(_existing: &State, _incoming: &State) -> bool {
    false
}

/// What an insertion did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inserted {
    New,
    Replaced,
    Absorbed,
}

/// Insertion-ordered set of states, deduplicated by exact equality.
#[derive(Clone, Debug, Default)]
pub struct StateSet {
    states: Vec<State>,
    hashes: Vec<u64>,
    index: HashTable<usize>,
}

impl StateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            states: Vec::with_capacity(capacity),
            hashes: Vec::with_capacity(capacity),
            index: HashTable::with_capacity(capacity),
        }
    }

    pub fn singleton(state: State) -> Self {
        let mut set = Self::with_capacity(1);
        set.insert(state, keep_first);
        set
    }

    /// Insert `state`, resolving a collision with an equal state via `reducer`.
    ///
    /// A replacement keeps the original insertion position.
    pub fn insert(&mut self, state: State, reducer: Reducer) -> Inserted {
        let hash = state.exact_hash();
        let states = &self.states;
        if let Some(&pos) = self.index.find(hash, |&i| states[i] == state) {
            if reducer(&self.states[pos], &state) {
                self.states[pos] = state;
                return Inserted::Replaced;
            }
            return Inserted::Absorbed;
        }
        let pos = self.states.len();
        self.states.push(state);
        self.hashes.push(hash);
        let hashes = &self.hashes;
        self.index.insert_unique(hash, pos, |&i| hashes[i]);
        Inserted::New
    }

    pub fn contains(&self, state: &State) -> bool {
        let hash = state.exact_hash();
        self.index
            .find(hash, |&i| self.states[i] == *state)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<&State> {
        self.states.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, State> {
        self.states.iter()
    }

    /// Keep only states satisfying `keep`, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&State) -> bool) {
        let old_states = std::mem::take(&mut self.states);
        let old_hashes = std::mem::take(&mut self.hashes);
        self.index.clear();
        for (state, hash) in old_states.into_iter().zip(old_hashes) {
            if keep(&state) {
                let pos = self.states.len();
                self.states.push(state);
                self.hashes.push(hash);
                let hashes = &self.hashes;
                self.index.insert_unique(hash, pos, |&i| hashes[i]);
            }
        }
    }
}

impl IntoIterator for StateSet {
    type Item = State;
    type IntoIter = std::vec::IntoIter<State>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.into_iter()
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = &'a State;
    type IntoIter = std::slice::Iter<'a, State>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

#[cfg(test)]
#[path = "tests/state.rs"]
mod tests;
