//! State engine: the live states of one bag and the four structural
//! operations on them.
//!
//! [`Engine`] fixes the slot layout for a decomposition width and owns the
//! metrics; [`StateVector`] is the deduplicated state collection of a single
//! bag. The decomposition walk calls:
//!
//! 1. [`StateVector::introduce`] / [`StateVector::forget`] /
//!    [`StateVector::edge`] within a bag,
//! 2. [`StateVector::join`] to merge two children at a branch bag,
//! 3. [`StateVector::satisfying_state`] once at the root.
//!
//! Each operation runs the logical objects in order, quantifiers first, and
//! every object sees the complete output of the previous one.

use crate::logic::{BagEntry, Branches, LogicalObject, Needs, Site};
use crate::metrics::DpMetrics;
use crate::problem::Problem;
use crate::state::{keep_min_value, Inserted, Slot, State, StateSet};
use crate::structure::Vertex;
use crate::trace::{debug, debug_span, trace};
use hashbrown::HashMap;
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::hash::Hasher;

/// Slot layout and shared context for one evaluation.
pub struct Engine<'p> {
    problem: &'p Problem,
    width: usize,
    slots: Vec<Slot>,
    state_len: usize,
    metrics: DpMetrics,
}

impl<'p> Engine<'p> {
    /// Lay out one slice per logical object for a decomposition of `width`.
    pub fn new(problem: &'p Problem, width: usize) -> Self {
        let mut slots = Vec::with_capacity(problem.objects().len());
        let mut offset = 0;
        for object in problem.objects() {
            let len = object.state_size(width);
            slots.push(Slot { offset, len });
            offset += len;
        }
        debug!(width, objects = slots.len(), state_len = offset, "engine_layout");
        Self {
            problem,
            width,
            slots,
            state_len: offset,
            metrics: DpMetrics::new(),
        }
    }

    pub fn problem(&self) -> &'p Problem {
        self.problem
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Slot of the object at position `i` of [`Problem::objects`].
    pub fn slot(&self, i: usize) -> Slot {
        self.slots[i]
    }

    pub fn state_len(&self) -> usize {
        self.state_len
    }

    pub fn metrics(&self) -> &DpMetrics {
        &self.metrics
    }

    /// State vector of a leaf: the single all-zero state.
    pub fn leaf(&self) -> StateVector<'_> {
        StateVector {
            engine: self,
            states: StateSet::singleton(State::zeroed(self.state_len)),
        }
    }

    /// Hash that agrees on weakly equal states.
    pub fn weak_hash(&self, state: &State) -> u64 {
        let mut hasher = FxHasher::default();
        for (object, &slot) in self.objects() {
            hasher.write_u64(object.weak_hash(state.slot(slot)));
        }
        hasher.finish()
    }

    /// Whether two states may be joined.
    pub fn weak_eq(&self, a: &State, b: &State) -> bool {
        self.objects()
            .all(|(object, &slot)| object.weak_eq(a.slot(slot), b.slot(slot)))
    }

    /// Whether a root state passes every object's final check.
    pub fn is_final(&self, state: &State) -> bool {
        self.objects()
            .all(|(object, &slot)| object.final_check(state.slot(slot)))
    }

    fn objects(&self) -> impl Iterator<Item = (&LogicalObject, &Slot)> + '_ {
        self.problem.objects().iter().zip(&self.slots)
    }

    fn site(&self, slot: Slot) -> Site<'p> {
        Site {
            structure: self.problem.structure(),
            slot,
        }
    }
}

/// The live states of one bag.
pub struct StateVector<'e> {
    engine: &'e Engine<'e>,
    states: StateSet,
}

impl<'e> StateVector<'e> {
    pub fn engine(&self) -> &'e Engine<'e> {
        self.engine
    }

    pub fn states(&self) -> &StateSet {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn introduce(&mut self, v: Vertex, index: usize) {
        self.engine.metrics.record_introduce();
        self.apply(
            |needs| needs.introduce,
            |object, site, state| object.introduce(site, state, v, index),
        );
        trace!(vertex = v, index, live = self.len(), "introduce");
    }

    pub fn forget(&mut self, v: Vertex, index: usize) {
        self.engine.metrics.record_forget();
        self.apply(
            |needs| needs.forget,
            |object, site, state| object.forget(site, state, v, index),
        );
        trace!(vertex = v, index, live = self.len(), "forget");
    }

    pub fn edge(&mut self, v: Vertex, w: Vertex, index_v: usize, index_w: usize) {
        self.engine.metrics.record_edge();
        self.apply(
            |needs| needs.edge,
            |object, site, state| object.edge(site, state, (v, w), (index_v, index_w)),
        );
        trace!(v, w, live = self.len(), "edge");
    }

    /// Merge with the states of a sibling branch over the shared `bag`.
    ///
    /// Partners are looked up by weak hash and confirmed with weak equality.
    /// Every object's join runs on a copy of this side's state, in order; the
    /// first refusal discards the pair.
    pub fn join(&mut self, other: StateVector<'_>, bag: &[BagEntry]) {
        debug_assert!(std::ptr::eq(
            self.engine as *const Engine<'_> as *const u8,
            other.engine as *const Engine<'_> as *const u8
        ));
        let engine = self.engine;
        let _span = debug_span!("join", left = self.len(), right = other.len()).entered();
        engine.metrics.record_join();

        let partners: Vec<State> = other.states.into_iter().collect();
        let mut buckets: HashMap<u64, SmallVec<[usize; 4]>> = HashMap::with_capacity(partners.len());
        for (i, partner) in partners.iter().enumerate() {
            buckets.entry(engine.weak_hash(partner)).or_default().push(i);
        }

        let current = std::mem::take(&mut self.states);
        let mut next = StateSet::with_capacity(current.len());
        let mut accepted = 0usize;
        for state in &current {
            let Some(bucket) = buckets.get(&engine.weak_hash(state)) else {
                continue;
            };
            for &j in bucket {
                let partner = &partners[j];
                if !engine.weak_eq(state, partner) {
                    continue;
                }
                let mut merged = state.clone();
                merged.value = state.value + partner.value;
                let ok = engine.objects().all(|(object, &slot)| {
                    object.join(engine.site(slot), state, partner, &mut merged, bag)
                });
                engine.metrics.record_join_pair(ok);
                if !ok {
                    continue;
                }
                accepted += 1;
                merged.assignment.union_with(&partner.assignment);
                if next.insert(merged, keep_min_value) != Inserted::New {
                    engine.metrics.record_collapse();
                }
            }
        }
        self.states = next;
        engine.metrics.observe_live(self.len());
        debug!(accepted, live = self.len(), "join_done");
    }

    /// Drop every state failing a final check and return the first survivor.
    pub fn satisfying_state(&mut self) -> Option<&State> {
        let engine = self.engine;
        let before = self.len();
        self.states.retain(|state| engine.is_final(state));
        debug!(before, after = self.len(), "final_check");
        self.states.first()
    }

    pub fn into_states(self) -> StateSet {
        self.states
    }

    fn apply(
        &mut self,
        wants: impl Fn(Needs) -> bool,
        step: impl Fn(&LogicalObject, Site<'_>, State) -> Branches,
    ) {
        let engine = self.engine;
        for (object, &slot) in engine.objects() {
            if !wants(object.needs()) {
                continue;
            }
            let site = engine.site(slot);
            let current = std::mem::take(&mut self.states);
            let mut next = StateSet::with_capacity(current.len());
            for state in current {
                let branches = step(object, site, state);
                engine.metrics.record_successors(branches.len());
                for successor in branches {
                    if next.insert(successor, keep_min_value) != Inserted::New {
                        engine.metrics.record_collapse();
                    }
                }
            }
            self.states = next;
        }
        engine.metrics.observe_live(self.len());
    }
}

#[cfg(test)]
#[path = "tests/engine.rs"]
mod tests;
