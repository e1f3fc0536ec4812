//! The closed set of logical objects the state engine evaluates.
//!
//! Every quantifier and every formula owns one slice of each state and reacts
//! to the four structural events of the decomposition walk. The engine only
//! talks to [`LogicalObject`]; the variants dispatch statically.

use crate::formula::Formula;
use crate::quantifier::Quantifier;
use crate::state::{Slot, State};
use crate::structure::{Structure, Vertex};
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Successor states of one callback: empty prunes, several branch.
pub type Branches = SmallVec<[State; 2]>;

/// Which callbacks an object takes part in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Needs {
    pub introduce: bool,
    pub forget: bool,
    pub edge: bool,
    /// Join partners are matched by the object's weak predicate instead of
    /// exact slice equality.
    pub weak_join: bool,
}

/// A vertex of the join bag together with its tree index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BagEntry {
    pub vertex: Vertex,
    pub index: usize,
}

/// What a callback may look at besides the state itself.
#[derive(Clone, Copy, Debug)]
pub struct Site<'a> {
    pub structure: &'a Structure,
    pub slot: Slot,
}

#[derive(Clone, Debug)]
pub enum LogicalObject {
    Quantifier(Quantifier),
    Formula(Formula),
}

impl LogicalObject {
    /// Slice length for a decomposition of width `width`.
    pub fn state_size(&self, width: usize) -> usize {
        match self {
            LogicalObject::Quantifier(q) => q.state_size(width),
            LogicalObject::Formula(f) => f.state_size(width),
        }
    }

    pub fn needs(&self) -> Needs {
        match self {
            LogicalObject::Quantifier(q) => q.needs(),
            LogicalObject::Formula(f) => f.needs(),
        }
    }

    pub fn introduce(&self, site: Site<'_>, state: State, v: Vertex, index: usize) -> Branches {
        match self {
            LogicalObject::Quantifier(q) => q.introduce(site, state, v, index),
            LogicalObject::Formula(f) => f.introduce(site, state, v, index),
        }
    }

    pub fn forget(&self, site: Site<'_>, state: State, v: Vertex, index: usize) -> Branches {
        match self {
            LogicalObject::Quantifier(q) => q.forget(site, state, v, index),
            LogicalObject::Formula(f) => f.forget(site, state, v, index),
        }
    }

    pub fn edge(
        &self,
        site: Site<'_>,
        state: State,
        (v, w): (Vertex, Vertex),
        (index_v, index_w): (usize, usize),
    ) -> Branches {
        match self {
            LogicalObject::Quantifier(q) => q.edge(site, state, (v, w), (index_v, index_w)),
            LogicalObject::Formula(f) => f.edge(site, state, (v, w), (index_v, index_w)),
        }
    }

    /// Combine `a` and `b` into `out`, which starts as a copy of `a`.
    ///
    /// Returns `false` if the pair cannot be combined.
    pub fn join(
        &self,
        site: Site<'_>,
        a: &State,
        b: &State,
        out: &mut State,
        bag: &[BagEntry],
    ) -> bool {
        debug_assert_eq!(a.slot(site.slot).len(), b.slot(site.slot).len());
        match self {
            LogicalObject::Quantifier(q) => q.join(site, a, b, out, bag),
            LogicalObject::Formula(f) => f.join(site, a, b, out),
        }
    }

    /// Hash used to bucket join partners.
    ///
    /// Objects without weak join hash their slice exactly, so exactly equal
    /// slices always land in the same bucket.
    pub fn weak_hash(&self, slice: &[i32]) -> u64 {
        if !self.needs().weak_join {
            return exact_slice_hash(slice);
        }
        match self {
            LogicalObject::Quantifier(q) => q.weak_hash(slice),
            LogicalObject::Formula(_) => 0,
        }
    }

    pub fn weak_eq(&self, a: &[i32], b: &[i32]) -> bool {
        if !self.needs().weak_join {
            return a == b;
        }
        match self {
            LogicalObject::Quantifier(q) => q.weak_eq(a, b),
            LogicalObject::Formula(_) => true,
        }
    }

    /// Validity of a root state.
    pub fn final_check(&self, slice: &[i32]) -> bool {
        match self {
            LogicalObject::Quantifier(_) => true,
            LogicalObject::Formula(f) => f.final_check(slice),
        }
    }

    pub fn is_quantifier(&self) -> bool {
        matches!(self, LogicalObject::Quantifier(_))
    }
}

impl fmt::Display for LogicalObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalObject::Quantifier(q) => write!(f, "{}", q),
            LogicalObject::Formula(formula) => write!(f, "{}", formula),
        }
    }
}

pub(crate) fn exact_slice_hash(slice: &[i32]) -> u64 {
    let mut hasher = FxHasher::default();
    slice.hash(&mut hasher);
    hasher.finish()
}

/// A single successor.
pub(crate) fn keep(state: State) -> Branches {
    let mut branches = Branches::new();
    branches.push(state);
    branches
}

pub(crate) fn prune() -> Branches {
    Branches::new()
}

#[cfg(test)]
#[path = "tests/logic.rs"]
mod tests;
