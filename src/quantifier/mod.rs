//! Second-order set quantifiers.
//!
//! Each quantifier guesses, vertex by vertex, which universe elements go
//! into its set variable(s), keeping only as much per-bag bookkeeping as its
//! constraint needs:
//!
//! - [`Partition`]: every vertex lands in exactly one of `k` classes.
//! - [`Optimization`]: an arbitrary subset, minimising the summed weights.
//! - [`Connected`]: a subset inducing one connected subgraph of `E`.
//! - [`Forest`]: a subset inducing an acyclic subgraph of `E`.

mod connected;
mod forest;
mod optimization;
mod partition;

pub use connected::{Connected, SEALED};
pub use forest::Forest;
pub use optimization::Optimization;
pub use partition::Partition;

use crate::logic::{BagEntry, Branches, Needs, Site};
use crate::state::State;
use crate::structure::Vertex;
use crate::symbol::Symbol;
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::Hasher;

/// A named second-order variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetVar {
    pub symbol: Symbol,
    pub name: String,
}

#[derive(Clone, Debug)]
pub enum Quantifier {
    Partition(Partition),
    Optimization(Optimization),
    Connected(Connected),
    Forest(Forest),
}

impl Quantifier {
    pub fn state_size(&self, width: usize) -> usize {
        width + 1
    }

    pub fn needs(&self) -> Needs {
        match self {
            Quantifier::Partition(_) | Quantifier::Optimization(_) => Needs {
                introduce: true,
                forget: true,
                edge: false,
                weak_join: false,
            },
            Quantifier::Connected(_) | Quantifier::Forest(_) => Needs {
                introduce: true,
                forget: true,
                edge: true,
                weak_join: true,
            },
        }
    }

    /// Variables this quantifier binds, in declaration order.
    pub fn variables(&self) -> &[SetVar] {
        match self {
            Quantifier::Partition(p) => p.classes(),
            Quantifier::Optimization(o) => std::slice::from_ref(o.variable()),
            Quantifier::Connected(c) => std::slice::from_ref(c.variable()),
            Quantifier::Forest(f) => std::slice::from_ref(f.variable()),
        }
    }

    pub(crate) fn introduce(&self, site: Site<'_>, state: State, v: Vertex, index: usize) -> Branches {
        match self {
            Quantifier::Partition(p) => p.introduce(site, state, v, index),
            Quantifier::Optimization(o) => o.introduce(site, state, v, index),
            Quantifier::Connected(c) => c.introduce(site, state, v, index),
            Quantifier::Forest(f) => f.introduce(site, state, v, index),
        }
    }

    pub(crate) fn forget(&self, site: Site<'_>, mut state: State, _v: Vertex, index: usize) -> Branches {
        match self {
            Quantifier::Connected(c) => c.forget(site, state, index),
            Quantifier::Partition(_) | Quantifier::Optimization(_) | Quantifier::Forest(_) => {
                state.slot_mut(site.slot)[index] = 0;
                crate::logic::keep(state)
            }
        }
    }

    pub(crate) fn edge(
        &self,
        site: Site<'_>,
        state: State,
        _vertices: (Vertex, Vertex),
        indices: (usize, usize),
    ) -> Branches {
        match self {
            Quantifier::Connected(c) => c.edge(site, state, indices),
            Quantifier::Forest(f) => f.edge(site, state, indices),
            Quantifier::Partition(_) | Quantifier::Optimization(_) => crate::logic::keep(state),
        }
    }

    pub(crate) fn join(
        &self,
        site: Site<'_>,
        a: &State,
        b: &State,
        out: &mut State,
        bag: &[BagEntry],
    ) -> bool {
        match self {
            // classes are fixed per branch and exact equality already matched them
            Quantifier::Partition(_) => true,
            Quantifier::Optimization(o) => o.join(site, out, bag),
            Quantifier::Connected(c) => c.join(site, a, b, out),
            Quantifier::Forest(f) => f.join(site, a, b, out),
        }
    }

    pub(crate) fn weak_hash(&self, slice: &[i32]) -> u64 {
        chosen_mask_hash(slice)
    }

    pub(crate) fn weak_eq(&self, a: &[i32], b: &[i32]) -> bool {
        chosen_mask_eq(a, b)
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantifier::Partition(p) => {
                write!(f, "exists")?;
                for class in p.classes() {
                    write!(f, " {}", class.name)?;
                }
                Ok(())
            }
            Quantifier::Optimization(o) => write!(f, "min {}", o.variable().name),
            Quantifier::Connected(c) => write!(f, "connected {}", c.variable().name),
            Quantifier::Forest(fo) => write!(f, "forest {}", fo.variable().name),
        }
    }
}

/// Smallest label larger than every label in use.
fn fresh_label(labels: &[i32]) -> i32 {
    labels.iter().copied().max().unwrap_or(0).max(0) + 1
}

/// Rename label `from` to `to` throughout.
fn relabel(labels: &mut [i32], from: i32, to: i32) {
    for label in labels.iter_mut() {
        if *label == from {
            *label = to;
        }
    }
}

/// Merge the components of positions `i` and `j` into the smaller label.
fn merge_positions(labels: &mut [i32], i: usize, j: usize) {
    let (li, lj) = (labels[i], labels[j]);
    if li == lj {
        return;
    }
    relabel(labels, li.max(lj), li.min(lj));
}

/// Hash of which positions hold a chosen vertex.
fn chosen_mask_hash(labels: &[i32]) -> u64 {
    let mut hasher = FxHasher::default();
    for &label in labels {
        hasher.write_u8((label > 0) as u8);
    }
    hasher.finish()
}

fn chosen_mask_eq(a: &[i32], b: &[i32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x > 0) == (y > 0))
}

#[cfg(test)]
#[path = "../tests/quantifier.rs"]
mod tests;
