//! First-order parts of the formula.
//!
//! A [`Formula`] is a CNF matrix over `x` and `y` under one of six fixed
//! quantifier prefixes. The edge-guarded shapes read the matrix under an
//! edge: `∀x∀y E(x,y) → ψ`, `∀x∃y E(x,y) ∧ ψ` and `∃x∀y E(x,y) → ψ`.
//!
//! | shape  | slice   | bookkeeping                                       |
//! |--------|---------|---------------------------------------------------|
//! | `axay` | 0       | every edge checked in both orientations           |
//! | `axey` | `w + 1` | per-vertex "witness seen" bit, required on forget |
//! | `exey` | 1       | "found" bit                                       |
//! | `exay` | `w + 2` | per-vertex "still a candidate" bit + "found" bit  |
//! | `ax`   | 0       | every vertex checked on introduce                 |
//! | `ex`   | 1       | "found" bit                                       |

mod clause;

pub use clause::{Atom, Clause, ClauseError, Literal, Operand};

use crate::logic::{keep, prune, Branches, Needs, Site};
use crate::state::{Assignment, State};
use crate::structure::{Structure, Vertex};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    ForallForall,
    ForallExists,
    ExistsExists,
    ExistsForall,
    Forall,
    Exists,
}

impl Shape {
    pub const ALL: [Shape; 6] = [
        Shape::ForallForall,
        Shape::ForallExists,
        Shape::ExistsExists,
        Shape::ExistsForall,
        Shape::Forall,
        Shape::Exists,
    ];

    /// Directive keyword of the input format.
    pub fn keyword(self) -> &'static str {
        match self {
            Shape::ForallForall => "axay",
            Shape::ForallExists => "axey",
            Shape::ExistsExists => "exey",
            Shape::ExistsForall => "exay",
            Shape::Forall => "ax",
            Shape::Exists => "ex",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Shape> {
        Shape::ALL.into_iter().find(|shape| shape.keyword() == keyword)
    }
}

#[derive(Clone, Debug)]
pub struct Formula {
    shape: Shape,
    clauses: Vec<Clause>,
}

impl Formula {
    pub fn new(shape: Shape, clauses: Vec<Clause>) -> Self {
        Self { shape, clauses }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// The matrix with `x` and `y` bound; single-variable shapes pass the
    /// same element twice.
    pub fn is_satisfied(&self, structure: &Structure, x: Vertex, y: Vertex, assignment: &Assignment) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.holds(structure, x, y, assignment))
    }

    pub fn state_size(&self, width: usize) -> usize {
        match self.shape {
            Shape::ForallForall | Shape::Forall => 0,
            Shape::ExistsExists | Shape::Exists => 1,
            Shape::ForallExists => width + 1,
            Shape::ExistsForall => width + 2,
        }
    }

    pub fn needs(&self) -> Needs {
        let (introduce, forget, edge, weak_join) = match self.shape {
            Shape::ForallForall => (false, false, true, false),
            Shape::ForallExists => (false, true, true, true),
            Shape::ExistsExists => (true, false, false, true),
            Shape::ExistsForall => (true, true, true, true),
            Shape::Forall => (true, false, false, false),
            Shape::Exists => (true, false, false, true),
        };
        Needs {
            introduce,
            forget,
            edge,
            weak_join,
        }
    }

    pub(crate) fn introduce(&self, site: Site<'_>, mut state: State, v: Vertex, index: usize) -> Branches {
        match self.shape {
            Shape::Forall => {
                if !self.is_satisfied(site.structure, v, v, &state.assignment) {
                    return prune();
                }
            }
            Shape::Exists | Shape::ExistsExists => {
                if self.is_satisfied(site.structure, v, v, &state.assignment) {
                    state.slot_mut(site.slot)[0] = 1;
                }
            }
            Shape::ExistsForall => state.slot_mut(site.slot)[index] = 1,
            Shape::ForallForall | Shape::ForallExists => {}
        }
        keep(state)
    }

    pub(crate) fn forget(&self, site: Site<'_>, mut state: State, _v: Vertex, index: usize) -> Branches {
        let bits = state.slot_mut(site.slot);
        match self.shape {
            Shape::ForallExists => {
                if bits[index] == 0 {
                    // no neighbour ever witnessed this vertex
                    return prune();
                }
                bits[index] = 0;
            }
            Shape::ExistsForall => {
                let found = bits.len() - 1;
                if bits[index] == 1 {
                    bits[found] = 1;
                }
                bits[index] = 0;
            }
            _ => {}
        }
        keep(state)
    }

    pub(crate) fn edge(
        &self,
        site: Site<'_>,
        mut state: State,
        (v, w): (Vertex, Vertex),
        (iv, iw): (usize, usize),
    ) -> Branches {
        let structure = site.structure;
        match self.shape {
            Shape::ForallForall => {
                let forward = self.is_satisfied(structure, v, w, &state.assignment);
                if !forward || !self.is_satisfied(structure, w, v, &state.assignment) {
                    return prune();
                }
            }
            Shape::ForallExists => {
                let from_v = self.is_satisfied(structure, v, w, &state.assignment);
                let from_w = self.is_satisfied(structure, w, v, &state.assignment);
                let bits = state.slot_mut(site.slot);
                if from_v {
                    bits[iv] = 1;
                }
                if from_w {
                    bits[iw] = 1;
                }
            }
            Shape::ExistsForall => {
                let from_v = self.is_satisfied(structure, v, w, &state.assignment);
                let from_w = self.is_satisfied(structure, w, v, &state.assignment);
                let bits = state.slot_mut(site.slot);
                if !from_v {
                    bits[iv] = 0;
                }
                if !from_w {
                    bits[iw] = 0;
                }
            }
            Shape::ExistsExists | Shape::Forall | Shape::Exists => {}
        }
        keep(state)
    }

    pub(crate) fn join(&self, site: Site<'_>, a: &State, b: &State, out: &mut State) -> bool {
        let left = a.slot(site.slot);
        let right = b.slot(site.slot);
        let bits = out.slot_mut(site.slot);
        match self.shape {
            Shape::ForallExists | Shape::ExistsExists | Shape::Exists => {
                for (i, bit) in bits.iter_mut().enumerate() {
                    *bit = (left[i] | right[i]).min(1);
                }
            }
            Shape::ExistsForall => {
                let found = bits.len() - 1;
                for i in 0..found {
                    bits[i] = left[i] & right[i];
                }
                bits[found] = (left[found] | right[found]).min(1);
            }
            Shape::ForallForall | Shape::Forall => {}
        }
        true
    }

    pub fn final_check(&self, slice: &[i32]) -> bool {
        match self.shape {
            Shape::ExistsExists | Shape::Exists => slice[0] == 1,
            Shape::ExistsForall => slice.last() == Some(&1),
            Shape::ForallForall | Shape::ForallExists | Shape::Forall => true,
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.shape.keyword())?;
        for clause in &self.clauses {
            write!(f, " [{}]", clause)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/formula.rs"]
mod tests;
