use super::SetVar;
use crate::logic::{BagEntry, Branches, Site};
use crate::state::State;
use crate::structure::Vertex;

/// `min X w0 .. w(n-1)`: choose `X` minimising the sum of its weights.
///
/// The slot of a bag vertex is 1 when it is in `X`. The weight is added to
/// the state value when the vertex is introduced, so a vertex of a join bag
/// has been paid for on both sides.
#[derive(Clone, Debug)]
pub struct Optimization {
    var: SetVar,
    weights: Vec<i64>,
}

impl Optimization {
    /// `weights[v]` is the cost of putting universe element `v` into the set.
    pub fn new(var: SetVar, weights: Vec<i64>) -> Self {
        Self { var, weights }
    }

    pub fn variable(&self) -> &SetVar {
        &self.var
    }

    pub fn weights(&self) -> &[i64] {
        &self.weights
    }

    pub(super) fn introduce(&self, site: Site<'_>, state: State, v: Vertex, index: usize) -> Branches {
        let mut excluded = state.clone();
        excluded.slot_mut(site.slot)[index] = 0;

        let mut included = state;
        included.slot_mut(site.slot)[index] = 1;
        included.value += self.weights[v];
        included.assignment.insert(self.var.symbol, v);

        let mut branches = Branches::new();
        branches.push(excluded);
        branches.push(included);
        branches
    }

    /// `out.value` already holds the sum of both sides; take back the
    /// weights of chosen bag vertices counted twice.
    pub(super) fn join(&self, site: Site<'_>, out: &mut State, bag: &[BagEntry]) -> bool {
        let doubled: i64 = bag
            .iter()
            .filter(|entry| out.slot(site.slot)[entry.index] != 0)
            .map(|entry| self.weights[entry.vertex])
            .sum();
        out.value -= doubled;
        true
    }
}
