use super::{fresh_label, merge_positions, SetVar};
use crate::logic::{keep, prune, Branches, Site};
use crate::state::State;
use crate::structure::Vertex;

/// Slot value marking a component that has been closed off entirely.
pub const SEALED: i32 = -1;

/// `connected X`: `X` induces a connected subgraph of `E`.
///
/// Slot values are local component labels: 0 for vertices outside `X`, a
/// positive label shared by chosen vertices known to be connected. When the
/// last vertex of the only open component is forgotten the component can no
/// longer grow, and the whole slice is set to [`SEALED`]; from then on no
/// vertex may join `X`.
#[derive(Clone, Debug)]
pub struct Connected {
    var: SetVar,
}

impl Connected {
    pub fn new(var: SetVar) -> Self {
        Self { var }
    }

    pub fn variable(&self) -> &SetVar {
        &self.var
    }

    pub(super) fn introduce(&self, site: Site<'_>, state: State, v: Vertex, index: usize) -> Branches {
        if state.slot(site.slot)[0] == SEALED {
            return keep(state);
        }

        let mut skip = state.clone();
        skip.slot_mut(site.slot)[index] = 0;

        let mut take = state;
        let label = fresh_label(take.slot(site.slot));
        take.slot_mut(site.slot)[index] = label;
        take.assignment.insert(self.var.symbol, v);

        let mut branches = Branches::new();
        branches.push(skip);
        branches.push(take);
        branches
    }

    pub(super) fn forget(&self, site: Site<'_>, mut state: State, index: usize) -> Branches {
        let labels = state.slot_mut(site.slot);
        if labels[0] == SEALED || labels[index] == 0 {
            return keep(state);
        }

        let label = labels[index];
        let same = labels.iter().filter(|&&l| l == label).count();
        let other = labels.iter().filter(|&&l| l > 0 && l != label).count();

        if same == 1 {
            if other > 0 {
                // the component is finished but others are still open
                return prune();
            }
            labels.fill(SEALED);
            return keep(state);
        }

        labels[index] = 0;
        keep(state)
    }

    pub(super) fn edge(&self, site: Site<'_>, mut state: State, (iv, iw): (usize, usize)) -> Branches {
        let labels = state.slot_mut(site.slot);
        if labels[0] == SEALED || labels[iv] == 0 || labels[iw] == 0 {
            return keep(state);
        }
        merge_positions(labels, iv, iw);
        keep(state)
    }

    pub(super) fn join(&self, site: Site<'_>, a: &State, b: &State, out: &mut State) -> bool {
        let left = a.slot(site.slot);
        let right = b.slot(site.slot);
        match (left[0] == SEALED, right[0] == SEALED) {
            (true, true) => return false,
            (true, false) => return true,
            (false, true) => {
                out.slot_mut(site.slot).copy_from_slice(right);
                return true;
            }
            (false, false) => {}
        }

        let result = out.slot_mut(site.slot);
        let len = result.len();
        for i in 0..len.saturating_sub(1) {
            for j in i + 1..len {
                if result[i] <= 0 || result[j] <= 0 || result[i] == result[j] {
                    continue;
                }
                if right[i] != right[j] {
                    continue;
                }
                merge_positions(result, i, j);
            }
        }
        true
    }
}
