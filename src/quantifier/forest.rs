use super::{fresh_label, merge_positions, SetVar};
use crate::logic::{keep, prune, Branches, Site};
use crate::state::State;
use crate::structure::Vertex;
use crate::union_find::UnionFind;
use smallvec::SmallVec;

/// `forest X`: `X` induces an acyclic subgraph of `E`.
///
/// Slot values are local component labels as for [`super::Connected`], but
/// components never close; an edge inside one component is a cycle.
#[derive(Clone, Debug)]
pub struct Forest {
    var: SetVar,
}

impl Forest {
    pub fn new(var: SetVar) -> Self {
        Self { var }
    }

    pub fn variable(&self) -> &SetVar {
        &self.var
    }

    pub(super) fn introduce(&self, site: Site<'_>, state: State, v: Vertex, index: usize) -> Branches {
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

    pub(super) fn edge(&self, site: Site<'_>, mut state: State, (iv, iw): (usize, usize)) -> Branches {
        let labels = state.slot_mut(site.slot);
        if labels[iv] == 0 || labels[iw] == 0 {
            return keep(state);
        }
        if labels[iv] == labels[iw] {
            return prune();
        }
        merge_positions(labels, iv, iw);
        keep(state)
    }

    /// Replay a spanning forest of each side into one union-find; any
    /// redundant edge closes a cycle across the join.
    pub(super) fn join(&self, site: Site<'_>, a: &State, b: &State, out: &mut State) -> bool {
        let left = a.slot(site.slot);
        let right = b.slot(site.slot);
        let len = left.len();

        let mut forest_edges: SmallVec<[(usize, usize); 16]> = SmallVec::new();
        spanning_forest(left, &mut forest_edges);
        spanning_forest(right, &mut forest_edges);

        let mut joined = UnionFind::new(len);
        for &(u, w) in &forest_edges {
            if !joined.union(u, w) {
                return false;
            }
        }

        // compact labels in position order; unchosen positions stay 0
        let mut label_of_root: SmallVec<[i32; 16]> = SmallVec::from_elem(0, len);
        let mut next_label = 1;
        let result = out.slot_mut(site.slot);
        for i in 0..len {
            if left[i] == 0 {
                result[i] = 0;
                continue;
            }
            let root = joined.find(i);
            if label_of_root[root] == 0 {
                label_of_root[root] = next_label;
                next_label += 1;
            }
            result[i] = label_of_root[root];
        }
        true
    }
}

/// Edges of a spanning forest over positions sharing a positive label.
fn spanning_forest(labels: &[i32], edges: &mut SmallVec<[(usize, usize); 16]>) {
    let mut uf = UnionFind::new(labels.len());
    for u in 0..labels.len() {
        if labels[u] == 0 {
            continue;
        }
        for w in u + 1..labels.len() {
            if labels[w] == 0 || labels[u] != labels[w] {
                continue;
            }
            if uf.union(u, w) {
                edges.push((u, w));
            }
        }
    }
}
