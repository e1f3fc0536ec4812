use super::SetVar;
use crate::logic::{Branches, Site};
use crate::state::State;
use crate::structure::Vertex;

/// `exists R1 .. Rk`: split the universe into `k` disjoint classes.
///
/// The slot of a bag vertex holds its class index. Forgotten positions read
/// 0 like class 0, which is harmless because all states of one bag agree on
/// which positions are occupied.
#[derive(Clone, Debug)]
pub struct Partition {
    classes: Vec<SetVar>,
}

impl Partition {
    pub fn new(classes: Vec<SetVar>) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &[SetVar] {
        &self.classes
    }

    /// One successor per class.
    pub(super) fn introduce(&self, site: Site<'_>, state: State, v: Vertex, index: usize) -> Branches {
        let mut branches = Branches::with_capacity(self.classes.len());
        for (class_index, class) in self.classes.iter().enumerate() {
            let mut next = state.clone();
            next.slot_mut(site.slot)[index] = class_index as i32;
            next.assignment.insert(class.symbol, v);
            branches.push(next);
        }
        branches
    }
}
