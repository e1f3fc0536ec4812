use crate::logic::Site;
use crate::quantifier::SetVar;
use crate::state::{Slot, State};
use crate::structure::{Structure, Vertex};
use crate::symbol::SymbolStore;

/// Structure on `0..n` whose edge relation holds `edges`.
pub(crate) fn graph(n: usize, edges: &[(Vertex, Vertex)]) -> Structure {
    let mut structure = Structure::new(n);
    for &(u, w) in edges {
        structure
            .set_in_relation("E", &[u, w])
            .expect("edge inside the universe");
    }
    structure
}

pub(crate) fn path(n: usize) -> Structure {
    let edges: Vec<_> = (1..n).map(|v| (v - 1, v)).collect();
    graph(n, &edges)
}

pub(crate) fn var(symbols: &mut SymbolStore, name: &str) -> SetVar {
    SetVar {
        symbol: symbols.intern(name),
        name: name.to_string(),
    }
}

/// Site covering the whole state.
pub(crate) fn whole(structure: &Structure, len: usize) -> Site<'_> {
    Site {
        structure,
        slot: Slot { offset: 0, len },
    }
}

/// State whose single slice is `slots`.
pub(crate) fn state_of(slots: &[i32]) -> State {
    let mut state = State::zeroed(slots.len());
    state
        .slot_mut(Slot {
            offset: 0,
            len: slots.len(),
        })
        .copy_from_slice(slots);
    state
}
