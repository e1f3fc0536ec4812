//! Walks a tree decomposition bottom-up and feeds the state engine.
//!
//! Nodes are processed in post-order with an explicit stack of pending
//! vectors: when a node is reached, the vectors of its children are the top
//! entries of the stack. Moving a child vector up to its parent's bag
//! forgets the child-only vertices first and introduces the parent-only
//! vertices afterwards, so a tree index freed by a forget can be reused by an
//! introduce in the same step.
//!
//! Every edge is emitted exactly once, just before the first of its two
//! endpoints is forgotten; the other endpoint is still in the working bag at
//! that point. A loop `E(v, v)` is emitted just before `v` is forgotten.

use crate::decomposition::TreeDecomposition;
use crate::engine::{Engine, StateVector};
use crate::logic::BagEntry;
use crate::structure::{EdgeGraph, Vertex};
use crate::trace::{debug, trace_span};
use smallvec::SmallVec;

/// Run the dynamic program over `decomposition` and return the root vector.
///
/// Component roots are closed off and joined over the empty bag; with no
/// bags at all the result is the single initial state.
pub fn evaluate<'e>(engine: &'e Engine<'e>, decomposition: &TreeDecomposition) -> StateVector<'e> {
    let graph = engine.problem().structure().graph();
    let mut pending: Vec<StateVector<'e>> = Vec::new();

    for node in decomposition.post_order() {
        let bag = decomposition.bag(node);
        let _span = trace_span!("node", node, bag = bag.len()).entered();
        let children = decomposition.children(node);

        let vector = if children.is_empty() {
            let mut leaf = engine.leaf();
            for &v in bag {
                leaf.introduce(v, decomposition.tree_index(v));
            }
            leaf
        } else {
            let entries = bag_entries(decomposition, bag);
            let vectors = pending.split_off(pending.len() - children.len());
            let transported = vectors.into_iter().zip(children).map(|(mut vector, &child)| {
                transport(&mut vector, decomposition, graph, decomposition.bag(child), bag);
                vector
            });
            join_all(engine, transported, &entries)
        };
        pending.push(vector);
    }

    let closed = pending
        .into_iter()
        .zip(decomposition.roots())
        .map(|(mut vector, &root)| {
            transport(&mut vector, decomposition, graph, decomposition.bag(root), &[]);
            vector
        });
    let result = join_all(engine, closed, &[]);
    debug!(live = result.len(), "root");
    result
}

/// Fold `vectors` with joins over `bag`; no vectors yields a leaf.
fn join_all<'e>(
    engine: &'e Engine<'e>,
    vectors: impl Iterator<Item = StateVector<'e>>,
    bag: &[BagEntry],
) -> StateVector<'e> {
    vectors
        .reduce(|mut acc, next| {
            acc.join(next, bag);
            acc
        })
        .unwrap_or_else(|| engine.leaf())
}

/// Move `vector` from bag `from` to bag `to`, both ascending.
fn transport(
    vector: &mut StateVector<'_>,
    decomposition: &TreeDecomposition,
    graph: &EdgeGraph,
    from: &[Vertex],
    to: &[Vertex],
) {
    let mut working: SmallVec<[Vertex; 16]> = SmallVec::from_slice(from);
    for &v in from {
        if to.binary_search(&v).is_ok() {
            continue;
        }
        working.retain(|&mut u| u != v);
        let index_v = decomposition.tree_index(v);
        if graph.is_adjacent(v, v) {
            vector.edge(v, v, index_v, index_v);
        }
        for &u in &working {
            if graph.is_adjacent(v, u) {
                vector.edge(v, u, index_v, decomposition.tree_index(u));
            }
        }
        vector.forget(v, index_v);
    }
    for &v in to {
        if from.binary_search(&v).is_err() {
            vector.introduce(v, decomposition.tree_index(v));
        }
    }
}

fn bag_entries(decomposition: &TreeDecomposition, bag: &[Vertex]) -> SmallVec<[BagEntry; 16]> {
    bag.iter()
        .map(|&vertex| BagEntry {
            vertex,
            index: decomposition.tree_index(vertex),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/driver.rs"]
mod tests;
