//! Finite relational structures.
//!
//! The universe is `0..n`. Every structure carries the symmetric binary edge
//! relation `E`, stored as an adjacency graph because the decomposition and
//! the driver need neighbourhoods. All other relations are extents of tuple
//! indices: a tuple `(e0, e1, ..)` is stored as `e0 + e1*n + e2*n^2 + ..`,
//! computed with checked integer arithmetic.

use crate::union_find::UnionFind;
use roaring::RoaringTreemap;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// An element of the universe.
pub type Vertex = usize;

/// Index of a stored (non-edge) relation.
pub type RelId = usize;

/// Reserved name of the edge relation.
pub const EDGE_RELATION: &str = "E";

/// A relation resolved against a structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelRef {
    Edge,
    Stored(RelId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructureError {
    UnknownRelation(String),
    ArityMismatch {
        relation: String,
        expected: usize,
        found: usize,
    },
    ElementOutOfRange { element: Vertex, universe: usize },
    /// `n^arity` does not fit the tuple index space.
    IndexOverflow { relation: String, arity: usize },
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::UnknownRelation(name) => write!(f, "unknown relation '{}'", name),
            StructureError::ArityMismatch {
                relation,
                expected,
                found,
            } => write!(
                f,
                "relation '{}' has arity {}, got {} elements",
                relation, expected, found
            ),
            StructureError::ElementOutOfRange { element, universe } => write!(
                f,
                "element {} is outside the universe 0..{}",
                element, universe
            ),
            StructureError::IndexOverflow { relation, arity } => write!(
                f,
                "relation '{}' of arity {} is too large for this universe",
                relation, arity
            ),
        }
    }
}

impl std::error::Error for StructureError {}

/// The edge relation as an undirected graph on the universe.
#[derive(Clone, Debug, Default)]
pub struct EdgeGraph {
    adjacency: Vec<BTreeSet<Vertex>>,
    edge_count: usize,
}

impl EdgeGraph {
    pub fn new(vertices: usize) -> Self {
        Self {
            adjacency: vec![BTreeSet::new(); vertices],
            edge_count: 0,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Insert `{u, w}`; returns `false` if it was already present.
    pub fn add_edge(&mut self, u: Vertex, w: Vertex) -> bool {
        if !self.adjacency[u].insert(w) {
            return false;
        }
        self.adjacency[w].insert(u);
        self.edge_count += 1;
        true
    }

    pub fn is_adjacent(&self, u: Vertex, w: Vertex) -> bool {
        self.adjacency
            .get(u)
            .is_some_and(|neighbours| neighbours.contains(&w))
    }

    pub fn neighbours(&self, v: Vertex) -> impl Iterator<Item = Vertex> + '_ {
        self.adjacency[v].iter().copied()
    }

    pub fn degree(&self, v: Vertex) -> usize {
        self.adjacency[v].len()
    }

    /// Every edge once, as `(u, w)` with `u <= w`.
    pub fn edges(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(u, neighbours)| {
            neighbours.range(u..).map(move |&w| (u, w))
        })
    }

    pub fn connected_components(&self) -> usize {
        let mut uf = UnionFind::new(self.vertex_count());
        for (u, w) in self.edges() {
            uf.union(u, w);
        }
        uf.count_sets()
    }
}

#[derive(Clone, Debug)]
struct StoredRelation {
    name: String,
    arity: usize,
    extent: RoaringTreemap,
}

/// A universe with the edge graph and any number of named relations.
#[derive(Clone, Debug)]
pub struct Structure {
    universe: usize,
    graph: EdgeGraph,
    relations: Vec<StoredRelation>,
    rel_names: HashMap<String, RelId>,
}

impl Structure {
    pub fn new(universe: usize) -> Self {
        Self {
            universe,
            graph: EdgeGraph::new(universe),
            relations: Vec::new(),
            rel_names: HashMap::new(),
        }
    }

    pub fn universe_size(&self) -> usize {
        self.universe
    }

    pub fn graph(&self) -> &EdgeGraph {
        &self.graph
    }

    /// Declare an empty relation. Declaring `E` is a no-op; redeclaring any
    /// other name replaces it with an empty relation of the new arity.
    pub fn add_relation(&mut self, name: &str, arity: usize) -> Result<(), StructureError> {
        if name == EDGE_RELATION {
            return Ok(());
        }
        if self.tuple_space(arity).is_none() {
            return Err(StructureError::IndexOverflow {
                relation: name.to_string(),
                arity,
            });
        }
        let relation = StoredRelation {
            name: name.to_string(),
            arity,
            extent: RoaringTreemap::new(),
        };
        match self.rel_names.get(name) {
            Some(&id) => self.relations[id] = relation,
            None => {
                self.rel_names.insert(name.to_string(), self.relations.len());
                self.relations.push(relation);
            }
        }
        Ok(())
    }

    /// Arity of a declared relation, `None` if `name` is not declared.
    pub fn arity(&self, name: &str) -> Option<usize> {
        self.resolve(name).map(|rel| self.rel_arity(rel))
    }

    pub fn resolve(&self, name: &str) -> Option<RelRef> {
        if name == EDGE_RELATION {
            return Some(RelRef::Edge);
        }
        self.rel_names.get(name).map(|&id| RelRef::Stored(id))
    }

    pub fn rel_arity(&self, rel: RelRef) -> usize {
        match rel {
            RelRef::Edge => 2,
            RelRef::Stored(id) => self.relations[id].arity,
        }
    }

    pub fn rel_name(&self, rel: RelRef) -> &str {
        match rel {
            RelRef::Edge => EDGE_RELATION,
            RelRef::Stored(id) => &self.relations[id].name,
        }
    }

    pub fn in_relation(&self, name: &str, elements: &[Vertex]) -> Result<bool, StructureError> {
        let rel = self.checked(name, elements)?;
        Ok(self.contains(rel, elements))
    }

    pub fn set_in_relation(&mut self, name: &str, elements: &[Vertex]) -> Result<(), StructureError> {
        let rel = self.checked(name, elements)?;
        match rel {
            RelRef::Edge => {
                self.graph.add_edge(elements[0], elements[1]);
            }
            RelRef::Stored(id) => {
                let index = self.tuple_index(elements);
                self.relations[id].extent.insert(index);
            }
        }
        Ok(())
    }

    /// Membership test for an already resolved relation.
    ///
    /// `elements` must match the arity and lie in the universe; out-of-range
    /// elements read as "not related".
    pub fn contains(&self, rel: RelRef, elements: &[Vertex]) -> bool {
        debug_assert_eq!(elements.len(), self.rel_arity(rel));
        if elements.iter().any(|&e| e >= self.universe) {
            return false;
        }
        match rel {
            RelRef::Edge => self.graph.is_adjacent(elements[0], elements[1]),
            RelRef::Stored(id) => self.relations[id].extent.contains(self.tuple_index(elements)),
        }
    }

    /// Number of tuples stored for a relation (edges for `E`).
    pub fn tuple_count(&self, rel: RelRef) -> u64 {
        match rel {
            RelRef::Edge => self.graph.edge_count() as u64,
            RelRef::Stored(id) => self.relations[id].extent.len(),
        }
    }

    fn checked(&self, name: &str, elements: &[Vertex]) -> Result<RelRef, StructureError> {
        let rel = self
            .resolve(name)
            .ok_or_else(|| StructureError::UnknownRelation(name.to_string()))?;
        let expected = self.rel_arity(rel);
        if elements.len() != expected {
            return Err(StructureError::ArityMismatch {
                relation: name.to_string(),
                expected,
                found: elements.len(),
            });
        }
        if let Some(&element) = elements.iter().find(|&&e| e >= self.universe) {
            return Err(StructureError::ElementOutOfRange {
                element,
                universe: self.universe,
            });
        }
        Ok(rel)
    }

    /// `n^arity`, if it fits.
    fn tuple_space(&self, arity: usize) -> Option<u64> {
        let n = u64::try_from(self.universe).ok()?;
        let exp = u32::try_from(arity).ok()?;
        n.checked_pow(exp)
    }

    /// Mixed-radix index; callers have bounded the arity by `tuple_space`.
    fn tuple_index(&self, elements: &[Vertex]) -> u64 {
        let n = self.universe as u64;
        elements
            .iter()
            .rev()
            .fold(0u64, |acc, &e| acc * n + e as u64)
    }
}

#[cfg(test)]
#[path = "tests/structure.rs"]
mod tests;
