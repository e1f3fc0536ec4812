//! Tree decompositions of the edge graph.
//!
//! A [`TreeDecomposition`] is a rooted forest of bags. It is only ever built
//! through [`TreeDecomposition::new`], which checks the three decomposition
//! properties and assigns every vertex a *tree index*: a position in
//! `0..=width` that no other vertex of any shared bag uses. State slices are
//! addressed by that index.
//!
//! [`MinDegree`] is the built-in [`Decomposer`].

use crate::structure::{EdgeGraph, Vertex};
use crate::trace::{debug, info};
use std::collections::BTreeSet;
use std::fmt;

/// Index of a node of the decomposition.
pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecompositionError {
    ParentCountMismatch { bags: usize, parents: usize },
    ParentOutOfRange { node: NodeId, parent: NodeId },
    /// Following parents from `node` never reaches a root.
    Cycle { node: NodeId },
    VertexOutOfRange { node: NodeId, vertex: Vertex },
    UncoveredVertex(Vertex),
    UncoveredEdge(Vertex, Vertex),
    /// The bags holding the vertex do not form a subtree.
    DisconnectedVertex(Vertex),
}

impl fmt::Display for DecompositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecompositionError::ParentCountMismatch { bags, parents } => {
                write!(f, "{} bags but {} parent entries", bags, parents)
            }
            DecompositionError::ParentOutOfRange { node, parent } => {
                write!(f, "node {} has nonexistent parent {}", node, parent)
            }
            DecompositionError::Cycle { node } => {
                write!(f, "parent links from node {} form a cycle", node)
            }
            DecompositionError::VertexOutOfRange { node, vertex } => {
                write!(f, "bag {} holds vertex {} outside the graph", node, vertex)
            }
            DecompositionError::UncoveredVertex(v) => write!(f, "vertex {} is in no bag", v),
            DecompositionError::UncoveredEdge(u, w) => {
                write!(f, "edge {{{}, {}}} is in no bag", u, w)
            }
            DecompositionError::DisconnectedVertex(v) => {
                write!(f, "bags containing vertex {} are not connected", v)
            }
        }
    }
}

impl std::error::Error for DecompositionError {}

/// Computes a tree decomposition of a graph.
pub trait Decomposer {
    fn decompose(&self, graph: &EdgeGraph) -> Result<TreeDecomposition, DecompositionError>;
}

/// Validated rooted forest of bags.
#[derive(Clone, Debug)]
pub struct TreeDecomposition {
    bags: Vec<Vec<Vertex>>,
    parents: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
    roots: Vec<NodeId>,
    width: usize,
    tree_index: Vec<usize>,
}

impl TreeDecomposition {
    /// Validate `bags` with their `parents` against `graph`.
    ///
    /// Bags are sorted and deduplicated.
    pub fn new(
        graph: &EdgeGraph,
        mut bags: Vec<Vec<Vertex>>,
        parents: Vec<Option<NodeId>>,
    ) -> Result<Self, DecompositionError> {
        if bags.len() != parents.len() {
            return Err(DecompositionError::ParentCountMismatch {
                bags: bags.len(),
                parents: parents.len(),
            });
        }
        let n = graph.vertex_count();
        for (node, bag) in bags.iter_mut().enumerate() {
            bag.sort_unstable();
            bag.dedup();
            if let Some(&vertex) = bag.iter().find(|&&v| v >= n) {
                return Err(DecompositionError::VertexOutOfRange { node, vertex });
            }
        }

        let mut children = vec![Vec::new(); bags.len()];
        let mut roots = Vec::new();
        for (node, parent) in parents.iter().enumerate() {
            match *parent {
                None => roots.push(node),
                Some(parent) if parent >= bags.len() => {
                    return Err(DecompositionError::ParentOutOfRange { node, parent });
                }
                Some(parent) => children[parent].push(node),
            }
        }

        let mut decomposition = Self {
            bags,
            parents,
            children,
            roots,
            width: 0,
            tree_index: vec![0; n],
        };
        let order = decomposition.pre_order();
        if order.len() != decomposition.bags.len() {
            let mut reached = vec![false; decomposition.bags.len()];
            for &node in &order {
                reached[node] = true;
            }
            let node = reached.iter().position(|&r| !r).unwrap_or(0);
            return Err(DecompositionError::Cycle { node });
        }

        decomposition.check_coverage(graph)?;
        decomposition.check_connectivity(n)?;
        decomposition.width = decomposition
            .bags
            .iter()
            .map(|bag| bag.len().saturating_sub(1))
            .max()
            .unwrap_or(0);
        decomposition.assign_tree_indices(&order);
        Ok(decomposition)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.bags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bags.is_empty()
    }

    /// Vertices of `node`, ascending.
    pub fn bag(&self, node: NodeId) -> &[Vertex] {
        &self.bags[node]
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents[node]
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.children[node]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn tree_index(&self, v: Vertex) -> usize {
        self.tree_index[v]
    }

    /// Every node before its children, roots in order.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.bags.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children[node].iter().rev().copied());
        }
        order
    }

    /// Every node after all of its children.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.bags.len());
        let mut stack: Vec<(NodeId, bool)> = self.roots.iter().rev().map(|&r| (r, false)).collect();
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
                continue;
            }
            stack.push((node, true));
            stack.extend(self.children[node].iter().rev().map(|&c| (c, false)));
        }
        order
    }

    fn check_coverage(&self, graph: &EdgeGraph) -> Result<(), DecompositionError> {
        let mut covered = vec![false; graph.vertex_count()];
        for bag in &self.bags {
            for &v in bag {
                covered[v] = true;
            }
        }
        if let Some(v) = covered.iter().position(|&c| !c) {
            return Err(DecompositionError::UncoveredVertex(v));
        }

        let mut pairs: BTreeSet<(Vertex, Vertex)> =
            graph.edges().filter(|&(u, w)| u != w).collect();
        for bag in &self.bags {
            for (i, &u) in bag.iter().enumerate() {
                for &w in &bag[i + 1..] {
                    pairs.remove(&(u, w));
                }
            }
            if pairs.is_empty() {
                break;
            }
        }
        match pairs.into_iter().next() {
            Some((u, w)) => Err(DecompositionError::UncoveredEdge(u, w)),
            None => Ok(()),
        }
    }

    /// Each vertex has exactly one topmost bag.
    fn check_connectivity(&self, n: usize) -> Result<(), DecompositionError> {
        let mut tops = vec![0usize; n];
        for (node, bag) in self.bags.iter().enumerate() {
            let parent_bag = self.parents[node].map(|p| &self.bags[p]);
            for &v in bag {
                if parent_bag.map_or(true, |pb| pb.binary_search(&v).is_err()) {
                    tops[v] += 1;
                }
            }
        }
        match tops.iter().position(|&t| t > 1) {
            Some(v) => Err(DecompositionError::DisconnectedVertex(v)),
            None => Ok(()),
        }
    }

    /// Vertices inherited from the parent keep their index; new ones take
    /// the smallest index unused in the bag.
    fn assign_tree_indices(&mut self, pre_order: &[NodeId]) {
        let mut assigned = vec![false; self.tree_index.len()];
        let mut used = vec![false; self.width + 1];
        for &node in pre_order {
            used.fill(false);
            for &v in &self.bags[node] {
                if assigned[v] {
                    used[self.tree_index[v]] = true;
                }
            }
            let mut next = 0;
            for &v in &self.bags[node] {
                if assigned[v] {
                    continue;
                }
                while used[next] {
                    next += 1;
                }
                used[next] = true;
                self.tree_index[v] = next;
                assigned[v] = true;
            }
        }
    }
}

/// Greedy minimum-degree elimination.
///
/// Repeatedly eliminates a vertex of minimum degree in the filled graph
/// (smallest id on ties), turning its remaining neighbourhood into a clique.
/// The bag of `v` is `v` with its neighbours at elimination time; its parent
/// is the bag of the first of those neighbours to be eliminated later.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinDegree;

impl Decomposer for MinDegree {
    fn decompose(&self, graph: &EdgeGraph) -> Result<TreeDecomposition, DecompositionError> {
        let n = graph.vertex_count();
        let mut adjacency: Vec<BTreeSet<Vertex>> = (0..n)
            .map(|v| graph.neighbours(v).filter(|&w| w != v).collect())
            .collect();
        // (degree, vertex) of every vertex still in the graph
        let mut queue: BTreeSet<(usize, Vertex)> =
            (0..n).map(|v| (adjacency[v].len(), v)).collect();

        let mut position = vec![0usize; n];
        let mut higher: Vec<Vec<Vertex>> = vec![Vec::new(); n];
        let mut step = 0;
        while let Some((_, v)) = queue.pop_first() {
            position[v] = step;
            step += 1;
            let neighbourhood: Vec<Vertex> = adjacency[v].iter().copied().collect();
            for &u in &neighbourhood {
                queue.remove(&(adjacency[u].len(), u));
                adjacency[u].remove(&v);
                for &w in &neighbourhood {
                    if w != u {
                        adjacency[u].insert(w);
                    }
                }
                queue.insert((adjacency[u].len(), u));
            }
            higher[v] = neighbourhood;
        }

        let mut bags = Vec::with_capacity(n);
        let mut parents = Vec::with_capacity(n);
        for v in 0..n {
            let parent = higher[v].iter().copied().min_by_key(|&u| position[u]);
            let mut bag = higher[v].clone();
            bag.push(v);
            bags.push(bag);
            parents.push(parent);
        }

        let decomposition = TreeDecomposition::new(graph, bags, parents)?;
        info!(
            width = decomposition.width(),
            bags = decomposition.len(),
            roots = decomposition.roots().len(),
            "decomposed"
        );
        debug!(order = ?position, "elimination_order");
        Ok(decomposition)
    }
}

#[cfg(test)]
#[path = "tests/decomposition.rs"]
mod tests;
