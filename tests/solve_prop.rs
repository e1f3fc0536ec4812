use courcelle::engine::Engine;
use courcelle::parser::parse_problem;
use courcelle::solve;
use courcelle::state::State;
use courcelle::union_find::UnionFind;
use proptest::prelude::*;

const MAX_VERTICES: usize = 7;

#[derive(Clone, Debug)]
struct Graph {
    n: usize,
    edges: Vec<(usize, usize)>,
}

impl Graph {
    fn adjacent(&self, u: usize, w: usize) -> bool {
        self.edges
            .iter()
            .any(|&(a, b)| (a, b) == (u, w) || (a, b) == (w, u))
    }

    fn components(&self) -> usize {
        let mut uf = UnionFind::new(self.n);
        for &(u, w) in &self.edges {
            uf.union(u, w);
        }
        uf.count_sets()
    }

    /// Instance text for this graph followed by `body`.
    fn instance(&self, body: &str) -> String {
        let mut text = format!("universe {}\nvocabulary E 2 {}\n", self.n, self.edges.len());
        for &(u, w) in &self.edges {
            text.push_str(&format!("E {} {}\n", u, w));
        }
        text.push_str(body);
        text
    }
}

fn graph_strategy() -> impl Strategy<Value = Graph> {
    (1..=MAX_VERTICES).prop_flat_map(|n| {
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|u| (u + 1..n).map(move |w| (u, w)))
            .collect();
        let max = pairs.len();
        prop::sample::subsequence(pairs, 0..=max).prop_map(move |edges| Graph { n, edges })
    })
}

fn weighted_graph_strategy() -> impl Strategy<Value = (Graph, Vec<i64>)> {
    graph_strategy().prop_flat_map(|graph| {
        let n = graph.n;
        (Just(graph), prop::collection::vec(1i64..6, n..=n))
    })
}

fn min_directive(var: &str, weights: &[i64]) -> String {
    let weights: Vec<String> = weights.iter().map(|w| w.to_string()).collect();
    format!("min {} {}\n", var, weights.join(" "))
}

fn subsets(n: usize) -> impl Iterator<Item = u32> {
    0..(1u32 << n)
}

fn cost(mask: u32, weights: &[i64]) -> i64 {
    (0..weights.len())
        .filter(|&v| mask & (1 << v) != 0)
        .map(|v| weights[v])
        .sum()
}

fn optimum(text: &str) -> Option<i64> {
    let outcome = solve(text).expect("generated instance is valid");
    outcome.solution.map(|solution| solution.value)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn vertex_cover_matches_brute_force((graph, weights) in weighted_graph_strategy()) {
        let text = graph.instance(&format!("{}axay 1\nX x X y\n", min_directive("X", &weights)));
        let expected = subsets(graph.n)
            .filter(|&mask| {
                graph
                    .edges
                    .iter()
                    .all(|&(u, w)| mask & (1 << u) != 0 || mask & (1 << w) != 0)
            })
            .map(|mask| cost(mask, &weights))
            .min();
        prop_assert_eq!(optimum(&text), expected);
    }

    #[test]
    fn dominating_set_matches_brute_force((graph, weights) in weighted_graph_strategy()) {
        let text = graph.instance(&format!("{}axey 1\nX x X y\n", min_directive("X", &weights)));
        let expected = subsets(graph.n)
            .filter(|&mask| {
                (0..graph.n).all(|x| {
                    (0..graph.n).any(|y| {
                        graph.adjacent(x, y) && (mask & (1 << x) != 0 || mask & (1 << y) != 0)
                    })
                })
            })
            .map(|mask| cost(mask, &weights))
            .min();
        prop_assert_eq!(optimum(&text), expected);
    }

    #[test]
    fn three_colouring_matches_brute_force(graph in graph_strategy()) {
        let text = graph.instance("exists R G B\naxay 3\n-R x -R y\n-G x -G y\n-B x -B y\n");
        let colourable = (0..3u32.pow(graph.n as u32)).any(|code| {
            let colour = |v: usize| (code / 3u32.pow(v as u32)) % 3;
            graph.edges.iter().all(|&(u, w)| colour(u) != colour(w))
        });
        prop_assert_eq!(optimum(&text).is_some(), colourable);
    }

    #[test]
    fn connected_cover_iff_graph_connected(graph in graph_strategy()) {
        let text = graph.instance("connected X\nax 1\nX x\n");
        prop_assert_eq!(optimum(&text).is_some(), graph.components() == 1);
    }

    #[test]
    fn forest_cover_iff_graph_acyclic(graph in graph_strategy()) {
        let text = graph.instance("forest X\nax 1\nX x\n");
        let acyclic = graph.edges.len() + graph.components() == graph.n;
        prop_assert_eq!(optimum(&text).is_some(), acyclic);
    }

    #[test]
    fn solving_is_deterministic((graph, weights) in weighted_graph_strategy()) {
        let text = graph.instance(&format!("{}connected X\n", min_directive("Y", &weights)));
        let first = solve(&text).expect("valid").to_string();
        let second = solve(&text).expect("valid").to_string();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn weak_equality_respects_exact_equality(
        labels in prop::collection::vec(-1i32..4, 4),
        relabel in prop::collection::vec(1i32..4, 4),
        bits in prop::collection::vec(0i32..2, 6),
        value in 0i64..10,
    ) {
        let problem = parse_problem(
            "universe 3\nvocabulary\nconnected X\nexists A B\naxey 1\nX x\nexay 1\nA x\n",
        )
        .expect("valid instance");
        let engine = Engine::new(&problem, 3);

        let mut a = State::zeroed(engine.state_len());
        a.slot_mut(engine.slot(0)).copy_from_slice(&labels);
        a.slot_mut(engine.slot(2)).copy_from_slice(&bits[..4]);
        let mut b = a.clone();
        b.value = value;

        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.exact_hash(), b.exact_hash());
        prop_assert!(engine.weak_eq(&a, &b));
        prop_assert_eq!(engine.weak_hash(&a), engine.weak_hash(&b));

        // same chosen positions under different labels stay weakly equal
        let mut c = a.clone();
        for (slot, (&old, &new)) in c
            .slot_mut(engine.slot(0))
            .iter_mut()
            .zip(labels.iter().zip(&relabel))
        {
            if old > 0 {
                *slot = new;
            }
        }
        c.slot_mut(engine.slot(3)).copy_from_slice(&bits[..5]);
        prop_assert!(engine.weak_eq(&a, &c));
        prop_assert_eq!(engine.weak_hash(&a), engine.weak_hash(&c));
    }
}
