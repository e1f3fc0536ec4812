use super::*;
use crate::formula::{Clause, Formula, Shape};
use crate::problem::ProblemBuilder;
use crate::quantifier::{Connected, Optimization, Partition, Quantifier};
use crate::test_utils::path;

fn min_with_formula(weights: Vec<i64>, shape: Shape, clause: &str) -> Problem {
    let n = weights.len();
    let mut builder = ProblemBuilder::new(path(n));
    let x = builder.set_var("X");
    builder.quantifier(Quantifier::Optimization(Optimization::new(x, weights)));
    let (structure, symbols) = builder.names();
    let clause = Clause::parse(clause, structure, symbols).expect("clause parses");
    builder.formula(Formula::new(shape, vec![clause]));
    builder.build()
}

#[test]
fn layout_places_slices_back_to_back() {
    let problem = min_with_formula(vec![1, 1, 1], Shape::ExistsForall, "X x");
    let engine = Engine::new(&problem, 2);
    assert_eq!(engine.slot(0), Slot { offset: 0, len: 3 });
    assert_eq!(engine.slot(1), Slot { offset: 3, len: 4 });
    assert_eq!(engine.state_len(), 7);
}

#[test]
fn leaf_is_single_zero_state() {
    let problem = min_with_formula(vec![1, 1], Shape::Exists, "X x");
    let engine = Engine::new(&problem, 1);
    let leaf = engine.leaf();
    assert_eq!(leaf.len(), 1);
    let first = leaf.states().first().expect("leaf state");
    assert_eq!(first.slots(), &[0, 0, 0]);
    assert_eq!(first.value, 0);
}

#[test]
fn introduce_runs_quantifiers_before_formulas() {
    let problem = min_with_formula(vec![4, 1], Shape::Exists, "X x");
    let engine = Engine::new(&problem, 1);
    let mut vector = engine.leaf();
    vector.introduce(0, 0);
    assert_eq!(vector.len(), 2);
    // the formula already sees the vertex the quantifier just chose
    let chosen = vector
        .states()
        .iter()
        .find(|state| state.slots()[0] == 1)
        .expect("branch including vertex 0");
    assert_eq!(chosen.slots()[2], 1);
    assert_eq!(chosen.value, 4);
}

#[test]
fn forget_collapses_to_cheapest_state() {
    let problem = min_with_formula(vec![4, 1], Shape::Exists, "X x");
    let engine = Engine::new(&problem, 1);
    let mut vector = engine.leaf();
    vector.introduce(0, 0);
    vector.introduce(1, 1);
    assert_eq!(vector.len(), 4);
    vector.forget(0, 0);
    vector.forget(1, 1);
    // found bit 0 (nothing chosen) and found bit 1 at minimum cost 1
    assert_eq!(vector.len(), 2);
    let best = vector.satisfying_state().expect("some state chose a vertex");
    assert_eq!(best.value, 1);
    assert_eq!(best.assignment.members(problem.variables().next().expect("X").symbol), vec![1]);
}

#[test]
fn join_counts_shared_weights_once() {
    let problem = min_with_formula(vec![3, 5], Shape::Exists, "X x");
    let engine = Engine::new(&problem, 1);
    let bag = [BagEntry { vertex: 0, index: 0 }];

    let mut left = engine.leaf();
    left.introduce(0, 0);
    let mut right = engine.leaf();
    right.introduce(0, 0);

    left.join(right, &bag);
    assert_eq!(left.len(), 2);
    let values: Vec<i64> = left.states().iter().map(|state| state.value).collect();
    assert_eq!(values, vec![0, 3]);
}

#[test]
fn join_requires_exact_match_for_partition() {
    let mut builder = ProblemBuilder::new(path(2));
    let a = builder.set_var("A");
    let b = builder.set_var("B");
    builder.quantifier(Quantifier::Partition(Partition::new(vec![a, b])));
    let problem = builder.build();
    let engine = Engine::new(&problem, 1);
    let bag = [BagEntry { vertex: 0, index: 0 }];

    let mut left = engine.leaf();
    left.introduce(0, 0);
    let mut right = engine.leaf();
    right.introduce(0, 0);
    left.join(right, &bag);
    // A with A and B with B; never A with B
    assert_eq!(left.len(), 2);
}

#[test]
fn join_pairs_weakly_equal_connected_states() {
    let mut builder = ProblemBuilder::new(path(3));
    let x = builder.set_var("X");
    builder.quantifier(Quantifier::Connected(Connected::new(x)));
    let problem = builder.build();
    let engine = Engine::new(&problem, 2);

    let mut left = engine.leaf();
    left.introduce(0, 0);
    left.introduce(1, 1);
    let mut right = engine.leaf();
    right.introduce(0, 0);
    right.introduce(1, 1);
    right.edge(0, 1, 0, 1);

    let bag = [
        BagEntry { vertex: 0, index: 0 },
        BagEntry { vertex: 1, index: 1 },
    ];
    let probe = left.states().iter().nth(3).expect("state choosing both").clone();
    assert!(right.states().iter().any(|s| engine.weak_eq(&probe, s)));
    left.join(right, &bag);
    // {}, {0}, {1}, and {0,1} joined into one component
    assert_eq!(left.len(), 4);
    assert!(left
        .states()
        .iter()
        .any(|state| state.slots()[..2] == [1, 1]));
}

#[test]
fn unsatisfiable_root_has_no_state() {
    let problem = min_with_formula(vec![1], Shape::Exists, "-= x x");
    let engine = Engine::new(&problem, 0);
    let mut vector = engine.leaf();
    vector.introduce(0, 0);
    vector.forget(0, 0);
    assert!(vector.satisfying_state().is_none());
    assert!(vector.is_empty());
}
