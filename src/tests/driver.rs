use super::*;
use crate::decomposition::{Decomposer, MinDegree};
use crate::formula::{Clause, Formula, Shape};
use crate::problem::{Problem, ProblemBuilder};
use crate::quantifier::{Connected, Forest, Optimization, Partition, Quantifier};
use crate::state::Assignment;
use crate::structure::Structure;
use crate::test_utils::{graph, path};

fn add_formula(builder: &mut ProblemBuilder, shape: Shape, lines: &[&str]) {
    let (structure, symbols) = builder.names();
    let clauses = lines
        .iter()
        .map(|line| Clause::parse(line, structure, symbols).expect("clause parses"))
        .collect();
    builder.formula(Formula::new(shape, clauses));
}

/// Solve and return the optimal value with its assignment, if any.
fn run(problem: &Problem) -> Option<(i64, Assignment)> {
    let decomposition = MinDegree
        .decompose(problem.structure().graph())
        .expect("decomposition");
    let engine = Engine::new(problem, decomposition.width());
    let mut root = evaluate(&engine, &decomposition);
    root.satisfying_state()
        .map(|state| (state.value, state.assignment.clone()))
}

fn all_in(structure: Structure, quantifier: fn(crate::quantifier::SetVar) -> Quantifier) -> Problem {
    let mut builder = ProblemBuilder::new(structure);
    let x = builder.set_var("X");
    builder.quantifier(quantifier(x));
    add_formula(&mut builder, Shape::Forall, &["X x"]);
    builder.build()
}

fn members(problem: &Problem, assignment: &Assignment, name: &str) -> Vec<usize> {
    let symbol = problem.symbols().get(name).expect("declared variable");
    assignment.members(symbol)
}

#[test]
fn forest_rejects_triangle() {
    let problem = all_in(graph(3, &[(0, 1), (1, 2), (2, 0)]), |x| {
        Quantifier::Forest(Forest::new(x))
    });
    assert!(run(&problem).is_none());
}

#[test]
fn forest_accepts_path() {
    let problem = all_in(path(5), |x| Quantifier::Forest(Forest::new(x)));
    let (_, assignment) = run(&problem).expect("a path is a forest");
    assert_eq!(members(&problem, &assignment, "X"), vec![0, 1, 2, 3, 4]);
}

#[test]
fn connected_covers_path() {
    let problem = all_in(path(3), |x| Quantifier::Connected(Connected::new(x)));
    let (_, assignment) = run(&problem).expect("the path is connected");
    assert_eq!(members(&problem, &assignment, "X"), vec![0, 1, 2]);
}

#[test]
fn connected_rejects_two_components() {
    let problem = all_in(graph(4, &[(0, 1), (2, 3)]), |x| {
        Quantifier::Connected(Connected::new(x))
    });
    assert!(run(&problem).is_none());
}

#[test]
fn connected_spans_a_cycle() {
    let edges: Vec<_> = (0..6).map(|v| (v, (v + 1) % 6)).collect();
    let problem = all_in(graph(6, &edges), |x| Quantifier::Connected(Connected::new(x)));
    assert!(run(&problem).is_some());
}

#[test]
fn minimum_weight_witness() {
    let mut builder = ProblemBuilder::new(Structure::new(3));
    let x = builder.set_var("X");
    builder.quantifier(Quantifier::Optimization(Optimization::new(x, vec![5, 1, 1])));
    add_formula(&mut builder, Shape::Exists, &["X x"]);
    let problem = builder.build();

    let (value, assignment) = run(&problem).expect("some vertex can be chosen");
    assert_eq!(value, 1);
    let chosen = members(&problem, &assignment, "X");
    assert_eq!(chosen.len(), 1);
    assert!(chosen == vec![1] || chosen == vec![2]);
}

#[test]
fn minimum_vertex_cover_of_path() {
    let mut builder = ProblemBuilder::new(path(5));
    let x = builder.set_var("X");
    builder.quantifier(Quantifier::Optimization(Optimization::new(x, vec![1; 5])));
    add_formula(&mut builder, Shape::ForallForall, &["X x X y"]);
    let problem = builder.build();

    let (value, assignment) = run(&problem).expect("a cover exists");
    assert_eq!(value, 2);
    assert_eq!(members(&problem, &assignment, "X"), vec![1, 3]);
}

#[test]
fn dominating_set_of_star_is_its_centre() {
    let mut builder = ProblemBuilder::new(graph(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]));
    let x = builder.set_var("X");
    builder.quantifier(Quantifier::Optimization(Optimization::new(x, vec![1; 5])));
    // every vertex is in X or has a neighbour in X
    add_formula(&mut builder, Shape::ForallExists, &["X x X y"]);
    let problem = builder.build();

    let (value, assignment) = run(&problem).expect("a dominating set exists");
    assert_eq!(value, 1);
    assert_eq!(members(&problem, &assignment, "X"), vec![0]);
}

fn colouring(structure: Structure) -> Problem {
    let mut builder = ProblemBuilder::new(structure);
    let classes = ["R", "G", "B"].map(|name| builder.set_var(name)).to_vec();
    builder.quantifier(Quantifier::Partition(Partition::new(classes)));
    add_formula(
        &mut builder,
        Shape::ForallForall,
        &["-R x -R y", "-G x -G y", "-B x -B y"],
    );
    builder.build()
}

#[test]
fn triangle_is_three_colourable() {
    let problem = colouring(graph(3, &[(0, 1), (1, 2), (2, 0)]));
    let (value, assignment) = run(&problem).expect("colourable");
    assert_eq!(value, 0);
    let mut seen: Vec<usize> = ["R", "G", "B"]
        .iter()
        .flat_map(|name| members(&problem, &assignment, name))
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2], "every vertex has exactly one colour");
}

#[test]
fn four_clique_is_not_three_colourable() {
    let mut edges = Vec::new();
    for u in 0..4 {
        for w in u + 1..4 {
            edges.push((u, w));
        }
    }
    assert!(run(&colouring(graph(4, &edges))).is_none());
}

#[test]
fn exists_forall_finds_universal_vertex() {
    let mut builder = ProblemBuilder::new(graph(4, &[(0, 1), (0, 2), (0, 3), (1, 2)]));
    builder.structure_mut().add_relation("Hub", 1).expect("declared");
    builder.structure_mut().set_in_relation("Hub", &[0]).expect("in range");
    // some x such that every neighbour y sees x as a hub
    add_formula(&mut builder, Shape::ExistsForall, &["Hub x"]);
    assert!(run(&builder.build()).is_some());

    let mut builder = ProblemBuilder::new(graph(2, &[(0, 1)]));
    builder.structure_mut().add_relation("Hub", 1).expect("declared");
    add_formula(&mut builder, Shape::ExistsForall, &["Hub x"]);
    assert!(run(&builder.build()).is_none());
}

#[test]
fn exists_exists_needs_a_witnessing_pair() {
    let mut builder = ProblemBuilder::new(Structure::new(2));
    add_formula(&mut builder, Shape::ExistsExists, &["E x x"]);
    assert!(run(&builder.build()).is_none());

    let mut builder = ProblemBuilder::new(graph(2, &[(1, 1)]));
    add_formula(&mut builder, Shape::ExistsExists, &["E x x"]);
    assert!(run(&builder.build()).is_some());
}

#[test]
fn empty_universe_keeps_initial_state() {
    let mut builder = ProblemBuilder::new(Structure::new(0));
    add_formula(&mut builder, Shape::Forall, &["= x x"]);
    assert_eq!(run(&builder.build()).map(|(value, _)| value), Some(0));

    let mut builder = ProblemBuilder::new(Structure::new(0));
    add_formula(&mut builder, Shape::Exists, &["= x x"]);
    assert!(run(&builder.build()).is_none());
}

#[test]
fn repeated_runs_agree() {
    let problem = colouring(path(6));
    let first = run(&problem).expect("colourable");
    let second = run(&problem).expect("colourable");
    assert_eq!(first, second);
}

#[test]
fn loop_is_a_cycle_for_forest() {
    let problem = all_in(graph(2, &[(0, 1), (1, 1)]), |x| {
        Quantifier::Forest(Forest::new(x))
    });
    assert!(run(&problem).is_none());

    let mut builder = ProblemBuilder::new(graph(2, &[(0, 1), (1, 1)]));
    let x = builder.set_var("X");
    builder.quantifier(Quantifier::Forest(Forest::new(x)));
    let problem = builder.build();
    let (_, assignment) = run(&problem).expect("the empty set is a forest");
    assert!(!members(&problem, &assignment, "X").contains(&1));
}

#[test]
fn loop_constrains_forall_forall() {
    let mut builder = ProblemBuilder::new(graph(3, &[(0, 1), (2, 2)]));
    let x = builder.set_var("X");
    builder.quantifier(Quantifier::Optimization(Optimization::new(x, vec![1; 3])));
    add_formula(&mut builder, Shape::ForallForall, &["X x X y"]);
    let problem = builder.build();
    let (value, assignment) = run(&problem).expect("a cover exists");
    assert_eq!(value, 2);
    assert!(members(&problem, &assignment, "X").contains(&2));
}
