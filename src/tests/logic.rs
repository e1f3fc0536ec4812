use super::*;
use crate::formula::{Clause, Shape};
use crate::quantifier::{Connected, Optimization, Partition};
use crate::test_utils::{path, state_of, var, whole};
use crate::symbol::SymbolStore;

fn formula(shape: Shape, line: &str, structure: &Structure, symbols: &mut SymbolStore) -> LogicalObject {
    let clause = Clause::parse(line, structure, symbols).expect("clause parses");
    LogicalObject::Formula(Formula::new(shape, vec![clause]))
}

#[test]
fn exact_objects_ignore_their_weak_predicates() {
    let mut symbols = SymbolStore::new();
    let partition = LogicalObject::Quantifier(Quantifier::Partition(Partition::new(vec![
        var(&mut symbols, "A"),
        var(&mut symbols, "B"),
    ])));
    assert!(!partition.needs().weak_join);
    assert!(partition.weak_eq(&[1, 0], &[1, 0]));
    assert!(!partition.weak_eq(&[1, 0], &[0, 1]));
    assert_eq!(partition.weak_hash(&[1, 0]), exact_slice_hash(&[1, 0]));
}

#[test]
fn weak_formula_accepts_any_partner() {
    let structure = path(2);
    let mut symbols = SymbolStore::new();
    let ex = formula(Shape::Exists, "E x x", &structure, &mut symbols);
    assert!(ex.needs().weak_join);
    assert!(ex.weak_eq(&[0], &[1]));
    assert_eq!(ex.weak_hash(&[0]), ex.weak_hash(&[1]));
}

#[test]
fn connected_matches_on_chosen_positions_only() {
    let mut symbols = SymbolStore::new();
    let connected =
        LogicalObject::Quantifier(Quantifier::Connected(Connected::new(var(&mut symbols, "X"))));
    assert!(connected.weak_eq(&[1, 2, 0], &[1, 1, 0]));
    assert_eq!(connected.weak_hash(&[1, 2, 0]), connected.weak_hash(&[1, 1, 0]));
    assert!(!connected.weak_eq(&[1, 2, 0], &[1, 0, 0]));
}

#[test]
fn needs_follow_the_object_kind() {
    let structure = path(2);
    let mut symbols = SymbolStore::new();
    let min = LogicalObject::Quantifier(Quantifier::Optimization(Optimization::new(
        var(&mut symbols, "X"),
        vec![1, 1],
    )));
    assert_eq!(
        min.needs(),
        Needs {
            introduce: true,
            forget: true,
            edge: false,
            weak_join: false
        }
    );
    let axay = formula(Shape::ForallForall, "-E x y = x y", &structure, &mut symbols);
    assert!(axay.needs().edge);
    assert!(!axay.needs().introduce);
    assert!(min.is_quantifier());
    assert!(!axay.is_quantifier());
}

#[test]
fn final_check_only_constrains_formulas() {
    let structure = path(2);
    let mut symbols = SymbolStore::new();
    let ex = formula(Shape::Exists, "X x", &structure, &mut symbols);
    assert!(!ex.final_check(&[0]));
    assert!(ex.final_check(&[1]));

    let connected =
        LogicalObject::Quantifier(Quantifier::Connected(Connected::new(var(&mut symbols, "X"))));
    assert!(connected.final_check(&[0, 0]));
}

#[test]
fn dispatch_reaches_the_variant() {
    let structure = path(2);
    let mut symbols = SymbolStore::new();
    let connected =
        LogicalObject::Quantifier(Quantifier::Connected(Connected::new(var(&mut symbols, "X"))));
    let site = whole(&structure, 2);
    let branches = connected.introduce(site, state_of(&[0, 0]), 0, 0);
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[1].slots(), &[1, 0]);
    assert_eq!(connected.to_string(), "connected X");
}
