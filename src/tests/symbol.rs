use super::*;

#[test]
fn interning_is_idempotent() {
    let mut symbols = SymbolStore::new();
    let x = symbols.intern("X");
    let again = symbols.intern("X");
    let y = symbols.intern("Y");
    assert_eq!(x, again);
    assert_ne!(x, y);
    assert_eq!(symbols.len(), 2);
}

#[test]
fn resolve_round_trips_and_get_does_not_intern() {
    let mut symbols = SymbolStore::new();
    let red = symbols.intern("Red");
    assert_eq!(symbols.resolve(red), Some("Red"));
    assert_eq!(symbols.get("Blue"), None);
    assert_eq!(symbols.len(), 1);
}
