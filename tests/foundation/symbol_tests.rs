//! Integration tests for the symbol table

use phoenix_foundation::{Capacity, SymbolClass, SymbolId, SymbolTable};

#[test]
fn nets_then_words_then_non_terminals() {
    let mut table = SymbolTable::new(32);
    assert_eq!(table.register_nets(["[Depart]", "[City]"]).unwrap(), 2);

    let from = table.intern_word("FROM").unwrap();
    let np = table.intern_non_terminal("<NP>").unwrap();
    assert_eq!(from, SymbolId::new(3));
    assert_eq!(np, SymbolId::new(4));

    assert_eq!(table.class(SymbolId::new(1)), Some(SymbolClass::Net));
    assert_eq!(table.class(from), Some(SymbolClass::Word));
    assert_eq!(table.class(np), Some(SymbolClass::NonTerminal));
    assert_eq!(table.last_net(), 2);
}

#[test]
fn interning_twice_returns_same_id() {
    let mut table = SymbolTable::new(8);
    let a = table.intern_word("BOSTON").unwrap();
    let b = table.intern_word("BOSTON").unwrap();
    assert_eq!(a, b);
    assert_eq!(table.lookup(a), Some("BOSTON"));
    assert_eq!(table.find("BOSTON"), Some(a));
}

#[test]
fn net_list_too_long_overflows() {
    let mut table = SymbolTable::new(2);
    let err = table.register_nets(["[A]", "[B]", "[C]"]).unwrap_err();
    assert_eq!(err.overflow().map(|l| l.capacity), Some(Capacity::Symbol));
}
