//! Integration tests for error reporting
//!
//! Overflow messages name the option that sets the exhausted buffer.

use phoenix_foundation::{ArenaLimit, Capacity, Error, ErrorKind};

#[test]
fn overflow_message_names_option() {
    let err = Error::arena_overflow(Capacity::EdgeBuf, 1000);
    assert_eq!(
        err.overflow(),
        Some(&ArenaLimit {
            capacity: Capacity::EdgeBuf,
            limit: 1000
        })
    );
    assert!(err.to_string().contains("EdgeBufSize= 1000 exceeded"));
}

#[test]
fn other_errors_are_not_overflows() {
    let err = Error::invalid_option("MAX_PARSES", "many");
    assert!(err.overflow().is_none());
    assert!(matches!(err.kind, ErrorKind::InvalidOption { .. }));
    assert!(err.to_string().contains("MAX_PARSES=many"));
}

#[test]
fn format_errors_carry_file_and_line() {
    let err = Error::format("g.net", 12, "bad arc");
    assert_eq!(err.to_string(), "g.net:12: bad arc");
}

#[test]
fn every_capacity_has_an_option_name() {
    let all = [
        Capacity::EdgeBuf,
        Capacity::ChartBuf,
        Capacity::PeBuf,
        Capacity::InputBuf,
        Capacity::SeqBuf,
        Capacity::FrameBuf,
        Capacity::PriBuf,
        Capacity::FidBuf,
        Capacity::SymBuf,
        Capacity::StringBuf,
        Capacity::ParseBuf,
        Capacity::Nfa,
        Capacity::SucLink,
        Capacity::NonTerm,
        Capacity::Symbol,
    ];
    let mut names: Vec<_> = all.iter().map(|c| c.option_name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), all.len());
}
