//! Parsing against the one-net greeting grammar.

use phoenix_foundation::{ArenaLimit, Capacity};
use phoenix_parser::{ParserConfig, PhoenixParser, RenderMode};

use crate::fixtures::greeting;

// =============================================================================
// Spans
// =============================================================================

#[test]
fn optional_word_extends_the_span() {
    let grammar = greeting();
    let mut parser = PhoenixParser::new(&grammar, ParserConfig::default());

    let outcome = parser.parse_text("hello");
    let tree = &outcome.best().unwrap().slots[0].tree;
    assert_eq!((tree.start, tree.end), (0, 1));

    let outcome = parser.parse_text("hello there");
    let tree = &outcome.best().unwrap().slots[0].tree;
    assert_eq!((tree.start, tree.end), (0, 2));
    assert_eq!(tree.words(), vec!["HELLO", "THERE"]);
}

#[test]
fn required_word_missing_gives_no_parse() {
    let grammar = greeting();
    let mut parser = PhoenixParser::new(&grammar, ParserConfig::default());
    let outcome = parser.parse_text("there");
    assert!(outcome.parses.is_empty());
    assert_eq!(outcome.render(RenderMode::Full, 1000).unwrap(), "No parse\n");
}

#[test]
fn full_rendering() {
    let grammar = greeting();
    let mut parser = PhoenixParser::new(&grammar, ParserConfig::default());
    let outcome = parser.parse_text("Hello there");
    assert_eq!(
        outcome.render(RenderMode::Full, 1000).unwrap(),
        "Parse 1:\n[Greeting] ( HELLO THERE )\n"
    );
}

// =============================================================================
// Unknown Words
// =============================================================================

#[test]
fn ignored_unknown_word_is_skipped() {
    let grammar = greeting();
    let mut parser = PhoenixParser::new(&grammar, ParserConfig::default());
    let outcome = parser.parse_text("hello xyzzy there");

    assert_eq!(outcome.oov, vec!["XYZZY"]);
    let best = outcome.best().unwrap();
    assert_eq!(best.slots[0].tree.words(), vec!["HELLO", "THERE"]);
    assert_eq!((best.slots[0].tree.start, best.slots[0].tree.end), (0, 3));
}

#[test]
fn kept_unknown_word_blocks_the_match() {
    let grammar = greeting();
    let config = ParserConfig::default().with_ignore_oov(false);
    let mut parser = PhoenixParser::new(&grammar, config);
    let outcome = parser.parse_text("hello xyzzy there");

    assert_eq!(outcome.oov, vec!["XYZZY"]);
    let best = outcome.best().unwrap();
    assert_eq!(best.slots[0].tree.words(), vec!["HELLO"]);
    assert_eq!(best.unparsed, vec!["XYZZY", "THERE"]);
}

// =============================================================================
// Overflow
// =============================================================================

#[test]
fn tiny_edge_buffer_reports_overflow() {
    let grammar = greeting();
    let config = ParserConfig::default().with_edge_buf_size(1);
    let mut parser = PhoenixParser::new(&grammar, config);
    let outcome = parser.parse_text("hello there");
    assert_eq!(
        outcome.overflow,
        Some(ArenaLimit {
            capacity: Capacity::EdgeBuf,
            limit: 1
        })
    );
}

#[test]
fn parser_recovers_after_overflow() {
    let grammar = greeting();
    let config = ParserConfig::default().with_edge_buf_size(2);
    let mut parser = PhoenixParser::new(&grammar, config);

    let long = vec!["hello"; 8].join(" ");
    assert!(parser.parse_text(&long).overflow.is_some());

    let outcome = parser.parse_text("hello");
    assert!(outcome.overflow.is_none());
    assert_eq!(outcome.parses.len(), 1);
}
