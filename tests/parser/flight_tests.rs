//! Parsing against the flight grammar, loaded from a compiled directory.

use std::collections::HashSet;

use phoenix_parser::{ParserConfig, PhoenixParser, RenderMode};

use crate::fixtures::flights_in;

fn frames_of(parse: &phoenix_parser::Parse) -> Vec<&str> {
    parse.slots.iter().filter_map(|s| s.frame.as_deref()).collect()
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn full_form_groups_slots_under_frame() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = flights_in(dir.path(), None);
    let mut parser = PhoenixParser::new(&grammar, ParserConfig::default());

    let outcome = parser.parse_text("show me flights from boston to denver");
    assert_eq!(outcome.parses.len(), 1);
    assert_eq!(
        outcome.best().unwrap().render(RenderMode::Full),
        "Flight:\n\
         [List] ( SHOW ME FLIGHTS )\n\
         [Depart] ( FROM [City] ( BOSTON ) )\n\
         [Arrive] ( TO [City] ( DENVER ) )\n"
    );
}

#[test]
fn extracts_descend_to_concept_leaves() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = flights_in(dir.path(), None);
    let mut parser = PhoenixParser::new(&grammar, ParserConfig::default());

    let outcome = parser.parse_text("list the flights to san francisco");
    assert_eq!(
        outcome.best().unwrap().render(RenderMode::Extracts),
        "Flight:[List].LIST THE FLIGHTS\nFlight:[Arrive].[City].SAN FRANCISCO\n"
    );
}

#[test]
fn outcome_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = flights_in(dir.path(), None);
    let mut parser = PhoenixParser::new(&grammar, ParserConfig::default());

    let outcome = parser.parse_text("list flights to boston please");
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["parses"][0]["slots"][0]["frame"], "Flight");
    assert_eq!(json["parses"][0]["slots"][1]["tree"]["net"], "[Arrive]");
    assert_eq!(json["parses"][0]["unparsed"][0], "PLEASE");
    assert!(json["overflow"].is_null());
}

// =============================================================================
// Frames
// =============================================================================

#[test]
fn ambiguous_slot_gives_one_parse_per_frame() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = flights_in(dir.path(), None);
    let mut parser = PhoenixParser::new(&grammar, ParserConfig::default());

    let outcome = parser.parse_text("from boston");
    let frames: HashSet<_> = outcome.parses.iter().flat_map(frames_of).collect();
    assert_eq!(outcome.parses.len(), 2);
    assert_eq!(frames, HashSet::from(["Flight", "Mail"]));
}

#[test]
fn fewer_frames_win() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = flights_in(dir.path(), None);
    let mut parser = PhoenixParser::new(&grammar, ParserConfig::default());

    let outcome = parser.parse_text("list flights from boston");
    assert_eq!(outcome.parses.len(), 1);
    assert_eq!(frames_of(&outcome.parses[0]), vec!["Flight", "Flight"]);
    assert_eq!(outcome.parses[0].frames, 1);
}

#[test]
fn priorities_break_ties() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = flights_in(dir.path(), Some("# prefer mail\n[Source] 2\n"));
    let mut parser = PhoenixParser::new(&grammar, ParserConfig::default());

    let outcome = parser.parse_text("from denver");
    assert_eq!(outcome.parses.len(), 2);
    assert_eq!(frames_of(&outcome.parses[0]), vec!["Mail"]);
}

#[test]
fn history_prefers_the_recent_frame() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = flights_in(dir.path(), None);
    let mut parser = PhoenixParser::new(&grammar, ParserConfig::default().with_history(true));

    parser.parse_text("list flights");
    assert_eq!(parser.history().len(), 1);

    let outcome = parser.parse_text("from boston");
    assert_eq!(frames_of(&outcome.parses[0]), vec!["Flight"]);
}
