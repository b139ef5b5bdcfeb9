//! Integration tests for compiling a grammar directory

use std::fs;
use std::path::Path;

use phoenix_compiler::{CompilerConfig, Severity, compile_dir};
use phoenix_foundation::{Capacity, WordDictionary};
use phoenix_grammar::{Grammar, GrammarFiles, read_nets};

const FLIGHTS: &str = "\
# flight queries
[List]
\t(*please show me FLIGHTS)
FLIGHTS
\t(+flights)
\t(the flights)
;
[Depart]
\t(from [City])
;
[City]
\t(boston)
\t(san francisco)
;
";

fn write_grammar(dir: &Path) {
    fs::write(dir.join("nets"), "List\nDepart\nCity\n").unwrap();
    fs::write(dir.join("flights.gra"), FLIGHTS).unwrap();
}

// =============================================================================
// Directory Layout
// =============================================================================

#[test]
fn compiled_directory_loads_as_grammar() {
    let dir = tempfile::tempdir().unwrap();
    write_grammar(dir.path());

    let compilation = compile_dir(dir.path(), "flights", &CompilerConfig::default()).unwrap();
    assert_eq!(compilation.declared, 3);
    assert!(compilation.report.diagnostics.is_empty());

    let grammar = Grammar::load(&GrammarFiles::in_dir(dir.path(), "flights"), 100_000).unwrap();
    assert_eq!(grammar.nets().count(), 3);
    assert!(grammar.dictionary().lookup("francisco").is_some());
    assert!(grammar.dictionary().lookup("FLIGHTS").is_some());

    let city = grammar.net_by_name("[City]").unwrap();
    let depart = grammar.net_by_name("[Depart]").unwrap();
    assert!(grammar.net(city).unwrap().concept_leaf);
    assert!(!grammar.net(depart).unwrap().concept_leaf);
}

#[test]
fn recompiling_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    write_grammar(dir.path());
    let config = CompilerConfig::default();

    compile_dir(dir.path(), "flights", &config).unwrap();
    let nets = fs::read_to_string(dir.path().join("flights.net")).unwrap();
    let dictionary = fs::read_to_string(dir.path().join("base.dic")).unwrap();

    compile_dir(dir.path(), "flights", &config).unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("flights.net")).unwrap(), nets);
    assert_eq!(fs::read_to_string(dir.path().join("base.dic")).unwrap(), dictionary);
}

#[test]
fn existing_dictionary_ids_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    write_grammar(dir.path());
    fs::write(dir.path().join("base.dic"), "BOSTON 40\n").unwrap();

    compile_dir(dir.path(), "flights", &CompilerConfig::default()).unwrap();
    let dict = WordDictionary::load(dir.path().join("base.dic")).unwrap();
    assert_eq!(dict.lookup("BOSTON").map(|id| id.index()), Some(40));
    assert!(dict.lookup("FROM").is_some_and(|id| id.index() > 40));
}

#[test]
fn written_net_file_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    write_grammar(dir.path());
    let compilation = compile_dir(dir.path(), "flights", &CompilerConfig::default()).unwrap();

    let text = fs::read_to_string(dir.path().join("flights.net")).unwrap();
    let file = read_nets(&text, "flights.net").unwrap();
    assert_eq!(file.declared, compilation.declared);
    assert_eq!(file.nets, compilation.nets);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn missing_net_list_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("flights.gra"), FLIGHTS).unwrap();
    let err = compile_dir(dir.path(), "flights", &CompilerConfig::default()).unwrap_err();
    assert!(err.to_string().contains("nets"));
}

#[test]
fn rule_errors_do_not_stop_compilation() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("nets"), "City\n").unwrap();
    fs::write(dir.path().join("g.gra"), "[City]\n\tboston\n\t(denver)\n;\n").unwrap();

    let compilation = compile_dir(dir.path(), "g", &CompilerConfig::default()).unwrap();
    assert_eq!(compilation.nets.len(), 1);
    let severities: Vec<_> = compilation.report.diagnostics.iter().map(|d| d.severity).collect();
    assert_eq!(severities, vec![Severity::Error]);
}

#[test]
fn small_state_budget_overflows() {
    let dir = tempfile::tempdir().unwrap();
    write_grammar(dir.path());
    let config = CompilerConfig::default().with_max_nfa(2);

    let err = compile_dir(dir.path(), "flights", &config).unwrap_err();
    assert_eq!(err.overflow().map(|l| l.capacity), Some(Capacity::Nfa));
    assert!(!dir.path().join("flights.net").exists());
}
