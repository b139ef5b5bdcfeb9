//! Batch parsing through the command front end.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use phoenix_cli::commands::{OutputFormat, compile, load_grammar, parse_lines, recompute_leaves};
use phoenix_compiler::CompilerConfig;
use phoenix_grammar::read_nets;
use phoenix_parser::{ParserConfig, PhoenixParser};

const SOURCE: &str = "\
[Greeting]
\t(HELLO *THERE)
\t(GOOD DAYPART)
DAYPART
\t(MORNING)
\t(EVENING)
;
[Name]
\t(i am [person])
;
[person]
\t(bob)
\t(alice)
;
";

fn setup(dir: &Path) {
    fs::write(dir.join("nets"), "Greeting Name person\n").unwrap();
    fs::write(dir.join("greet.gra"), SOURCE).unwrap();
    fs::write(dir.join("forms"), "FUNCTION: Meet\nNETS:\n\t[Greeting]\n\t[Name]\n;\n").unwrap();
}

fn run(dir: &Path, config: ParserConfig, input: &str, format: OutputFormat) -> String {
    let grammar = load_grammar(dir, "greet", None, None, &config).unwrap();
    let mut parser = PhoenixParser::new(&grammar, config);
    let mut output = Vec::new();
    parse_lines(&mut parser, Cursor::new(input), &mut output, format).unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn compile_then_parse_full() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());
    compile(dir.path(), "greet", &CompilerConfig::default()).unwrap();

    let text = run(
        dir.path(),
        ParserConfig::default(),
        "hello there i am bob\n\n  good evening  \n",
        OutputFormat::Full,
    );
    assert_eq!(
        text,
        ";;; hello there i am bob\n\
         Parse 1:\n\
         Meet:\n\
         [Greeting] ( HELLO THERE )\n\
         [Name] ( I AM [person] ( BOB ) )\n\
         ;;; good evening\n\
         Parse 1:\n\
         Meet:\n\
         [Greeting] ( GOOD EVENING )\n"
    );
}

#[test]
fn extracts_stop_at_concept_leaves() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());
    compile(dir.path(), "greet", &CompilerConfig::default()).unwrap();

    // [person] is not a concept, so [Name] is a leaf and is printed whole.
    let text = run(dir.path(), ParserConfig::default(), "i am alice\n", OutputFormat::Extracts);
    assert_eq!(text, ";;; i am alice\nParse 1:\nMeet:[Name].I AM ALICE\n");
}

#[test]
fn json_lines_have_no_echo() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());
    compile(dir.path(), "greet", &CompilerConfig::default()).unwrap();

    let text = run(dir.path(), ParserConfig::default(), "hello\n", OutputFormat::Json);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["tokens"][0], "HELLO");
    assert_eq!(json["parses"][0]["slots"][0]["tree"]["net"], "[Greeting]");
}

#[test]
fn overflow_is_reported_inline() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());
    compile(dir.path(), "greet", &CompilerConfig::default()).unwrap();

    let config = ParserConfig::default().with_edge_buf_size(1);
    let text = run(dir.path(), config, "hello there\n", OutputFormat::Full);
    assert!(text.ends_with("Warning: EdgeBufSize= 1 exceeded\n"));
}

#[test]
fn options_file_configures_the_parser() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());
    compile(dir.path(), "greet", &CompilerConfig::default()).unwrap();
    fs::write(dir.path().join("parser.cfg"), "# strict\nIGNORE_OOV 0\n").unwrap();

    let mut config = ParserConfig::default();
    config.load_options(dir.path().join("parser.cfg")).unwrap();
    let text = run(dir.path(), config, "hello xyzzy there\n", OutputFormat::Full);
    assert!(text.contains("[Greeting] ( HELLO )\n"));
    assert!(text.contains("Unparsed: XYZZY THERE\n"));
}

#[test]
fn leaves_are_recomputed_in_place() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());
    compile(dir.path(), "greet", &CompilerConfig::default()).unwrap();
    let path = dir.path().join("greet.net");

    let text = fs::read_to_string(&path).unwrap();
    let cleared = text.replacen(" 1 _\n", " 0 _\n", 1);
    assert_ne!(cleared, text);
    fs::write(&path, cleared).unwrap();

    assert_eq!(recompute_leaves(&path).unwrap(), 2);
    let file = read_nets(&fs::read_to_string(&path).unwrap(), "greet.net").unwrap();
    let leaves: Vec<_> = file.nets.iter().filter(|n| n.concept_leaf).map(|n| n.name.as_str()).collect();
    assert_eq!(leaves, vec!["[Greeting]", "[Name]"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}
