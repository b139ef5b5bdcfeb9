//! Grammars written differently but meaning the same thing parse alike.

use phoenix_compiler::{CompilerConfig, GrammarCompiler};
use phoenix_foundation::WordDictionary;
use phoenix_grammar::{Grammar, NetFile};
use phoenix_parser::{ParserConfig, PhoenixParser};
use proptest::prelude::*;

fn compile(names: &[&str], source: &str) -> Grammar {
    let mut compiler = GrammarCompiler::new(CompilerConfig::default(), WordDictionary::new());
    compiler.register_nets(names).unwrap();
    compiler.compile_source(source, "test.gra").unwrap();
    let (compilation, dictionary) = compiler.finish().unwrap();
    let file = NetFile {
        declared: compilation.declared,
        nets: compilation.nets,
    };
    Grammar::new(dictionary, file).unwrap()
}

/// Spans of the best parse's slots, as `(net, start, end)`.
fn spans(grammar: &Grammar, words: &[&str]) -> Vec<(String, usize, usize)> {
    let mut parser = PhoenixParser::new(grammar, ParserConfig::default().with_ignore_oov(false));
    let outcome = parser.parse_words(words);
    outcome
        .best()
        .map(|p| p.slots.iter().map(|s| (s.tree.net.clone(), s.tree.start, s.tree.end)).collect())
        .unwrap_or_default()
}

const WORDS: &[&str] = &["go", "again", "good", "morning", "evening", "night"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn zero_or_more_forms_agree(words in prop::collection::vec(prop::sample::select(WORDS), 0..8)) {
        let star_plus = compile(&["[A]"], "[A]\n\t(go *+again)\n;\n");
        let optional_then_repeat = compile(&["[A]"], "[A]\n\t(go)\n\t(go +again)\n;\n");
        prop_assert_eq!(spans(&star_plus, &words), spans(&optional_then_repeat, &words));
    }

    #[test]
    fn macros_are_transparent(words in prop::collection::vec(prop::sample::select(WORDS), 0..8)) {
        let with_macro = compile(&["[A]"], "[A]\n\t(good DAYPART)\nDAYPART\n\t(morning)\n\t(evening)\n;\n");
        let inline = compile(&["[A]"], "[A]\n\t(good morning)\n\t(good evening)\n;\n");
        prop_assert_eq!(spans(&with_macro, &words), spans(&inline, &words));
    }
}

#[test]
fn repeats_cover_every_again() {
    let grammar = compile(&["[A]"], "[A]\n\t(go *+again)\n;\n");
    assert_eq!(spans(&grammar, &["go"]), vec![("[A]".to_string(), 0, 1)]);
    assert_eq!(spans(&grammar, &["go", "again", "again"]), vec![("[A]".to_string(), 0, 3)]);
    assert!(spans(&grammar, &["again"]).is_empty());
}
