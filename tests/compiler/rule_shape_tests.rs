//! Integration tests for rule decorations and macro expansion

use phoenix_compiler::{CompilerConfig, GrammarCompiler};
use phoenix_foundation::WordDictionary;
use phoenix_grammar::{ArcKind, Net};

fn compile(names: &[&str], source: &str) -> (Vec<Net>, WordDictionary) {
    let mut compiler = GrammarCompiler::new(CompilerConfig::default(), WordDictionary::new());
    compiler.register_nets(names).unwrap();
    compiler.compile_source(source, "test.gra").unwrap();
    let (compilation, dictionary) = compiler.finish().unwrap();
    assert!(compilation.report.diagnostics.is_empty(), "{:?}", compilation.report.diagnostics);
    (compilation.nets, dictionary)
}

#[test]
fn prefix_order_does_not_matter() {
    let source = "[A]\n\t(go *+again)\n;\n[B]\n\t(go +*again)\n;\n";
    let (nets, _) = compile(&["[A]", "[B]"], source);
    assert_eq!(nets[0].states, nets[1].states);
}

#[test]
fn macro_words_land_in_the_net() {
    let source = "\
[Greeting]
\t(good DAYPART)
DAYPART
\t(morning)
\t(evening)
;
";
    let (nets, dictionary) = compile(&["[Greeting]"], source);
    let words: Vec<_> = nets[0]
        .states
        .iter()
        .flat_map(|s| &s.arcs)
        .filter_map(|a| match a.kind {
            ArcKind::Word(id) => dictionary.word(id),
            _ => None,
        })
        .collect();
    assert!(words.contains(&"MORNING"));
    assert!(words.contains(&"EVENING"));
    assert!(dictionary.lookup("DAYPART").is_none());
}

#[test]
fn compiled_nets_are_numbered_by_net_list() {
    let source = "[City]\n\t(boston)\n;\n[Depart]\n\t(from [City])\n;\n";
    let (nets, _) = compile(&["[Depart]", "[City]"], source);
    let ids: Vec<_> = nets.iter().map(|n| (n.name.as_str(), n.id.index())).collect();
    assert_eq!(ids, vec![("[City]", 2), ("[Depart]", 1)]);
}
