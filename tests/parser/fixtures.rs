//! Grammars compiled from source for the parser tests.

use std::fs;
use std::path::Path;

use phoenix_compiler::{CompilerConfig, GrammarCompiler, compile_dir};
use phoenix_foundation::WordDictionary;
use phoenix_grammar::{Grammar, GrammarFiles, NetFile};

/// Compiles `source` in memory with `names` as the net list.
pub fn compile(names: &[&str], source: &str) -> Grammar {
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

pub fn greeting() -> Grammar {
    compile(&["[Greeting]"], "[Greeting]\n\t(HELLO *THERE)\n;\n")
}

pub const FLIGHTS: &str = "\
[List]
\t(*please show me FLIGHTS)
\t(list FLIGHTS)
FLIGHTS
\t(+flights)
\t(the flights)
;
[Depart]
\t(from [City])
;
[Arrive]
\t(to [City])
;
[Source]
\t(from [City])
;
[City]
\t(boston)
\t(denver)
\t(san francisco)
;
";

pub const FORMS: &str = "\
FUNCTION: Flight
NETS:
\t[List]
\t[Depart]
\t[Arrive]
;
FUNCTION: Mail
NETS:
\t[Source]
;
";

/// Writes and compiles the flight grammar in `dir`, then loads it.
pub fn flights_in(dir: &Path, priorities: Option<&str>) -> Grammar {
    fs::write(dir.join("nets"), "List Depart Arrive Source City\n").unwrap();
    fs::write(dir.join("flights.gra"), FLIGHTS).unwrap();
    fs::write(dir.join(GrammarFiles::FRAMES), FORMS).unwrap();
    if let Some(text) = priorities {
        fs::write(dir.join(GrammarFiles::PRIORITIES), text).unwrap();
    }
    compile_dir(dir, "flights", &CompilerConfig::default()).unwrap();
    Grammar::load(&GrammarFiles::in_dir(dir, "flights"), 100_000).unwrap()
}
