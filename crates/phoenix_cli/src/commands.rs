//! Subcommand implementations shared by the binary and the REPL.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use phoenix_compiler::{Compilation, CompilerConfig, Severity, compile_dir};
use phoenix_foundation::{Error, ErrorKind, Result};
use phoenix_grammar::{Grammar, GrammarFiles, mark_concept_leaves, read_nets, write_nets};
use phoenix_parser::{ParseOutcome, ParserConfig, PhoenixParser, RenderMode};

/// How parse results are printed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Bracketed trees under frame headers.
    #[default]
    Full,
    /// `Frame:[Slot].[Leaf].WORDS` lines.
    Extracts,
    /// The whole outcome as JSON.
    Json,
}

/// Compiles `<dir>/<name>.gra` and logs its diagnostics.
///
/// # Errors
///
/// Fails if the grammar cannot be compiled at all; rule-level problems are
/// only logged.
pub fn compile(dir: &Path, name: &str, config: &CompilerConfig) -> Result<Compilation> {
    let compilation = compile_dir(dir, name, config)?;
    for diagnostic in &compilation.report.diagnostics {
        match diagnostic.severity {
            Severity::Warning => warn!("{diagnostic}"),
            Severity::Error => error!("{diagnostic}"),
        }
    }
    Ok(compilation)
}

/// Recomputes the concept leaf flags of a net file in place, returning the
/// number of leaves.
///
/// # Errors
///
/// Fails if the file cannot be read, parsed or written.
pub fn recompute_leaves(path: &Path) -> Result<usize> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let mut file = read_nets(&text, &path.display().to_string())?;
    mark_concept_leaves(&mut file.nets);
    fs::write(path, write_nets(file.declared, &file.nets)).map_err(|e| Error::io(path, e))?;

    let leaves = file.nets.iter().filter(|n| n.concept_leaf).count();
    info!("{}: {leaves} concept leaves among {} nets", path.display(), file.nets.len());
    Ok(leaves)
}

/// Loads the compiled grammar `name` from `dir`.
///
/// # Errors
///
/// Fails if a grammar file is missing or malformed.
pub fn load_grammar(
    dir: &Path,
    name: &str,
    frames: Option<PathBuf>,
    priorities: Option<PathBuf>,
    config: &ParserConfig,
) -> Result<Grammar> {
    let mut files = GrammarFiles::in_dir(dir, name);
    if let Some(path) = frames {
        files = files.with_frames(path);
    }
    if let Some(path) = priorities {
        files = files.with_priorities(path);
    }
    Grammar::load(&files, config.sym_buf_size)
}

/// Formats one outcome.
///
/// # Errors
///
/// Returns a `StringBufSize` overflow for oversized text.
pub fn format_outcome(outcome: &ParseOutcome, format: OutputFormat, limit: usize) -> Result<String> {
    match format {
        OutputFormat::Full => outcome.render(RenderMode::Full, limit),
        OutputFormat::Extracts => outcome.render(RenderMode::Extracts, limit),
        OutputFormat::Json => serde_json::to_string_pretty(outcome)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string()))),
    }
}

/// Parses every non-blank line of `input`, writing the results to `output`.
/// Returns the number of sentences parsed.
///
/// # Errors
///
/// Fails on I/O errors. A sentence whose text overflows is reported in the
/// output and does not stop the run.
pub fn parse_lines<R: BufRead, W: Write>(
    parser: &mut PhoenixParser<'_>,
    input: R,
    output: &mut W,
    format: OutputFormat,
) -> Result<usize> {
    let limit = parser.config().string_buf_size;
    let io = |e: std::io::Error| Error::io("<output>", e);
    let mut count = 0;
    for line in input.lines() {
        let line = line.map_err(|e| Error::io("<input>", e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let outcome = parser.parse_text(line);
        count += 1;
        if format != OutputFormat::Json {
            writeln!(output, ";;; {line}").map_err(io)?;
        }
        match format_outcome(&outcome, format, limit) {
            Ok(text) => output.write_all(text.as_bytes()).map_err(io)?,
            Err(err) => writeln!(output, "Error: {err}").map_err(io)?,
        }
        if let Some(limit) = outcome.overflow {
            writeln!(output, "Warning: {limit}").map_err(io)?;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn grammar_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nets"), "Greeting\n").unwrap();
        fs::write(dir.path().join("hi.gra"), "[Greeting]\n\t(HELLO *THERE)\n;\n").unwrap();
        compile(dir.path(), "hi", &CompilerConfig::default()).unwrap();
        dir
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = grammar_dir();
        let config = ParserConfig::default();
        let grammar = load_grammar(dir.path(), "hi", None, None, &config).unwrap();
        let mut parser = PhoenixParser::new(&grammar, config);

        let mut output = Vec::new();
        let count = parse_lines(&mut parser, Cursor::new("hello\n\n  \nthere\n"), &mut output, OutputFormat::Full).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            ";;; hello\nParse 1:\n[Greeting] ( HELLO )\n;;; there\nNo parse\n"
        );
    }

    #[test]
    fn oversized_text_is_reported_per_line() {
        let dir = grammar_dir();
        let mut config = ParserConfig::default();
        config.set_option("StringBufSize", "5").unwrap();
        let grammar = load_grammar(dir.path(), "hi", None, None, &config).unwrap();
        let mut parser = PhoenixParser::new(&grammar, config);

        let mut output = Vec::new();
        parse_lines(&mut parser, Cursor::new("hello\n"), &mut output, OutputFormat::Extracts).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with(";;; hello\nError: "));
        assert!(text.contains("StringBufSize= 5 exceeded"));
    }

    #[test]
    fn leaves_count_concepts() {
        let dir = grammar_dir();
        assert_eq!(recompute_leaves(&dir.path().join("hi.net")).unwrap(), 1);
    }
}
