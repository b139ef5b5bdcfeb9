//! The interactive parse loop.

use std::io::{self, Write};

use phoenix_foundation::{Error, Result};
use phoenix_parser::PhoenixParser;

use crate::commands::{OutputFormat, format_outcome};
use crate::editor::{LineEditor, ReadResult, RustylineEditor};

/// REPL commands, offered for completion.
pub const COMMANDS: &[&str] = &[":clear", ":extract", ":full", ":help", ":json", ":quit"];

/// What one line of input produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// Text to print.
    Text(String),
    /// Leave the loop.
    Quit,
}

/// The interactive REPL.
pub struct Repl<'g, E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Parser with its history.
    parser: PhoenixParser<'g>,

    /// How parses are shown.
    format: OutputFormat,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,
}

impl<'g> Repl<'g, RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(parser: PhoenixParser<'g>) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor, parser))
    }
}

impl<'g, E: LineEditor> Repl<'g, E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(mut editor: E, parser: PhoenixParser<'g>) -> Self {
        let words = parser
            .grammar()
            .dictionary()
            .iter()
            .map(|(_, w)| w.to_string())
            .collect();
        editor.set_words(words);
        Self {
            editor,
            parser,
            format: OutputFormat::default(),
            show_banner: true,
            prompt: "phoenix> ".to_string(),
        }
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// The current output format.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// The parser.
    #[must_use]
    pub const fn parser(&self) -> &PhoenixParser<'g> {
        &self.parser
    }

    /// Runs the REPL loop until EOF or `:quit`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            let line = match self.editor.read_line(&self.prompt)? {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted => continue,
                ReadResult::Eof => break,
            };
            if line.trim().is_empty() {
                continue;
            }
            self.editor.add_history(&line);

            match self.eval(&line) {
                Ok(Reply::Text(text)) => {
                    print!("{text}");
                    let _ = io::stdout().flush();
                }
                Ok(Reply::Quit) => break,
                Err(e) => Self::print_error(&e),
            }
        }
        Ok(())
    }

    /// Handles one line: a `:command` or a sentence to parse.
    ///
    /// # Errors
    ///
    /// Returns a `StringBufSize` overflow when the parse text is too long.
    pub fn eval(&mut self, input: &str) -> Result<Reply> {
        let input = input.trim();
        let reply = match input {
            ":quit" | ":q" => return Ok(Reply::Quit),
            ":clear" => {
                self.parser.clear_history();
                "history cleared\n".to_string()
            }
            ":full" => self.set_format(OutputFormat::Full),
            ":extract" => self.set_format(OutputFormat::Extracts),
            ":json" => self.set_format(OutputFormat::Json),
            ":help" => help(),
            command if command.starts_with(':') => format!("unknown command {command}; try :help\n"),
            sentence => {
                let outcome = self.parser.parse_text(sentence);
                let mut text = format_outcome(&outcome, self.format, self.parser.config().string_buf_size)?;
                if let Some(limit) = outcome.overflow {
                    text.push_str(&format!("Warning: {limit}\n"));
                }
                text
            }
        };
        Ok(Reply::Text(reply))
    }

    fn set_format(&mut self, format: OutputFormat) -> String {
        self.format = format;
        format!("output: {format:?}\n")
    }

    fn print_error(error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
    }

    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        let grammar = self.parser.grammar();
        println!("\x1b[1;36mPhoenix\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
        println!(
            "{} nets, {} frames, {} words. Type a sentence, :help for commands, Ctrl+D to exit.\n",
            grammar.nets().count(),
            grammar.frames().len(),
            grammar.dictionary().len()
        );
        let _ = io::stdout().flush();
    }
}

fn help() -> String {
    "\
:full      print bracketed parse trees
:extract   print Frame:[Slot].[Leaf].WORDS lines
:json      print outcomes as JSON
:clear     forget the frame history
:quit      leave
"
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use phoenix_foundation::WordDictionary;
    use phoenix_grammar::{ArcKind, Grammar, Net, NetArc, NetFile, NetId, State, StateId};
    use phoenix_parser::ParserConfig;

    /// A simple mock editor for testing.
    struct MockEditor {
        inputs: Vec<String>,
        index: usize,
        words: usize,
    }

    impl MockEditor {
        fn new(inputs: Vec<&str>) -> Self {
            Self {
                inputs: inputs.into_iter().map(String::from).collect(),
                index: 0,
                words: 0,
            }
        }
    }

    impl LineEditor for MockEditor {
        fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
            if self.index < self.inputs.len() {
                let line = self.inputs[self.index].clone();
                self.index += 1;
                Ok(ReadResult::Line(line))
            } else {
                Ok(ReadResult::Eof)
            }
        }

        fn add_history(&mut self, _line: &str) {}

        fn set_words(&mut self, words: Vec<String>) {
            self.words = words.len();
        }
    }

    fn grammar() -> Grammar {
        let dictionary = WordDictionary::parse("HELLO 1\n", "base.dic").unwrap();
        let mut net = Net::new(NetId::new(1), "[Greeting]");
        net.states = vec![
            State {
                arcs: vec![NetArc::new(ArcKind::Word(phoenix_foundation::WordId::new(1)), StateId::new(1))],
                is_final: false,
            },
            State {
                arcs: vec![],
                is_final: true,
            },
        ];
        let file = NetFile {
            declared: 1,
            nets: vec![net],
        };
        Grammar::new(dictionary, file).unwrap()
    }

    #[test]
    fn sentences_are_parsed() {
        let grammar = grammar();
        let parser = PhoenixParser::new(&grammar, ParserConfig::default());
        let mut repl = Repl::with_editor(MockEditor::new(vec![]), parser);
        assert_eq!(repl.editor.words, 1);

        let Reply::Text(text) = repl.eval("hello").unwrap() else {
            panic!("expected text");
        };
        assert_eq!(text, "Parse 1:\n[Greeting] ( HELLO )\n");
    }

    #[test]
    fn commands_switch_format() {
        let grammar = grammar();
        let parser = PhoenixParser::new(&grammar, ParserConfig::default());
        let mut repl = Repl::with_editor(MockEditor::new(vec![]), parser);

        repl.eval(":json").unwrap();
        assert_eq!(repl.format(), OutputFormat::Json);
        let Reply::Text(text) = repl.eval("hello").unwrap() else {
            panic!("expected text");
        };
        assert!(text.contains("\"parses\""));

        assert_eq!(repl.eval(":quit").unwrap(), Reply::Quit);
        let Reply::Text(text) = repl.eval(":nope").unwrap() else {
            panic!("expected text");
        };
        assert!(text.starts_with("unknown command"));
    }

    #[test]
    fn run_stops_at_quit() {
        let grammar = grammar();
        let parser = PhoenixParser::new(&grammar, ParserConfig::default());
        let editor = MockEditor::new(vec!["", ":quit", "hello"]);
        let mut repl = Repl::with_editor(editor, parser).without_banner();
        repl.run().unwrap();
        assert_eq!(repl.editor.index, 2);
    }
}
