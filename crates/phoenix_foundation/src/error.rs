//! Error types for the Phoenix system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::symbol::SymbolClass;

/// Result alias used throughout Phoenix.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Phoenix operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an arena overflow error.
    #[must_use]
    pub fn arena_overflow(capacity: Capacity, limit: usize) -> Self {
        Self::new(ErrorKind::ArenaOverflow(ArenaLimit { capacity, limit }))
    }

    /// Creates a malformed grammar line error.
    #[must_use]
    pub fn malformed_line(message: impl Into<String>, line: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedLine {
            message: message.into(),
            line: line.into(),
        })
    }

    /// Creates a file format error.
    #[must_use]
    pub fn format(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format {
            file: file.into(),
            line,
            message: message.into(),
        })
    }

    /// Creates an I/O error for the given path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(ErrorKind::Io {
            path: path.into(),
            source,
        })
    }

    /// Creates an invalid configuration option error.
    #[must_use]
    pub fn invalid_option(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOption {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Returns the exceeded limit if this is an arena overflow.
    #[must_use]
    pub fn overflow(&self) -> Option<&ArenaLimit> {
        match &self.kind {
            ErrorKind::ArenaOverflow(limit) => Some(limit),
            _ => None,
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A fixed-capacity buffer is exhausted.
    #[error("arena overflow: {0}")]
    ArenaOverflow(ArenaLimit),

    /// A grammar source line could not be classified or parsed.
    #[error("bad format: {message}: {line}")]
    MalformedLine {
        /// Description of what is wrong.
        message: String,
        /// The offending line.
        line: String,
    },

    /// A net name appears twice in the net list.
    #[error("duplicate net name {0}")]
    DuplicateNet(String),

    /// A symbol was re-used with a different class.
    #[error("symbol {symbol} already defined as {existing}")]
    SymbolClass {
        /// The symbol text.
        symbol: String,
        /// The class it was first interned with.
        existing: SymbolClass,
    },

    /// A compiled artifact (net, dictionary, frames, priorities) is malformed.
    #[error("{file}:{line}: {message}")]
    Format {
        /// Which file kind or path.
        file: String,
        /// Line number (1-indexed).
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration option name or value is not recognised.
    #[error("invalid option {name}={value}")]
    InvalidOption {
        /// Option name.
        name: String,
        /// Rejected value.
        value: String,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// The configured buffers whose exhaustion is reported as an overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capacity {
    /// Chart edges.
    EdgeBuf,
    /// Chart bucket links.
    ChartBuf,
    /// Edge child pointers.
    PeBuf,
    /// Input tokens per sentence.
    InputBuf,
    /// Lattice sequence nodes.
    SeqBuf,
    /// Frame label walk nodes.
    FrameBuf,
    /// Priority histogram counters.
    PriBuf,
    /// Per-node frame fragmentation records.
    FidBuf,
    /// Loaded word and net name text.
    SymBuf,
    /// Rendered parse text.
    StringBuf,
    /// Parses kept per sentence.
    ParseBuf,
    /// Automaton states of one net.
    Nfa,
    /// Automaton arcs of one net.
    SucLink,
    /// Non-terminal records of one net.
    NonTerm,
    /// Symbol table entries.
    Symbol,
}

impl Capacity {
    /// The configuration option that sets this capacity.
    #[must_use]
    pub const fn option_name(self) -> &'static str {
        match self {
            Self::EdgeBuf => "EdgeBufSize",
            Self::ChartBuf => "ChartBufSize",
            Self::PeBuf => "PeBufSize",
            Self::InputBuf => "InputBufSize",
            Self::SeqBuf => "SeqBufSize",
            Self::FrameBuf => "FrameBufSize",
            Self::PriBuf => "PriBufSize",
            Self::FidBuf => "FidBufSize",
            Self::SymBuf => "SymBufSize",
            Self::StringBuf => "StringBufSize",
            Self::ParseBuf => "ParseBufSize",
            Self::Nfa => "MaxNfa",
            Self::SucLink => "MaxSucLink",
            Self::NonTerm => "MaxNonTerm",
            Self::Symbol => "MaxSymbol",
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

/// An exceeded capacity together with its configured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaLimit {
    /// Which buffer overflowed.
    pub capacity: Capacity,
    /// The configured limit.
    pub limit: usize,
}

impl fmt::Display for ArenaLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}= {} exceeded", self.capacity, self.limit)
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file.
    pub source: Option<String>,
    /// Line number in source (1-indexed).
    pub line: Option<usize>,
    /// Net being compiled or matched.
    pub net: Option<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source file.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line number.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets the net name.
    #[must_use]
    pub fn with_net(mut self, net: impl Into<String>) -> Self {
        self.net = Some(net.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
        }
        if let Some(net) = &self.net {
            if self.source.is_some() {
                f.write_str(" ")?;
            }
            write!(f, "in {net}")?;
        }
        Ok(())
    }
}
