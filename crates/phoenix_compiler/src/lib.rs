//! Phoenix grammar compiler.
//!
//! Turns line-oriented grammar source into nets:
//!
//! ```text
//! [Greeting]            ← net header: start state, final state, <Greeting> arc
//!     (HELLO *THERE)    ← rewrite rule for the header symbol
//!     (GOOD DAYPART)
//! DAYPART               ← macro: a non-terminal local to this net
//!     (MORNING)
//!     (+VERY LATE [Time])
//! ;                     ← end of net: resolve non-terminals, emit the net
//! ```
//!
//! # Modules
//!
//! - [`config`] - Capacities and file names
//! - [`rule`] - Decorated right-hand-side tokens
//! - [`nfa`] - Construction automaton with non-terminal records
//! - [`builder`] - [`NetBuilder`]: splices one rule into the automaton
//! - [`compiler`] - [`GrammarCompiler`]: the line driver

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod compiler;
pub mod config;
pub mod nfa;
pub mod rule;

pub use builder::{NetBuilder, ResolvedToken};
pub use compiler::{
    Compilation, CompileReport, Diagnostic, GrammarCompiler, NetSummary, Severity, compile_dir,
    parse_net_list,
};
pub use config::CompilerConfig;
pub use nfa::{Label, Nfa};
pub use rule::{RuleToken, parse_rule};
