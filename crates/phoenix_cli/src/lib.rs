//! Command line front end for Phoenix grammars.
//!
//! This crate provides:
//! - [`commands`] - Compiling grammars, recomputing leaves and batch parsing
//! - [`Repl`] - Interactive parsing with frame history
//! - [`LineEditor`] - Line editing behind a trait so the REPL can be scripted

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod commands;
pub mod editor;
pub mod repl;

pub use commands::OutputFormat;
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Reply, Repl};
