//! Core types shared by the Phoenix compiler and parser.
//!
//! This crate provides:
//! - [`Arena`] - Fixed-capacity, index-addressed storage with explicit overflow
//! - [`SymbolTable`] - Net names, non-terminals and words mapped to dense ids
//! - [`WordDictionary`] - Persistent upper-cased word ↔ id table
//! - [`Error`] - Error types with file/line context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod dictionary;
pub mod error;
pub mod symbol;

pub use arena::{Arena, ArenaId, Span};
pub use dictionary::{WordDictionary, WordId};
pub use error::{ArenaLimit, Capacity, Error, ErrorContext, ErrorKind, Result};
pub use symbol::{SymbolClass, SymbolId, SymbolTable};
