//! Phoenix - frame-grammar compiler and chart parser
//!
//! This crate re-exports all layers of the Phoenix system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: phoenix_cli        - `phoenix` binary: compile, parse, leaves, config
//! Layer 2: phoenix_compiler   - Grammar source → nets (NetBuilder, GrammarCompiler)
//!          phoenix_parser     - Chart matching, slot lattice, parse rendering
//! Layer 1: phoenix_grammar    - Compiled grammar artifact, net/frames file formats
//! Layer 0: phoenix_foundation - Arenas, SymbolTable, WordDictionary, Error
//! ```

pub use phoenix_compiler as compiler;
pub use phoenix_foundation as foundation;
pub use phoenix_grammar as grammar;
pub use phoenix_parser as parser;
