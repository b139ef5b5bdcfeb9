//! Chart parser and slot lattice for compiled Phoenix grammars.
//!
//! This crate matches sentences against the nets of a [`Grammar`] and turns
//! the matches into ranked frame/slot interpretations.
//!
//! # Architecture
//!
//! ```text
//! "show flights from boston"
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   TOKENIZER     │  → ["SHOW", "FLIGHTS", "FROM", "BOSTON"]
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ SCRIPT          │  → <s> SHOW FLIGHTS FROM BOSTON </s>  (word ids, OOV policy)
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CHART           │  → [List] 1..3, [Depart] 3..5, [City] 4..5, ...
//! │ MATCHING        │
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ SLOT            │  → Flight:[List] Flight:[Depart]  (best cover, ranked)
//! │ LATTICE         │
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ PARSE           │  → Flight:
//! │ TREES           │    [List] ( SHOW FLIGHTS )
//! └─────────────────┘    [Depart] ( FROM [City] ( BOSTON ) )
//! ```
//!
//! # Modules
//!
//! - [`config`] - Parser options and buffer sizes
//! - [`tokenizer`] - Convert raw input to words
//! - [`script`] - The word sequence with boundary symbols
//! - [`chart`] - Edges indexed by start position
//! - [`matcher`] - Matching nets against a script
//! - [`prune`] - First-word tables for bigram pruning
//! - [`lattice`] - Slot sequences and their ranking
//! - [`history`] - Recently chosen frames
//! - [`parse`] - Parse trees and rendering
//! - [`parser`] - Main parser pipeline
//!
//! [`Grammar`]: phoenix_grammar::Grammar

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod chart;
pub mod config;
pub mod history;
pub mod lattice;
pub mod matcher;
pub mod parse;
pub mod parser;
pub mod prune;
pub mod script;
pub mod tokenizer;

// Re-export main types for convenience
pub use chart::{Chart, Edge, EdgeId};
pub use config::ParserConfig;
pub use history::{FrameHistory, HIST_LEN};
pub use lattice::{Candidate, Lattice, LatticeBuilder, SlotIndex};
pub use matcher::{ChartParser, PATH_TREE_DEPTH};
pub use parse::{Parse, ParseNode, ParseOutcome, ParseTree, RenderMode, SlotFill};
pub use parser::PhoenixParser;
pub use script::Script;
pub use tokenizer::InputTokenizer;
