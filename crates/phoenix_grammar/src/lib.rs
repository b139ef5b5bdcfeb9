//! The compiled grammar artifact consumed by the Phoenix parser.
//!
//! A grammar is a set of numbered nets (automata over words and calls to
//! other nets), the word dictionary their arcs refer to, the frames that
//! group slot nets into top-level interpretations, and per-net priorities.
//!
//! # Modules
//!
//! - [`net`] - Net, state and arc types
//! - [`netfile`] - Reading and writing the compiled net file
//! - [`frames`] - Frame definitions file
//! - [`priorities`] - Net priority file
//! - [`leaf`] - Concept-leaf marking
//! - [`grammar`] - The loaded [`Grammar`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod frames;
pub mod grammar;
pub mod leaf;
pub mod net;
pub mod netfile;
pub mod priorities;

pub use frames::{FrameDef, FrameId, parse_frames};
pub use grammar::{Grammar, GrammarFiles};
pub use leaf::{is_concept_name, mark_concept_leaves};
pub use net::{ArcKind, Net, NetArc, NetId, State, StateId};
pub use netfile::{NetFile, read_nets, write_nets};
pub use priorities::parse_priorities;
