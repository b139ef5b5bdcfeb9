//! Integration tests for the grammar compiler
//!
//! Tests compiling grammar directories, the net file round-trip and how
//! rule decorations and macros shape the compiled nets.

mod compile_dir_tests;
mod rule_shape_tests;
