//! Integration tests for the foundation layer
//!
//! Tests the word dictionary, the symbol table and error reporting.

mod dictionary_tests;
mod error_tests;
mod symbol_tests;
