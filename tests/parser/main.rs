//! Integration tests for the chart parser
//!
//! Tests parsing against grammars compiled from source: spans, unknown
//! words, buffer overflows, frames and priorities, and rendering.

mod fixtures;

mod flight_tests;
mod greeting_tests;
mod invariant_tests;
