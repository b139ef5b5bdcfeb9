//! End-to-end tests
//!
//! Grammar source goes in, parses come out: compiling a directory, loading
//! it, and running sentences through the batch front end.

mod batch_tests;
mod equivalence_tests;
