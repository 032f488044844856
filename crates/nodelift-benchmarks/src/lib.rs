//! nodelift benchmarking suite
//!
//! Benchmarks for range translation, manifest normalization and source
//! rewriting.

pub mod common;

pub use common::*;
