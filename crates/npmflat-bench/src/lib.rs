#![deny(clippy::all)]
#![warn(clippy::pedantic)]

//! Benchmark harness for npmflat.
//!
//! Run benchmarks with: `cargo bench -p npmflat-bench`
//!
//! This crate only holds criterion benchmarks.
