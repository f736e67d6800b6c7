//! # geospec parallel
//!
//! Execution strategies for running pipeline stages over many independent
//! units. Results always come back in input order, so a parallel run is
//! indistinguishable from a sequential one.
//!
//! Without the `parallel` feature every mode runs sequentially.

pub mod strategy;

pub use strategy::{num_threads, ParallelStrategy, ProcessingMode};
