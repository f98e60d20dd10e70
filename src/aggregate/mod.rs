//! Result aggregation.
//!
//! Runs the source fetchers in their fixed order and collects one
//! result per platform.

pub mod aggregator;

pub use aggregator::*;
