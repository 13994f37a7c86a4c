//! Tasting statistics.
//!
//! The aggregator is the only place scores are reduced; presentation
//! adapters consume its output without recomputing anything.

pub mod aggregator;
pub mod stats;

pub use aggregator::*;
