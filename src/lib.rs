//! Tastingboard - statistics and reports for a cheese-tasting panel.
//!
//! The crate loads a tasting sheet into a [`models::TastingTable`],
//! reduces it with the pure functions in [`analysis`], and hands the
//! results to one of the [`report`] renderers.

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod source;

pub use analysis::Aggregates;
pub use error::TastingError;
pub use models::{TastingRecord, TastingTable};
