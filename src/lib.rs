//! CustLens: descriptive analysis of a synthetic customer dataset
//!
//! This library implements a sequential batch pipeline over customer records
//! (demographics, income, spending, region, premium status): load a CSV into
//! a columnar table, clean it against a fixed policy, aggregate per-group
//! statistics, and report the results as a console table, flat files, and
//! chart images.

pub mod charts;
pub mod cli;
pub mod data;
pub mod report;
pub mod stats;
pub mod synth;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{CustomerRecord, CustomerTable, DataCleaner, DataLoader};
pub use stats::{Aggregator, Analysis, GroupKey, GroupSummary};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
