//! Chart assembly for the biochart engine.
//!
//! This module contains:
//! - Dense per-type grid allocation and placement
//! - The aggregation pipeline that turns one fetched batch into a dataset

pub mod grid;
pub mod pipeline;

// Re-export commonly used types
pub use grid::{Grid, GridBuilder};
pub use pipeline::{AggregationPipeline, ChartDataset, IntervalPreset};
