//! Biochart - temporal-binning and aggregation engine for biometric charts.
//!
//! This library converts an unordered batch of timestamped biometric
//! readings (weight, temperature, blood pressure, glucose, pulse) into
//! fixed-interval matrices suitable for charting, together with the min/max
//! bounds needed to scale axes. Rendering and storage of readings live
//! outside the crate; retrieval is consumed through the [`fetch::ReadingStore`]
//! capability.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Chart build (one worker)                │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────────┐   ┌───────────────┐        │
//! │  │  Fetch   │──▶│ BoundsTracker │──▶│ TimePartition │        │
//! │  │ (1-shot) │   │  (min/max)    │   │  (buckets)    │        │
//! │  └──────────┘   └───────────────┘   └───────┬───────┘        │
//! │                                             ▼                │
//! │                                     ┌───────────────┐        │
//! │                                     │  GridBuilder  │        │
//! │                                     │ (per-type 2D) │        │
//! │                                     └───────┬───────┘        │
//! │                                             ▼                │
//! │                                      ChartDataset            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Charts are time-of-day histograms: readings from different calendar days
//! aggregate into one daily cycle. Every grid of a build shares the bucket
//! count of one partition derived from the global time-of-day bound.
//!
//! # Example
//!
//! ```
//! use biochart::chart::{AggregationPipeline, IntervalPreset};
//! use biochart::model::Reading;
//! use chrono::NaiveDate;
//!
//! let morning = NaiveDate::from_ymd_opt(2022, 9, 1)
//!     .unwrap()
//!     .and_hms_opt(7, 0, 0)
//!     .unwrap();
//! let evening = NaiveDate::from_ymd_opt(2022, 9, 2)
//!     .unwrap()
//!     .and_hms_opt(21, 0, 0)
//!     .unwrap();
//! let readings = vec![
//!     Reading::pulse(morning, 62),
//!     Reading::pulse(evening, 74),
//! ];
//!
//! let dataset = AggregationPipeline::with_preset(IntervalPreset::Hourly)
//!     .run(&readings)
//!     .expect("valid batch");
//! assert!(!dataset.is_empty());
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;

// Re-export key types at crate root for convenience
pub use chart::{AggregationPipeline, ChartDataset, Grid, GridBuilder, IntervalPreset};
pub use config::Config;
pub use error::ChartError;
pub use fetch::{build_chart, ChartWorker, FetchRequest, FetchResponse, MemoryStore, ReadingStore};
pub use model::{
    BoundsTracker, Reading, ReadingType, ReadingValue, Scalar, TimePartition, TimeRange,
    UnitOfMeasure, ValueRange, ValueShape,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
