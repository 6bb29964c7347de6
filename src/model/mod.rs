//! Data model for the biochart engine.
//!
//! This module contains:
//! - Reading types and value shapes for biometric observations
//! - Time partitioning of an observed time-of-day span into buckets
//! - Min/max bounds tracking for axis scaling

pub mod bounds;
pub mod partition;
pub mod reading;

// Re-export commonly used types
pub use bounds::{BoundsTracker, TimeRange, ValueRange};
pub use partition::TimePartition;
pub use reading::{Reading, ReadingType, ReadingValue, Scalar, UnitOfMeasure, ValueShape};
