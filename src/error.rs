//! Error taxonomy for the biochart engine.

use crate::model::ReadingType;
use chrono::NaiveDateTime;
use std::fmt;

/// Errors surfaced by partitioning, grid building, and chart assembly.
///
/// All failures are fatal for the build that raised them; no partial dataset
/// is ever returned. An empty batch is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartError {
    /// Partition bounds or interval are malformed.
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
        interval_minutes: i64,
    },
    /// Boundary index outside the partition.
    IndexOutOfRange { index: usize, count: usize },
    /// A reading's time-of-day resolved to no bucket after the bounds scan
    /// covered the same batch. Signals a pipeline bug, not bad user input.
    TimestampOutOfRange { taken_at: NaiveDateTime },
    /// A reading's value shape contradicts its type's declared shape.
    UnsupportedReadingType {
        reading_type: ReadingType,
        detail: String,
    },
    /// The fetch response did not arrive within the configured timeout.
    FetchTimeout { timeout_secs: u64 },
    /// The build was cancelled before the fetch response was awaited.
    Cancelled,
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::InvalidRange {
                start,
                end,
                interval_minutes,
            } => write!(
                f,
                "invalid partition range: start={start}, end={end}, interval={interval_minutes}m"
            ),
            ChartError::IndexOutOfRange { index, count } => {
                write!(f, "boundary index {index} out of range (count {count})")
            }
            ChartError::TimestampOutOfRange { taken_at } => {
                write!(f, "reading taken at {taken_at} resolved to no bucket")
            }
            ChartError::UnsupportedReadingType {
                reading_type,
                detail,
            } => {
                write!(f, "unsupported {reading_type} reading: {detail}")
            }
            ChartError::FetchTimeout { timeout_secs } => {
                write!(f, "fetch response not received within {timeout_secs}s")
            }
            ChartError::Cancelled => write!(f, "chart build cancelled"),
        }
    }
}

impl std::error::Error for ChartError {}
