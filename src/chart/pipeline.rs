//! The aggregation pipeline: one batch in, one immutable dataset out.
//!
//! Steps are strictly sequential: scan the batch for bounds, derive the
//! partition from the global time-of-day range, then allocate and populate
//! the per-type grids. Every run owns its own trackers and grids; nothing is
//! shared across builds.

use crate::chart::grid::{Grid, GridBuilder};
use crate::error::ChartError;
use crate::model::{BoundsTracker, Reading, ReadingType, TimePartition};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Named interval presets for chart builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalPreset {
    /// Two-hour buckets
    Hourly,
}

impl IntervalPreset {
    pub fn interval_minutes(&self) -> i64 {
        match self {
            IntervalPreset::Hourly => 120,
        }
    }
}

/// The immutable product of one chart build.
///
/// `partition` is `None` only for an empty batch; in that case the grid map
/// is empty and every bound is in its "no data" state. Iteration order over
/// the grid map is unspecified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataset {
    pub partition: Option<TimePartition>,
    pub grids: HashMap<ReadingType, Grid>,
    pub bounds: BoundsTracker,
}

impl ChartDataset {
    /// True when the batch had no readings. Callers must check this before
    /// treating any bound as a numeric value.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

/// Orchestrates bounds scan, partitioning, and grid population.
pub struct AggregationPipeline {
    interval: Duration,
}

impl AggregationPipeline {
    pub fn new(interval_minutes: i64) -> Self {
        Self {
            interval: Duration::minutes(interval_minutes),
        }
    }

    pub fn with_preset(preset: IntervalPreset) -> Self {
        Self::new(preset.interval_minutes())
    }

    /// Build a dataset from one retrieved batch.
    ///
    /// The partition always comes from the global time-of-day bound, never a
    /// per-type one, so every grid shares the same bucket count. Rows are
    /// assigned per type in input order.
    pub fn run(&self, readings: &[Reading]) -> Result<ChartDataset, ChartError> {
        let mut bounds = BoundsTracker::new();
        for reading in readings {
            bounds.observe(reading);
        }

        if bounds.is_empty() {
            debug!("empty batch, returning dataset with no partition");
            return Ok(ChartDataset {
                partition: None,
                grids: HashMap::new(),
                bounds,
            });
        }

        let partition = self.derive_partition(readings, &bounds)?;
        debug!(
            boundaries = partition.element_count(),
            readings = readings.len(),
            "partition derived from global time bound"
        );

        let grids = GridBuilder::new(&partition).build(readings)?;
        debug!(types = grids.len(), "grids populated");

        Ok(ChartDataset {
            partition: Some(partition),
            grids,
            bounds,
        })
    }

    fn derive_partition(
        &self,
        readings: &[Reading],
        bounds: &BoundsTracker,
    ) -> Result<TimePartition, ChartError> {
        // Only time-of-day is meaningful; anchoring to the earliest reading's
        // calendar date keeps runs reproducible.
        let anchor = readings
            .iter()
            .map(|r| r.taken_at.date())
            .min()
            .expect("non-empty batch");
        let times = bounds.global_times();
        let start = anchor.and_time(times.min().expect("non-empty bounds"));
        let mut end = anchor.and_time(times.max().expect("non-empty bounds"));
        // A batch whose readings all share one time-of-day has a zero-width
        // bound; widen it by one interval so the batch lands in bucket 0.
        if end <= start {
            end = start + self.interval;
        }
        TimePartition::new(start, end, self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Scalar;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 9, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_empty_batch_yields_empty_dataset() {
        let dataset = AggregationPipeline::new(120).run(&[]).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.partition.is_none());
        assert!(dataset.grids.is_empty());
        assert!(dataset.bounds.global_times().is_empty());
    }

    #[test]
    fn test_partition_spans_global_bound() {
        let readings = vec![
            Reading::pulse(at(1, 6, 30), 62),
            Reading::glucose(at(2, 20, 30), 140),
            Reading::pulse(at(3, 11, 0), 75),
        ];
        let dataset = AggregationPipeline::with_preset(IntervalPreset::Hourly)
            .run(&readings)
            .unwrap();

        let partition = dataset.partition.as_ref().unwrap();
        assert_eq!(partition.start(), at(1, 6, 30));
        assert_eq!(partition.end(), at(1, 20, 30));
        // 6:30..20:30 at 120m: seven uniform steps cover exactly 14 hours.
        assert_eq!(partition.element_count(), 8);

        // All grids share the one partition's bucket count.
        for grid in dataset.grids.values() {
            assert_eq!(grid.bucket_count(), 8);
        }
    }

    #[test]
    fn test_rows_follow_input_order_per_type() {
        let readings = vec![
            Reading::glucose(at(1, 7, 0), 98),
            Reading::glucose(at(1, 12, 0), 135),
            Reading::glucose(at(1, 18, 0), 110),
        ];
        let dataset = AggregationPipeline::new(240).run(&readings).unwrap();

        match &dataset.grids[&ReadingType::Glucose] {
            Grid::Int(rows) => {
                assert_eq!(rows.len(), 3);
                assert_eq!(rows[0][0], 98);
                assert_eq!(rows[1][1], 135);
                // 18:00 is the declared end, so it lands in the final
                // (double-closed) bucket.
                assert_eq!(rows[2][3], 110);
            }
            other => panic!("expected integer grid, got {other:?}"),
        }
    }

    #[test]
    fn test_single_instant_batch_lands_in_first_bucket() {
        let readings = vec![Reading::weight(at(5, 7, 15), dec!(180.0))];
        let dataset = AggregationPipeline::new(120).run(&readings).unwrap();

        let partition = dataset.partition.as_ref().unwrap();
        assert_eq!(partition.start(), at(5, 7, 15));
        assert_eq!(partition.end(), at(5, 9, 15));
        match &dataset.grids[&ReadingType::Weight] {
            Grid::Decimal(rows) => assert_eq!(rows[0][0], dec!(180.0)),
            other => panic!("expected decimal grid, got {other:?}"),
        }
    }

    #[test]
    fn test_bounds_survive_into_dataset() {
        let readings = vec![
            Reading::blood_pressure(at(1, 8, 0), 135, 88),
            Reading::blood_pressure(at(1, 21, 0), 118, 74),
        ];
        let dataset = AggregationPipeline::new(120).run(&readings).unwrap();

        let values = dataset
            .bounds
            .values_for(ReadingType::BloodPressure)
            .unwrap();
        assert_eq!(values.min(), Some(Scalar::Int(74)));
        assert_eq!(values.max(), Some(Scalar::Int(135)));
    }

    #[test]
    fn test_invalid_interval_is_rejected() {
        let readings = vec![
            Reading::pulse(at(1, 8, 0), 60),
            Reading::pulse(at(1, 9, 0), 65),
        ];
        let err = AggregationPipeline::new(0).run(&readings).unwrap_err();
        assert!(matches!(err, ChartError::InvalidRange { .. }));
    }
}
