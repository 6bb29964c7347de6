//! Fixed-interval time partitioning.
//!
//! A partition spans an observed time-of-day range with boundaries at a
//! fixed interval. Charts are time-of-day histograms: a queried timestamp is
//! normalized onto the partition's calendar date, keeping only its
//! time-of-day, so readings from different days aggregate into the same
//! daily cycle.

use crate::error::ChartError;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

/// An ordered sequence of time boundaries at a fixed interval.
///
/// Boundaries are strictly increasing; the first is `start` and the last is
/// exactly `end`. Bucket widths are uniform except possibly the last, which
/// may be shorter when the span is not a whole multiple of the interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimePartition {
    start: NaiveDateTime,
    end: NaiveDateTime,
    #[serde(with = "interval_serde")]
    interval: Duration,
    boundaries: Vec<NaiveDateTime>,
    /// Lookup memo keyed by normalized time-of-day. The same timestamps are
    /// resolved repeatedly while populating multiple per-type grids from one
    /// batch; a partition is exclusively owned by one build, so interior
    /// mutability is not shared across threads.
    #[serde(skip)]
    lookup_memo: RefCell<HashMap<NaiveTime, Option<(usize, NaiveDateTime)>>>,
}

impl TimePartition {
    /// Create a partition from `start` to `end` stepping by `interval`.
    ///
    /// Fails with [`ChartError::InvalidRange`] when `end <= start` or the
    /// interval is not positive.
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        interval: Duration,
    ) -> Result<Self, ChartError> {
        if end <= start || interval <= Duration::zero() {
            return Err(ChartError::InvalidRange {
                start,
                end,
                interval_minutes: interval.num_minutes(),
            });
        }

        let mut boundaries = Vec::new();
        let mut cursor = start;
        while cursor < end {
            boundaries.push(cursor);
            cursor += interval;
        }
        // Close the sequence on the declared end; the final bucket may be
        // shorter than the interval, never longer.
        if *boundaries.last().unwrap_or(&start) != end {
            boundaries.push(end);
        }

        Ok(Self {
            start,
            end,
            interval,
            boundaries,
            lookup_memo: RefCell::new(HashMap::new()),
        })
    }

    /// First boundary of the partition.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Last boundary of the partition.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Interval between uniform boundaries.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of boundaries (one more than the number of full-width steps;
    /// the sequence has `element_count() - 1` inclusive bucket intervals).
    pub fn element_count(&self) -> usize {
        self.boundaries.len()
    }

    /// Boundary timestamp at `index`.
    pub fn boundary_at(&self, index: usize) -> Result<NaiveDateTime, ChartError> {
        self.boundaries
            .get(index)
            .copied()
            .ok_or(ChartError::IndexOutOfRange {
                index,
                count: self.boundaries.len(),
            })
    }

    /// Resolve a timestamp to the bucket it falls in.
    ///
    /// Only the query's time-of-day matters; it is projected onto `start`'s
    /// calendar date before comparison. Returns `None` when the normalized
    /// time falls outside `[start, end]`. Intervals are left-closed except
    /// the final bucket, which is closed on both ends.
    pub fn bucket_for(&self, query: NaiveDateTime) -> Option<(usize, NaiveDateTime)> {
        let time_of_day = query.time();
        if let Some(hit) = self.lookup_memo.borrow().get(&time_of_day) {
            return *hit;
        }
        let resolved = self.resolve(time_of_day);
        self.lookup_memo.borrow_mut().insert(time_of_day, resolved);
        resolved
    }

    fn resolve(&self, time_of_day: NaiveTime) -> Option<(usize, NaiveDateTime)> {
        let normalized = self.start.date().and_time(time_of_day);
        if normalized < self.start || normalized > self.end {
            return None;
        }
        let last = self.boundaries.len() - 1;
        for idx in 0..last {
            if self.boundaries[idx] <= normalized && normalized < self.boundaries[idx + 1] {
                return Some((idx, self.boundaries[idx]));
            }
        }
        // normalized == end: the final bucket is closed on its right edge.
        Some((last, self.boundaries[last]))
    }
}

/// Serde support for the interval as whole seconds.
mod interval_serde {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(interval: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        interval.num_seconds().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = i64::deserialize(deserializer)?;
        Ok(Duration::seconds(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 9, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_rejects_malformed_ranges() {
        assert!(TimePartition::new(dt(8, 0, 0), dt(8, 0, 0), Duration::minutes(15)).is_err());
        assert!(TimePartition::new(dt(9, 0, 0), dt(8, 0, 0), Duration::minutes(15)).is_err());
        assert!(TimePartition::new(dt(0, 0, 0), dt(8, 0, 0), Duration::zero()).is_err());
    }

    #[test]
    fn test_boundary_invariants() {
        let partition =
            TimePartition::new(dt(6, 0, 0), dt(11, 30, 0), Duration::minutes(45)).unwrap();
        let count = partition.element_count();

        assert_eq!(partition.boundary_at(0).unwrap(), dt(6, 0, 0));
        assert_eq!(partition.boundary_at(count - 1).unwrap(), dt(11, 30, 0));
        for idx in 0..count - 1 {
            assert!(partition.boundary_at(idx).unwrap() < partition.boundary_at(idx + 1).unwrap());
        }
        assert!(partition.boundary_at(count).is_err());
    }

    #[test]
    fn test_fifteen_minute_partition_over_eight_hours() {
        let partition =
            TimePartition::new(dt(0, 0, 0), dt(8, 0, 0), Duration::minutes(15)).unwrap();
        assert_eq!(partition.element_count(), 33);

        let (idx, boundary) = partition.bucket_for(dt(5, 12, 0)).unwrap();
        assert_eq!(idx, 20);
        assert_eq!(boundary, dt(5, 0, 0));
    }

    #[test]
    fn test_short_final_bucket() {
        // 100 minutes at a 45-minute interval: last bucket is only 10 wide.
        let partition =
            TimePartition::new(dt(10, 0, 0), dt(11, 40, 0), Duration::minutes(45)).unwrap();
        assert_eq!(partition.element_count(), 4);
        assert_eq!(partition.boundary_at(2).unwrap(), dt(11, 30, 0));
        assert_eq!(partition.boundary_at(3).unwrap(), dt(11, 40, 0));
    }

    #[test]
    fn test_interval_wider_than_span() {
        let partition =
            TimePartition::new(dt(10, 0, 0), dt(10, 20, 0), Duration::hours(2)).unwrap();
        assert_eq!(partition.element_count(), 2);
        assert_eq!(partition.boundary_at(1).unwrap(), dt(10, 20, 0));
    }

    #[test]
    fn test_boundary_round_trip() {
        let partition =
            TimePartition::new(dt(0, 0, 0), dt(8, 0, 0), Duration::minutes(15)).unwrap();
        for idx in 0..partition.element_count() - 1 {
            let boundary = partition.boundary_at(idx).unwrap();
            // Left-closed: a boundary timestamp resolves to its own bucket,
            // not the one ending at it.
            assert_eq!(partition.bucket_for(boundary), Some((idx, boundary)));
        }
        let last = partition.element_count() - 1;
        let end = partition.boundary_at(last).unwrap();
        assert_eq!(partition.bucket_for(end), Some((last, end)));
    }

    #[test]
    fn test_out_of_range_query() {
        let partition =
            TimePartition::new(dt(10, 0, 0), dt(11, 0, 0), Duration::minutes(15)).unwrap();
        assert_eq!(partition.bucket_for(dt(9, 59, 59)), None);
        assert_eq!(partition.bucket_for(dt(11, 0, 1)), None);
    }

    #[test]
    fn test_normalizes_to_time_of_day() {
        let partition =
            TimePartition::new(dt(6, 0, 0), dt(12, 0, 0), Duration::hours(2)).unwrap();
        // A reading from a different calendar day lands by its time-of-day.
        let other_day = NaiveDate::from_ymd_opt(2022, 9, 14)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let (idx, boundary) = partition.bucket_for(other_day).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(boundary, dt(8, 0, 0));
    }

    #[test]
    fn test_memoized_lookup_is_stable() {
        let partition =
            TimePartition::new(dt(0, 0, 0), dt(8, 0, 0), Duration::minutes(15)).unwrap();
        let first = partition.bucket_for(dt(3, 7, 0));
        let second = partition.bucket_for(dt(3, 7, 0));
        assert_eq!(first, second);
        assert_eq!(first.unwrap().0, 12);
    }
}
