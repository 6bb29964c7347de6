//! Min/max bounds tracking for axis scaling.
//!
//! One bounds scan over a batch fills a global time-of-day range, a per-type
//! time-of-day range, and a per-type value range. Ranges start in an
//! explicit "no observation yet" state rather than relying on numeric
//! sentinels; consumers check `is_empty()` before treating a bound as
//! meaningful.

use crate::model::reading::{Reading, ReadingValue, Scalar, UnitOfMeasure};
use crate::model::ReadingType;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Observed time-of-day min/max.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    min: Option<NaiveTime>,
    max: Option<NaiveTime>,
}

impl TimeRange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen the range to include `time`. The first observation sets both
    /// ends.
    pub fn observe(&mut self, time: NaiveTime) {
        match self.min {
            Some(min) if time >= min => {}
            _ => self.min = Some(time),
        }
        match self.max {
            Some(max) if time <= max => {}
            _ => self.max = Some(time),
        }
    }

    /// True while nothing has been observed.
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    pub fn min(&self) -> Option<NaiveTime> {
        self.min
    }

    pub fn max(&self) -> Option<NaiveTime> {
        self.max
    }
}

/// Observed value min/max plus the unit it was recorded in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    min: Option<Scalar>,
    max: Option<Scalar>,
    unit: Option<UnitOfMeasure>,
}

impl ValueRange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the range from one reading's value.
    ///
    /// Pair values are asymmetric on purpose: diastolic is the physiological
    /// lower bound and systolic the upper, so the minimum only ever compares
    /// against diastolic and the maximum only against systolic.
    pub fn observe(&mut self, value: &ReadingValue, unit: UnitOfMeasure) {
        if self.unit.is_none() {
            self.unit = Some(unit);
        }
        match value {
            ReadingValue::Scalar(scalar) => {
                self.observe_min(*scalar);
                self.observe_max(*scalar);
            }
            ReadingValue::Pair {
                systolic,
                diastolic,
            } => {
                self.observe_min(Scalar::Int(*diastolic));
                self.observe_max(Scalar::Int(*systolic));
            }
        }
    }

    fn observe_min(&mut self, candidate: Scalar) {
        match self.min {
            Some(min) if candidate.as_decimal() >= min.as_decimal() => {}
            _ => self.min = Some(candidate),
        }
    }

    fn observe_max(&mut self, candidate: Scalar) {
        match self.max {
            Some(max) if candidate.as_decimal() <= max.as_decimal() => {}
            _ => self.max = Some(candidate),
        }
    }

    /// True while nothing has been observed.
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    pub fn min(&self) -> Option<Scalar> {
        self.min
    }

    pub fn max(&self) -> Option<Scalar> {
        self.max
    }

    pub fn unit(&self) -> Option<UnitOfMeasure> {
        self.unit
    }
}

/// Accumulates all bounds for one batch in a single scan.
///
/// The empty state is valid and terminal: a batch with no readings leaves
/// every range empty, which downstream code must treat as "no data", not as
/// numeric bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundsTracker {
    global_times: TimeRange,
    times_by_type: HashMap<ReadingType, TimeRange>,
    values_by_type: HashMap<ReadingType, ValueRange>,
}

impl BoundsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one reading into the global and per-type ranges.
    pub fn observe(&mut self, reading: &Reading) {
        let time_of_day = reading.taken_at.time();
        self.global_times.observe(time_of_day);
        self.times_by_type
            .entry(reading.reading_type)
            .or_default()
            .observe(time_of_day);
        self.values_by_type
            .entry(reading.reading_type)
            .or_default()
            .observe(&reading.value, reading.unit);
    }

    /// Time-of-day range across every reading in the batch. The partition is
    /// always derived from this range, never from a per-type one.
    pub fn global_times(&self) -> &TimeRange {
        &self.global_times
    }

    pub fn times_for(&self, reading_type: ReadingType) -> Option<&TimeRange> {
        self.times_by_type.get(&reading_type)
    }

    pub fn values_for(&self, reading_type: ReadingType) -> Option<&ValueRange> {
        self.values_by_type.get(&reading_type)
    }

    /// Types seen during the scan, in no particular order.
    pub fn observed_types(&self) -> impl Iterator<Item = ReadingType> + '_ {
        self.values_by_type.keys().copied()
    }

    /// True when the scan saw no readings at all.
    pub fn is_empty(&self) -> bool {
        self.global_times.is_empty()
    }
}
