//! Dense per-type grids and their population rules.
//!
//! Each reading type present in a batch gets one matrix of
//! `rows × bucket_count` cells, where rows equal the number of readings of
//! that specific type and columns come from the shared partition. Cells
//! default to the shape's exact zero and are selectively overwritten during
//! placement.

use crate::error::ChartError;
use crate::model::{Reading, ReadingType, ReadingValue, Scalar, TimePartition, ValueShape};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A dense reading-row × time-bucket matrix with shape-appropriate cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Grid {
    /// Whole-number cells, zero-filled
    Int(Vec<Vec<i64>>),
    /// Exact decimal cells, filled with `Decimal::ZERO`
    Decimal(Vec<Vec<Decimal>>),
    /// Systolic/diastolic cells, filled with `(0, 0)`
    Pair(Vec<Vec<(i64, i64)>>),
}

impl Grid {
    /// Allocate a default-filled grid for the given shape.
    pub fn allocate(shape: ValueShape, rows: usize, buckets: usize) -> Self {
        match shape {
            ValueShape::Integer => Grid::Int(vec![vec![0; buckets]; rows]),
            ValueShape::Decimal => Grid::Decimal(vec![vec![Decimal::ZERO; buckets]; rows]),
            ValueShape::Pair => Grid::Pair(vec![vec![(0, 0); buckets]; rows]),
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Grid::Int(rows) => rows.len(),
            Grid::Decimal(rows) => rows.len(),
            Grid::Pair(rows) => rows.len(),
        }
    }

    pub fn bucket_count(&self) -> usize {
        match self {
            Grid::Int(rows) => rows.first().map_or(0, Vec::len),
            Grid::Decimal(rows) => rows.first().map_or(0, Vec::len),
            Grid::Pair(rows) => rows.first().map_or(0, Vec::len),
        }
    }

    /// Write a value into a cell. The value's shape must match the grid's.
    fn write(&mut self, row: usize, bucket: usize, value: &ReadingValue) -> bool {
        match (self, value) {
            (Grid::Int(rows), ReadingValue::Scalar(Scalar::Int(v))) => {
                rows[row][bucket] = *v;
                true
            }
            (Grid::Decimal(rows), ReadingValue::Scalar(Scalar::Decimal(d))) => {
                rows[row][bucket] = *d;
                true
            }
            (Grid::Pair(rows), ReadingValue::Pair {
                systolic,
                diastolic,
            }) => {
                rows[row][bucket] = (*systolic, *diastolic);
                true
            }
            _ => false,
        }
    }
}

/// Builds the per-type grid map for one batch against one shared partition.
pub struct GridBuilder<'a> {
    partition: &'a TimePartition,
}

impl<'a> GridBuilder<'a> {
    pub fn new(partition: &'a TimePartition) -> Self {
        Self { partition }
    }

    /// Allocate and populate one grid per reading type present in the batch.
    ///
    /// Rows are assigned per type in input order, so each row holds exactly
    /// one reading. Two readings of one type can still collide on the same
    /// row and bucket only under a broken row assignment; placement is
    /// last-write-wins in that case, not an error.
    pub fn build(
        &self,
        readings: &[Reading],
    ) -> Result<HashMap<ReadingType, Grid>, ChartError> {
        let mut per_type_counts: HashMap<ReadingType, usize> = HashMap::new();
        for reading in readings {
            *per_type_counts.entry(reading.reading_type).or_insert(0) += 1;
        }

        let buckets = self.partition.element_count();
        let mut grids: HashMap<ReadingType, Grid> = HashMap::new();
        let mut next_row: HashMap<ReadingType, usize> = HashMap::new();

        for reading in readings {
            let declared = reading.reading_type.value_shape();
            if reading.value.shape() != declared {
                return Err(ChartError::UnsupportedReadingType {
                    reading_type: reading.reading_type,
                    detail: format!(
                        "value shape {:?} does not match declared shape {:?}",
                        reading.value.shape(),
                        declared
                    ),
                });
            }

            let grid = grids.entry(reading.reading_type).or_insert_with(|| {
                Grid::allocate(declared, per_type_counts[&reading.reading_type], buckets)
            });

            let (bucket, _boundary) = self
                .partition
                .bucket_for(reading.taken_at)
                .ok_or(ChartError::TimestampOutOfRange {
                    taken_at: reading.taken_at,
                })?;

            let row = next_row.entry(reading.reading_type).or_insert(0);
            grid.write(*row, bucket, &reading.value);
            *row += 1;
        }

        Ok(grids)
    }
}
