//! End-to-end tests for chart builds through the fetch capability.

use biochart::{
    build_chart, ChartError, Grid, IntervalPreset, MemoryStore, Reading, ReadingStore,
    ReadingType, Scalar,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 9, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// A week of mixed readings for one person.
fn week_of_readings() -> Vec<Reading> {
    let mut readings = Vec::new();
    for day in 1..=7 {
        readings.push(Reading::weight(at(day, 7, 0), dec!(182.0) + Decimal::from(day)));
        readings.push(Reading::blood_pressure(at(day, 8, 30), 118 + day as i64, 76 + day as i64));
        readings.push(Reading::glucose(at(day, 12, 15), 100 + day as i64 * 3));
        readings.push(Reading::pulse(at(day, 21, 45), 60 + day as i64));
    }
    readings
}

#[test]
fn test_hourly_build_over_a_week() {
    let mut store = MemoryStore::new();
    store.insert_batch("alice", week_of_readings());
    let store: Arc<dyn ReadingStore> = Arc::new(store);

    let dataset = build_chart(
        store,
        "alice",
        at(1, 0, 0),
        at(7, 23, 59),
        None,
        IntervalPreset::Hourly.interval_minutes(),
        Duration::from_secs(2),
    )
    .unwrap();

    assert!(!dataset.is_empty());
    let partition = dataset.partition.as_ref().unwrap();

    // The span comes from the global time-of-day bound: 07:00 to 21:45.
    assert_eq!(partition.start().time(), at(1, 7, 0).time());
    assert_eq!(partition.end().time(), at(1, 21, 45).time());

    // One grid per observed type, each sized by that type's reading count
    // and all sharing the partition's bucket count.
    assert_eq!(dataset.grids.len(), 4);
    for grid in dataset.grids.values() {
        assert_eq!(grid.row_count(), 7);
        assert_eq!(grid.bucket_count(), partition.element_count());
    }

    // Readings from every calendar day collapse into one daily cycle: each
    // weight reading sits in the first bucket of its own row.
    match &dataset.grids[&ReadingType::Weight] {
        Grid::Decimal(rows) => {
            for (row, cells) in rows.iter().enumerate() {
                assert_eq!(cells[0], dec!(182.0) + Decimal::from(row as i64 + 1));
            }
        }
        other => panic!("expected decimal grid, got {other:?}"),
    }

    // Asymmetric pair bounds: min from the lowest diastolic, max from the
    // highest systolic.
    let bp = dataset
        .bounds
        .values_for(ReadingType::BloodPressure)
        .unwrap();
    assert_eq!(bp.min(), Some(Scalar::Int(77)));
    assert_eq!(bp.max(), Some(Scalar::Int(125)));
}

#[test]
fn test_type_filter_limits_the_dataset() {
    let mut store = MemoryStore::new();
    store.insert_batch("alice", week_of_readings());
    let store: Arc<dyn ReadingStore> = Arc::new(store);

    let dataset = build_chart(
        store,
        "alice",
        at(1, 0, 0),
        at(7, 23, 59),
        Some(ReadingType::Glucose),
        60,
        Duration::from_secs(2),
    )
    .unwrap();

    assert_eq!(dataset.grids.len(), 1);
    assert!(dataset.grids.contains_key(&ReadingType::Glucose));
    // With only glucose in the batch, the partition collapses to its
    // per-type bound, which equals the global one here.
    let partition = dataset.partition.as_ref().unwrap();
    assert_eq!(partition.start().time(), at(1, 12, 15).time());
}

#[test]
fn test_unknown_person_yields_empty_dataset() {
    let mut store = MemoryStore::new();
    store.insert_batch("alice", week_of_readings());
    let store: Arc<dyn ReadingStore> = Arc::new(store);

    let dataset = build_chart(
        store,
        "nobody",
        at(1, 0, 0),
        at(7, 23, 59),
        None,
        120,
        Duration::from_secs(2),
    )
    .unwrap();

    assert!(dataset.is_empty());
    assert!(dataset.partition.is_none());
    assert!(dataset.grids.is_empty());
    assert!(dataset.bounds.global_times().is_empty());
}

#[test]
fn test_invalid_interval_surfaces_synchronously() {
    let mut store = MemoryStore::new();
    store.insert_batch("alice", week_of_readings());
    let store: Arc<dyn ReadingStore> = Arc::new(store);

    let err = build_chart(
        store,
        "alice",
        at(1, 0, 0),
        at(7, 23, 59),
        None,
        -15,
        Duration::from_secs(2),
    )
    .unwrap_err();

    assert!(matches!(err, ChartError::InvalidRange { .. }));
}

#[test]
fn test_dataset_serializes_to_json() {
    let mut store = MemoryStore::new();
    store.insert_batch("alice", week_of_readings());
    let store: Arc<dyn ReadingStore> = Arc::new(store);

    let dataset = build_chart(
        store,
        "alice",
        at(1, 0, 0),
        at(7, 23, 59),
        None,
        120,
        Duration::from_secs(2),
    )
    .unwrap();

    let json = serde_json::to_string(&dataset).unwrap();
    assert!(json.contains("partition"));
    assert!(json.contains("grids"));
    assert!(json.contains("bounds"));
}
