//! Biometric reading types.
//!
//! A reading is one timestamped observation of a given type. Blood pressure
//! carries a paired systolic/diastolic value; every other type carries a
//! single scalar, either integral (glucose, pulse) or exact decimal
//! (weight, temperature).

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of supported reading types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadingType {
    Weight,
    Temperature,
    BloodPressure,
    Glucose,
    Pulse,
}

/// The cell/value shape a reading type produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueShape {
    /// Whole-number scalar (glucose, pulse)
    Integer,
    /// Exact decimal scalar (weight, temperature)
    Decimal,
    /// Paired systolic/diastolic value (blood pressure)
    Pair,
}

impl ReadingType {
    /// The value shape this type's readings must carry.
    ///
    /// Exhaustive on purpose: adding a type without declaring its shape is a
    /// compile error, not a silent fall-through to an integer grid.
    pub fn value_shape(&self) -> ValueShape {
        match self {
            ReadingType::Weight => ValueShape::Decimal,
            ReadingType::Temperature => ValueShape::Decimal,
            ReadingType::BloodPressure => ValueShape::Pair,
            ReadingType::Glucose => ValueShape::Integer,
            ReadingType::Pulse => ValueShape::Integer,
        }
    }

    /// All supported types, in declaration order.
    pub fn all() -> &'static [ReadingType] {
        &[
            ReadingType::Weight,
            ReadingType::Temperature,
            ReadingType::BloodPressure,
            ReadingType::Glucose,
            ReadingType::Pulse,
        ]
    }
}

impl fmt::Display for ReadingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadingType::Weight => "weight",
            ReadingType::Temperature => "temperature",
            ReadingType::BloodPressure => "blood-pressure",
            ReadingType::Glucose => "glucose",
            ReadingType::Pulse => "pulse",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ReadingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weight" => Ok(ReadingType::Weight),
            "temperature" => Ok(ReadingType::Temperature),
            "blood-pressure" | "bp" => Ok(ReadingType::BloodPressure),
            "glucose" => Ok(ReadingType::Glucose),
            "pulse" => Ok(ReadingType::Pulse),
            other => Err(format!("unknown reading type: {other}")),
        }
    }
}

/// Unit of measure attached to a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    Pounds,
    Kilograms,
    DegreesF,
    DegreesC,
    MmHg,
    MgPerDl,
    MmolPerL,
    BeatsPerMinute,
}

impl fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitOfMeasure::Pounds => "lbs",
            UnitOfMeasure::Kilograms => "kg",
            UnitOfMeasure::DegreesF => "°F",
            UnitOfMeasure::DegreesC => "°C",
            UnitOfMeasure::MmHg => "mmHg",
            UnitOfMeasure::MgPerDl => "mg/dL",
            UnitOfMeasure::MmolPerL => "mmol/L",
            UnitOfMeasure::BeatsPerMinute => "bpm",
        };
        write!(f, "{name}")
    }
}

/// A single-component reading value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Int(i64),
    Decimal(Decimal),
}

impl Scalar {
    /// Numeric value as an exact decimal, for comparisons across both forms.
    pub fn as_decimal(&self) -> Decimal {
        match self {
            Scalar::Int(v) => Decimal::from(*v),
            Scalar::Decimal(d) => *d,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Decimal(d) => write!(f, "{d}"),
        }
    }
}

/// The value carried by a reading: one scalar, or a systolic/diastolic pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReadingValue {
    Scalar(Scalar),
    Pair { systolic: i64, diastolic: i64 },
}

impl ReadingValue {
    /// The shape of this value.
    pub fn shape(&self) -> ValueShape {
        match self {
            ReadingValue::Scalar(Scalar::Int(_)) => ValueShape::Integer,
            ReadingValue::Scalar(Scalar::Decimal(_)) => ValueShape::Decimal,
            ReadingValue::Pair { .. } => ValueShape::Pair,
        }
    }
}

/// One timestamped biometric observation.
///
/// Readings are immutable once retrieved; the aggregation pipeline borrows
/// them and never mutates or copies the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Category of the observation
    pub reading_type: ReadingType,
    /// When the observation was taken
    pub taken_at: NaiveDateTime,
    /// The observed value
    pub value: ReadingValue,
    /// Unit the value was recorded in
    pub unit: UnitOfMeasure,
}

impl Reading {
    pub fn new(
        reading_type: ReadingType,
        taken_at: NaiveDateTime,
        value: ReadingValue,
        unit: UnitOfMeasure,
    ) -> Self {
        Self {
            reading_type,
            taken_at,
            value,
            unit,
        }
    }

    /// Create a weight reading in pounds.
    pub fn weight(taken_at: NaiveDateTime, pounds: Decimal) -> Self {
        Self::new(
            ReadingType::Weight,
            taken_at,
            ReadingValue::Scalar(Scalar::Decimal(pounds)),
            UnitOfMeasure::Pounds,
        )
    }

    /// Create a body temperature reading in degrees Fahrenheit.
    pub fn temperature(taken_at: NaiveDateTime, degrees: Decimal) -> Self {
        Self::new(
            ReadingType::Temperature,
            taken_at,
            ReadingValue::Scalar(Scalar::Decimal(degrees)),
            UnitOfMeasure::DegreesF,
        )
    }

    /// Create a blood pressure reading in mmHg.
    pub fn blood_pressure(taken_at: NaiveDateTime, systolic: i64, diastolic: i64) -> Self {
        Self::new(
            ReadingType::BloodPressure,
            taken_at,
            ReadingValue::Pair {
                systolic,
                diastolic,
            },
            UnitOfMeasure::MmHg,
        )
    }

    /// Create a blood glucose reading in mg/dL.
    pub fn glucose(taken_at: NaiveDateTime, value: i64) -> Self {
        Self::new(
            ReadingType::Glucose,
            taken_at,
            ReadingValue::Scalar(Scalar::Int(value)),
            UnitOfMeasure::MgPerDl,
        )
    }

    /// Create a pulse reading in beats per minute.
    pub fn pulse(taken_at: NaiveDateTime, value: i64) -> Self {
        Self::new(
            ReadingType::Pulse,
            taken_at,
            ReadingValue::Scalar(Scalar::Int(value)),
            UnitOfMeasure::BeatsPerMinute,
        )
    }
}
