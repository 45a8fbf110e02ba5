/// Reading validation — raw channel values in, `Reading` out.
///
/// The schema: temperature, humidity, and pressure are mandatory;
/// wind speed, wind direction, and rainfall are optional and stay
/// optional (absence means "sensor does not carry this channel", which
/// is distinct from a zero measurement). Range constraints:
///
///   humidity_percent         in [0, 100]
///   wind_direction_degrees   in [0, 360)
///   wind_speed_ms, rain_mm   >= 0
///
/// Validation is pure: no logging, no IO, no clock access — the caller
/// supplies the timestamp.

use chrono::{DateTime, Utc};

use crate::model::{RawMeasurement, Reading};

/// A raw measurement violated the reading schema.
///
/// Names the offending field and the constraint it violated so the
/// failure is actionable from the log line alone.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },
    #[error("field '{field}' out of range: {value} not in [{min}, {max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("field '{field}' must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

/// Validate one raw measurement, producing an immutable `Reading`
/// stamped with the supplied UTC instant.
pub fn validate(
    raw: &RawMeasurement,
    timestamp: DateTime<Utc>,
) -> Result<Reading, ValidationError> {
    let temperature_celsius = require(raw.temperature_celsius, "temperature_celsius")?;
    let humidity_percent = require(raw.humidity_percent, "humidity_percent")?;
    let pressure_hpa = require(raw.pressure_hpa, "pressure_hpa")?;

    if !(0.0..=100.0).contains(&humidity_percent) {
        return Err(ValidationError::OutOfRange {
            field: "humidity_percent",
            value: humidity_percent,
            min: 0.0,
            max: 100.0,
        });
    }

    if let Some(speed) = raw.wind_speed_ms
        && speed < 0.0
    {
        return Err(ValidationError::Negative {
            field: "wind_speed_ms",
            value: speed,
        });
    }

    // Half-open range: 360.0 exactly is rejected, 0.0 is north.
    if let Some(direction) = raw.wind_direction_degrees
        && !(0.0..360.0).contains(&direction)
    {
        return Err(ValidationError::OutOfRange {
            field: "wind_direction_degrees",
            value: direction,
            min: 0.0,
            max: 360.0,
        });
    }

    if let Some(rain) = raw.rain_mm
        && rain < 0.0
    {
        return Err(ValidationError::Negative {
            field: "rain_mm",
            value: rain,
        });
    }

    Ok(Reading {
        timestamp,
        temperature_celsius,
        humidity_percent,
        pressure_hpa,
        wind_speed_ms: raw.wind_speed_ms,
        wind_direction_degrees: raw.wind_direction_degrees,
        rain_mm: raw.rain_mm,
    })
}

fn require(value: Option<f64>, field: &'static str) -> Result<f64, ValidationError> {
    value.ok_or(ValidationError::MissingField { field })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
