/// Shared data types for the weather station monitoring service.
///
/// Everything in this module is plain data: construction happens in
/// `config` (Station), `validate` (Reading), and `alert::thresholds`
/// (AlertEvent). None of these types are mutated after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Station identity
// ---------------------------------------------------------------------------

/// Identity and geolocation of a single weather station.
///
/// Created once at configuration time and never mutated. A deployment
/// running several stations runs one controller per station, each with
/// its own `Station`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    /// Unique identifier for this station within a deployment.
    pub station_id: String,
    /// Human-readable station name.
    pub name: String,
    /// WGS84 latitude, degrees in [-90, 90].
    pub latitude: f64,
    /// WGS84 longitude, degrees in [-180, 180].
    pub longitude: f64,
    /// Altitude above sea level in meters.
    pub altitude_meters: f64,
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// Raw channel values as reported by a sensor, before validation.
///
/// Every channel is optional at this stage: a sensor that does not carry
/// a given instrument reports `None` for that channel, never a sentinel
/// zero. The validator decides which channels are mandatory.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawMeasurement {
    pub temperature_celsius: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub wind_speed_ms: Option<f64>,
    pub wind_direction_degrees: Option<f64>,
    pub rain_mm: Option<f64>,
}

/// One validated, timestamped sensor snapshot.
///
/// Produced only by `validate::validate` — a `Reading` existing at all
/// means every range constraint held. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// UTC instant the reading was taken.
    pub timestamp: DateTime<Utc>,
    /// Air temperature in degrees Celsius.
    pub temperature_celsius: f64,
    /// Relative humidity percentage, in [0, 100].
    pub humidity_percent: f64,
    /// Atmospheric pressure in hPa.
    pub pressure_hpa: f64,
    /// Wind speed in m/s, >= 0. Absent when the station has no anemometer.
    pub wind_speed_ms: Option<f64>,
    /// Wind direction in degrees, in [0, 360). Absent when unsupported.
    pub wind_direction_degrees: Option<f64>,
    /// Rainfall in mm, >= 0. Absent when the station has no rain gauge.
    pub rain_mm: Option<f64>,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A threshold exceedance detected on a single reading.
///
/// `alert_id` is derived from station id, alert kind, and the reading's
/// timestamp, so re-evaluating the same reading yields the same identity.
/// Carries the triggering reading by value (`Reading` is `Copy`).
#[derive(Debug, Clone, Serialize)]
pub struct AlertEvent {
    pub alert_id: String,
    pub station_id: String,
    pub alert_type: String,
    pub severity: Severity,
    pub message: String,
    pub reading: Reading,
}

impl AlertEvent {
    /// Deterministic alert identity: same station, kind, and reading
    /// timestamp always produce the same id.
    pub fn make_id(station_id: &str, alert_type: &str, timestamp: DateTime<Utc>) -> String {
        format!("{}:{}:{}", station_id, alert_type, timestamp.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
