/// Threshold evaluation — the pure heart of the alerting engine.
///
/// `evaluate` maps one reading plus a threshold configuration to zero or
/// more alert events. No clock, no IO, no state: identical inputs always
/// yield an identical, identically-ordered event list, which is what
/// makes alerting testable. Event order follows threshold declaration
/// order.

use serde::Deserialize;

use crate::model::{AlertEvent, Reading, Severity};

// ---------------------------------------------------------------------------
// Threshold configuration
// ---------------------------------------------------------------------------

/// One named bound, e.g. `high_temperature -> 30.0`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThresholdEntry {
    pub name: String,
    pub bound: f64,
}

/// Ordered threshold configuration for one controller.
///
/// Declaration order is preserved and determines evaluation order.
/// Immutable for the controller's lifetime. Names not in the known-kind
/// table are skipped at evaluation time, not rejected — a config written
/// for a newer service version still loads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thresholds {
    entries: Vec<ThresholdEntry>,
}

impl Thresholds {
    pub fn new(entries: Vec<ThresholdEntry>) -> Self {
        Self { entries }
    }

    /// Build from `(name, bound)` pairs, preserving order.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(name, bound)| ThresholdEntry {
                    name: name.to_string(),
                    bound,
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThresholdEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Known alert kinds
// ---------------------------------------------------------------------------

/// Comparison direction for a bound.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Direction {
    /// Fires when the reading exceeds the bound.
    Above,
    /// Fires when the reading is below the bound.
    Below,
}

/// Table of alert kinds this evaluator understands: which reading field
/// each kind watches, in which direction, and at what severity.
/// Optional fields yield `None` when the station lacks the instrument,
/// and the corresponding thresholds are simply skipped for that reading.
fn known_kind(name: &str) -> Option<(fn(&Reading) -> Option<f64>, Direction, Severity)> {
    use Direction::*;
    fn temperature(r: &Reading) -> Option<f64> {
        Some(r.temperature_celsius)
    }
    fn humidity(r: &Reading) -> Option<f64> {
        Some(r.humidity_percent)
    }
    fn pressure(r: &Reading) -> Option<f64> {
        Some(r.pressure_hpa)
    }
    fn wind_speed(r: &Reading) -> Option<f64> {
        r.wind_speed_ms
    }
    fn rainfall(r: &Reading) -> Option<f64> {
        r.rain_mm
    }

    match name {
        "high_temperature" => Some((temperature, Above, Severity::Warning)),
        "low_temperature" => Some((temperature, Below, Severity::Warning)),
        "high_humidity" => Some((humidity, Above, Severity::Info)),
        "low_humidity" => Some((humidity, Below, Severity::Info)),
        "high_pressure" => Some((pressure, Above, Severity::Info)),
        "low_pressure" => Some((pressure, Below, Severity::Warning)),
        "high_wind_speed" => Some((wind_speed, Above, Severity::Critical)),
        "high_rainfall" => Some((rainfall, Above, Severity::Warning)),
        _ => None,
    }
}

fn unit_for(name: &str) -> &'static str {
    match name {
        "high_temperature" | "low_temperature" => "°C",
        "high_humidity" | "low_humidity" => "%",
        "high_pressure" | "low_pressure" => " hPa",
        "high_wind_speed" => " m/s",
        "high_rainfall" => " mm",
        _ => "",
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate one reading against a threshold configuration.
///
/// Returns the events for every threshold that fired, in declaration
/// order. Thresholds over absent optional channels and unknown threshold
/// names contribute nothing.
pub fn evaluate(station_id: &str, reading: &Reading, thresholds: &Thresholds) -> Vec<AlertEvent> {
    let mut events = Vec::new();

    for entry in thresholds.iter() {
        let Some((field, direction, severity)) = known_kind(&entry.name) else {
            continue;
        };
        let Some(value) = field(reading) else {
            continue;
        };

        let fired = match direction {
            Direction::Above => value > entry.bound,
            Direction::Below => value < entry.bound,
        };
        if !fired {
            continue;
        }

        let unit = unit_for(&entry.name);
        let comparison = match direction {
            Direction::Above => "above",
            Direction::Below => "below",
        };
        events.push(AlertEvent {
            alert_id: AlertEvent::make_id(station_id, &entry.name, reading.timestamp),
            station_id: station_id.to_string(),
            alert_type: entry.name.clone(),
            severity,
            message: format!(
                "{}: {}{} {} threshold {}{}",
                entry.name, value, unit, comparison, entry.bound, unit
            ),
            reading: *reading,
        });
    }

    events
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(temperature: f64) -> Reading {
        Reading {
            timestamp: Utc.with_ymd_and_hms(2026, 8, 30, 15, 0, 0).unwrap(),
            temperature_celsius: temperature,
            humidity_percent: 65.0,
            pressure_hpa: 1013.25,
            wind_speed_ms: Some(5.0),
            wind_direction_degrees: Some(180.0),
            rain_mm: Some(0.0),
        }
    }

    #[test]
    fn test_high_temperature_fires_above_bound() {
        let thresholds = Thresholds::from_pairs([("high_temperature", 30.0)]);
        let events = evaluate("STN-1", &reading(36.0), &thresholds);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].alert_type, "high_temperature");
        assert_eq!(events[0].station_id, "STN-1");
        assert_eq!(events[0].severity, Severity::Warning);
        assert_eq!(events[0].reading.temperature_celsius, 36.0);
    }

    #[test]
    fn test_high_temperature_quiet_below_bound() {
        let thresholds = Thresholds::from_pairs([("high_temperature", 40.0)]);
        let events = evaluate("STN-1", &reading(36.0), &thresholds);
        assert!(events.is_empty());
    }

    #[test]
    fn test_bound_itself_does_not_fire() {
        // Strict comparison in both directions: the bound is quiet.
        let thresholds =
            Thresholds::from_pairs([("high_temperature", 36.0), ("low_temperature", 36.0)]);
        assert!(evaluate("STN-1", &reading(36.0), &thresholds).is_empty());
    }

    #[test]
    fn test_low_threshold_fires_below_bound() {
        let thresholds = Thresholds::from_pairs([("low_temperature", 5.0)]);
        let events = evaluate("STN-1", &reading(-2.0), &thresholds);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].alert_type, "low_temperature");
    }

    #[test]
    fn test_multiple_thresholds_fire_in_declaration_order() {
        let thresholds = Thresholds::from_pairs([
            ("high_humidity", 50.0),
            ("high_temperature", 30.0),
            ("low_pressure", 1050.0),
        ]);
        let events = evaluate("STN-1", &reading(36.0), &thresholds);

        let kinds: Vec<&str> = events.iter().map(|e| e.alert_type.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["high_humidity", "high_temperature", "low_pressure"]
        );
    }

    #[test]
    fn test_evaluation_is_deterministic_and_idempotent() {
        let thresholds =
            Thresholds::from_pairs([("high_temperature", 30.0), ("high_humidity", 50.0)]);
        let r = reading(36.0);

        let first = evaluate("STN-1", &r, &thresholds);
        let second = evaluate("STN-1", &r, &thresholds);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.alert_id, b.alert_id);
            assert_eq!(a.alert_type, b.alert_type);
            assert_eq!(a.message, b.message);
        }
    }

    #[test]
    fn test_unknown_threshold_names_are_ignored() {
        let thresholds = Thresholds::from_pairs([
            ("solar_flux_peak", 900.0),
            ("high_temperature", 30.0),
        ]);
        let events = evaluate("STN-1", &reading(36.0), &thresholds);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].alert_type, "high_temperature");
    }

    #[test]
    fn test_absent_optional_channel_skips_threshold() {
        let mut r = reading(20.0);
        r.wind_speed_ms = None;
        let thresholds = Thresholds::from_pairs([("high_wind_speed", 1.0)]);
        assert!(
            evaluate("STN-1", &r, &thresholds).is_empty(),
            "no anemometer means no wind alerts, not zero-wind alerts"
        );
    }

    #[test]
    fn test_wind_speed_fires_when_present() {
        let thresholds = Thresholds::from_pairs([("high_wind_speed", 4.0)]);
        let events = evaluate("STN-1", &reading(20.0), &thresholds);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, Severity::Critical);
    }

    #[test]
    fn test_message_names_value_and_bound() {
        let thresholds = Thresholds::from_pairs([("high_temperature", 30.0)]);
        let events = evaluate("STN-1", &reading(36.0), &thresholds);
        assert!(events[0].message.contains("36"));
        assert!(events[0].message.contains("30"));
    }
}
