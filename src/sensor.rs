/// Sensor capability interface.
///
/// The controller drives any type implementing `Sensor`; hardware-backed
/// drivers live outside this crate. The contract is deliberately small:
/// initialize once before the loop starts, read one raw measurement per
/// cycle, clean up best-effort on shutdown.

use crate::model::RawMeasurement;

/// Error raised by a sensor during initialization or reading.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// The sensor could not be brought up. Fatal at controller start.
    #[error("sensor initialization failed: {0}")]
    Init(String),
    /// A single read attempt failed. Recoverable; counted by the loop.
    #[error("sensor read failed: {0}")]
    Read(String),
    /// Cleanup did not complete. Logged at shutdown, never propagated.
    #[error("sensor cleanup failed: {0}")]
    Cleanup(String),
}

/// Capability set for a weather sensor.
///
/// `read` returns raw channel values; range validation is the
/// controller's job, not the driver's. A slow or hanging `read` stalls
/// the cycle — bounding read latency is the driver's responsibility.
pub trait Sensor {
    /// Bring up the sensor hardware. Called once before the first cycle.
    fn initialize(&mut self) -> Result<(), SensorError>;

    /// Take one raw measurement. Channels the sensor does not carry are
    /// reported as `None`.
    fn read(&mut self) -> Result<RawMeasurement, SensorError>;

    /// Release sensor resources. Best-effort; called once at shutdown.
    fn cleanup(&mut self) -> Result<(), SensorError>;
}

// ---------------------------------------------------------------------------
// Mock sensor
// ---------------------------------------------------------------------------

/// Fixed-value sensor for the demo binary and tests.
///
/// Reports nominal fair-weather values on every read and never fails.
#[derive(Debug, Default)]
pub struct MockSensor;

impl Sensor for MockSensor {
    fn initialize(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn read(&mut self) -> Result<RawMeasurement, SensorError> {
        Ok(RawMeasurement {
            temperature_celsius: Some(20.0),
            humidity_percent: Some(65.0),
            pressure_hpa: Some(1013.25),
            wind_speed_ms: Some(5.0),
            wind_direction_degrees: Some(180.0),
            rain_mm: Some(0.0),
        })
    }

    fn cleanup(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_sensor_reports_all_channels() {
        let mut sensor = MockSensor;
        sensor.initialize().expect("mock init never fails");

        let raw = sensor.read().expect("mock read never fails");
        assert_eq!(raw.temperature_celsius, Some(20.0));
        assert_eq!(raw.humidity_percent, Some(65.0));
        assert_eq!(raw.pressure_hpa, Some(1013.25));
        assert_eq!(raw.wind_speed_ms, Some(5.0));
        assert_eq!(raw.wind_direction_degrees, Some(180.0));
        assert_eq!(raw.rain_mm, Some(0.0));

        sensor.cleanup().expect("mock cleanup never fails");
    }
}
