/// Station configuration loader - parses station.toml
///
/// Separates station metadata and alert thresholds from code, making it
/// easy to retune bounds or redeploy the service against a different
/// station without recompiling. One file configures one controller; a
/// deployment with several stations runs one service process per file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use serde::Deserialize;

use crate::alert::Thresholds;
use crate::alert::thresholds::ThresholdEntry;
use crate::model::Station;

/// The configuration file was missing, malformed, or semantically invalid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Root structure of station.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct StationFile {
    pub station: Station,
    pub monitor: MonitorConfig,
    /// Ordered `[[threshold]]` entries; order here is evaluation order.
    #[serde(default)]
    pub threshold: Vec<ThresholdEntry>,
}

/// Monitoring loop settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between the start of consecutive poll cycles. Must be > 0.
    pub reading_interval_secs: f64,
    /// Stop the loop after this many consecutive sensor/validation
    /// failures. Absent means unbounded.
    #[serde(default)]
    pub max_consecutive_errors: Option<u32>,
    /// Directory for the daily reading journal.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl MonitorConfig {
    pub fn reading_interval(&self) -> Duration {
        Duration::from_secs_f64(self.reading_interval_secs)
    }
}

impl StationFile {
    /// Thresholds in declaration order, ready for the evaluator.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.threshold.clone())
    }
}

/// Loads and validates the station configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<StationFile, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;

    let file: StationFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })?;

    validate_config(&file)?;
    Ok(file)
}

/// Semantic checks the TOML schema cannot express.
pub fn validate_config(file: &StationFile) -> Result<(), ConfigError> {
    let s = &file.station;

    if s.station_id.is_empty() {
        return Err(ConfigError::Invalid("station_id must not be empty".into()));
    }
    if !(-90.0..=90.0).contains(&s.latitude) {
        return Err(ConfigError::Invalid(format!(
            "latitude {} outside [-90, 90]",
            s.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&s.longitude) {
        return Err(ConfigError::Invalid(format!(
            "longitude {} outside [-180, 180]",
            s.longitude
        )));
    }
    // `!(secs > 0.0)` also catches NaN; try_from rejects infinities and
    // values too large for a Duration, so reading_interval() cannot
    // panic on a validated file.
    let secs = file.monitor.reading_interval_secs;
    if !(secs > 0.0) || Duration::try_from_secs_f64(secs).is_err() {
        return Err(ConfigError::Invalid(format!(
            "reading_interval_secs must be a positive finite number of seconds, got {}",
            secs
        )));
    }
    if file.monitor.max_consecutive_errors == Some(0) {
        return Err(ConfigError::Invalid(
            "max_consecutive_errors must be >= 1 when set".into(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in &file.threshold {
        if !seen.insert(entry.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "duplicate threshold '{}'",
                entry.name
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
