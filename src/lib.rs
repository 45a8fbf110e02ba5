/// wxmon_service: single-station weather monitoring and alerting service.
///
/// # Module structure
///
/// ```text
/// wxmon_service
/// ├── model      — shared data types (Station, Reading, AlertEvent, …)
/// ├── config     — station configuration loader (station.toml)
/// ├── sensor     — Sensor capability trait {initialize, read, cleanup} + mock
/// ├── validate   — reading schema validation (raw measurement -> Reading)
/// ├── journal    — date-partitioned append-only JSONL reading log
/// ├── alert
/// │   ├── thresholds — pure threshold evaluation -> alert events
/// │   └── dispatch   — ordered handler registry with failure isolation
/// └── controller — monitoring loop (state machine, interval discipline,
///                  consecutive-error limit, cooperative stop)
/// ```

/// Public modules
pub mod alert;
pub mod config;
pub mod controller;
pub mod journal;
pub mod model;
pub mod sensor;
pub mod validate;
