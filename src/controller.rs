/// Core monitoring loop for the weather station service.
///
/// This module implements the controller that:
/// 1. Initializes the sensor and enters the polling loop
/// 2. Reads, validates, and journals one measurement per cycle
/// 3. Evaluates thresholds and dispatches alert events
/// 4. Tracks consecutive failures against a configurable limit
/// 5. Honors cooperative stop requests from other threads
///
/// One controller drives exactly one sensor and one journal. The loop
/// runs one cycle at a time to completion; cycles never overlap. The
/// only cross-thread operations are `ControllerHandle::stop()` and the
/// status accessors.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::alert::{AlertDispatcher, AlertHandler, Thresholds, evaluate};
use crate::journal::ReadingJournal;
use crate::model::{Reading, Station};
use crate::sensor::{Sensor, SensorError};
use crate::validate::{self, ValidationError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Loop timing and failure tolerance.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Interval between the start of consecutive cycles. Cycle duration
    /// is subtracted from the sleep; a cycle that overruns the interval
    /// is followed immediately by the next one.
    pub reading_interval: Duration,
    /// Stop with `MaxErrorsExceeded` once this many consecutive
    /// sensor/validation failures accumulate. `None` means unbounded.
    pub max_consecutive_errors: Option<u32>,
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Lifecycle state of the monitoring loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Constructed, never started.
    Idle,
    /// Loop is cycling.
    Running,
    /// Stop requested; the in-flight cycle finishes, then teardown.
    Stopping,
    /// Loop has exited and the sensor was cleaned up.
    Stopped,
}

/// Fatal controller errors. Recoverable failures (sensor reads,
/// validation, journal IO) are logged and counted inside the loop and
/// never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// `run` was called while a previous run is still shutting down.
    #[error("controller is still stopping from a previous run")]
    AlreadyRunning,
    /// The consecutive-failure limit was reached.
    #[error("stopped after {count} consecutive errors (limit {limit})")]
    MaxErrorsExceeded { count: u32, limit: u32 },
    /// The sensor could not be initialized; the loop never started.
    #[error("sensor failed to initialize: {0}")]
    SensorInit(#[source] SensorError),
}

/// One recoverable cycle failure.
#[derive(Debug, thiserror::Error)]
enum CycleError {
    #[error(transparent)]
    Sensor(SensorError),
    #[error(transparent)]
    Validation(ValidationError),
}

// State shared with handles. The condvar is signaled on every state
// transition and on stop requests, so sleeping loops and waiting
// observers both wake promptly.
struct Shared {
    state: Mutex<RunState>,
    signal: Condvar,
    last_reading: Mutex<Option<Reading>>,
}

/// Cloneable view of a running controller for other threads: request a
/// stop, observe the lifecycle state, or fetch the latest reading.
#[derive(Clone)]
pub struct ControllerHandle {
    shared: Arc<Shared>,
}

impl ControllerHandle {
    /// Request a stop. Transitions `Running -> Stopping`, interrupts any
    /// in-progress sleep, and returns immediately; termination is
    /// observed via `state()` or `wait_until_stopped`. No-op in any
    /// other state.
    pub fn stop(&self) {
        let mut state = self.shared.state.lock().unwrap();
        if *state == RunState::Running {
            *state = RunState::Stopping;
            self.shared.signal.notify_all();
        }
    }

    pub fn state(&self) -> RunState {
        *self.shared.state.lock().unwrap()
    }

    /// Most recent validated reading, for status reporting.
    pub fn last_reading(&self) -> Option<Reading> {
        *self.shared.last_reading.lock().unwrap()
    }

    /// Block until the loop reaches `Stopped` or the timeout elapses.
    /// Returns whether `Stopped` was reached.
    pub fn wait_until_stopped(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock().unwrap();
        while *state != RunState::Stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .shared
                .signal
                .wait_timeout(state, deadline - now)
                .unwrap();
            state = guard;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Weather station monitoring controller.
///
/// Owns the sensor, journal, thresholds, and dispatcher exclusively.
pub struct Controller<S: Sensor> {
    station: Station,
    sensor: S,
    thresholds: Thresholds,
    journal: ReadingJournal,
    dispatcher: AlertDispatcher,
    config: ControllerConfig,
    consecutive_errors: u32,
    shared: Arc<Shared>,
}

impl<S: Sensor> Controller<S> {
    pub fn new(
        station: Station,
        sensor: S,
        thresholds: Thresholds,
        journal: ReadingJournal,
        config: ControllerConfig,
    ) -> Self {
        Self {
            station,
            sensor,
            thresholds,
            journal,
            dispatcher: AlertDispatcher::new(),
            config,
            consecutive_errors: 0,
            shared: Arc::new(Shared {
                state: Mutex::new(RunState::Idle),
                signal: Condvar::new(),
                last_reading: Mutex::new(None),
            }),
        }
    }

    /// Register an alert handler. Handlers receive events in
    /// registration order; see `alert::dispatch`.
    pub fn add_alert_handler(&mut self, handler: impl AlertHandler + 'static) {
        self.dispatcher.register(handler);
    }

    /// Handle for stopping and observing this controller from other
    /// threads.
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Start monitoring and block until the loop stops.
    ///
    /// Initializes the sensor before entering `Running`; an
    /// initialization failure aborts the start and the state never
    /// leaves `Idle`/`Stopped`. Returns `Ok(())` after a requested stop,
    /// `Err(MaxErrorsExceeded)` when the failure limit trips. Calling
    /// `run` while already `Running` is a no-op; while `Stopping` it is
    /// an error.
    pub fn run(&mut self) -> Result<(), ControllerError> {
        match *self.shared.state.lock().unwrap() {
            RunState::Running => return Ok(()),
            RunState::Stopping => return Err(ControllerError::AlreadyRunning),
            RunState::Idle | RunState::Stopped => {}
        }

        self.sensor
            .initialize()
            .map_err(ControllerError::SensorInit)?;
        self.consecutive_errors = 0;
        self.set_state(RunState::Running);
        info!(
            station = %self.station.station_id,
            interval_secs = self.config.reading_interval.as_secs_f64(),
            "monitoring started"
        );

        let result = self.run_loop();

        if let Err(e) = self.sensor.cleanup() {
            warn!(error = %e, "sensor cleanup failed");
        }
        self.set_state(RunState::Stopped);
        info!(station = %self.station.station_id, "monitoring stopped");
        result
    }

    fn run_loop(&mut self) -> Result<(), ControllerError> {
        loop {
            if self.stop_requested() {
                return Ok(());
            }

            let cycle_start = Instant::now();
            match self.cycle() {
                Ok(()) => self.consecutive_errors = 0,
                Err(e) => {
                    self.consecutive_errors += 1;
                    warn!(
                        error = %e,
                        consecutive_errors = self.consecutive_errors,
                        "poll cycle failed"
                    );
                    if let Some(limit) = self.config.max_consecutive_errors
                        && self.consecutive_errors >= limit
                    {
                        error!(limit, "consecutive error limit reached, stopping");
                        return Err(ControllerError::MaxErrorsExceeded {
                            count: self.consecutive_errors,
                            limit,
                        });
                    }
                }
            }

            // Interval is measured from the start of the cycle, so cycle
            // duration comes out of the sleep budget. A cycle that
            // overran the interval sleeps zero and the next one begins
            // immediately.
            let budget = self
                .config
                .reading_interval
                .saturating_sub(cycle_start.elapsed());
            if !self.sleep_interruptible(budget) {
                return Ok(());
            }
        }
    }

    /// One poll cycle: read, validate, journal, evaluate, dispatch.
    fn cycle(&mut self) -> Result<(), CycleError> {
        let raw = self.sensor.read().map_err(CycleError::Sensor)?;
        let reading = validate::validate(&raw, Utc::now()).map_err(CycleError::Validation)?;

        // A journal failure does not suppress alerting: events are
        // evaluated from the in-memory reading even when the record
        // never reached disk. At-least-once alert delivery wins over
        // persist-before-notify here.
        if let Err(e) = self.journal.append(&reading) {
            warn!(error = %e, "failed to journal reading");
        }

        let events = evaluate(&self.station.station_id, &reading, &self.thresholds);
        for event in &events {
            self.dispatcher.dispatch(event);
        }

        *self.shared.last_reading.lock().unwrap() = Some(reading);
        info!(
            temperature_c = reading.temperature_celsius,
            humidity_pct = reading.humidity_percent,
            pressure_hpa = reading.pressure_hpa,
            alerts = events.len(),
            "reading recorded"
        );
        Ok(())
    }

    /// Sleep for `budget`, waking early on a stop request. Returns false
    /// when a stop was requested during the sleep.
    fn sleep_interruptible(&self, budget: Duration) -> bool {
        let deadline = Instant::now() + budget;
        let mut state = self.shared.state.lock().unwrap();
        while *state == RunState::Running {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            let (guard, _) = self
                .shared
                .signal
                .wait_timeout(state, deadline - now)
                .unwrap();
            state = guard;
        }
        false
    }

    fn stop_requested(&self) -> bool {
        *self.shared.state.lock().unwrap() == RunState::Stopping
    }

    fn set_state(&self, next: RunState) {
        let mut state = self.shared.state.lock().unwrap();
        *state = next;
        self.shared.signal.notify_all();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawMeasurement;
    use crate::sensor::MockSensor;

    fn station() -> Station {
        Station {
            station_id: "TEST-STN".to_string(),
            name: "Test Station".to_string(),
            latitude: 51.5074,
            longitude: -0.1278,
            altitude_meters: 11.0,
        }
    }

    fn controller_with<S: Sensor>(sensor: S, max_errors: Option<u32>) -> Controller<S> {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = ReadingJournal::open(dir.keep()).expect("journal");
        Controller::new(
            station(),
            sensor,
            Thresholds::default(),
            journal,
            ControllerConfig {
                reading_interval: Duration::from_millis(10),
                max_consecutive_errors: max_errors,
            },
        )
    }

    /// Sensor that always fails to read.
    struct DeadSensor;

    impl Sensor for DeadSensor {
        fn initialize(&mut self) -> Result<(), SensorError> {
            Ok(())
        }
        fn read(&mut self) -> Result<RawMeasurement, SensorError> {
            Err(SensorError::Read("bus timeout".to_string()))
        }
        fn cleanup(&mut self) -> Result<(), SensorError> {
            Ok(())
        }
    }

    /// Sensor whose initialization fails.
    struct BrickedSensor;

    impl Sensor for BrickedSensor {
        fn initialize(&mut self) -> Result<(), SensorError> {
            Err(SensorError::Init("no device on bus".to_string()))
        }
        fn read(&mut self) -> Result<RawMeasurement, SensorError> {
            unreachable!("read must not be called on a sensor that failed init")
        }
        fn cleanup(&mut self) -> Result<(), SensorError> {
            Ok(())
        }
    }

    #[test]
    fn test_controller_starts_idle() {
        let controller = controller_with(MockSensor, None);
        assert_eq!(controller.handle().state(), RunState::Idle);
        assert!(controller.handle().last_reading().is_none());
    }

    #[test]
    fn test_init_failure_is_fatal_and_loop_never_runs() {
        let mut controller = controller_with(BrickedSensor, None);
        let err = controller.run().expect_err("bricked sensor must abort start");
        assert!(matches!(err, ControllerError::SensorInit(_)));
        assert_eq!(controller.handle().state(), RunState::Idle);
    }

    #[test]
    fn test_max_errors_stops_loop_with_error() {
        let mut controller = controller_with(DeadSensor, Some(3));
        let err = controller.run().expect_err("dead sensor must trip the limit");
        match err {
            ControllerError::MaxErrorsExceeded { count, limit } => {
                assert_eq!(count, 3);
                assert_eq!(limit, 3);
            }
            other => panic!("expected MaxErrorsExceeded, got {other:?}"),
        }
        assert_eq!(controller.handle().state(), RunState::Stopped);
    }

    #[test]
    fn test_failed_cycles_produce_no_reading() {
        let mut controller = controller_with(DeadSensor, Some(2));
        let handle = controller.handle();
        let _ = controller.run();
        assert!(handle.last_reading().is_none());
    }

    #[test]
    fn test_stop_before_start_is_a_no_op() {
        let controller = controller_with(MockSensor, None);
        let handle = controller.handle();
        handle.stop();
        assert_eq!(handle.state(), RunState::Idle);
    }
}
