/// Alert dispatch — delivers events to registered handlers.
///
/// Handlers are the seam where notification transports (email, SMS,
/// pagers) plug in without this crate knowing about them. Delivery is
/// synchronous and sequential in registration order; a handler that
/// needs parallel fan-out spawns its own background work. A failing
/// handler is logged and skipped — it never blocks delivery to the
/// remaining handlers and never reaches the monitoring loop.

use std::error::Error;

use tracing::warn;

use crate::model::AlertEvent;

/// Boxed error a handler may report without aborting dispatch.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// A consumer of alert events.
///
/// Implemented automatically for closures:
///
/// ```
/// use wxmon_service::alert::AlertDispatcher;
/// use wxmon_service::model::AlertEvent;
///
/// let mut dispatcher = AlertDispatcher::new();
/// dispatcher.register(|event: &AlertEvent| {
///     println!("{}", event.message);
///     Ok(())
/// });
/// ```
pub trait AlertHandler: Send {
    fn handle(&mut self, event: &AlertEvent) -> Result<(), HandlerError>;
}

impl<F> AlertHandler for F
where
    F: FnMut(&AlertEvent) -> Result<(), HandlerError> + Send,
{
    fn handle(&mut self, event: &AlertEvent) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Ordered registry of alert handlers.
#[derive(Default)]
pub struct AlertDispatcher {
    handlers: Vec<Box<dyn AlertHandler>>,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the delivery order. No de-duplication: a
    /// handler registered twice is invoked twice, which permits layered
    /// handling (e.g. log-then-page from one transport).
    pub fn register(&mut self, handler: impl AlertHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Deliver one event to every handler in registration order.
    ///
    /// Handler failures are logged at warn and isolated; dispatch itself
    /// never fails. Returns once every handler has been invoked.
    pub fn dispatch(&mut self, event: &AlertEvent) {
        for (index, handler) in self.handlers.iter_mut().enumerate() {
            if let Err(e) = handler.handle(event) {
                warn!(
                    alert_id = %event.alert_id,
                    handler = index,
                    error = %e,
                    "alert handler failed"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
