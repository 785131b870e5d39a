//! Session-scoped coordination: single-flight token refresh, session-expiry
//! notification, and the current-user holder.
//!
//! One instance of each lives per application session, owned by whoever
//! constructs the invoker and facade. None of these are process globals;
//! they are created at session start and dropped (or cleared) at logout.

use std::sync::{Arc, Condvar, Mutex};

use crate::error::{CommandError, Result};
use crate::model::User;

// =============================================================================
// RefreshGate - single-flight session refresh
// =============================================================================

/// Outcome cell for one in-flight refresh, settled exactly once.
#[derive(Default)]
struct Flight {
    outcome: Mutex<Option<Result<()>>>,
    settled: Condvar,
}

impl Flight {
    fn wait(&self) -> Result<()> {
        let mut outcome = self.outcome.lock().expect("refresh flight lock poisoned");
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            outcome = self
                .settled
                .wait(outcome)
                .expect("refresh flight lock poisoned");
        }
    }

    fn settle(&self, result: Result<()>) {
        let mut outcome = self.outcome.lock().expect("refresh flight lock poisoned");
        *outcome = Some(result);
        self.settled.notify_all();
    }
}

/// Guarantees at most one in-flight session refresh per gate, no matter how
/// many callers request one concurrently.
///
/// The pending flight is published under the gate lock before the refresh
/// operation runs, so a concurrent caller can never race past the in-flight
/// check and become a second initiator. Joining callers block on the shared
/// flight and receive the initiator's outcome, success or failure alike.
/// The gate returns to idle before waiters are woken, so a caller that wakes
/// can immediately start a fresh refresh.
#[derive(Default)]
pub struct RefreshGate {
    current: Mutex<Option<Arc<Flight>>>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `refresh` once across all concurrent callers.
    ///
    /// The first caller executes the operation; everyone else joins the
    /// in-flight attempt and shares its outcome. If the operation unwinds,
    /// the gate is cleared and waiters receive a transport error, so the
    /// gate cannot stay stuck in the refreshing state.
    pub fn ensure_refreshed(&self, refresh: impl FnOnce() -> Result<()>) -> Result<()> {
        let flight = {
            let mut current = self.current.lock().expect("refresh gate lock poisoned");
            if let Some(flight) = current.as_ref() {
                let flight = Arc::clone(flight);
                drop(current);
                return flight.wait();
            }
            let flight = Arc::new(Flight::default());
            *current = Some(Arc::clone(&flight));
            flight
        };

        let guard = SettleGuard {
            gate: self,
            flight: Some(flight),
        };
        let result = refresh();
        guard.finish(result.clone());
        result
    }

    fn clear(&self) {
        *self.current.lock().expect("refresh gate lock poisoned") = None;
    }
}

/// Clears the gate and settles the flight exactly once, on the normal path
/// or on unwind.
struct SettleGuard<'a> {
    gate: &'a RefreshGate,
    flight: Option<Arc<Flight>>,
}

impl SettleGuard<'_> {
    fn finish(mut self, result: Result<()>) {
        if let Some(flight) = self.flight.take() {
            // Idle before waking waiters: a woken caller may start the next
            // refresh immediately.
            self.gate.clear();
            flight.settle(result);
        }
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if let Some(flight) = self.flight.take() {
            self.gate.clear();
            flight.settle(Err(CommandError::Transport(
                "session refresh panicked".to_string(),
            )));
        }
    }
}

// =============================================================================
// SessionExpiredHook
// =============================================================================

type ExpiryHandler = Arc<dyn Fn() + Send + Sync>;

/// Callback fired when the session is unrecoverable.
///
/// At most one handler is registered at a time; a new registration replaces
/// the previous one and there is no queue. This mirrors the single consumer
/// the application has today (the login redirect); an ordered registry with
/// unregister handles would replace it if a second listener ever appears.
#[derive(Default)]
pub struct SessionExpiredHook {
    handler: Mutex<Option<ExpiryHandler>>,
}

impl SessionExpiredHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler, replacing any previous registration.
    pub fn set(&self, handler: impl Fn() + Send + Sync + 'static) {
        *self.handler.lock().expect("expiry hook lock poisoned") = Some(Arc::new(handler));
    }

    pub fn clear(&self) {
        *self.handler.lock().expect("expiry hook lock poisoned") = None;
    }

    /// Invoke the registered handler, if any.
    ///
    /// Handler panics are not caught; the handler owns its own error
    /// discipline.
    pub fn notify(&self) {
        let handler = self
            .handler
            .lock()
            .expect("expiry hook lock poisoned")
            .clone();
        if let Some(handler) = handler {
            handler();
        }
    }
}

// =============================================================================
// CurrentUser
// =============================================================================

/// Holder for the authenticated user of the current session.
///
/// Set at login and by `get_me`, cleared at logout.
#[derive(Default)]
pub struct CurrentUser {
    user: Mutex<Option<User>>,
}

impl CurrentUser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user: User) {
        *self.user.lock().expect("current user lock poisoned") = Some(user);
    }

    pub fn get(&self) -> Option<User> {
        self.user.lock().expect("current user lock poisoned").clone()
    }

    pub fn clear(&self) {
        *self.user.lock().expect("current user lock poisoned") = None;
    }
}
