//! Best-effort confirmation wait after state change requests
//!
//! Backends apply state changes asynchronously. After a request, we look
//! at the state once. If it did not change yet, we wait one fixed interval
//! and carry on without looking again. This is not a poll loop and gives
//! no guarantee that the new state is visible afterwards.

use std::time::Duration;

use super::ManagementError;

/// Outcome of a [`ConfirmationWait`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation<T> {
    /// The re-read value differs from the value before the request
    Confirmed(T),
    /// Value was unchanged, we waited once
    WaitedOnce,
}

impl<T> Confirmation<T> {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Confirmed(_))
    }
}

#[derive(Clone, Copy)]
pub struct ConfirmationWait {
    interval: Duration,
    sleep: fn(Duration),
}

impl std::fmt::Debug for ConfirmationWait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationWait")
            .field("interval", &self.interval)
            .finish()
    }
}

impl ConfirmationWait {
    pub fn new(interval: Duration) -> Self {
        Self::with_sleep(interval, std::thread::sleep)
    }

    /// Use a custom sleep function
    pub fn with_sleep(interval: Duration, sleep: fn(Duration)) -> Self {
        Self { interval, sleep }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Re-read once, and wait once if the value is unchanged.
    pub fn wait<T, F>(&self, before: &T, reread: F) -> Result<Confirmation<T>, ManagementError>
    where
        T: PartialEq + std::fmt::Debug,
        F: FnOnce() -> Result<T, ManagementError>,
    {
        let current = reread()?;
        if current != *before {
            return Ok(Confirmation::Confirmed(current));
        }

        log::debug!(
            "state still {:?}, waiting {:?} once",
            current,
            self.interval
        );
        if !self.interval.is_zero() {
            (self.sleep)(self.interval);
        }

        Ok(Confirmation::WaitedOnce)
    }
}
