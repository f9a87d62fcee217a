//! Media inventory and state management
//!
//! The [`MediaManager`] wraps a [`MediaManagement`] backend and
//! implements the library, drive, VSN, search and alarm operations on
//! top of it. All media state lives in the backend, nothing is cached
//! between calls.

use std::time::Duration;

use samqfs_api_types::{
    VirtualMediaServer, DEFAULT_CONFIRM_WAIT, DEFAULT_MAX_FLAGS, MAXIMUM_ENTRIES_FETCHED,
};

mod error;
pub use error::*;

mod access;
pub use access::*;

pub mod capacity;

mod attribute_flags;
pub use attribute_flags::*;

mod confirm;
pub use confirm::*;

pub mod backend;
use backend::MediaManagement;

mod library;
pub use library::*;

mod drive;
pub use drive::*;

mod vsn;
pub use vsn::*;

mod search;
pub use search::*;

mod alarm;
pub use alarm::*;

#[cfg(test)]
mod test;

/// Runtime settings of a [`MediaManager`]
#[derive(Clone, Debug)]
pub struct MediaManagerSettings {
    /// Interval of the best-effort confirmation wait
    pub confirm_wait: Duration,
    /// Search fetch cap
    pub max_entries: usize,
    /// Number of flag labels shown in flag summaries
    pub max_flags: usize,
}

impl Default for MediaManagerSettings {
    fn default() -> Self {
        Self {
            confirm_wait: Duration::from_secs(DEFAULT_CONFIRM_WAIT),
            max_entries: MAXIMUM_ENTRIES_FETCHED as usize,
            max_flags: DEFAULT_MAX_FLAGS as usize,
        }
    }
}

impl MediaManagerSettings {
    pub fn from_config(config: &VirtualMediaServer) -> Self {
        Self {
            confirm_wait: Duration::from_secs(config.confirm_wait.unwrap_or(DEFAULT_CONFIRM_WAIT)),
            max_entries: config.max_entries.unwrap_or(MAXIMUM_ENTRIES_FETCHED) as usize,
            max_flags: config.max_flags.unwrap_or(DEFAULT_MAX_FLAGS) as usize,
        }
    }
}

/// Media operations on top of a management backend
pub struct MediaManager {
    backend: Box<dyn MediaManagement>,
    confirm: ConfirmationWait,
    settings: MediaManagerSettings,
}

impl MediaManager {
    pub fn new(backend: Box<dyn MediaManagement>, settings: MediaManagerSettings) -> Self {
        Self {
            backend,
            confirm: ConfirmationWait::new(settings.confirm_wait),
            settings,
        }
    }

    /// Replace the confirmation wait (e.g. to use a custom sleep function)
    pub fn with_confirmation_wait(mut self, confirm: ConfirmationWait) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn settings(&self) -> &MediaManagerSettings {
        &self.settings
    }

    pub fn backend(&self) -> &dyn MediaManagement {
        self.backend.as_ref()
    }

    /// Flag summary using the configured width
    pub fn flag_summary<F: AttributeFlags>(&self, flags: F) -> String {
        flag_string(flags, self.settings.max_flags)
    }
}
