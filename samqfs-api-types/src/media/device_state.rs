use std::fmt;

use serde::{Deserialize, Serialize};

use proxmox_schema::{ApiType, IntegerSchema, Schema};

/// Device state as reported by the management backend
///
/// The backend owns the meaning of these values, drivers may report
/// states we do not know about. Such values are kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceState(pub i32);

impl DeviceState {
    pub const ON: DeviceState = DeviceState(0);
    pub const READ_ONLY: DeviceState = DeviceState(1);
    pub const IDLE: DeviceState = DeviceState(2);
    pub const UNAVAILABLE: DeviceState = DeviceState(3);
    pub const OFF: DeviceState = DeviceState(4);
    pub const DOWN: DeviceState = DeviceState(5);
    pub const NO_ALLOC: DeviceState = DeviceState(6);

    /// Returns the well known name, if any
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            DeviceState::ON => "on",
            DeviceState::READ_ONLY => "ro",
            DeviceState::IDLE => "idle",
            DeviceState::UNAVAILABLE => "unavail",
            DeviceState::OFF => "off",
            DeviceState::DOWN => "down",
            DeviceState::NO_ALLOC => "noalloc",
            _ => return None,
        };
        Some(name)
    }

    pub fn is_on(&self) -> bool {
        *self == DeviceState::ON
    }
}

impl ApiType for DeviceState {
    const API_SCHEMA: Schema = IntegerSchema::new(
        "Device state (0=on, 1=ro, 2=idle, 3=unavail, 4=off, 5=down, 6=noalloc, others are driver defined).",
    )
    .schema();
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "state-{}", self.0),
        }
    }
}

impl std::str::FromStr for DeviceState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let state = match s {
            "on" => DeviceState::ON,
            "ro" => DeviceState::READ_ONLY,
            "idle" => DeviceState::IDLE,
            "unavail" => DeviceState::UNAVAILABLE,
            "off" => DeviceState::OFF,
            "down" => DeviceState::DOWN,
            "noalloc" => DeviceState::NO_ALLOC,
            other => {
                let raw = other.strip_prefix("state-").unwrap_or(other);
                match raw.parse::<i32>() {
                    Ok(value) => DeviceState(value),
                    Err(_) => anyhow::bail!("unable to parse device state '{}'", s),
                }
            }
        };
        Ok(state)
    }
}
