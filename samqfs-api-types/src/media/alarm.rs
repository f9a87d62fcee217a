use serde::{Deserialize, Serialize};

use proxmox_schema::api;

#[api()]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Alarm severity
pub enum AlarmSeverity {
    /// Critical
    Critical,
    /// Major
    Major,
    /// Minor
    Minor,
}

#[api()]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Alarm status
pub enum AlarmStatus {
    /// Not yet acknowledged
    Active,
    /// Acknowledged by an administrator
    Acknowledged,
}

#[api(
    properties: {
        severity: {
            type: AlarmSeverity,
        },
        status: {
            type: AlarmStatus,
        },
    },
)]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case")]
/// Fault/alarm entry
pub struct Alarm {
    /// Alarm ID
    pub id: u64,
    pub severity: AlarmSeverity,
    /// Alarm text
    pub description: String,
    /// Generation time (epoch)
    pub time: i64,
    pub status: AlarmStatus,
    /// Associated library
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
}

#[api(
    properties: {
        severity: {
            type: AlarmSeverity,
            optional: true,
        },
        status: {
            type: AlarmStatus,
            optional: true,
        },
    },
)]
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "kebab-case")]
/// Alarm list filter
pub struct AlarmFilter {
    /// Only alarms of this library
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<AlarmSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AlarmStatus>,
}

impl AlarmFilter {
    pub fn matches(&self, alarm: &Alarm) -> bool {
        if let Some(ref library) = self.library {
            if alarm.library.as_deref() != Some(library.as_str()) {
                return false;
            }
        }
        if let Some(severity) = self.severity {
            if alarm.severity != severity {
                return false;
            }
        }
        if let Some(status) = self.status {
            if alarm.status != status {
                return false;
            }
        }
        true
    }
}
