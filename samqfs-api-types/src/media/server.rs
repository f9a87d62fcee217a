use serde::{Deserialize, Serialize};

use proxmox_schema::{api, IntegerSchema, Schema, Updater};

use crate::{SERVER_NAME_SCHEMA, SINGLE_LINE_COMMENT_SCHEMA};

/// Number of entries a search returns at most
pub const MAXIMUM_ENTRIES_FETCHED: u64 = 1000;

/// Number of flag labels shown before the remaining ones get counted
pub const DEFAULT_MAX_FLAGS: u64 = 2;

/// Seconds to wait once after a state change request
pub const DEFAULT_CONFIRM_WAIT: u64 = 5;

pub const CONFIRM_WAIT_SCHEMA: Schema = IntegerSchema::new(
    "Seconds to wait once after a state change request was not yet visible.",
)
.minimum(0)
.maximum(60)
.default(DEFAULT_CONFIRM_WAIT as isize)
.schema();

pub const MAX_ENTRIES_SCHEMA: Schema = IntegerSchema::new("Maximum number of search results.")
    .minimum(1)
    .maximum(100_000)
    .default(MAXIMUM_ENTRIES_FETCHED as isize)
    .schema();

pub const MAX_FLAGS_SCHEMA: Schema =
    IntegerSchema::new("Number of attribute flags shown before summarizing the rest.")
        .minimum(0)
        .maximum(10)
        .default(DEFAULT_MAX_FLAGS as isize)
        .schema();

pub const STATE_DELAY_SCHEMA: Schema = IntegerSchema::new(
    "Seconds until a requested device state becomes visible (virtual servers only).",
)
.minimum(0)
.maximum(3600)
.default(0)
.schema();

#[api(
    properties: {
        name: {
            schema: SERVER_NAME_SCHEMA,
        },
        comment: {
            schema: SINGLE_LINE_COMMENT_SCHEMA,
            optional: true,
        },
        "confirm-wait": {
            schema: CONFIRM_WAIT_SCHEMA,
            optional: true,
        },
        "max-entries": {
            schema: MAX_ENTRIES_SCHEMA,
            optional: true,
        },
        "max-flags": {
            schema: MAX_FLAGS_SCHEMA,
            optional: true,
        },
        "state-delay": {
            schema: STATE_DELAY_SCHEMA,
            optional: true,
        },
        "sync-label": {
            description: "Label synchronously, without starting a job.",
            type: bool,
            optional: true,
            default: false,
        },
    }
)]
#[derive(Serialize, Deserialize, Updater, Clone, Debug)]
#[serde(rename_all = "kebab-case")]
/// Simulated media management server (only for test and debug)
pub struct VirtualMediaServer {
    #[updater(skip)]
    pub name: String,
    /// Path to state directory
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_wait: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_flags: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_delay: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_label: Option<bool>,
}
