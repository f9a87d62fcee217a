use serde::{Deserialize, Serialize};

use proxmox_schema::api;

use crate::{
    parse_removable_media_status, DeviceState, DriverType, RemovableMediaStatus,
    LIBRARY_NAME_SCHEMA,
};

#[api(
    properties: {
        name: {
            schema: LIBRARY_NAME_SCHEMA,
        },
        "driver-type": {
            type: DriverType,
        },
        state: {
            type: DeviceState,
        },
        "detailed-status": {
            type: Array,
            items: {
                description: "Detailed status string.",
                type: String,
            },
        },
        messages: {
            type: Array,
            items: {
                description: "Device message.",
                type: String,
            },
        },
    },
)]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case")]
/// Library (family set) summary
pub struct LibraryInfo {
    pub name: String,
    /// Equipment ordinal
    pub eq: u32,
    /// Two letter equipment type
    pub equ_type: String,
    /// Vendor name
    pub vendor: String,
    /// Product ID
    pub product_id: String,
    pub driver_type: DriverType,
    pub state: DeviceState,
    /// Total capacity (MiB)
    pub capacity: u64,
    /// Total free space (MiB)
    pub free_space: u64,
    /// Firmware level
    pub firmware_level: String,
    /// Serial number
    pub serial_number: String,
    pub detailed_status: Vec<String>,
    pub messages: Vec<String>,
}

impl LibraryInfo {
    /// Decoded detailed status
    pub fn status_codes(&self) -> Vec<RemovableMediaStatus> {
        self.detailed_status
            .iter()
            .flat_map(|status| parse_removable_media_status(status))
            .collect()
    }

    /// Capacity, or 0 when the library is not online.
    pub fn effective_capacity(&self) -> u64 {
        if self.state.is_on() {
            self.capacity
        } else {
            0
        }
    }

    /// Free space, or 0 when the library is not online.
    pub fn effective_free_space(&self) -> u64 {
        if self.state.is_on() {
            self.free_space
        } else {
            0
        }
    }
}
