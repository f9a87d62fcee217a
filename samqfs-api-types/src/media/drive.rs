use serde::{Deserialize, Serialize};

use proxmox_schema::api;

use crate::{
    parse_removable_media_status, DeviceState, RemovableMediaStatus, LIBRARY_NAME_SCHEMA,
    MEDIA_TYPE_SCHEMA,
};

#[api(
    properties: {
        library: {
            schema: LIBRARY_NAME_SCHEMA,
        },
        "media-type": {
            schema: MEDIA_TYPE_SCHEMA,
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
/// Drive status
pub struct DriveInfo {
    /// Equipment ordinal (unique within the library)
    pub eq: u32,
    pub library: String,
    /// Device path
    pub path: String,
    /// Vendor name
    pub vendor: String,
    /// Product ID
    pub product_id: String,
    /// Serial number
    pub serial_number: String,
    /// Firmware level
    pub firmware_level: String,
    pub media_type: String,
    pub state: DeviceState,
    /// Shared drive (ACSLS libraries only)
    pub shared: bool,
    /// Catalog slot of the loaded VSN
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_slot: Option<u32>,
    /// Name of the loaded VSN
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_vsn: Option<String>,
    pub detailed_status: Vec<String>,
    pub messages: Vec<String>,
}

impl DriveInfo {
    /// Decoded detailed status
    pub fn status_codes(&self) -> Vec<RemovableMediaStatus> {
        self.detailed_status
            .iter()
            .flat_map(|status| parse_removable_media_status(status))
            .collect()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_slot.is_some()
    }

    /// Forget the loaded volume.
    pub fn clear_loaded(&mut self) {
        self.loaded_slot = None;
        self.loaded_vsn = None;
    }
}
