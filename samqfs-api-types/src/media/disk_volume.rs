use serde::{Deserialize, Serialize};

use proxmox_schema::api;

use crate::MEDIA_TYPE_SCHEMA;

#[api(
    properties: {
        "media-type": {
            schema: MEDIA_TYPE_SCHEMA,
        },
    },
)]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case")]
/// Disk archive volume
pub struct DiskVolumeInfo {
    /// Volume name
    pub name: String,
    /// Host serving the volume (empty for local volumes)
    pub host: String,
    /// Path of the volume directory
    pub path: String,
    /// Either 'dk' (disk) or 'cb' (honeycomb)
    pub media_type: String,
    /// Capacity (MiB)
    pub capacity: u64,
    /// Available space (MiB)
    pub available: u64,
    /// Media is damaged
    #[serde(default)]
    pub bad_media: bool,
    /// Volume is unavailable
    #[serde(default)]
    pub unavailable: bool,
    /// Read only
    #[serde(default)]
    pub read_only: bool,
    /// Volume is labeled
    #[serde(default)]
    pub labeled: bool,
    /// Volume state is unknown
    #[serde(default)]
    pub unknown: bool,
    /// Volume is served by a remote host
    #[serde(default)]
    pub remote: bool,
}
