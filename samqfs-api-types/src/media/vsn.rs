use serde::{Deserialize, Serialize};

use proxmox_schema::{api, Schema, StringSchema};

use crate::{LIBRARY_NAME_SCHEMA, MEDIA_TYPE_SCHEMA, VSN_NAME_FORMAT, VSN_POOL_NAME_SCHEMA};

pub const VSN_NAME_SCHEMA: Schema = StringSchema::new("Volume serial name (VSN).")
    .format(&VSN_NAME_FORMAT)
    .min_length(1)
    .max_length(6)
    .schema();

#[api()]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Kind of entity owning a reservation
pub enum ReservationKind {
    /// Reserved for a user
    Owner,
    /// Reserved for a group
    Group,
    /// Reserved for a starting directory
    StartingDir,
}

#[api(
    properties: {
        kind: {
            type: ReservationKind,
            optional: true,
        },
    },
)]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
/// Reservation parameters
pub struct ReservationRequest {
    /// Archive policy name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    /// File system name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReservationKind>,
    /// Owner, group or directory name (depends on kind)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[api(
    properties: {
        kind: {
            type: ReservationKind,
            optional: true,
        },
    },
)]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case")]
/// Active reservation of a VSN
pub struct Reservation {
    /// Archive policy name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    /// File system name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReservationKind>,
    /// Owner, group or directory name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Reservation time (epoch)
    pub time: i64,
}

impl Reservation {
    pub fn new(request: &ReservationRequest, time: i64) -> Self {
        Self {
            policy: request.policy.clone(),
            file_system: request.file_system.clone(),
            kind: request.kind,
            name: request.name.clone(),
            time,
        }
    }
}

#[api()]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
/// The nine user settable VSN attributes
///
/// Those are always written together.
pub struct VsnAttributes {
    /// Media is damaged
    #[serde(default)]
    pub damaged: bool,
    /// Duplicate VSN
    #[serde(default)]
    pub duplicate: bool,
    /// Read only
    #[serde(default)]
    pub read_only: bool,
    /// Write protected
    #[serde(default)]
    pub write_protected: bool,
    /// Foreign media
    #[serde(default)]
    pub foreign: bool,
    /// Marked for recycling
    #[serde(default)]
    pub recycle: bool,
    /// Volume is full
    #[serde(default)]
    pub full: bool,
    /// Volume is unavailable
    #[serde(default)]
    pub unavailable: bool,
    /// Volume needs an audit
    #[serde(default)]
    pub needs_audit: bool,
}

#[api()]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Label mode
pub enum LabelMode {
    /// Label blank media
    Label,
    /// Relabel previously labeled media
    Relabel,
}

#[api(
    properties: {
        library: {
            schema: LIBRARY_NAME_SCHEMA,
        },
        "media-type": {
            schema: MEDIA_TYPE_SCHEMA,
        },
        pool: {
            schema: VSN_POOL_NAME_SCHEMA,
            optional: true,
        },
        reservation: {
            type: Reservation,
            optional: true,
        },
        attributes: {
            type: VsnAttributes,
        },
    },
)]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case")]
/// Volume (VSN) catalog entry
pub struct VsnInfo {
    /// VSN name (empty for unlabeled media)
    pub name: String,
    /// Barcode
    pub barcode: String,
    /// Catalog slot
    pub slot: u32,
    pub library: String,
    pub media_type: String,
    /// Capacity (MiB)
    pub capacity: u64,
    /// Available space (MiB)
    pub available: u64,
    /// Access count
    pub access_count: u64,
    /// Block size (KiB, 0 is the device default)
    pub block_size: u64,
    /// Label time (epoch, 0 if unlabeled)
    pub label_time: i64,
    /// Last mount time (epoch)
    pub mount_time: i64,
    /// Last modification time (epoch)
    pub modification_time: i64,
    /// Media is labeled
    pub labeled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<Reservation>,
    #[serde(flatten)]
    pub attributes: VsnAttributes,
}

impl VsnInfo {
    pub fn is_reserved(&self) -> bool {
        self.reservation.is_some()
    }
}

#[api(
    properties: {
        name: {
            schema: VSN_NAME_SCHEMA,
        },
        "media-type": {
            schema: MEDIA_TYPE_SCHEMA,
        },
    },
)]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case")]
/// Volume known to the ACSLS server
pub struct AcslsVolume {
    pub name: String,
    pub media_type: String,
    /// ACSLS scratch pool id
    pub pool_id: u32,
    /// Volume is already imported somewhere
    pub in_use: bool,
    /// ACSLS volume status
    pub status: String,
}
