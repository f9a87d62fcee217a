//! Types for the media manager API

mod device_state;
pub use device_state::*;

mod device_status;
pub use device_status::*;

mod library;
pub use library::*;

mod drive;
pub use drive::*;

mod vsn;
pub use vsn::*;

mod disk_volume;
pub use disk_volume::*;

mod alarm;
pub use alarm::*;

mod server;
pub use server::*;

use proxmox_schema::{Schema, StringSchema};

use crate::{MEDIA_TYPE_FORMAT, SAFE_ID_FORMAT};

pub const LIBRARY_NAME_SCHEMA: Schema = StringSchema::new("Library (family set) name.")
    .format(&SAFE_ID_FORMAT)
    .min_length(1)
    .max_length(32)
    .schema();

pub const MEDIA_TYPE_SCHEMA: Schema = StringSchema::new("Media type code (e.g. 'li', 'lt', 'dk').")
    .format(&MEDIA_TYPE_FORMAT)
    .schema();

pub const VSN_POOL_NAME_SCHEMA: Schema = StringSchema::new("VSN pool name.")
    .format(&SAFE_ID_FORMAT)
    .min_length(1)
    .max_length(32)
    .schema();

/// Name of the pseudo library holding exported and orphaned volumes
pub const HISTORIAN_NAME: &str = "Historian";

/// Media type code used for disk volumes
pub const DISK_MEDIA: &str = "dk";

/// Media type code used for STK 5800 honeycomb volumes (handled like disk)
pub const STK5800_MEDIA: &str = "cb";

/// Returns true if the media type code denotes a disk volume
pub fn is_disk_media_type(media_type: &str) -> bool {
    media_type == DISK_MEDIA || media_type == STK5800_MEDIA
}

/// Returns true if `name` is the Historian sentinel name.
pub fn is_historian_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(HISTORIAN_NAME)
}
