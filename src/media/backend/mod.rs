//! Management backend interface
//!
//! The backend owns all media state. Libraries, drives and volumes are
//! discovered and persisted by the backend, the media manager only
//! references them by library name, drive ordinal and catalog slot.

mod virtual_backend;
pub use virtual_backend::*;

use samqfs_api_types::{
    AcslsVolume, Alarm, DeviceState, DiskVolumeInfo, DriveInfo, LabelMode, LibraryInfo,
    ReservationRequest, VsnAttributes, VsnInfo,
};

use super::ManagementError;

/// Backend job id value meaning "no job was started"
pub const NO_JOB_ID: i64 = -1;

/// Calls into the management backend
///
/// Read accessors take `&self`, everything changing media state takes
/// `&mut self`. Mutating calls either succeed or return a
/// [`ManagementError`]. Nothing is applied speculatively on our side.
pub trait MediaManagement {
    /// All libraries, including the Historian
    fn list_libraries(&self) -> Result<Vec<LibraryInfo>, ManagementError>;

    fn library(&self, name: &str) -> Result<Option<LibraryInfo>, ManagementError>;

    /// Drives of a library, `None` if the backend has no drive list
    fn library_drives(&self, library: &str) -> Result<Option<Vec<DriveInfo>>, ManagementError>;

    /// Catalog of a library, ordered by slot
    fn catalog(&self, library: &str) -> Result<Vec<VsnInfo>, ManagementError>;

    /// Catalog entry, `None` if the slot is empty
    fn catalog_entry(&self, library: &str, slot: u32) -> Result<Option<VsnInfo>, ManagementError>;

    /// VSNs of a media type over all libraries, optionally restricted
    /// to a VSN pool and/or the pools of an archive copy
    fn media_volumes(
        &self,
        media_type: &str,
        pool: Option<&str>,
        copy: Option<u8>,
    ) -> Result<Vec<VsnInfo>, ManagementError>;

    fn disk_volumes(&self) -> Result<Vec<DiskVolumeInfo>, ManagementError>;

    /// Volumes the ACSLS server of a library knows about
    fn acsls_volumes(&self, library: &str) -> Result<Vec<AcslsVolume>, ManagementError>;

    fn alarms(&self) -> Result<Vec<Alarm>, ManagementError>;

    fn set_library_state(&mut self, library: &str, state: DeviceState)
        -> Result<(), ManagementError>;

    /// Unload all drives of a library
    fn unload_library(&mut self, library: &str) -> Result<(), ManagementError>;

    /// Import a cartridge from the mailbox (direct attached libraries)
    fn import_cartridge(&mut self, library: &str) -> Result<(), ManagementError>;

    fn import_acsls_volumes(
        &mut self,
        library: &str,
        volume_ids: &[String],
    ) -> Result<(), ManagementError>;

    /// Import a single VSN (`end == None`) or a VSN range
    fn import_network_attached(
        &mut self,
        library: &str,
        start: &str,
        end: Option<&str>,
    ) -> Result<(), ManagementError>;

    fn remove_library(&mut self, library: &str) -> Result<(), ManagementError>;

    fn set_drive_state(
        &mut self,
        library: &str,
        eq: u32,
        state: DeviceState,
    ) -> Result<(), ManagementError>;

    fn idle_drive(&mut self, library: &str, eq: u32) -> Result<(), ManagementError>;

    fn unload_drive(&mut self, library: &str, eq: u32) -> Result<(), ManagementError>;

    fn clean_drive(&mut self, library: &str, eq: u32) -> Result<(), ManagementError>;

    fn set_drive_shared(&mut self, library: &str, eq: u32, shared: bool)
        -> Result<(), ManagementError>;

    /// Returns a job id, or [`NO_JOB_ID`]
    fn label_vsn(
        &mut self,
        library: &str,
        slot: u32,
        mode: LabelMode,
        name: &str,
        block_size: u64,
    ) -> Result<i64, ManagementError>;

    /// Set (or with `None` clear) the reservation of a VSN
    fn reserve_vsn(
        &mut self,
        library: &str,
        slot: u32,
        reservation: Option<&ReservationRequest>,
    ) -> Result<(), ManagementError>;

    /// Write all attributes at once
    fn change_vsn_attributes(
        &mut self,
        library: &str,
        slot: u32,
        attributes: &VsnAttributes,
    ) -> Result<(), ManagementError>;

    fn export_vsn(&mut self, library: &str, slot: u32) -> Result<(), ManagementError>;

    fn audit_vsn(&mut self, library: &str, slot: u32) -> Result<(), ManagementError>;

    fn load_vsn(&mut self, library: &str, slot: u32) -> Result<(), ManagementError>;

    fn move_vsn(&mut self, library: &str, slot: u32, dest_slot: u32)
        -> Result<(), ManagementError>;

    fn acknowledge_alarms(&mut self, ids: &[u64]) -> Result<(), ManagementError>;

    fn delete_alarms(&mut self, ids: &[u64]) -> Result<(), ManagementError>;
}
