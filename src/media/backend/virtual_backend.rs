// Note: This is only for test and debug

use std::fs::File;
use std::path::PathBuf;

use anyhow::{format_err, Error};
use serde::{Deserialize, Serialize};

use proxmox_sys::fs::{replace_file, CreateOptions};

use samqfs_api_types::{
    is_historian_name, AcslsVolume, Alarm, AlarmStatus, DeviceState, DiskVolumeInfo, DriveInfo,
    DriverType, LabelMode, LibraryInfo, Reservation, ReservationRequest, VirtualMediaServer,
    VsnAttributes, VsnInfo, HISTORIAN_NAME,
};

use super::{MediaManagement, NO_JOB_ID};
use crate::media::ManagementError;
use crate::mgmt_bail;

/// Equipment ordinal of the Historian
const HISTORIAN_EQ: u32 = 0;

/// This needs to lock the server state directory
pub fn open_virtual_media_server(
    config: &VirtualMediaServer,
) -> Result<VirtualMediaBackend, Error> {
    proxmox_lang::try_block!({
        std::fs::create_dir_all(&config.path)?;

        let mut lock_path = PathBuf::from(&config.path);
        lock_path.push(".media.lck");

        let options = CreateOptions::new();
        let timeout = std::time::Duration::new(10, 0);
        let lock = proxmox_sys::fs::open_file_locked(&lock_path, timeout, true, options)?;

        Ok(VirtualMediaBackend {
            _lock: lock,
            server_name: config.name.clone(),
            path: PathBuf::from(&config.path),
            state_delay: config.state_delay.unwrap_or(0) as i64,
            sync_label: config.sync_label.unwrap_or(false),
        })
    })
    .map_err(|err: Error| {
        format_err!(
            "open media server '{}' ({}) failed - {}",
            config.name,
            config.path,
            err
        )
    })
}

/// Cartridge waiting in the mailbox (or known to a network attached
/// library server) to be imported
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct VirtualCartridge {
    /// Label, empty for blank media
    pub name: String,
    pub barcode: String,
    pub media_type: String,
    /// Capacity (MiB)
    pub capacity: u64,
}

/// VSN pool definition
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct VirtualPool {
    pub name: String,
    pub media_type: String,
    /// Archive copy this pool is assigned to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy: Option<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "kebab-case")]
struct PendingState {
    state: DeviceState,
    visible_at: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "kebab-case")]
struct VirtualLibrary {
    info: LibraryInfo,
    /// Number of catalog slots
    slots: u32,
    drives: Option<Vec<DriveInfo>>,
    catalog: Vec<VsnInfo>,
    #[serde(default)]
    mailbox: Vec<VirtualCartridge>,
    #[serde(default)]
    acsls_pool: Vec<AcslsVolume>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pending: Option<PendingState>,
    #[serde(default)]
    pending_drives: Vec<(u32, PendingState)>,
}

impl VirtualLibrary {
    fn is_historian(&self) -> bool {
        is_historian_name(&self.info.name)
    }

    fn free_slot(&self) -> Option<u32> {
        if self.is_historian() {
            let next = self.catalog.iter().map(|vsn| vsn.slot + 1).max().unwrap_or(0);
            return Some(next);
        }
        (0..self.slots).find(|slot| !self.catalog.iter().any(|vsn| vsn.slot == *slot))
    }

    fn vsn_index(&self, slot: u32) -> Result<usize, ManagementError> {
        self.catalog
            .iter()
            .position(|vsn| vsn.slot == slot)
            .ok_or_else(|| ManagementError::vsn_not_found(&self.info.name, slot))
    }

    fn drive_mut(&mut self, eq: u32) -> Result<&mut DriveInfo, ManagementError> {
        let library = self.info.name.clone();
        self.drives
            .as_mut()
            .and_then(|drives| drives.iter_mut().find(|drive| drive.eq == eq))
            .ok_or_else(|| {
                ManagementError::generic(format!("no drive {} in library '{}'", eq, library))
            })
    }

    fn is_loaded(&self, slot: u32) -> bool {
        match self.drives {
            Some(ref drives) => drives.iter().any(|drive| drive.loaded_slot == Some(slot)),
            None => false,
        }
    }

    fn insert_cartridge(
        &mut self,
        cartridge: VirtualCartridge,
        now: i64,
    ) -> Result<u32, ManagementError> {
        let slot = match self.free_slot() {
            Some(slot) => slot,
            None => mgmt_bail!("library '{}' has no free slot", self.info.name),
        };
        let labeled = !cartridge.name.is_empty();
        self.catalog.push(VsnInfo {
            name: cartridge.name,
            barcode: cartridge.barcode,
            slot,
            library: self.info.name.clone(),
            media_type: cartridge.media_type,
            capacity: cartridge.capacity,
            available: cartridge.capacity,
            access_count: 0,
            block_size: 0,
            label_time: if labeled { now } else { 0 },
            mount_time: 0,
            modification_time: now,
            labeled,
            pool: None,
            reservation: None,
            attributes: VsnAttributes::default(),
        });
        self.catalog.sort_by_key(|vsn| vsn.slot);
        Ok(slot)
    }

    fn apply_pending(&mut self, now: i64) {
        if let Some(pending) = self.pending.take() {
            if pending.visible_at <= now {
                self.info.state = pending.state;
            } else {
                self.pending = Some(pending);
            }
        }

        let mut still_pending = Vec::new();
        for (eq, pending) in std::mem::take(&mut self.pending_drives) {
            if pending.visible_at > now {
                still_pending.push((eq, pending));
                continue;
            }
            if let Some(drive) = self
                .drives
                .as_mut()
                .and_then(|drives| drives.iter_mut().find(|drive| drive.eq == eq))
            {
                drive.state = pending.state;
            }
        }
        self.pending_drives = still_pending;
    }

    fn update_totals(&mut self) {
        self.info.capacity = self.catalog.iter().map(|vsn| vsn.capacity).sum();
        self.info.free_space = self.catalog.iter().map(|vsn| vsn.available).sum();
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "kebab-case")]
struct VirtualMediaState {
    libraries: Vec<VirtualLibrary>,
    #[serde(default)]
    disk_volumes: Vec<DiskVolumeInfo>,
    #[serde(default)]
    pools: Vec<VirtualPool>,
    #[serde(default)]
    alarms: Vec<Alarm>,
    next_job_id: i64,
    /// Alarm ids are never reused
    #[serde(default = "first_alarm_id")]
    next_alarm_id: u64,
}

fn first_alarm_id() -> u64 {
    1
}

impl Default for VirtualMediaState {
    fn default() -> Self {
        let historian = VirtualLibrary {
            info: LibraryInfo {
                name: HISTORIAN_NAME.to_string(),
                eq: HISTORIAN_EQ,
                equ_type: "hy".to_string(),
                vendor: String::new(),
                product_id: String::new(),
                driver_type: DriverType::Samst,
                state: DeviceState::ON,
                capacity: 0,
                free_space: 0,
                firmware_level: String::new(),
                serial_number: String::new(),
                detailed_status: Vec::new(),
                messages: Vec::new(),
            },
            slots: 0,
            drives: None,
            catalog: Vec::new(),
            mailbox: Vec::new(),
            acsls_pool: Vec::new(),
            pending: None,
            pending_drives: Vec::new(),
        };
        Self {
            libraries: vec![historian],
            disk_volumes: Vec::new(),
            pools: Vec::new(),
            alarms: Vec::new(),
            next_job_id: 1,
            next_alarm_id: first_alarm_id(),
        }
    }
}

impl VirtualMediaState {
    fn library(&self, name: &str) -> Result<&VirtualLibrary, ManagementError> {
        self.libraries
            .iter()
            .find(|lib| lib.info.name == name)
            .ok_or_else(|| ManagementError::library_not_found(name))
    }

    fn library_mut(&mut self, name: &str) -> Result<&mut VirtualLibrary, ManagementError> {
        self.libraries
            .iter_mut()
            .find(|lib| lib.info.name == name)
            .ok_or_else(|| ManagementError::library_not_found(name))
    }

    /// Like `library_mut`, but refuses the Historian
    fn real_library_mut(&mut self, name: &str) -> Result<&mut VirtualLibrary, ManagementError> {
        let lib = self.library_mut(name)?;
        if lib.is_historian() {
            mgmt_bail!("operation not supported on the {}", HISTORIAN_NAME);
        }
        Ok(lib)
    }

    fn historian_mut(&mut self) -> Result<&mut VirtualLibrary, ManagementError> {
        self.libraries
            .iter_mut()
            .find(|lib| lib.is_historian())
            .ok_or_else(|| ManagementError::library_not_found(HISTORIAN_NAME))
    }

    fn pool_copy(&self, pool: &str) -> Option<u8> {
        self.pools
            .iter()
            .find(|p| p.name == pool)
            .and_then(|p| p.copy)
    }

    fn vsn_name_in_use(&self, name: &str) -> bool {
        self.libraries
            .iter()
            .any(|lib| lib.catalog.iter().any(|vsn| vsn.labeled && vsn.name == name))
    }
}

/// File based media management server
///
/// Keeps the whole server state in `media-state.json` inside the
/// configured directory.
pub struct VirtualMediaBackend {
    server_name: String,
    path: PathBuf,
    state_delay: i64,
    sync_label: bool,
    _lock: File,
}

impl VirtualMediaBackend {
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    fn state_file_path(&self) -> PathBuf {
        let mut path = self.path.clone();
        path.push("media-state.json");
        path
    }

    fn load_state(&self) -> Result<VirtualMediaState, Error> {
        let path = self.state_file_path();

        let default = serde_json::to_value(VirtualMediaState::default())?;

        let data = proxmox_sys::fs::file_get_json(path, Some(default))?;
        let mut state: VirtualMediaState = serde_json::from_value(data)?;

        let now = proxmox_time::epoch_i64();
        for lib in state.libraries.iter_mut() {
            lib.apply_pending(now);
            lib.update_totals();
        }

        Ok(state)
    }

    fn store_state(&self, state: &VirtualMediaState) -> Result<(), Error> {
        let path = self.state_file_path();
        let raw = serde_json::to_string_pretty(&serde_json::to_value(state)?)?;

        let options = CreateOptions::new();
        replace_file(path, raw.as_bytes(), options, false)?;
        Ok(())
    }

    fn read(&self) -> Result<VirtualMediaState, ManagementError> {
        Ok(self.load_state()?)
    }

    fn update<R, F>(&self, func: F) -> Result<R, ManagementError>
    where
        F: FnOnce(&mut VirtualMediaState, i64) -> Result<R, ManagementError>,
    {
        let mut state = self.load_state()?;
        let now = proxmox_time::epoch_i64();
        let result = func(&mut state, now)?;
        self.store_state(&state)?;
        Ok(result)
    }

    // Setup helpers (used to populate a simulated server)

    /// Add a library with `slots` catalog slots
    pub fn add_library(&mut self, info: LibraryInfo, slots: u32) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            if state.libraries.iter().any(|lib| lib.info.name == info.name) {
                mgmt_bail!("library '{}' already exists", info.name);
            }
            state.libraries.push(VirtualLibrary {
                info,
                slots,
                drives: None,
                catalog: Vec::new(),
                mailbox: Vec::new(),
                acsls_pool: Vec::new(),
                pending: None,
                pending_drives: Vec::new(),
            });
            Ok(())
        })
    }

    pub fn add_drive(&mut self, drive: DriveInfo) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            let lib = state.library_mut(&drive.library)?;
            lib.drives.get_or_insert_with(Vec::new).push(drive);
            Ok(())
        })
    }

    /// Put a VSN into its catalog slot
    pub fn add_vsn(&mut self, vsn: VsnInfo) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            let lib = state.library_mut(&vsn.library)?;
            if !lib.is_historian() && vsn.slot >= lib.slots {
                mgmt_bail!("slot {} out of range for library '{}'", vsn.slot, lib.info.name);
            }
            if lib.catalog.iter().any(|entry| entry.slot == vsn.slot) {
                mgmt_bail!("slot {} of library '{}' is occupied", vsn.slot, lib.info.name);
            }
            lib.catalog.push(vsn);
            lib.catalog.sort_by_key(|vsn| vsn.slot);
            Ok(())
        })
    }

    /// Put a cartridge into the library mailbox
    pub fn add_to_mailbox(
        &mut self,
        library: &str,
        cartridge: VirtualCartridge,
    ) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            state.library_mut(library)?.mailbox.push(cartridge);
            Ok(())
        })
    }

    pub fn add_acsls_volume(
        &mut self,
        library: &str,
        volume: AcslsVolume,
    ) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            let lib = state.library_mut(library)?;
            if lib.info.driver_type != DriverType::Acsls {
                mgmt_bail!("library '{}' is not an ACSLS library", library);
            }
            lib.acsls_pool.push(volume);
            Ok(())
        })
    }

    pub fn add_disk_volume(&mut self, volume: DiskVolumeInfo) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            state.disk_volumes.push(volume);
            Ok(())
        })
    }

    pub fn add_pool(&mut self, pool: VirtualPool) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            state.pools.retain(|p| p.name != pool.name);
            state.pools.push(pool);
            Ok(())
        })
    }

    /// Raise an alarm, returns the new alarm id
    pub fn raise_alarm(&mut self, mut alarm: Alarm) -> Result<u64, ManagementError> {
        self.update(|state, now| {
            let id = state
                .alarms
                .iter()
                .map(|a| a.id + 1)
                .fold(state.next_alarm_id, u64::max);
            state.next_alarm_id = id + 1;
            alarm.id = id;
            if alarm.time == 0 {
                alarm.time = now;
            }
            state.alarms.push(alarm);
            Ok(id)
        })
    }
}

impl MediaManagement for VirtualMediaBackend {
    fn list_libraries(&self) -> Result<Vec<LibraryInfo>, ManagementError> {
        let state = self.read()?;
        Ok(state.libraries.into_iter().map(|lib| lib.info).collect())
    }

    fn library(&self, name: &str) -> Result<Option<LibraryInfo>, ManagementError> {
        let state = self.read()?;
        Ok(state
            .libraries
            .into_iter()
            .find(|lib| lib.info.name == name)
            .map(|lib| lib.info))
    }

    fn library_drives(&self, library: &str) -> Result<Option<Vec<DriveInfo>>, ManagementError> {
        let state = self.read()?;
        Ok(state.library(library)?.drives.clone())
    }

    fn catalog(&self, library: &str) -> Result<Vec<VsnInfo>, ManagementError> {
        let state = self.read()?;
        Ok(state.library(library)?.catalog.clone())
    }

    fn catalog_entry(&self, library: &str, slot: u32) -> Result<Option<VsnInfo>, ManagementError> {
        let state = self.read()?;
        let lib = state.library(library)?;
        Ok(lib.catalog.iter().find(|vsn| vsn.slot == slot).cloned())
    }

    fn media_volumes(
        &self,
        media_type: &str,
        pool: Option<&str>,
        copy: Option<u8>,
    ) -> Result<Vec<VsnInfo>, ManagementError> {
        let state = self.read()?;

        let mut list = Vec::new();
        for lib in state.libraries.iter() {
            for vsn in lib.catalog.iter() {
                if vsn.media_type != media_type {
                    continue;
                }
                if let Some(pool) = pool {
                    if vsn.pool.as_deref() != Some(pool) {
                        continue;
                    }
                }
                if let Some(copy) = copy {
                    let pool_copy = vsn.pool.as_deref().and_then(|p| state.pool_copy(p));
                    if pool_copy != Some(copy) {
                        continue;
                    }
                }
                list.push(vsn.clone());
            }
        }

        Ok(list)
    }

    fn disk_volumes(&self) -> Result<Vec<DiskVolumeInfo>, ManagementError> {
        Ok(self.read()?.disk_volumes)
    }

    fn acsls_volumes(&self, library: &str) -> Result<Vec<AcslsVolume>, ManagementError> {
        let state = self.read()?;
        let lib = state.library(library)?;
        if lib.info.driver_type != DriverType::Acsls {
            return Err(ManagementError::catalog_unavailable(library));
        }
        Ok(lib.acsls_pool.clone())
    }

    fn alarms(&self) -> Result<Vec<Alarm>, ManagementError> {
        Ok(self.read()?.alarms)
    }

    fn set_library_state(
        &mut self,
        library: &str,
        new_state: DeviceState,
    ) -> Result<(), ManagementError> {
        let delay = self.state_delay;
        self.update(|state, now| {
            let lib = state.real_library_mut(library)?;
            match delayed_state(new_state, delay, now) {
                Some(pending) => lib.pending = Some(pending),
                None => lib.info.state = new_state,
            }
            Ok(())
        })
    }

    fn unload_library(&mut self, library: &str) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            let lib = state.real_library_mut(library)?;
            if let Some(ref mut drives) = lib.drives {
                drives.iter_mut().for_each(|drive| drive.clear_loaded());
            }
            Ok(())
        })
    }

    fn import_cartridge(&mut self, library: &str) -> Result<(), ManagementError> {
        self.update(|state, now| {
            let lib = state.real_library_mut(library)?;
            if lib.mailbox.is_empty() {
                mgmt_bail!("mailbox of library '{}' is empty", library);
            }
            let cartridge = lib.mailbox.remove(0);
            lib.insert_cartridge(cartridge, now)?;
            Ok(())
        })
    }

    fn import_acsls_volumes(
        &mut self,
        library: &str,
        volume_ids: &[String],
    ) -> Result<(), ManagementError> {
        self.update(|state, now| {
            let lib = state.real_library_mut(library)?;
            if lib.info.driver_type != DriverType::Acsls {
                return Err(ManagementError::catalog_unavailable(library));
            }

            for (i, id) in volume_ids.iter().enumerate() {
                if volume_ids[..i].contains(id) {
                    mgmt_bail!("volume '{}' listed more than once", id);
                }
                match lib.acsls_pool.iter().find(|vol| &vol.name == id) {
                    Some(vol) if vol.in_use => mgmt_bail!("volume '{}' is already in use", id),
                    Some(_) => {}
                    None => mgmt_bail!("volume '{}' is not known to ACSLS", id),
                }
            }

            for id in volume_ids {
                let mut cartridge = None;
                if let Some(vol) = lib.acsls_pool.iter_mut().find(|vol| &vol.name == id) {
                    vol.in_use = true;
                    cartridge = Some(VirtualCartridge {
                        name: vol.name.clone(),
                        barcode: vol.name.clone(),
                        media_type: vol.media_type.clone(),
                        capacity: 0,
                    });
                }
                if let Some(cartridge) = cartridge {
                    lib.insert_cartridge(cartridge, now)?;
                }
            }
            Ok(())
        })
    }

    fn import_network_attached(
        &mut self,
        library: &str,
        start: &str,
        end: Option<&str>,
    ) -> Result<(), ManagementError> {
        self.update(|state, now| {
            let lib = state.real_library_mut(library)?;
            if !lib.info.driver_type.is_network_attached() {
                mgmt_bail!("library '{}' is not network attached", library);
            }

            let end = end.unwrap_or(start);
            let (selected, rest): (Vec<VirtualCartridge>, Vec<VirtualCartridge>) =
                std::mem::take(&mut lib.mailbox)
                    .into_iter()
                    .partition(|c| c.name.as_str() >= start && c.name.as_str() <= end);
            lib.mailbox = rest;

            if selected.is_empty() {
                mgmt_bail!("no volume in range {}-{} found", start, end);
            }
            for cartridge in selected {
                lib.insert_cartridge(cartridge, now)?;
            }
            Ok(())
        })
    }

    fn remove_library(&mut self, library: &str) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            state.real_library_mut(library)?;

            let pos = state
                .libraries
                .iter()
                .position(|lib| lib.info.name == library)
                .ok_or_else(|| ManagementError::library_not_found(library))?;
            let removed = state.libraries.remove(pos);

            let historian = state.historian_mut()?;
            for mut vsn in removed.catalog {
                vsn.slot = historian.free_slot().unwrap_or(0);
                vsn.library = historian.info.name.clone();
                historian.catalog.push(vsn);
            }
            Ok(())
        })
    }

    fn set_drive_state(
        &mut self,
        library: &str,
        eq: u32,
        new_state: DeviceState,
    ) -> Result<(), ManagementError> {
        let delay = self.state_delay;
        self.update(|state, now| {
            let lib = state.real_library_mut(library)?;
            match delayed_state(new_state, delay, now) {
                Some(pending) => {
                    lib.drive_mut(eq)?;
                    lib.pending_drives.retain(|(id, _)| *id != eq);
                    lib.pending_drives.push((eq, pending));
                }
                None => lib.drive_mut(eq)?.state = new_state,
            }
            Ok(())
        })
    }

    fn idle_drive(&mut self, library: &str, eq: u32) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            let drive = state.real_library_mut(library)?.drive_mut(eq)?;
            drive.state = DeviceState::IDLE;
            drive.clear_loaded();
            Ok(())
        })
    }

    fn unload_drive(&mut self, library: &str, eq: u32) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            let drive = state.real_library_mut(library)?.drive_mut(eq)?;
            drive.clear_loaded();
            Ok(())
        })
    }

    fn clean_drive(&mut self, library: &str, eq: u32) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            let drive = state.real_library_mut(library)?.drive_mut(eq)?;
            if drive.is_loaded() {
                mgmt_bail!("drive {} is loaded, unload it first", eq);
            }
            if drive.state == DeviceState::OFF || drive.state == DeviceState::DOWN {
                mgmt_bail!("drive {} is not available ({})", eq, drive.state);
            }
            drive.messages.push("cleaning requested".to_string());
            Ok(())
        })
    }

    fn set_drive_shared(
        &mut self,
        library: &str,
        eq: u32,
        shared: bool,
    ) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            let lib = state.real_library_mut(library)?;
            if lib.info.driver_type != DriverType::Acsls {
                mgmt_bail!("shared drives are only supported on ACSLS libraries");
            }
            lib.drive_mut(eq)?.shared = shared;
            Ok(())
        })
    }

    fn label_vsn(
        &mut self,
        library: &str,
        slot: u32,
        mode: LabelMode,
        name: &str,
        block_size: u64,
    ) -> Result<i64, ManagementError> {
        let sync_label = self.sync_label;
        self.update(|state, now| {
            let lib = state.library(library)?;
            let vsn = &lib.catalog[lib.vsn_index(slot)?];
            match mode {
                LabelMode::Label if vsn.labeled => {
                    mgmt_bail!("media in slot {} is already labeled", slot)
                }
                LabelMode::Relabel if !vsn.labeled => {
                    mgmt_bail!("media in slot {} is not labeled", slot)
                }
                _ => {}
            }
            if vsn.name != name && state.vsn_name_in_use(name) {
                mgmt_bail!("VSN '{}' already exists", name);
            }

            let lib = state.library_mut(library)?;
            let index = lib.vsn_index(slot)?;
            let vsn = &mut lib.catalog[index];
            vsn.name = name.to_string();
            vsn.labeled = true;
            vsn.label_time = now;
            vsn.modification_time = now;
            vsn.block_size = block_size;
            vsn.available = vsn.capacity;

            if sync_label {
                return Ok(NO_JOB_ID);
            }

            let job_id = state.next_job_id;
            state.next_job_id += 1;
            Ok(job_id)
        })
    }

    fn reserve_vsn(
        &mut self,
        library: &str,
        slot: u32,
        reservation: Option<&ReservationRequest>,
    ) -> Result<(), ManagementError> {
        self.update(|state, now| {
            let lib = state.library_mut(library)?;
            let index = lib.vsn_index(slot)?;
            let vsn = &mut lib.catalog[index];
            vsn.reservation = reservation.map(|request| Reservation::new(request, now));
            vsn.modification_time = now;
            Ok(())
        })
    }

    fn change_vsn_attributes(
        &mut self,
        library: &str,
        slot: u32,
        attributes: &VsnAttributes,
    ) -> Result<(), ManagementError> {
        self.update(|state, now| {
            let lib = state.library_mut(library)?;
            let index = lib.vsn_index(slot)?;
            let vsn = &mut lib.catalog[index];
            vsn.attributes = *attributes;
            vsn.modification_time = now;
            Ok(())
        })
    }

    fn export_vsn(&mut self, library: &str, slot: u32) -> Result<(), ManagementError> {
        self.update(|state, now| {
            let lib = state.library_mut(library)?;
            let index = lib.vsn_index(slot)?;
            if lib.is_loaded(slot) {
                mgmt_bail!("VSN in slot {} is loaded", slot);
            }
            let mut vsn = lib.catalog.remove(index);
            if lib.is_historian() {
                // gone for good
                return Ok(());
            }
            if let Some(vol) = lib.acsls_pool.iter_mut().find(|vol| vol.name == vsn.name) {
                vol.in_use = false;
            }

            let historian = state.historian_mut()?;
            vsn.slot = historian.free_slot().unwrap_or(0);
            vsn.library = historian.info.name.clone();
            vsn.modification_time = now;
            historian.catalog.push(vsn);
            Ok(())
        })
    }

    fn audit_vsn(&mut self, library: &str, slot: u32) -> Result<(), ManagementError> {
        self.update(|state, now| {
            let lib = state.real_library_mut(library)?;
            let index = lib.vsn_index(slot)?;
            let vsn = &mut lib.catalog[index];
            vsn.attributes.needs_audit = false;
            vsn.modification_time = now;
            Ok(())
        })
    }

    fn load_vsn(&mut self, library: &str, slot: u32) -> Result<(), ManagementError> {
        self.update(|state, now| {
            let lib = state.real_library_mut(library)?;
            let index = lib.vsn_index(slot)?;
            if lib.is_loaded(slot) {
                mgmt_bail!("VSN in slot {} is already loaded", slot);
            }
            let name = lib.catalog[index].name.clone();

            let drive = lib
                .drives
                .as_mut()
                .and_then(|drives| {
                    drives
                        .iter_mut()
                        .find(|drive| drive.state.is_on() && !drive.is_loaded())
                })
                .ok_or_else(|| ManagementError::generic("no free drive available"))?;
            drive.loaded_slot = Some(slot);
            drive.loaded_vsn = Some(name);

            let vsn = &mut lib.catalog[index];
            vsn.mount_time = now;
            vsn.access_count += 1;
            Ok(())
        })
    }

    fn move_vsn(
        &mut self,
        library: &str,
        slot: u32,
        dest_slot: u32,
    ) -> Result<(), ManagementError> {
        self.update(|state, now| {
            let lib = state.real_library_mut(library)?;
            let index = lib.vsn_index(slot)?;
            if dest_slot >= lib.slots {
                mgmt_bail!("slot {} out of range", dest_slot);
            }
            if lib.catalog.iter().any(|vsn| vsn.slot == dest_slot) {
                mgmt_bail!("slot {} is occupied", dest_slot);
            }
            if lib.is_loaded(slot) {
                mgmt_bail!("VSN in slot {} is loaded", slot);
            }
            let vsn = &mut lib.catalog[index];
            vsn.slot = dest_slot;
            vsn.modification_time = now;
            lib.catalog.sort_by_key(|vsn| vsn.slot);
            Ok(())
        })
    }

    fn acknowledge_alarms(&mut self, ids: &[u64]) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            check_alarm_ids(state, ids)?;
            for alarm in state.alarms.iter_mut().filter(|a| ids.contains(&a.id)) {
                alarm.status = AlarmStatus::Acknowledged;
            }
            Ok(())
        })
    }

    fn delete_alarms(&mut self, ids: &[u64]) -> Result<(), ManagementError> {
        self.update(|state, _now| {
            check_alarm_ids(state, ids)?;
            state.alarms.retain(|a| !ids.contains(&a.id));
            Ok(())
        })
    }
}

/// State changes become visible after `delay` seconds
fn delayed_state(state: DeviceState, delay: i64, now: i64) -> Option<PendingState> {
    if delay > 0 {
        Some(PendingState {
            state,
            visible_at: now + delay,
        })
    } else {
        None
    }
}

fn check_alarm_ids(state: &VirtualMediaState, ids: &[u64]) -> Result<(), ManagementError> {
    for id in ids {
        if !state.alarms.iter().any(|a| a.id == *id) {
            mgmt_bail!("alarm {} not found", id);
        }
    }
    Ok(())
}
