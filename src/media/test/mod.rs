use std::path::PathBuf;
use std::time::Duration;

use anyhow::Error;

use samqfs_api_types::{
    DeviceState, DriveInfo, DriverType, LibraryInfo, VirtualMediaServer, VsnAttributes, VsnInfo,
    ROLE_ADMIN,
};

use crate::media::backend::{open_virtual_media_server, VirtualMediaBackend};
use crate::media::{AccessContext, ConfirmationWait, MediaManager, MediaManagerSettings};

mod library;
mod search;

fn testdir_path(name: &str) -> PathBuf {
    let mut testdir: PathBuf = String::from("./target/testout").into();
    testdir.push(std::module_path!());
    testdir.push(name);
    testdir
}

fn create_testdir(name: &str) -> Result<PathBuf, Error> {
    let testdir = testdir_path(name);

    let _ = std::fs::remove_dir_all(&testdir);
    let _ = std::fs::create_dir_all(&testdir);

    Ok(testdir)
}

fn server_config(testdir: &PathBuf, state_delay: u64) -> VirtualMediaServer {
    VirtualMediaServer {
        name: "vtest".to_string(),
        path: testdir.to_string_lossy().to_string(),
        comment: None,
        confirm_wait: Some(0),
        max_entries: None,
        max_flags: None,
        state_delay: Some(state_delay),
        sync_label: None,
    }
}

fn open_backend(name: &str) -> Result<VirtualMediaBackend, Error> {
    let testdir = create_testdir(name)?;
    open_virtual_media_server(&server_config(&testdir, 0))
}

/// Open the backend of a previous `open_backend` call, keeping its state
fn reopen_backend(name: &str) -> Result<VirtualMediaBackend, Error> {
    open_virtual_media_server(&server_config(&testdir_path(name), 0))
}

fn manager(backend: VirtualMediaBackend) -> MediaManager {
    manager_with(backend, MediaManagerSettings::default())
}

fn manager_with(backend: VirtualMediaBackend, settings: MediaManagerSettings) -> MediaManager {
    MediaManager::new(Box::new(backend), settings)
        .with_confirmation_wait(ConfirmationWait::new(Duration::from_secs(0)))
}

fn admin() -> AccessContext {
    AccessContext::new("root@pam", ROLE_ADMIN)
}

fn library_info(name: &str, equ_type: &str) -> LibraryInfo {
    LibraryInfo {
        name: name.to_string(),
        eq: 10,
        equ_type: equ_type.to_string(),
        vendor: "STK".to_string(),
        product_id: "L180".to_string(),
        driver_type: DriverType::from_equipment_type(equ_type),
        state: DeviceState::ON,
        capacity: 0,
        free_space: 0,
        firmware_level: "1.0".to_string(),
        serial_number: format!("SN-{}", name),
        detailed_status: Vec::new(),
        messages: Vec::new(),
    }
}

fn drive_info(library: &str, eq: u32, media_type: &str) -> DriveInfo {
    DriveInfo {
        eq,
        library: library.to_string(),
        path: format!("/dev/rmt/{}cbn", eq),
        vendor: "IBM".to_string(),
        product_id: "ULT3580".to_string(),
        serial_number: format!("D{}", eq),
        firmware_level: "B170".to_string(),
        media_type: media_type.to_string(),
        state: DeviceState::ON,
        shared: false,
        loaded_slot: None,
        loaded_vsn: None,
        detailed_status: Vec::new(),
        messages: Vec::new(),
    }
}

fn vsn_info(library: &str, slot: u32, name: &str, capacity: u64, available: u64) -> VsnInfo {
    VsnInfo {
        name: name.to_string(),
        barcode: name.to_string(),
        slot,
        library: library.to_string(),
        media_type: "li".to_string(),
        capacity,
        available,
        access_count: 0,
        block_size: 0,
        label_time: 1,
        mount_time: 0,
        modification_time: 1,
        labeled: !name.is_empty(),
        pool: None,
        reservation: None,
        attributes: VsnAttributes::default(),
    }
}
