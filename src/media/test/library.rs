// Library state and import tests
//
// # cargo test --release media::test::library

use anyhow::Error;

use samqfs_api_types::{
    AcslsVolume, DeviceState, DriverType, HISTORIAN_NAME, ROLE_MEDIA_AUDIT, ROLE_MEDIA_OPERATOR,
};

use super::*;
use crate::media::backend::{open_virtual_media_server, MediaManagement, VirtualCartridge};
use crate::media::{
    AccessContext, Confirmation, ImportFilter, ImportRequest, MediaManagerSettings,
    ELIBRARY_NOT_FOUND,
};

fn acsls_volume(name: &str, pool_id: u32, in_use: bool) -> AcslsVolume {
    AcslsVolume {
        name: name.to_string(),
        media_type: "li".to_string(),
        pool_id,
        in_use,
        status: "home".to_string(),
    }
}

fn cartridge(name: &str) -> VirtualCartridge {
    VirtualCartridge {
        name: name.to_string(),
        barcode: name.to_string(),
        media_type: "li".to_string(),
        capacity: 1000,
    }
}

#[test]
fn test_list_libraries() -> Result<(), Error> {
    let mut backend = open_backend("test_list_libraries")?;
    backend.add_library(library_info("LIB1", "rb"), 10)?;
    backend.add_library(library_info("LIB2", "sk"), 10)?;

    let manager = manager(backend);

    let names: Vec<String> = manager
        .list_libraries()?
        .into_iter()
        .map(|lib| lib.name)
        .collect();
    assert_eq!(names, vec!["LIB1", "LIB2"]);

    assert_eq!(manager.historian()?.name, HISTORIAN_NAME);
    assert_eq!(manager.library("LIB2")?.driver_type, DriverType::Acsls);

    let err = manager.library("LIB3").unwrap_err();
    assert_eq!(err.code, ELIBRARY_NOT_FOUND);

    Ok(())
}

#[test]
fn test_library_usage() -> Result<(), Error> {
    let mut backend = open_backend("test_library_usage")?;
    backend.add_library(library_info("LIB1", "rb"), 10)?;
    backend.add_library(library_info("EMPTY", "rb"), 10)?;
    backend.add_vsn(vsn_info("LIB1", 5, "VSN005", 1000, 250))?;
    backend.add_vsn(vsn_info("LIB1", 6, "VSN006", 1000, 750))?;

    let mut manager = manager(backend);

    assert_eq!(manager.library_usage("LIB1")?, 50);
    assert_eq!(manager.library_usage("EMPTY")?, -1);

    // offline libraries report no capacity
    manager.set_library_state(&admin(), "LIB1", DeviceState::OFF)?;
    assert_eq!(manager.library_usage("LIB1")?, -1);

    Ok(())
}

#[test]
fn test_set_library_state() -> Result<(), Error> {
    let mut backend = open_backend("test_set_library_state")?;
    backend.add_library(library_info("LIB1", "rb"), 10)?;

    let mut manager = manager(backend);

    let res = manager.set_library_state(&admin(), "LIB1", DeviceState::OFF)?;
    assert_eq!(res, Confirmation::Confirmed(DeviceState::OFF));

    // requesting the current state gives nothing to confirm
    let res = manager.set_library_state(&admin(), "LIB1", DeviceState::OFF)?;
    assert_eq!(res, Confirmation::WaitedOnce);

    // driver defined states are kept verbatim
    let res = manager.set_library_state(&admin(), "LIB1", DeviceState(42))?;
    assert_eq!(res, Confirmation::Confirmed(DeviceState(42)));

    Ok(())
}

#[test]
fn test_delayed_library_state() -> Result<(), Error> {
    let testdir = create_testdir("test_delayed_library_state")?;
    let mut backend = open_virtual_media_server(&server_config(&testdir, 3600))?;
    backend.add_library(library_info("LIB1", "rb"), 10)?;

    let mut manager = manager(backend);

    let res = manager.set_library_state(&admin(), "LIB1", DeviceState::OFF)?;
    assert_eq!(res, Confirmation::WaitedOnce);
    assert_eq!(manager.library("LIB1")?.state, DeviceState::ON);

    Ok(())
}

#[test]
fn test_historian_protected() -> Result<(), Error> {
    let backend = open_backend("test_historian_protected")?;
    let mut manager = manager(backend);
    let ctx = admin();

    assert!(manager
        .set_library_state(&ctx, HISTORIAN_NAME, DeviceState::OFF)
        .is_err());
    assert!(manager.set_library_state(&ctx, "historian", DeviceState::OFF).is_err());
    assert!(manager.import(&ctx, HISTORIAN_NAME, &ImportRequest::Catalog).is_err());
    assert!(manager.remove_library(&ctx, HISTORIAN_NAME).is_err());
    assert!(manager.unload_library(&ctx, HISTORIAN_NAME).is_err());

    assert_eq!(manager.historian()?.state, DeviceState::ON);

    Ok(())
}

#[test]
fn test_import_range_acsls() -> Result<(), Error> {
    let mut backend = open_backend("test_import_range_acsls")?;
    backend.add_library(library_info("LIB1", "sk"), 10)?;
    backend.add_acsls_volume("LIB1", acsls_volume("A000", 1, false))?;
    backend.add_acsls_volume("LIB1", acsls_volume("A500", 1, true))?;
    backend.add_acsls_volume("LIB1", acsls_volume("A999", 2, false))?;
    backend.add_acsls_volume("LIB1", acsls_volume("B000", 1, false))?;

    let mut manager = manager(backend);

    manager.import_range(&admin(), "LIB1", "A000", "A999")?;

    let names: Vec<String> = manager
        .catalog("LIB1")?
        .into_iter()
        .map(|vsn| vsn.name)
        .collect();
    assert_eq!(names, vec!["A000", "A999"]);

    let volumes = manager.backend().acsls_volumes("LIB1")?;
    assert!(volumes.iter().all(|vol| vol.in_use || vol.name == "B000"));

    // nothing left to import in that range
    assert!(manager.import_range(&admin(), "LIB1", "A000", "A999").is_err());

    Ok(())
}

#[test]
fn test_import_range_over_cap() -> Result<(), Error> {
    let mut backend = open_backend("test_import_range_over_cap")?;
    backend.add_library(library_info("ACS", "sk"), 10)?;
    for i in 1..=5 {
        backend.add_acsls_volume("ACS", acsls_volume(&format!("S{:05}", i), 1, false))?;
    }

    let settings = MediaManagerSettings {
        max_entries: 2,
        ..Default::default()
    };
    let mut manager = manager_with(backend, settings);

    let err = manager
        .import_range(&admin(), "ACS", "S00001", "S00005")
        .unwrap_err();
    assert!(err.message.contains("narrow the range"));
    assert!(manager.catalog("ACS")?.is_empty());

    manager.import_range(&admin(), "ACS", "S00001", "S00002")?;
    assert_eq!(manager.catalog("ACS")?.len(), 2);

    Ok(())
}

#[test]
fn test_import_acsls_duplicate_ids() -> Result<(), Error> {
    let mut backend = open_backend("test_import_acsls_duplicate_ids")?;
    backend.add_library(library_info("ACS", "sk"), 10)?;
    backend.add_acsls_volume("ACS", acsls_volume("A000", 1, false))?;
    backend.add_acsls_volume("ACS", acsls_volume("A001", 1, false))?;

    let mut manager = manager(backend);
    let ctx = admin();

    let request = ImportRequest::Acsls {
        volume_ids: vec!["A000".to_string(), "A000".to_string()],
    };
    assert!(manager.import(&ctx, "ACS", &request).is_err());
    assert!(manager.catalog("ACS")?.is_empty());

    let request = ImportRequest::Acsls {
        volume_ids: crate::media::parse_volume_list("A000, A000,A001"),
    };
    manager.import(&ctx, "ACS", &request)?;
    let names: Vec<String> = manager
        .catalog("ACS")?
        .into_iter()
        .map(|vsn| vsn.name)
        .collect();
    assert_eq!(names, vec!["A000", "A001"]);

    Ok(())
}

#[test]
fn test_import_range_samst() -> Result<(), Error> {
    let mut backend = open_backend("test_import_range_samst")?;
    backend.add_library(library_info("LIB1", "rb"), 10)?;
    backend.add_to_mailbox("LIB1", cartridge("A001"))?;

    let mut manager = manager(backend);

    let err = manager
        .import_range(&admin(), "LIB1", "A000", "A999")
        .unwrap_err();
    assert!(err.message.contains("cannot import by VSN range"));
    assert!(manager.catalog("LIB1")?.is_empty());

    manager.import(&admin(), "LIB1", &ImportRequest::Catalog)?;
    let catalog = manager.catalog("LIB1")?;
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name, "A001");
    assert_eq!(catalog[0].slot, 0);

    // mailbox is empty now
    assert!(manager.import(&admin(), "LIB1", &ImportRequest::Catalog).is_err());

    Ok(())
}

#[test]
fn test_import_network_attached() -> Result<(), Error> {
    let mut backend = open_backend("test_import_network_attached")?;
    backend.add_library(library_info("GRAU", "gr"), 10)?;
    for name in ["N001", "N002", "N003", "N010"] {
        backend.add_to_mailbox("GRAU", cartridge(name))?;
    }

    let mut manager = manager(backend);
    let ctx = admin();

    let request = ImportRequest::NetworkAttached {
        start: "N002".to_string(),
        end: Some("N002".to_string()),
    };
    manager.import(&ctx, "GRAU", &request)?;
    assert_eq!(manager.catalog("GRAU")?.len(), 1);

    manager.import_range(&ctx, "GRAU", "N001", "N003")?;
    let names: Vec<String> = manager
        .catalog("GRAU")?
        .into_iter()
        .map(|vsn| vsn.name)
        .collect();
    assert_eq!(names, vec!["N002", "N001", "N003"]);

    let request = ImportRequest::NetworkAttached {
        start: "N010".to_string(),
        end: None,
    };
    manager.import(&ctx, "GRAU", &request)?;
    assert_eq!(manager.catalog("GRAU")?.len(), 4);

    // wrong protocol for this driver
    let request = ImportRequest::Acsls {
        volume_ids: vec!["N001".to_string()],
    };
    assert!(manager.import(&ctx, "GRAU", &request).is_err());

    Ok(())
}

#[test]
fn test_acsls_candidates() -> Result<(), Error> {
    let mut backend = open_backend("test_acsls_candidates")?;
    backend.add_library(library_info("ACS", "sk"), 10)?;
    backend.add_library(library_info("LIB1", "rb"), 10)?;
    for i in 0..5 {
        let name = format!("S{:05}", i);
        backend.add_acsls_volume("ACS", acsls_volume(&name, i % 2, i == 0))?;
    }

    let settings = MediaManagerSettings {
        max_entries: 2,
        ..Default::default()
    };
    let manager = manager_with(backend, settings);

    let res = manager.acsls_candidates("ACS", &ImportFilter::None)?;
    assert_eq!(res.total_count, 5);
    assert_eq!(res.volumes.len(), 2);
    assert!(res.volumes[0].in_use);

    let res = manager.acsls_candidates("ACS", &ImportFilter::ScratchPool(1))?;
    assert_eq!(res.total_count, 2);

    let res = manager.acsls_candidates("ACS", &ImportFilter::Expression("S0000[34]".to_string()))?;
    assert_eq!(res.total_count, 2);

    let filter = ImportFilter::Range {
        start: "S00001".to_string(),
        end: "S00002".to_string(),
    };
    let res = manager.acsls_candidates("ACS", &filter)?;
    assert_eq!(res.total_count, 2);
    assert_eq!(res.expression_used, "S00001-S00002");

    let err = manager.acsls_candidates("LIB1", &ImportFilter::None).unwrap_err();
    assert_eq!(err.code, crate::media::ECATALOG_UNAVAILABLE);

    Ok(())
}

#[test]
fn test_remove_library() -> Result<(), Error> {
    let mut backend = open_backend("test_remove_library")?;
    backend.add_library(library_info("LIB1", "rb"), 10)?;
    backend.add_vsn(vsn_info("LIB1", 3, "VSN003", 1000, 500))?;

    let mut manager = manager(backend);

    let operator = AccessContext::new("op@pam", ROLE_MEDIA_OPERATOR);
    assert!(manager
        .remove_library(&operator, "LIB1")
        .unwrap_err()
        .is_no_permission());

    manager.remove_library(&admin(), "LIB1")?;
    assert!(manager.list_libraries()?.is_empty());

    let historian = manager.catalog(HISTORIAN_NAME)?;
    assert_eq!(historian.len(), 1);
    assert_eq!(historian[0].name, "VSN003");
    assert_eq!(historian[0].library, HISTORIAN_NAME);

    Ok(())
}

#[test]
fn test_mixed_media_and_drives() -> Result<(), Error> {
    let mut backend = open_backend("test_mixed_media_and_drives")?;
    backend.add_library(library_info("LIB1", "rb"), 10)?;
    backend.add_library(library_info("LIB2", "rb"), 10)?;
    backend.add_drive(drive_info("LIB1", 11, "li"))?;
    backend.add_drive(drive_info("LIB1", 12, "lt"))?;
    backend.add_drive(drive_info("LIB2", 21, "li"))?;

    let manager = manager(backend);

    assert!(manager.contains_mixed_media("LIB1")?);
    assert!(!manager.contains_mixed_media("LIB2")?);
    assert!(!manager.contains_mixed_media(HISTORIAN_NAME)?);
    assert!(manager.library_drives(HISTORIAN_NAME)?.is_empty());

    Ok(())
}

#[test]
fn test_unload_library_permissions() -> Result<(), Error> {
    let mut backend = open_backend("test_unload_library_permissions")?;
    backend.add_library(library_info("LIB1", "rb"), 10)?;

    let mut manager = manager(backend);

    let audit = AccessContext::new("audit@pam", ROLE_MEDIA_AUDIT);
    assert!(manager.unload_library(&audit, "LIB1").is_err());

    manager.unload_library(&admin(), "LIB1")?;

    Ok(())
}
