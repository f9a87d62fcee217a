// Volume search tests
//
// # cargo test --release media::test::search

use anyhow::Error;

use samqfs_api_types::DiskVolumeInfo;

use super::*;
use crate::media::backend::VirtualPool;
use crate::media::{MediaManagerSettings, SearchCriteria, VolumeQuery};

fn disk_volume(name: &str, media_type: &str, available: u64) -> DiskVolumeInfo {
    DiskVolumeInfo {
        name: name.to_string(),
        host: String::new(),
        path: format!("/disk_archive/{}", name),
        media_type: media_type.to_string(),
        capacity: 10_000,
        available,
        bad_media: false,
        unavailable: false,
        read_only: false,
        labeled: true,
        unknown: false,
        remote: false,
    }
}

fn vsn_names(list: &[samqfs_api_types::VsnInfo]) -> Vec<String> {
    list.iter().map(|vsn| vsn.name.clone()).collect()
}

#[test]
fn test_search_range_and_expression() -> Result<(), Error> {
    let mut backend = open_backend("test_search_range_and_expression")?;
    backend.add_library(library_info("LIB1", "rb"), 20)?;
    backend.add_library(library_info("LIB2", "rb"), 20)?;
    for (slot, name) in ["A000", "A100", "A999", "B000"].iter().enumerate() {
        backend.add_vsn(vsn_info("LIB1", slot as u32, name, 1000, 100))?;
    }
    backend.add_vsn(vsn_info("LIB2", 0, "A050", 1000, 100))?;
    backend.add_vsn(vsn_info("LIB2", 1, "", 1000, 1000))?;
    let mut other = vsn_info("LIB2", 2, "A060", 1000, 100);
    other.media_type = "lt".to_string();
    backend.add_vsn(other)?;

    let manager = manager(backend);

    let query = VolumeQuery::new("li", SearchCriteria::range("A000", "A999"));
    let res = manager.search_vsns(&query)?;
    assert_eq!(vsn_names(&res.volumes), vec!["A000", "A050", "A100", "A999"]);
    assert_eq!(res.total_count, 4);
    assert_eq!(res.free_space_mb, 400);
    assert_eq!(res.expression_used, "A000-A999");

    // empty range behaves like a wildcard expression
    let range = manager.search_vsns(&VolumeQuery::new("li", SearchCriteria::range("", "")))?;
    let wildcard = manager.search_vsns(&VolumeQuery::new("li", SearchCriteria::expression(".*")))?;
    assert_eq!(vsn_names(&range.volumes), vsn_names(&wildcard.volumes));
    assert_eq!(range.total_count, 5);

    let res = manager.search_vsns(&VolumeQuery::new("lt", SearchCriteria::expression("A0.0")))?;
    assert_eq!(vsn_names(&res.volumes), vec!["A060"]);

    // disk media is searched with search_disk_volumes
    assert!(manager
        .search_vsns(&VolumeQuery::new("dk", SearchCriteria::range("", "")))
        .is_err());

    Ok(())
}

#[test]
fn test_search_cap() -> Result<(), Error> {
    let mut backend = open_backend("test_search_cap")?;
    backend.add_library(library_info("LIB1", "rb"), 50)?;
    for slot in 0..30 {
        backend.add_vsn(vsn_info("LIB1", slot, &format!("V{:05}", slot), 100, 10))?;
    }

    let settings = MediaManagerSettings {
        max_entries: 10,
        ..Default::default()
    };
    let manager = manager_with(backend, settings);

    let res = manager.search_vsns(&VolumeQuery::new("li", SearchCriteria::range("", "")))?;
    assert_eq!(res.total_count, 30);
    assert_eq!(res.volumes.len(), 10);
    assert!(res.is_truncated());
    assert_eq!(res.volumes[0].name, "V00000");
    assert_eq!(res.free_space_mb, 300);

    let res = manager.search_vsns(&VolumeQuery::new("li", SearchCriteria::range("V00025", "")))?;
    assert_eq!(res.total_count, 5);
    assert_eq!(res.volumes.len(), 5);

    Ok(())
}

#[test]
fn test_search_pool_and_copy() -> Result<(), Error> {
    let mut backend = open_backend("test_search_pool_and_copy")?;
    backend.add_library(library_info("LIB1", "rb"), 20)?;
    backend.add_pool(VirtualPool {
        name: "pool1".to_string(),
        media_type: "li".to_string(),
        copy: Some(1),
    })?;
    backend.add_pool(VirtualPool {
        name: "pool2".to_string(),
        media_type: "li".to_string(),
        copy: Some(2),
    })?;
    for (slot, (name, pool)) in [("A000", "pool1"), ("A001", "pool2"), ("A002", "pool1")]
        .iter()
        .enumerate()
    {
        let mut vsn = vsn_info("LIB1", slot as u32, name, 1000, 500);
        vsn.pool = Some(pool.to_string());
        backend.add_vsn(vsn)?;
    }
    backend.add_vsn(vsn_info("LIB1", 10, "A010", 1000, 500))?;

    let manager = manager(backend);

    let query = VolumeQuery::new("li", SearchCriteria::range("", "")).pool("pool1");
    assert_eq!(vsn_names(&manager.search_vsns(&query)?.volumes), vec!["A000", "A002"]);

    let query = VolumeQuery::new("li", SearchCriteria::range("", "")).copy(2);
    assert_eq!(vsn_names(&manager.search_vsns(&query)?.volumes), vec!["A001"]);

    let query = VolumeQuery::new("li", SearchCriteria::range("", "")).copy(3);
    assert!(manager.search_vsns(&query)?.volumes.is_empty());

    let query = VolumeQuery::new("li", SearchCriteria::range("", "")).copy(0);
    assert!(manager.search_vsns(&query).is_err());

    Ok(())
}

#[test]
fn test_search_disk_volumes() -> Result<(), Error> {
    let mut backend = open_backend("test_search_disk_volumes")?;
    backend.add_disk_volume(disk_volume("disk01", "dk", 100))?;
    backend.add_disk_volume(disk_volume("disk02", "dk", 200))?;
    backend.add_disk_volume(disk_volume("hc01", "cb", 300))?;

    let settings = MediaManagerSettings {
        max_entries: 1,
        ..Default::default()
    };
    let manager = manager_with(backend, settings);

    let res = manager.search_disk_volumes(&VolumeQuery::new("dk", SearchCriteria::expression("disk.*")))?;
    assert_eq!(res.total_count, 2);
    assert_eq!(res.volumes.len(), 1);
    assert_eq!(res.volumes[0].name, "disk01");
    assert_eq!(res.free_space_mb, 300);

    let res = manager.search_disk_volumes(&VolumeQuery::new("cb", SearchCriteria::range("", "")))?;
    assert_eq!(res.total_count, 1);

    assert!(manager
        .search_disk_volumes(&VolumeQuery::new("li", SearchCriteria::range("", "")))
        .is_err());

    Ok(())
}
