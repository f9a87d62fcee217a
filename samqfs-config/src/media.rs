//! Managed media server configuration
//!
//! This configuration module is based on [`SectionConfig`], and
//! provides a type safe interface to store [`VirtualMediaServer`]
//! configurations.
//!
//! [VirtualMediaServer]: samqfs_api_types::VirtualMediaServer
//! [SectionConfig]: proxmox_section_config::SectionConfig

use std::collections::HashMap;

use anyhow::{bail, Error};
use lazy_static::lazy_static;

use proxmox_schema::*;
use proxmox_section_config::{SectionConfig, SectionConfigData, SectionConfigPlugin};

use samqfs_api_types::{VirtualMediaServer, SERVER_NAME_SCHEMA};

use crate::{open_media_lockfile, replace_media_config, MediaLockGuard};

lazy_static! {
    /// Static [`SectionConfig`] to access parser/writer functions.
    pub static ref CONFIG: SectionConfig = init();
}

fn init() -> SectionConfig {
    let mut config = SectionConfig::new(&SERVER_NAME_SCHEMA);

    let obj_schema = match VirtualMediaServer::API_SCHEMA {
        Schema::Object(ref obj_schema) => obj_schema,
        _ => unreachable!(),
    };
    let plugin =
        SectionConfigPlugin::new("virtual".to_string(), Some("name".to_string()), obj_schema);
    config.register_plugin(plugin);

    config
}

/// Configuration file name
pub const MEDIA_CFG_FILENAME: &str = samqfs_buildcfg::configdir!("/media.cfg");
/// Lock file name (used to prevent concurrent access)
pub const MEDIA_CFG_LOCKFILE: &str = samqfs_buildcfg::configdir!("/.media.lck");

/// Get exclusive lock
pub fn lock() -> Result<MediaLockGuard, Error> {
    open_media_lockfile(MEDIA_CFG_LOCKFILE, None, true)
}

/// Read and parse the configuration file
pub fn config() -> Result<(SectionConfigData, [u8; 32]), Error> {
    let content =
        proxmox_sys::fs::file_read_optional_string(MEDIA_CFG_FILENAME)?.unwrap_or_default();

    let digest = openssl::sha::sha256(content.as_bytes());
    let data = CONFIG.parse(MEDIA_CFG_FILENAME, &content)?;
    Ok((data, digest))
}

/// Save the configuration file
pub fn save_config(config: &SectionConfigData) -> Result<(), Error> {
    let raw = CONFIG.write(MEDIA_CFG_FILENAME, config)?;
    replace_media_config(MEDIA_CFG_FILENAME, raw.as_bytes())
}

/// Lookup a server section by name
pub fn lookup_server(config: &SectionConfigData, name: &str) -> Result<VirtualMediaServer, Error> {
    match config.sections.get(name) {
        Some((section_type, _)) if section_type == "virtual" => config.lookup("virtual", name),
        Some((section_type, _)) => {
            bail!("Entry '{}' exists, but has unsupported type '{}'", name, section_type)
        }
        None => bail!("Media server '{}' does not exist", name),
    }
}

/// Add a new server section
pub fn add_server(config: &mut SectionConfigData, server: &VirtualMediaServer) -> Result<(), Error> {
    if config.sections.get(&server.name).is_some() {
        bail!("Entry '{}' already exists", server.name);
    }
    config.set_data(&server.name, "virtual", server)?;
    Ok(())
}

/// Remove a server section
pub fn remove_server(config: &mut SectionConfigData, name: &str) -> Result<(), Error> {
    lookup_server(config, name)?;
    config.sections.remove(name);
    Ok(())
}

// shell completion helper

/// List all server names
pub fn complete_server_name(_arg: &str, _param: &HashMap<String, String>) -> Vec<String> {
    match config() {
        Ok((data, _digest)) => data.sections.keys().map(|id| id.to_string()).collect(),
        Err(_) => Vec::new(),
    }
}
