/// SAM-QFS media management command line tool
///
/// Lists libraries, drives and volume catalogs of a managed server and
/// runs the media operations (state changes, import, label, reserve,
/// export, search).
///
/// Servers are configured in `/etc/samqfs-media/media.cfg` (see the
/// `create-server` and `remove-server` commands).
use anyhow::{bail, format_err, Error};
use serde::Serialize;
use serde_json::Value;

use proxmox_router::cli::*;
use proxmox_router::RpcEnvironment;
use proxmox_schema::api;

use samqfs_api_types::{
    is_disk_media_type, AlarmFilter, AlarmSeverity, AlarmStatus, DeviceState, LabelMode,
    ReservationKind, ReservationRequest, VirtualMediaServer, CONFIRM_WAIT_SCHEMA,
    LIBRARY_NAME_SCHEMA, MAX_ENTRIES_SCHEMA, MAX_FLAGS_SCHEMA, MEDIA_TYPE_SCHEMA, ROLE_ADMIN,
    ROLE_MEDIA_AUDIT, SERVER_NAME_SCHEMA, SINGLE_LINE_COMMENT_SCHEMA, STATE_DELAY_SCHEMA,
    VSN_NAME_SCHEMA, VSN_POOL_NAME_SCHEMA,
};
use samqfs_config::media::complete_server_name;
use samqfs_media::media::backend::open_virtual_media_server;
use samqfs_media::media::capacity::{format_mib, usage};
use samqfs_media::media::{
    parse_volume_list, AccessContext, DiskVolumeFlags, ImportRequest, MediaManager,
    MediaManagerSettings, SearchCriteria, VolumeQuery, VsnFlags,
};

fn get_media_manager(param: &Value) -> Result<MediaManager, Error> {
    let name = match param["server"].as_str() {
        Some(name) => name.to_string(),
        None => match std::env::var("SAMQFS_MEDIA_SERVER") {
            Ok(name) => name,
            Err(_) => bail!("no media server specified"),
        },
    };

    let (config, _digest) = samqfs_config::media::config()?;
    let server = samqfs_config::media::lookup_server(&config, &name)?;
    log::debug!("using media server {} ({})", server.name, server.path);

    let backend = open_virtual_media_server(&server)?;
    Ok(MediaManager::new(
        Box::new(backend),
        MediaManagerSettings::from_config(&server),
    ))
}

fn get_access_context(rpcenv: &dyn RpcEnvironment) -> Result<AccessContext, Error> {
    let auth_id = rpcenv
        .get_auth_id()
        .ok_or_else(|| format_err!("no authid available"))?;
    let privs = if auth_id == "root@pam" {
        ROLE_ADMIN
    } else {
        ROLE_MEDIA_AUDIT
    };
    Ok(AccessContext::new(auth_id, privs))
}

fn print_result<T: Serialize, F: FnOnce(&T)>(
    output_format: &str,
    data: &T,
    render_text: F,
) -> Result<(), Error> {
    match output_format {
        "json-pretty" => println!("{}", serde_json::to_string_pretty(data)?),
        "json" => println!("{}", serde_json::to_string(data)?),
        "text" => render_text(data),
        _ => bail!("unknown output format '{}'", output_format),
    }
    Ok(())
}

fn print_status_codes<T: std::fmt::Debug>(codes: &[T]) {
    if !codes.is_empty() {
        let codes: Vec<String> = codes.iter().map(|code| format!("{:?}", code)).collect();
        println!("    status: {}", codes.join(", "));
    }
}

fn slot_param(slot: u64) -> Result<u32, Error> {
    u32::try_from(slot).map_err(|_| format_err!("slot number {} out of range", slot))
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            "output-format": {
                schema: OUTPUT_FORMAT,
                optional: true,
            },
        },
    },
)]
/// List libraries
fn libraries(param: Value) -> Result<(), Error> {
    let output_format = get_output_format(&param);
    let manager = get_media_manager(&param)?;

    let list = manager.list_libraries()?;

    print_result(&output_format, &list, |list| {
        for lib in list.iter() {
            println!(
                "{} (eq {}, {:?}) state {} - {} free of {} ({}% used)",
                lib.name,
                lib.eq,
                lib.driver_type,
                lib.state,
                format_mib(lib.effective_free_space()),
                format_mib(lib.effective_capacity()),
                usage(lib.effective_free_space(), lib.effective_capacity()),
            );
            print_status_codes(&lib.status_codes());
        }
    })
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            library: {
                schema: LIBRARY_NAME_SCHEMA,
            },
            "output-format": {
                schema: OUTPUT_FORMAT,
                optional: true,
            },
        },
    },
)]
/// List drives of a library
fn drives(param: Value, library: String) -> Result<(), Error> {
    let output_format = get_output_format(&param);
    let manager = get_media_manager(&param)?;

    let list = manager.library_drives(&library)?;

    print_result(&output_format, &list, |list| {
        for drive in list.iter() {
            let loaded = match (&drive.loaded_vsn, drive.loaded_slot) {
                (Some(vsn), Some(slot)) => format!("{} (slot {})", vsn, slot),
                _ => String::from("empty"),
            };
            println!(
                "{} {} ({}) state {} shared={} loaded: {}",
                drive.eq, drive.path, drive.media_type, drive.state, drive.shared, loaded
            );
            print_status_codes(&drive.status_codes());
        }
    })
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            library: {
                schema: LIBRARY_NAME_SCHEMA,
            },
            "output-format": {
                schema: OUTPUT_FORMAT,
                optional: true,
            },
        },
    },
)]
/// Show the VSN catalog of a library
fn catalog(param: Value, library: String) -> Result<(), Error> {
    let output_format = get_output_format(&param);
    let manager = get_media_manager(&param)?;

    let list = manager.catalog(&library)?;

    print_result(&output_format, &list, |list| {
        for vsn in list.iter() {
            println!(
                "{:>5} {:<6} {} {:>3}% {}",
                vsn.slot,
                if vsn.labeled { vsn.name.as_str() } else { "-" },
                vsn.media_type,
                usage(vsn.available, vsn.capacity),
                manager.vsn_flag_summary(vsn),
            );
        }
    })
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            library: {
                schema: LIBRARY_NAME_SCHEMA,
            },
            state: {
                description: "New state (on, ro, idle, unavail, off, down, noalloc or a number).",
                type: String,
            },
        },
    },
)]
/// Change the state of a library
fn set_library_state(
    param: Value,
    library: String,
    state: String,
    rpcenv: &mut dyn RpcEnvironment,
) -> Result<(), Error> {
    let ctx = get_access_context(rpcenv)?;
    let mut manager = get_media_manager(&param)?;

    let state: DeviceState = state.parse()?;
    if !manager.set_library_state(&ctx, &library, state)?.is_confirmed() {
        log::warn!("library '{}' did not report the new state yet", library);
    }

    Ok(())
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            library: {
                schema: LIBRARY_NAME_SCHEMA,
            },
        },
    },
)]
/// Unload all drives of a library
fn unload_library(
    param: Value,
    library: String,
    rpcenv: &mut dyn RpcEnvironment,
) -> Result<(), Error> {
    let ctx = get_access_context(rpcenv)?;
    let mut manager = get_media_manager(&param)?;

    manager.unload_library(&ctx, &library)?;

    Ok(())
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            library: {
                schema: LIBRARY_NAME_SCHEMA,
            },
            start: {
                schema: VSN_NAME_SCHEMA,
                optional: true,
            },
            end: {
                schema: VSN_NAME_SCHEMA,
                optional: true,
            },
            volumes: {
                description: "Comma separated list of ACSLS volumes.",
                type: String,
                optional: true,
            },
        },
    },
)]
/// Import media
///
/// Without parameters, the next cartridge of the mailbox is imported.
fn import(
    param: Value,
    library: String,
    start: Option<String>,
    end: Option<String>,
    volumes: Option<String>,
    rpcenv: &mut dyn RpcEnvironment,
) -> Result<(), Error> {
    let ctx = get_access_context(rpcenv)?;
    let mut manager = get_media_manager(&param)?;

    if let Some(volumes) = volumes {
        if start.is_some() || end.is_some() {
            bail!("parameter 'volumes' conflicts with 'start'/'end'");
        }
        let request = ImportRequest::Acsls {
            volume_ids: parse_volume_list(&volumes),
        };
        manager.import(&ctx, &library, &request)?;
        return Ok(());
    }

    match (start, end) {
        (Some(start), Some(end)) => manager.import_range(&ctx, &library, &start, &end)?,
        (Some(start), None) => {
            let request = ImportRequest::NetworkAttached { start, end: None };
            manager.import(&ctx, &library, &request)?;
        }
        (None, Some(_)) => bail!("parameter 'end' requires 'start'"),
        (None, None) => manager.import(&ctx, &library, &ImportRequest::Catalog)?,
    }

    Ok(())
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            library: {
                schema: LIBRARY_NAME_SCHEMA,
            },
            slot: {
                description: "Catalog slot number.",
                type: u64,
            },
            vsn: {
                schema: VSN_NAME_SCHEMA,
            },
            relabel: {
                description: "Relabel previously labeled media.",
                type: bool,
                optional: true,
                default: false,
            },
            "block-size": {
                description: "Block size in KiB (0 uses the device default).",
                type: u64,
                optional: true,
                default: 0,
            },
        },
    },
)]
/// Label media
fn label(
    param: Value,
    library: String,
    slot: u64,
    vsn: String,
    relabel: bool,
    block_size: u64,
    rpcenv: &mut dyn RpcEnvironment,
) -> Result<(), Error> {
    let ctx = get_access_context(rpcenv)?;
    let mut manager = get_media_manager(&param)?;

    let mode = if relabel {
        LabelMode::Relabel
    } else {
        LabelMode::Label
    };

    match manager.label(&ctx, &library, slot_param(slot)?, mode, &vsn, block_size)? {
        Some(job_id) => log::info!("label job {} started", job_id),
        None => log::info!("label done"),
    }

    Ok(())
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            library: {
                schema: LIBRARY_NAME_SCHEMA,
            },
            slot: {
                description: "Catalog slot number.",
                type: u64,
            },
            policy: {
                description: "Archive policy name.",
                type: String,
                optional: true,
            },
            "file-system": {
                description: "File system name.",
                type: String,
                optional: true,
            },
            kind: {
                type: ReservationKind,
                optional: true,
            },
            name: {
                description: "Owner, group or directory name.",
                type: String,
                optional: true,
            },
        },
    },
)]
/// Reserve a VSN
#[allow(clippy::too_many_arguments)]
fn reserve(
    param: Value,
    library: String,
    slot: u64,
    policy: Option<String>,
    file_system: Option<String>,
    kind: Option<ReservationKind>,
    name: Option<String>,
    rpcenv: &mut dyn RpcEnvironment,
) -> Result<(), Error> {
    let ctx = get_access_context(rpcenv)?;
    let mut manager = get_media_manager(&param)?;

    let request = ReservationRequest {
        policy,
        file_system,
        kind,
        name,
    };
    manager.reserve(&ctx, &library, slot_param(slot)?, &request)?;

    Ok(())
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            library: {
                schema: LIBRARY_NAME_SCHEMA,
            },
            slot: {
                description: "Catalog slot number.",
                type: u64,
            },
        },
    },
)]
/// Clear the reservation of a VSN
fn unreserve(
    param: Value,
    library: String,
    slot: u64,
    rpcenv: &mut dyn RpcEnvironment,
) -> Result<(), Error> {
    let ctx = get_access_context(rpcenv)?;
    let mut manager = get_media_manager(&param)?;

    manager.unreserve(&ctx, &library, slot_param(slot)?)?;

    Ok(())
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            library: {
                schema: LIBRARY_NAME_SCHEMA,
            },
            slot: {
                description: "Catalog slot number.",
                type: u64,
            },
        },
    },
)]
/// Export a VSN
fn export(
    param: Value,
    library: String,
    slot: u64,
    rpcenv: &mut dyn RpcEnvironment,
) -> Result<(), Error> {
    let ctx = get_access_context(rpcenv)?;
    let mut manager = get_media_manager(&param)?;

    manager.export(&ctx, &library, slot_param(slot)?)?;

    Ok(())
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            "media-type": {
                schema: MEDIA_TYPE_SCHEMA,
            },
            start: {
                description: "First VSN of the range.",
                type: String,
                optional: true,
            },
            end: {
                description: "Last VSN of the range.",
                type: String,
                optional: true,
            },
            expression: {
                description: "Regular expression matching VSN names.",
                type: String,
                optional: true,
            },
            pool: {
                schema: VSN_POOL_NAME_SCHEMA,
                optional: true,
            },
            copy: {
                description: "Archive copy number.",
                type: Integer,
                minimum: 1,
                maximum: 4,
                optional: true,
            },
            "output-format": {
                schema: OUTPUT_FORMAT,
                optional: true,
            },
        },
    },
)]
/// Search volumes by VSN range or expression
#[allow(clippy::too_many_arguments)]
fn search(
    param: Value,
    media_type: String,
    start: Option<String>,
    end: Option<String>,
    expression: Option<String>,
    pool: Option<String>,
    copy: Option<u8>,
) -> Result<(), Error> {
    let output_format = get_output_format(&param);
    let manager = get_media_manager(&param)?;

    let criteria = match expression {
        Some(pattern) => {
            if start.is_some() || end.is_some() {
                bail!("parameter 'expression' conflicts with 'start'/'end'");
            }
            SearchCriteria::expression(pattern)
        }
        None => SearchCriteria::range(start.unwrap_or_default(), end.unwrap_or_default()),
    };

    let query = VolumeQuery {
        media_type: media_type.clone(),
        pool,
        copy,
        criteria,
    };

    if is_disk_media_type(&media_type) {
        let result = manager.search_disk_volumes(&query)?;
        print_result(&output_format, &result, |result| {
            for volume in result.volumes.iter() {
                println!(
                    "{:<16} {} {}",
                    volume.name,
                    format_mib(volume.available),
                    manager.flag_summary(DiskVolumeFlags::from(volume)),
                );
            }
            print_search_summary(result.total_count, result.volumes.len(), result.free_space_mb);
        })
    } else {
        let result = manager.search_vsns(&query)?;
        print_result(&output_format, &result, |result| {
            for vsn in result.volumes.iter() {
                println!(
                    "{:<6} {} slot {} {} {}",
                    vsn.name,
                    vsn.library,
                    vsn.slot,
                    format_mib(vsn.available),
                    manager.flag_summary(VsnFlags::from(vsn)),
                );
            }
            print_search_summary(result.total_count, result.volumes.len(), result.free_space_mb);
        })
    }
}

fn print_search_summary(total: usize, shown: usize, free_space_mb: u64) {
    println!("{} volumes, {} free", total, format_mib(free_space_mb));
    if total > shown {
        println!("showing the first {} volumes, narrow the range to see the rest", shown);
    }
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            library: {
                schema: LIBRARY_NAME_SCHEMA,
                optional: true,
            },
            severity: {
                type: AlarmSeverity,
                optional: true,
            },
            status: {
                type: AlarmStatus,
                optional: true,
            },
            "output-format": {
                schema: OUTPUT_FORMAT,
                optional: true,
            },
        },
    },
)]
/// List alarms
fn alarms(
    param: Value,
    library: Option<String>,
    severity: Option<AlarmSeverity>,
    status: Option<AlarmStatus>,
) -> Result<(), Error> {
    let output_format = get_output_format(&param);
    let manager = get_media_manager(&param)?;

    let filter = AlarmFilter {
        library,
        severity,
        status,
    };
    let list = manager.alarms(&filter)?;

    print_result(&output_format, &list, |list| {
        for alarm in list.iter() {
            let time = proxmox_time::epoch_to_rfc3339_utc(alarm.time)
                .unwrap_or_else(|_| alarm.time.to_string());
            println!(
                "{:>6} {:?} {:?} {} {}",
                alarm.id, alarm.severity, alarm.status, time, alarm.description
            );
        }
    })
}

fn parse_alarm_ids(ids: &str) -> Result<Vec<u64>, Error> {
    parse_volume_list(ids)
        .iter()
        .map(|id| {
            id.parse::<u64>()
                .map_err(|err| format_err!("invalid alarm id '{}' - {}", id, err))
        })
        .collect()
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            ids: {
                description: "Comma separated list of alarm IDs.",
                type: String,
            },
        },
    },
)]
/// Acknowledge alarms
fn acknowledge_alarms(
    param: Value,
    ids: String,
    rpcenv: &mut dyn RpcEnvironment,
) -> Result<(), Error> {
    let ctx = get_access_context(rpcenv)?;
    let mut manager = get_media_manager(&param)?;

    manager.acknowledge_alarms(&ctx, &parse_alarm_ids(&ids)?)?;

    Ok(())
}

#[api(
    input: {
        properties: {
            server: {
                schema: SERVER_NAME_SCHEMA,
                optional: true,
            },
            ids: {
                description: "Comma separated list of alarm IDs.",
                type: String,
            },
        },
    },
)]
/// Delete alarms
fn delete_alarms(
    param: Value,
    ids: String,
    rpcenv: &mut dyn RpcEnvironment,
) -> Result<(), Error> {
    let ctx = get_access_context(rpcenv)?;
    let mut manager = get_media_manager(&param)?;

    manager.delete_alarms(&ctx, &parse_alarm_ids(&ids)?)?;

    Ok(())
}

#[api(
    input: {
        properties: {
            name: {
                schema: SERVER_NAME_SCHEMA,
            },
            path: {
                description: "Path to state directory.",
                type: String,
                optional: true,
            },
            comment: {
                schema: SINGLE_LINE_COMMENT_SCHEMA,
                optional: true,
            },
            "confirm-wait": {
                schema: CONFIRM_WAIT_SCHEMA,
                optional: true,
            },
            "max-entries": {
                schema: MAX_ENTRIES_SCHEMA,
                optional: true,
            },
            "max-flags": {
                schema: MAX_FLAGS_SCHEMA,
                optional: true,
            },
            "state-delay": {
                schema: STATE_DELAY_SCHEMA,
                optional: true,
            },
            "sync-label": {
                description: "Label synchronously, without starting a job.",
                type: bool,
                optional: true,
            },
        },
    },
)]
/// Add a virtual media server to the configuration
#[allow(clippy::too_many_arguments)]
fn create_server(
    name: String,
    path: Option<String>,
    comment: Option<String>,
    confirm_wait: Option<u64>,
    max_entries: Option<u64>,
    max_flags: Option<u64>,
    state_delay: Option<u64>,
    sync_label: Option<bool>,
    rpcenv: &mut dyn RpcEnvironment,
) -> Result<(), Error> {
    get_access_context(rpcenv)?.check_config()?;

    let path = path
        .unwrap_or_else(|| format!("{}/{}", samqfs_buildcfg::VIRTUAL_BACKEND_DEFAULT_DIR, name));

    let server = VirtualMediaServer {
        name,
        path,
        comment,
        confirm_wait,
        max_entries,
        max_flags,
        state_delay,
        sync_label,
    };

    let _lock = samqfs_config::media::lock()?;
    let (mut config, _digest) = samqfs_config::media::config()?;

    samqfs_config::media::add_server(&mut config, &server)?;
    samqfs_config::media::save_config(&config)?;

    log::info!("created media server {} ({})", server.name, server.path);

    Ok(())
}

#[api(
    input: {
        properties: {
            name: {
                schema: SERVER_NAME_SCHEMA,
            },
        },
    },
)]
/// Remove a virtual media server from the configuration
///
/// The state directory is left in place.
fn remove_server(name: String, rpcenv: &mut dyn RpcEnvironment) -> Result<(), Error> {
    get_access_context(rpcenv)?.check_config()?;

    let _lock = samqfs_config::media::lock()?;
    let (mut config, _digest) = samqfs_config::media::config()?;

    samqfs_config::media::remove_server(&mut config, &name)?;
    samqfs_config::media::save_config(&config)?;

    Ok(())
}

fn main() -> Result<(), Error> {
    init_cli_logger("SAMQFS_LOG", "info");

    let uid = nix::unistd::Uid::current();

    let username = match nix::unistd::User::from_uid(uid)? {
        Some(user) => user.name,
        None => bail!("unable to get user name"),
    };

    let cmd_def = CliCommandMap::new()
        .usage_skip_options(&["server", "output-format"])
        .insert(
            "libraries",
            CliCommand::new(&API_METHOD_LIBRARIES).completion_cb("server", complete_server_name),
        )
        .insert(
            "drives",
            CliCommand::new(&API_METHOD_DRIVES)
                .arg_param(&["library"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "catalog",
            CliCommand::new(&API_METHOD_CATALOG)
                .arg_param(&["library"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "set-library-state",
            CliCommand::new(&API_METHOD_SET_LIBRARY_STATE)
                .arg_param(&["library", "state"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "unload-library",
            CliCommand::new(&API_METHOD_UNLOAD_LIBRARY)
                .arg_param(&["library"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "import",
            CliCommand::new(&API_METHOD_IMPORT)
                .arg_param(&["library"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "label",
            CliCommand::new(&API_METHOD_LABEL)
                .arg_param(&["library", "slot", "vsn"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "reserve",
            CliCommand::new(&API_METHOD_RESERVE)
                .arg_param(&["library", "slot"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "unreserve",
            CliCommand::new(&API_METHOD_UNRESERVE)
                .arg_param(&["library", "slot"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "export",
            CliCommand::new(&API_METHOD_EXPORT)
                .arg_param(&["library", "slot"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "search",
            CliCommand::new(&API_METHOD_SEARCH)
                .arg_param(&["media-type"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "alarms",
            CliCommand::new(&API_METHOD_ALARMS).completion_cb("server", complete_server_name),
        )
        .insert(
            "acknowledge-alarms",
            CliCommand::new(&API_METHOD_ACKNOWLEDGE_ALARMS)
                .arg_param(&["ids"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "delete-alarms",
            CliCommand::new(&API_METHOD_DELETE_ALARMS)
                .arg_param(&["ids"])
                .completion_cb("server", complete_server_name),
        )
        .insert(
            "create-server",
            CliCommand::new(&API_METHOD_CREATE_SERVER).arg_param(&["name"]),
        )
        .insert(
            "remove-server",
            CliCommand::new(&API_METHOD_REMOVE_SERVER)
                .arg_param(&["name"])
                .completion_cb("name", complete_server_name),
        );

    let mut rpcenv = CliEnvironment::new();
    rpcenv.set_auth_id(Some(format!("{}@pam", username)));

    run_cli_command(cmd_def, rpcenv, None);

    Ok(())
}
