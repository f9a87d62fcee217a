use samqfs_api_types::{
    is_historian_name, AcslsVolume, DeviceState, DriveInfo, DriverType, LibraryInfo,
    HISTORIAN_NAME,
};

use super::capacity::usage;
use super::search::{evaluate, SearchCriteria, SearchResult};
use super::{AccessContext, Confirmation, ManagementError, MediaManager};

/// How a library imports media
///
/// The protocol depends on the library driver, see
/// [`MediaManager::import`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRequest {
    /// Import the next cartridge from the mailbox (direct attached libraries)
    Catalog,
    /// Import these volumes from the ACSLS server
    Acsls { volume_ids: Vec<String> },
    /// Import a single VSN, or a VSN range (network attached libraries)
    NetworkAttached { start: String, end: Option<String> },
}

/// Selects ACSLS volumes offered for import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportFilter {
    None,
    ScratchPool(u32),
    Range { start: String, end: String },
    Expression(String),
}

/// Split a comma separated volume list
///
/// Whitespace around the names is removed, empty and repeated entries
/// are dropped.
pub fn parse_volume_list(list: &str) -> Vec<String> {
    let mut volumes: Vec<String> = Vec::new();
    for name in list.split(',').map(str::trim) {
        if !name.is_empty() && !volumes.iter().any(|known| known == name) {
            volumes.push(name.to_string());
        }
    }
    volumes
}

fn check_not_historian(library: &str) -> Result<(), ManagementError> {
    if is_historian_name(library) {
        return Err(ManagementError::generic(format!(
            "operation not supported on the {}",
            HISTORIAN_NAME
        )));
    }
    Ok(())
}

impl MediaManager {
    /// All real libraries (without the Historian)
    pub fn list_libraries(&self) -> Result<Vec<LibraryInfo>, ManagementError> {
        let list = self.backend.list_libraries()?;
        Ok(list
            .into_iter()
            .filter(|lib| !is_historian_name(&lib.name))
            .collect())
    }

    pub fn historian(&self) -> Result<LibraryInfo, ManagementError> {
        self.library(HISTORIAN_NAME)
    }

    pub fn library(&self, name: &str) -> Result<LibraryInfo, ManagementError> {
        self.backend
            .library(name)?
            .ok_or_else(|| ManagementError::library_not_found(name))
    }

    /// Used space in percent, -1 if there is no capacity
    ///
    /// Libraries which are not online report no capacity.
    pub fn library_usage(&self, name: &str) -> Result<i64, ManagementError> {
        let info = self.library(name)?;
        Ok(usage(info.effective_free_space(), info.effective_capacity()))
    }

    /// Drives of a library (empty if the backend reports none)
    pub fn library_drives(&self, name: &str) -> Result<Vec<DriveInfo>, ManagementError> {
        Ok(self.backend.library_drives(name)?.unwrap_or_default())
    }

    /// True if the drives of a library use different media types
    pub fn contains_mixed_media(&self, name: &str) -> Result<bool, ManagementError> {
        let drives = self.library_drives(name)?;
        let mut media_types = drives.iter().map(|drive| drive.media_type.as_str());
        Ok(match media_types.next() {
            Some(first) => media_types.any(|media_type| media_type != first),
            None => false,
        })
    }

    /// Request a library state change
    ///
    /// The backend may apply the change asynchronously. We do one
    /// confirmation wait, see [`ConfirmationWait`](super::ConfirmationWait).
    pub fn set_library_state(
        &mut self,
        ctx: &AccessContext,
        name: &str,
        state: DeviceState,
    ) -> Result<Confirmation<DeviceState>, ManagementError> {
        ctx.check_config()?;
        check_not_historian(name)?;

        let before = self.library(name)?.state;

        log::info!("set state of library '{}' to {}", name, state);
        self.backend.set_library_state(name, state)?;

        let res = self.confirm.wait(&before, || Ok(self.library(name)?.state))?;
        log::info!("set state of library '{}' done", name);
        Ok(res)
    }

    /// Unload all drives
    pub fn unload_library(&mut self, ctx: &AccessContext, name: &str) -> Result<(), ManagementError> {
        ctx.check_media_op()?;
        check_not_historian(name)?;

        log::info!("unloading library '{}'", name);
        self.backend.unload_library(name)?;
        log::info!("unloading library '{}' done", name);
        Ok(())
    }

    /// Import media
    ///
    /// The request must match the driver type of the library.
    pub fn import(
        &mut self,
        ctx: &AccessContext,
        name: &str,
        request: &ImportRequest,
    ) -> Result<(), ManagementError> {
        ctx.check_media_op()?;
        check_not_historian(name)?;

        let driver_type = self.library(name)?.driver_type;

        match (request, driver_type) {
            (ImportRequest::Catalog, DriverType::Samst) => {
                log::info!("import into library '{}'", name);
                self.backend.import_cartridge(name)?;
            }
            (ImportRequest::Acsls { volume_ids }, DriverType::Acsls) => {
                if volume_ids.is_empty() {
                    return Err(ManagementError::generic("no volumes selected for import"));
                }
                log::info!("import {} into library '{}'", volume_ids.join(","), name);
                self.backend.import_acsls_volumes(name, volume_ids)?;
            }
            (ImportRequest::NetworkAttached { start, end }, driver)
                if driver.is_network_attached() =>
            {
                if start.is_empty() {
                    return Err(ManagementError::generic("missing start VSN"));
                }
                // a range with identical ends is a single import
                let end = end
                    .as_deref()
                    .filter(|end| !end.is_empty() && *end != start.as_str());
                match end {
                    Some(end) => log::info!("import {}-{} into library '{}'", start, end, name),
                    None => log::info!("import {} into library '{}'", start, name),
                }
                self.backend.import_network_attached(name, start, end)?;
            }
            (request, driver) => {
                return Err(ManagementError::generic(format!(
                    "import request {:?} not supported by {:?} library '{}'",
                    request, driver, name
                )));
            }
        }

        log::info!("import into library '{}' done", name);
        Ok(())
    }

    /// Import a VSN range
    ///
    /// ACSLS libraries import the free volumes of that range known to the
    /// ACSLS server, network attached libraries import the range directly.
    /// Other libraries cannot import by range.
    pub fn import_range(
        &mut self,
        ctx: &AccessContext,
        name: &str,
        start: &str,
        end: &str,
    ) -> Result<(), ManagementError> {
        let driver_type = self.library(name)?.driver_type;

        let request = match driver_type {
            DriverType::Acsls => {
                let filter = ImportFilter::Range {
                    start: start.to_string(),
                    end: end.to_string(),
                };
                let candidates = self.acsls_candidates(name, &filter)?;
                if candidates.is_truncated() {
                    return Err(ManagementError::generic(format!(
                        "VSN range {}-{} matches {} volumes (more than {}), narrow the range",
                        start,
                        end,
                        candidates.total_count,
                        candidates.volumes.len()
                    )));
                }
                let volume_ids = candidates
                    .volumes
                    .into_iter()
                    .filter(|volume| !volume.in_use)
                    .map(|volume| volume.name)
                    .collect();
                ImportRequest::Acsls { volume_ids }
            }
            driver if driver.is_network_attached() => ImportRequest::NetworkAttached {
                start: start.to_string(),
                end: Some(end.to_string()),
            },
            driver => {
                return Err(ManagementError::generic(format!(
                    "library '{}' ({:?}) cannot import by VSN range",
                    name, driver
                )));
            }
        };

        self.import(ctx, name, &request)
    }

    /// Volumes offered for import by the ACSLS server of a library
    pub fn acsls_candidates(
        &self,
        name: &str,
        filter: &ImportFilter,
    ) -> Result<SearchResult<AcslsVolume>, ManagementError> {
        let info = self.library(name)?;
        if info.driver_type != DriverType::Acsls {
            return Err(ManagementError::catalog_unavailable(name));
        }

        let mut volumes = self.backend.acsls_volumes(name)?;

        let criteria = match filter {
            ImportFilter::None => SearchCriteria::range("", ""),
            ImportFilter::ScratchPool(pool_id) => {
                volumes.retain(|volume| volume.pool_id == *pool_id);
                SearchCriteria::range("", "")
            }
            ImportFilter::Range { start, end } => SearchCriteria::range(start.as_str(), end.as_str()),
            ImportFilter::Expression(pattern) => SearchCriteria::expression(pattern.as_str()),
        };

        evaluate(volumes, &criteria, self.settings.max_entries)
    }

    /// Remove a library (irreversible)
    ///
    /// Its volumes move to the Historian.
    pub fn remove_library(&mut self, ctx: &AccessContext, name: &str) -> Result<(), ManagementError> {
        ctx.check_config()?;
        check_not_historian(name)?;

        log::info!("removing library '{}'", name);
        self.backend.remove_library(name)?;
        log::info!("removing library '{}' done", name);
        Ok(())
    }
}
