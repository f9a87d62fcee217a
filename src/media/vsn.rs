use samqfs_api_types::{
    LabelMode, ReservationRequest, VsnAttributes, VsnInfo, VSN_NAME_REGEX,
};

use super::backend::NO_JOB_ID;
use super::capacity::usage;
use super::{AccessContext, ManagementError, MediaManager, VsnFlags};

/// Supported tape block sizes (KiB), 0 selects the device default
pub const VALID_BLOCK_SIZES: [u64; 8] = [16, 32, 64, 128, 256, 512, 1024, 2048];

/// Check VSN name and block size of a label request
pub fn check_label_parameters(name: &str, block_size: u64) -> Result<(), ManagementError> {
    if !VSN_NAME_REGEX.is_match(name) {
        return Err(ManagementError::generic(format!(
            "invalid VSN name '{}' (1 to 6 characters out of A-Z, a-z, 0-9, '_', '-' and '.')",
            name
        )));
    }
    if block_size != 0 && !VALID_BLOCK_SIZES.contains(&block_size) {
        return Err(ManagementError::generic(format!(
            "invalid block size {}k (expected one of {:?})",
            block_size, VALID_BLOCK_SIZES
        )));
    }
    Ok(())
}

impl MediaManager {
    /// Lookup a VSN by catalog slot
    pub fn vsn(&self, library: &str, slot: u32) -> Result<VsnInfo, ManagementError> {
        self.backend
            .catalog_entry(library, slot)?
            .ok_or_else(|| ManagementError::vsn_not_found(library, slot))
    }

    pub fn catalog(&self, library: &str) -> Result<Vec<VsnInfo>, ManagementError> {
        self.backend.catalog(library)
    }

    /// Used space of a VSN in percent, -1 if capacity is unknown
    pub fn vsn_usage(&self, library: &str, slot: u32) -> Result<i64, ManagementError> {
        let vsn = self.vsn(library, slot)?;
        Ok(usage(vsn.available, vsn.capacity))
    }

    /// Flag summary of a VSN
    pub fn vsn_flag_summary(&self, vsn: &VsnInfo) -> String {
        self.flag_summary(VsnFlags::from(vsn))
    }

    /// Label or relabel the media in a slot
    ///
    /// Returns the backend job id, if the backend started a job.
    pub fn label(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        slot: u32,
        mode: LabelMode,
        name: &str,
        block_size: u64,
    ) -> Result<Option<u64>, ManagementError> {
        ctx.check_config()?;
        check_label_parameters(name, block_size)?;

        let before = self.vsn(library, slot)?;
        if mode == LabelMode::Relabel && !before.labeled {
            return Err(ManagementError::generic(format!(
                "media in slot {} is not labeled, cannot relabel",
                slot
            )));
        }

        log::info!("label slot {} ({}) as '{}' ({:?})", slot, library, name, mode);
        let job_id = self
            .backend
            .label_vsn(library, slot, mode, name, block_size)?;

        if job_id == NO_JOB_ID {
            let before = (before.name, before.label_time);
            self.confirm.wait(&before, || {
                let vsn = self.vsn(library, slot)?;
                Ok((vsn.name, vsn.label_time))
            })?;
            return Ok(None);
        }
        if job_id < 0 {
            return Err(ManagementError::generic(format!(
                "backend returned invalid job id {}",
                job_id
            )));
        }

        log::info!("label slot {} ({}) started job {}", slot, library, job_id);
        Ok(Some(job_id as u64))
    }

    /// Reserve a VSN
    ///
    /// An existing reservation is replaced.
    pub fn reserve(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        slot: u32,
        request: &ReservationRequest,
    ) -> Result<(), ManagementError> {
        ctx.check_config()?;

        if request.policy.is_none() && request.file_system.is_none() && request.name.is_none() {
            return Err(ManagementError::generic(
                "reservation needs a policy, file system or owner",
            ));
        }
        if request.kind.is_some() != request.name.is_some() {
            return Err(ManagementError::generic(
                "reservation kind and name must be specified together",
            ));
        }

        let vsn = self.vsn(library, slot)?;
        if let Some(ref current) = vsn.reservation {
            log::info!("replacing reservation of '{}' ({:?})", vsn.name, current);
        }

        log::info!("reserve slot {} ({})", slot, library);
        self.backend.reserve_vsn(library, slot, Some(request))
    }

    /// Clear the reservation of a VSN
    ///
    /// Clearing an unreserved VSN is a no-op.
    pub fn unreserve(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        slot: u32,
    ) -> Result<(), ManagementError> {
        ctx.check_config()?;

        log::info!("unreserve slot {} ({})", slot, library);
        self.backend.reserve_vsn(library, slot, None)
    }

    /// Write all nine attributes in one call
    pub fn change_attributes(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        slot: u32,
        attributes: &VsnAttributes,
    ) -> Result<(), ManagementError> {
        ctx.check_config()?;

        log::info!("change attributes of slot {} ({})", slot, library);
        self.backend.change_vsn_attributes(library, slot, attributes)
    }

    /// Export a VSN from the library
    ///
    /// The VSN is no longer part of the library catalog afterwards.
    pub fn export(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        slot: u32,
    ) -> Result<(), ManagementError> {
        ctx.check_export()?;

        let vsn = self.vsn(library, slot)?;

        log::info!("export '{}' from slot {} ({})", vsn.name, slot, library);
        self.backend.export_vsn(library, slot)?;
        log::info!("export '{}' done", vsn.name);
        Ok(())
    }

    /// Request a catalog re-read of the VSN
    pub fn audit(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        slot: u32,
    ) -> Result<(), ManagementError> {
        ctx.check_config()?;

        log::info!("audit slot {} ({})", slot, library);
        self.backend.audit_vsn(library, slot)
    }

    /// Load a VSN into a free drive
    pub fn load(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        slot: u32,
    ) -> Result<(), ManagementError> {
        ctx.check_config()?;

        log::info!("load slot {} ({})", slot, library);
        self.backend.load_vsn(library, slot)?;
        log::info!("load slot {} ({}) done", slot, library);
        Ok(())
    }

    /// Move a VSN to another (free) slot
    pub fn move_vsn(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        slot: u32,
        dest_slot: u32,
    ) -> Result<(), ManagementError> {
        ctx.check_config()?;

        if slot == dest_slot {
            return Ok(());
        }

        log::info!("move slot {} to slot {} ({})", slot, dest_slot, library);
        self.backend.move_vsn(library, slot, dest_slot)
    }
}
