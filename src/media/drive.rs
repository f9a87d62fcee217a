use samqfs_api_types::{DeviceState, DriveInfo, DriverType};

use super::{AccessContext, Confirmation, ManagementError, MediaManager};

impl MediaManager {
    pub fn drive(&self, library: &str, eq: u32) -> Result<DriveInfo, ManagementError> {
        self.library_drives(library)?
            .into_iter()
            .find(|drive| drive.eq == eq)
            .ok_or_else(|| {
                ManagementError::generic(format!("no drive {} in library '{}'", eq, library))
            })
    }

    /// Request a drive state change, followed by one confirmation wait
    pub fn set_drive_state(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        eq: u32,
        state: DeviceState,
    ) -> Result<Confirmation<DeviceState>, ManagementError> {
        ctx.check_config()?;

        let before = self.drive(library, eq)?.state;

        log::info!("set state of drive {} ({}) to {}", eq, library, state);
        self.backend.set_drive_state(library, eq, state)?;

        self.confirm.wait(&before, || Ok(self.drive(library, eq)?.state))
    }

    pub fn idle_drive(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        eq: u32,
    ) -> Result<(), ManagementError> {
        ctx.check_media_op()?;

        log::info!("idle drive {} ({})", eq, library);
        self.backend.idle_drive(library, eq)
    }

    pub fn unload_drive(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        eq: u32,
    ) -> Result<(), ManagementError> {
        ctx.check_media_op()?;

        log::info!("unload drive {} ({})", eq, library);
        self.backend.unload_drive(library, eq)?;
        log::info!("unload drive {} ({}) done", eq, library);
        Ok(())
    }

    pub fn clean_drive(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        eq: u32,
    ) -> Result<(), ManagementError> {
        ctx.check_media_op()?;

        log::info!("clean drive {} ({})", eq, library);
        self.backend.clean_drive(library, eq)
    }

    /// Mark a drive as shared between hosts (ACSLS libraries only)
    pub fn set_drive_shared(
        &mut self,
        ctx: &AccessContext,
        library: &str,
        eq: u32,
        shared: bool,
    ) -> Result<(), ManagementError> {
        ctx.check_config()?;

        let info = self.library(library)?;
        if info.driver_type != DriverType::Acsls {
            return Err(ManagementError::generic(format!(
                "library '{}' is not an ACSLS library, drives cannot be shared",
                library
            )));
        }

        log::info!("set drive {} ({}) shared={}", eq, library, shared);
        self.backend.set_drive_shared(library, eq, shared)
    }
}
