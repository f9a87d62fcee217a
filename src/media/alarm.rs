use samqfs_api_types::{Alarm, AlarmFilter};

use super::{AccessContext, ManagementError, MediaManager};

impl MediaManager {
    /// List alarms, newest first
    pub fn alarms(&self, filter: &AlarmFilter) -> Result<Vec<Alarm>, ManagementError> {
        let mut list: Vec<Alarm> = self
            .backend
            .alarms()?
            .into_iter()
            .filter(|alarm| filter.matches(alarm))
            .collect();
        list.sort_by(|a, b| b.time.cmp(&a.time).then(b.id.cmp(&a.id)));
        Ok(list)
    }

    /// Alarms associated with a library
    pub fn associated_alarms(&self, library: &str) -> Result<Vec<Alarm>, ManagementError> {
        let filter = AlarmFilter {
            library: Some(library.to_string()),
            ..Default::default()
        };
        self.alarms(&filter)
    }

    /// Acknowledge a batch of alarms (one backend call)
    pub fn acknowledge_alarms(
        &mut self,
        ctx: &AccessContext,
        ids: &[u64],
    ) -> Result<(), ManagementError> {
        ctx.check_config()?;
        if ids.is_empty() {
            return Ok(());
        }

        log::info!("acknowledge alarms {:?}", ids);
        self.backend.acknowledge_alarms(ids)
    }

    /// Delete a batch of alarms (one backend call)
    pub fn delete_alarms(&mut self, ctx: &AccessContext, ids: &[u64]) -> Result<(), ManagementError> {
        ctx.check_config()?;
        if ids.is_empty() {
            return Ok(());
        }

        log::info!("delete alarms {:?}", ids);
        self.backend.delete_alarms(ids)
    }
}
