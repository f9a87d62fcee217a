//! SAM-QFS media inventory and state management
//!
//! Libraries, drives, VSN catalogs and alarms of a SAM-QFS server are
//! accessed through a [`MediaManagement`](media::backend::MediaManagement)
//! backend. The [`MediaManager`](media::MediaManager) adds access
//! checks, capacity and flag reporting, searching and the driver
//! specific import protocols on top.

pub mod media;
