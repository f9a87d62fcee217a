//! Exports configuration data from the build system

#[macro_export]
macro_rules! SAMQFS_MEDIA_STATE_DIR_M {
    () => {
        "/var/lib/samqfs-media"
    };
}

/// default state directory of the virtual management backend
pub const VIRTUAL_BACKEND_DEFAULT_DIR: &str = concat!(SAMQFS_MEDIA_STATE_DIR_M!(), "/virtual");

/// Prepend configuration directory to a file name
///
/// This is a simply way to get the full path for configuration files.
/// #### Example:
/// ```
/// use samqfs_buildcfg::configdir;
/// let media_cfg = configdir!("/media.cfg");
/// ```
#[macro_export]
macro_rules! configdir {
    ($subdir:expr) => {
        concat!("/etc/samqfs-media", $subdir)
    };
}
