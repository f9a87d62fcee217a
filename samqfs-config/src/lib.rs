pub mod media;

use anyhow::Error;

use proxmox_sys::fs::CreateOptions;

/// Holds the config lock until dropped
pub struct MediaLockGuard {
    _file: std::fs::File,
}

/// Open or create a lock file and lock it.
///
/// File mode is 0600, default timeout is 10 seconds.
pub fn open_media_lockfile<P: AsRef<std::path::Path>>(
    path: P,
    timeout: Option<std::time::Duration>,
    exclusive: bool,
) -> Result<MediaLockGuard, Error> {
    let options =
        CreateOptions::new().perm(nix::sys::stat::Mode::from_bits_truncate(0o600));

    let timeout = timeout.unwrap_or(std::time::Duration::new(10, 0));

    let file = proxmox_sys::fs::open_file_locked(&path, timeout, exclusive, options)?;
    Ok(MediaLockGuard { _file: file })
}

/// Atomically write data to file owned by "root:root" with permission "0640"
pub fn replace_media_config<P: AsRef<std::path::Path>>(path: P, data: &[u8]) -> Result<(), Error> {
    let mode = nix::sys::stat::Mode::from_bits_truncate(0o0640);
    let options = CreateOptions::new()
        .perm(mode)
        .owner(nix::unistd::ROOT)
        .group(nix::unistd::Gid::from_raw(0));

    proxmox_sys::fs::replace_file(path, data, options, true)?;

    Ok(())
}
