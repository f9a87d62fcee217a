//! Capacity and usage helpers

use proxmox_human_byte::HumanByte;

/// Percentage of used space, or -1 if the total is zero.
///
/// Available space larger than the total is clamped to the total.
pub fn usage(available: u64, total: u64) -> i64 {
    if total == 0 {
        return -1;
    }
    let used = total - available.min(total);
    ((used as u128 * 100) / total as u128) as i64
}

/// Format a size given in MiB (as reported for volumes and libraries)
pub fn format_mib(size: u64) -> String {
    HumanByte::from(size.saturating_mul(1024 * 1024)).to_string()
}
