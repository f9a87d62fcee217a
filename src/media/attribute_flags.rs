//! Volume attribute flags and their summary string

use samqfs_api_types::{DiskVolumeInfo, VsnAttributes, VsnInfo};

bitflags::bitflags! {
    /// VSN attribute flags (including the reservation state)
    pub struct VsnFlags: u64 {
        const RESERVED = 1 << 0;
        const DAMAGED = 1 << 1;
        const NEEDS_AUDIT = 1 << 2;
        const UNAVAILABLE = 1 << 3;
        const DUPLICATE = 1 << 4;
        const FULL = 1 << 5;
        const RECYCLE = 1 << 6;
        const READ_ONLY = 1 << 7;
        const WRITE_PROTECTED = 1 << 8;
        const FOREIGN = 1 << 9;
    }
}

bitflags::bitflags! {
    /// Disk volume flags
    pub struct DiskVolumeFlags: u64 {
        const BAD_MEDIA = 1 << 0;
        const UNAVAILABLE = 1 << 1;
        const READ_ONLY = 1 << 2;
        const LABELED = 1 << 3;
        const UNKNOWN = 1 << 4;
        const REMOTE = 1 << 5;
    }
}

/// A set of flags with a fixed display priority
pub trait AttributeFlags: Copy {
    /// All flags with their default label, highest priority first
    fn priority_order() -> &'static [(Self, &'static str)];

    fn is_set(&self, flag: Self) -> bool;
}

const VSN_FLAG_ORDER: [(VsnFlags, &str); 10] = [
    (VsnFlags::RESERVED, "Reserved"),
    (VsnFlags::DAMAGED, "Damaged"),
    (VsnFlags::NEEDS_AUDIT, "Needs Audit"),
    (VsnFlags::UNAVAILABLE, "Unavailable"),
    (VsnFlags::DUPLICATE, "Duplicate"),
    (VsnFlags::FULL, "Full"),
    (VsnFlags::RECYCLE, "Recycle"),
    (VsnFlags::READ_ONLY, "Read Only"),
    (VsnFlags::WRITE_PROTECTED, "Write Protected"),
    (VsnFlags::FOREIGN, "Foreign"),
];

const DISK_VOLUME_FLAG_ORDER: [(DiskVolumeFlags, &str); 6] = [
    (DiskVolumeFlags::BAD_MEDIA, "Bad Media"),
    (DiskVolumeFlags::UNAVAILABLE, "Unavailable"),
    (DiskVolumeFlags::READ_ONLY, "Read Only"),
    (DiskVolumeFlags::LABELED, "Labeled"),
    (DiskVolumeFlags::UNKNOWN, "Unknown"),
    (DiskVolumeFlags::REMOTE, "Remote"),
];

impl AttributeFlags for VsnFlags {
    fn priority_order() -> &'static [(Self, &'static str)] {
        &VSN_FLAG_ORDER
    }

    fn is_set(&self, flag: Self) -> bool {
        self.contains(flag)
    }
}

impl AttributeFlags for DiskVolumeFlags {
    fn priority_order() -> &'static [(Self, &'static str)] {
        &DISK_VOLUME_FLAG_ORDER
    }

    fn is_set(&self, flag: Self) -> bool {
        self.contains(flag)
    }
}

impl VsnFlags {
    pub fn from_attributes(attributes: &VsnAttributes, reserved: bool) -> Self {
        let mut flags = VsnFlags::empty();
        flags.set(VsnFlags::RESERVED, reserved);
        flags.set(VsnFlags::DAMAGED, attributes.damaged);
        flags.set(VsnFlags::NEEDS_AUDIT, attributes.needs_audit);
        flags.set(VsnFlags::UNAVAILABLE, attributes.unavailable);
        flags.set(VsnFlags::DUPLICATE, attributes.duplicate);
        flags.set(VsnFlags::FULL, attributes.full);
        flags.set(VsnFlags::RECYCLE, attributes.recycle);
        flags.set(VsnFlags::READ_ONLY, attributes.read_only);
        flags.set(VsnFlags::WRITE_PROTECTED, attributes.write_protected);
        flags.set(VsnFlags::FOREIGN, attributes.foreign);
        flags
    }

    /// The user settable part (everything but the reservation)
    pub fn to_attributes(&self) -> VsnAttributes {
        VsnAttributes {
            damaged: self.contains(VsnFlags::DAMAGED),
            duplicate: self.contains(VsnFlags::DUPLICATE),
            read_only: self.contains(VsnFlags::READ_ONLY),
            write_protected: self.contains(VsnFlags::WRITE_PROTECTED),
            foreign: self.contains(VsnFlags::FOREIGN),
            recycle: self.contains(VsnFlags::RECYCLE),
            full: self.contains(VsnFlags::FULL),
            unavailable: self.contains(VsnFlags::UNAVAILABLE),
            needs_audit: self.contains(VsnFlags::NEEDS_AUDIT),
        }
    }
}

impl From<&VsnInfo> for VsnFlags {
    fn from(vsn: &VsnInfo) -> Self {
        VsnFlags::from_attributes(&vsn.attributes, vsn.is_reserved())
    }
}

impl From<&DiskVolumeInfo> for DiskVolumeFlags {
    fn from(volume: &DiskVolumeInfo) -> Self {
        let mut flags = DiskVolumeFlags::empty();
        flags.set(DiskVolumeFlags::BAD_MEDIA, volume.bad_media);
        flags.set(DiskVolumeFlags::UNAVAILABLE, volume.unavailable);
        flags.set(DiskVolumeFlags::READ_ONLY, volume.read_only);
        flags.set(DiskVolumeFlags::LABELED, volume.labeled);
        flags.set(DiskVolumeFlags::UNKNOWN, volume.unknown);
        flags.set(DiskVolumeFlags::REMOTE, volume.remote);
        flags
    }
}

/// Summarize set flags using the default labels.
///
/// See [`flag_string_with`].
pub fn flag_string<F: AttributeFlags>(flags: F, max_shown: usize) -> String {
    flag_string_with(flags, max_shown, |_flag, label| label.to_string())
}

/// Summarize set flags in priority order.
///
/// At most `max_shown` labels are joined with ", ". If more flags are
/// set, the total number of set flags is appended as "(N)", directly
/// after the last label. No flags set gives an empty string.
pub fn flag_string_with<F, L>(flags: F, max_shown: usize, label: L) -> String
where
    F: AttributeFlags,
    L: Fn(F, &'static str) -> String,
{
    let set: Vec<(F, &'static str)> = F::priority_order()
        .iter()
        .filter(|(flag, _)| flags.is_set(*flag))
        .copied()
        .collect();

    let mut text = set
        .iter()
        .take(max_shown)
        .map(|(flag, default)| label(*flag, default))
        .collect::<Vec<String>>()
        .join(", ");

    if set.len() > max_shown {
        text.push_str(&format!("({})", set.len()));
    }

    text
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_no_flags() {
        assert_eq!(flag_string(VsnFlags::empty(), 2), "");
        assert_eq!(flag_string(DiskVolumeFlags::empty(), 0), "");
    }

    #[test]
    fn test_flags_within_limit() {
        let flags = VsnFlags::FOREIGN | VsnFlags::FULL;
        assert_eq!(flag_string(flags, 2), "Full, Foreign");
        assert_eq!(flag_string(VsnFlags::RECYCLE, 2), "Recycle");
    }

    #[test]
    fn test_flags_truncated_with_count() {
        let flags = VsnFlags::DAMAGED | VsnFlags::NEEDS_AUDIT | VsnFlags::RESERVED;
        assert_eq!(flag_string(flags, 2), "Reserved, Damaged(3)");
        assert_eq!(flag_string(flags, 1), "Reserved(3)");
        assert_eq!(flag_string(flags, 0), "(3)");
        assert_eq!(flag_string(flags, 3), "Reserved, Damaged, Needs Audit");

        assert_eq!(flag_string(VsnFlags::all(), 2), "Reserved, Damaged(10)");
    }

    #[test]
    fn test_disk_volume_order() {
        let flags = DiskVolumeFlags::REMOTE | DiskVolumeFlags::BAD_MEDIA | DiskVolumeFlags::LABELED;
        assert_eq!(flag_string(flags, 2), "Bad Media, Labeled(3)");
    }

    #[test]
    fn test_custom_labels() {
        let flags = VsnFlags::DAMAGED | VsnFlags::READ_ONLY;
        let text = flag_string_with(flags, 2, |flag, _| {
            if flag == VsnFlags::DAMAGED {
                "beschädigt".to_string()
            } else {
                "schreibgeschützt".to_string()
            }
        });
        assert_eq!(text, "beschädigt, schreibgeschützt");
    }

    #[test]
    fn test_attribute_conversion() {
        let attributes = VsnAttributes {
            damaged: true,
            needs_audit: true,
            ..Default::default()
        };
        let flags = VsnFlags::from_attributes(&attributes, true);
        assert_eq!(flags, VsnFlags::RESERVED | VsnFlags::DAMAGED | VsnFlags::NEEDS_AUDIT);
        assert_eq!(flags.to_attributes(), attributes);
    }
}
