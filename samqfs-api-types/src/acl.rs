use proxmox_lang::constnamedbitmap;

// define Privilege bitfield

constnamedbitmap! {
    /// Contains a list of privilege name to privilege value mappings.
    ///
    /// The names are used when displaying/persisting privileges anywhere, the values are used to
    /// allow easy matching of privileges as bitflags.
    PRIVILEGES: u64 => {
        /// Media.Audit allows reading library, drive and volume status
        PRIV_MEDIA_AUDIT("Media.Audit");
        /// Media.Config allows state changes, reservations, attribute
        /// changes and removing libraries
        PRIV_MEDIA_CONFIG("Media.Config");
        /// Media.Operator allows handling physical media (load, unload,
        /// import, export, label, clean)
        PRIV_MEDIA_OPERATOR("Media.Operator");
    }
}

pub fn privs_to_priv_names(privs: u64) -> Vec<&'static str> {
    PRIVILEGES
        .iter()
        .fold(Vec::new(), |mut priv_names, (name, value)| {
            if value & privs != 0 {
                priv_names.push(name);
            }
            priv_names
        })
}

/// Admin always has all privileges.
pub const ROLE_ADMIN: u64 = u64::MAX;

/// NoAccess can be used to remove privileges from specific users
pub const ROLE_NO_ACCESS: u64 = 0;

#[rustfmt::skip]
#[allow(clippy::identity_op)]
/// Media.Audit can view status information, but not modify it.
pub const ROLE_MEDIA_AUDIT: u64 = 0
    | PRIV_MEDIA_AUDIT;

#[rustfmt::skip]
#[allow(clippy::identity_op)]
/// Media.Operator can handle media, but not change configuration.
pub const ROLE_MEDIA_OPERATOR: u64 = 0
    | PRIV_MEDIA_AUDIT
    | PRIV_MEDIA_OPERATOR;

#[rustfmt::skip]
#[allow(clippy::identity_op)]
/// Media.Admin can do anything on libraries, drives and volumes.
pub const ROLE_MEDIA_ADMIN: u64 = 0
    | PRIV_MEDIA_AUDIT
    | PRIV_MEDIA_CONFIG
    | PRIV_MEDIA_OPERATOR;
