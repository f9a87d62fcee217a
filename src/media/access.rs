//! Explicit permission context for media operations

use samqfs_api_types::{
    privs_to_priv_names, PRIV_MEDIA_AUDIT, PRIV_MEDIA_CONFIG, PRIV_MEDIA_OPERATOR,
};

use super::ManagementError;

/// Who is calling, and with which privileges
///
/// Every mutating media operation takes this as argument.
#[derive(Clone, Debug)]
pub struct AccessContext {
    auth_id: String,
    privs: u64,
}

impl AccessContext {
    pub fn new<S: Into<String>>(auth_id: S, privs: u64) -> Self {
        Self {
            auth_id: auth_id.into(),
            privs,
        }
    }

    pub fn auth_id(&self) -> &str {
        &self.auth_id
    }

    pub fn privs(&self) -> u64 {
        self.privs
    }

    pub fn priv_names(&self) -> Vec<&'static str> {
        privs_to_priv_names(self.privs)
    }

    fn has_privs(&self, privs: u64) -> bool {
        (self.privs & privs) == privs
    }

    pub fn has_audit_permission(&self) -> bool {
        self.has_privs(PRIV_MEDIA_AUDIT)
    }

    pub fn has_config_permission(&self) -> bool {
        self.has_privs(PRIV_MEDIA_CONFIG)
    }

    /// Permission for physical media handling (import, unload, clean)
    ///
    /// FIXME: this checks Media.Config, not Media.Operator. Operators
    /// without Media.Config are rejected. Confirm the intended semantics
    /// before switching to PRIV_MEDIA_OPERATOR.
    pub fn has_media_op_permission(&self) -> bool {
        self.has_privs(PRIV_MEDIA_CONFIG)
    }

    /// Export requires both Media.Operator and Media.Config
    pub fn has_export_permission(&self) -> bool {
        self.has_privs(PRIV_MEDIA_OPERATOR) && self.has_config_permission()
    }

    pub fn check_config(&self) -> Result<(), ManagementError> {
        check(self, self.has_config_permission())
    }

    pub fn check_media_op(&self) -> Result<(), ManagementError> {
        check(self, self.has_media_op_permission())
    }

    pub fn check_export(&self) -> Result<(), ManagementError> {
        check(self, self.has_export_permission())
    }
}

fn check(ctx: &AccessContext, allowed: bool) -> Result<(), ManagementError> {
    if allowed {
        Ok(())
    } else {
        log::warn!(
            "permission check failed for '{}' (privileges: {:?})",
            ctx.auth_id,
            ctx.priv_names()
        );
        Err(ManagementError::no_permission())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use samqfs_api_types::{ROLE_ADMIN, ROLE_MEDIA_AUDIT, ROLE_MEDIA_OPERATOR, ROLE_NO_ACCESS};

    #[test]
    fn test_role_permissions() {
        let admin = AccessContext::new("root@pam", ROLE_ADMIN);
        assert!(admin.check_config().is_ok());
        assert!(admin.check_media_op().is_ok());
        assert!(admin.check_export().is_ok());

        let audit = AccessContext::new("audit@pam", ROLE_MEDIA_AUDIT);
        assert!(audit.has_audit_permission());
        assert!(audit.check_config().unwrap_err().is_no_permission());

        let nobody = AccessContext::new("nobody@pam", ROLE_NO_ACCESS);
        assert!(!nobody.has_audit_permission());
    }

    #[test]
    fn test_media_op_checks_config() {
        // operators without Media.Config are rejected for media operations
        let operator = AccessContext::new("op@pam", ROLE_MEDIA_OPERATOR);
        assert!(!operator.has_media_op_permission());
        assert!(!operator.has_export_permission());

        let config_only = AccessContext::new("cfg@pam", PRIV_MEDIA_CONFIG);
        assert!(config_only.has_media_op_permission());
        assert!(!config_only.has_export_permission());
    }
}
