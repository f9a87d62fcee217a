/// Generic failure
pub const EGENERIC: i32 = -1;
/// Library does not exist
pub const ELIBRARY_NOT_FOUND: i32 = -2502;
/// No VSN in the requested catalog slot
pub const EVSN_NOT_FOUND: i32 = -2507;
/// Catalog or ACSLS connection information not available
pub const ECATALOG_UNAVAILABLE: i32 = -2517;

/// Message key used for permission failures
pub const NO_PERMISSION_MESSAGE: &str = "common.nopermission";

/// Error returned by the management backend and all media operations
///
/// This carries the backend error number and message. Callers are
/// expected to display both.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (error {code})")]
pub struct ManagementError {
    pub code: i32,
    pub message: String,
}

impl ManagementError {
    pub fn new<S: Into<String>>(code: i32, message: S) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::new(EGENERIC, message)
    }

    pub fn library_not_found(library: &str) -> Self {
        Self::new(
            ELIBRARY_NOT_FOUND,
            format!("library '{}' not found", library),
        )
    }

    pub fn vsn_not_found(library: &str, slot: u32) -> Self {
        Self::new(
            EVSN_NOT_FOUND,
            format!("no VSN in slot {} of library '{}'", slot, library),
        )
    }

    pub fn catalog_unavailable(library: &str) -> Self {
        Self::new(
            ECATALOG_UNAVAILABLE,
            format!("catalog information for library '{}' not available", library),
        )
    }

    pub fn no_permission() -> Self {
        Self::new(EGENERIC, NO_PERMISSION_MESSAGE)
    }

    pub fn is_no_permission(&self) -> bool {
        self.message == NO_PERMISSION_MESSAGE
    }
}

impl From<anyhow::Error> for ManagementError {
    fn from(err: anyhow::Error) -> Self {
        ManagementError::generic(err.to_string())
    }
}

impl From<std::io::Error> for ManagementError {
    fn from(err: std::io::Error) -> Self {
        let code = err.raw_os_error().map(|errno| -errno).unwrap_or(EGENERIC);
        ManagementError::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for ManagementError {
    fn from(err: serde_json::Error) -> Self {
        ManagementError::generic(format!("invalid state data - {}", err))
    }
}

/// Shortcut for `return Err(ManagementError::generic(format!(...)))`
#[macro_export]
macro_rules! mgmt_bail {
    ($($arg:tt)*) => {
        return Err($crate::media::ManagementError::generic(format!($($arg)*)))
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManagementError::vsn_not_found("LIB1", 5);
        assert_eq!(err.code, EVSN_NOT_FOUND);
        assert_eq!(err.to_string(), "no VSN in slot 5 of library 'LIB1' (error -2507)");

        let err = ManagementError::no_permission();
        assert!(err.is_no_permission());
        assert_eq!(err.code, EGENERIC);

        let err: ManagementError = anyhow::format_err!("broken").into();
        assert_eq!(err.code, EGENERIC);
        assert_eq!(err.message, "broken");
    }
}
