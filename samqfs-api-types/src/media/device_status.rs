use serde::{Deserialize, Serialize};

use proxmox_schema::api;

#[api()]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Library driver family
///
/// The driver family decides which import protocol a library speaks.
pub enum DriverType {
    /// Direct attached SCSI library
    Samst,
    /// StorageTek ACSLS
    Acsls,
    /// ADIC/Grau network attached library
    AdicGrau,
    /// Fujitsu LMF network attached library
    FujitsuLmf,
    /// IBM 3494 network attached library
    Ibm3494,
    /// Sony network attached library
    Sony,
}

impl DriverType {
    /// Derive the driver family from a two letter equipment type.
    pub fn from_equipment_type(equ_type: &str) -> Self {
        match equ_type.to_ascii_lowercase().as_str() {
            "sk" => DriverType::Acsls,
            "gr" => DriverType::AdicGrau,
            "fj" => DriverType::FujitsuLmf,
            "im" => DriverType::Ibm3494,
            "pe" => DriverType::Sony,
            _ => DriverType::Samst,
        }
    }

    /// Network attached libraries import by VSN or VSN range.
    pub fn is_network_attached(&self) -> bool {
        matches!(
            self,
            DriverType::AdicGrau | DriverType::FujitsuLmf | DriverType::Ibm3494 | DriverType::Sony
        )
    }
}

#[api()]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Detailed device status codes
pub enum RemovableMediaStatus {
    /// Media scan in progress
    MediaScan,
    /// Library is operational
    Operational,
    /// Maintenance mode
    Maintenance,
    /// Unrecoverable error in scanner
    Error,
    /// Audit in progress
    Audit,
    /// Label present on media
    LabelPresent,
    /// Foreign media
    Foreign,
    /// Labeling operation in progress
    Labeling,
    /// Waiting for device to idle
    WaitIdle,
    /// Needs operator attention
    OperatorAttention,
    /// Needs cleaning
    NeedsCleaning,
    /// Unload has been requested
    UnloadRequested,
    /// Device is reserved
    Reserved,
    /// Device is ready and media is read-only
    ReadOnlyReady,
    /// Device is spun up and ready
    Ready,
    /// Device is writing
    Writing,
    /// Device is open
    Open,
    /// Device is positioning
    Positioning,
    /// All storage slots occupied
    SlotsFull,
    /// Device is present
    Present,
    /// Media is write protected
    WriteProtected,
}

/// Position in the status string that carries the reservation marker.
const RESERVED_POSITION: usize = 5;

/// Parse a detailed status string as reported by the backend.
///
/// Every character maps to one status code, unknown characters and
/// placeholders ('-') are skipped. The letter 'R' means "read-only ready",
/// except at position 5, where it marks the device as reserved.
pub fn parse_removable_media_status(status: &str) -> Vec<RemovableMediaStatus> {
    let mut list = Vec::new();

    for (pos, c) in status.chars().enumerate() {
        let code = match c {
            's' => RemovableMediaStatus::MediaScan,
            'm' => RemovableMediaStatus::Operational,
            'M' => RemovableMediaStatus::Maintenance,
            'E' => RemovableMediaStatus::Error,
            'a' => RemovableMediaStatus::Audit,
            'l' => RemovableMediaStatus::LabelPresent,
            'N' => RemovableMediaStatus::Foreign,
            'L' => RemovableMediaStatus::Labeling,
            'I' => RemovableMediaStatus::WaitIdle,
            'A' => RemovableMediaStatus::OperatorAttention,
            'C' => RemovableMediaStatus::NeedsCleaning,
            'U' => RemovableMediaStatus::UnloadRequested,
            'R' if pos == RESERVED_POSITION => RemovableMediaStatus::Reserved,
            'R' => RemovableMediaStatus::ReadOnlyReady,
            'r' => RemovableMediaStatus::Ready,
            'w' => RemovableMediaStatus::Writing,
            'o' => RemovableMediaStatus::Open,
            'P' => RemovableMediaStatus::Positioning,
            'F' => RemovableMediaStatus::SlotsFull,
            'p' => RemovableMediaStatus::Present,
            'W' => RemovableMediaStatus::WriteProtected,
            _ => continue,
        };
        list.push(code);
    }

    list
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_driver_type() {
        assert_eq!(DriverType::from_equipment_type("sk"), DriverType::Acsls);
        assert_eq!(DriverType::from_equipment_type("SK"), DriverType::Acsls);
        assert_eq!(DriverType::from_equipment_type("gr"), DriverType::AdicGrau);
        assert_eq!(DriverType::from_equipment_type("rb"), DriverType::Samst);

        assert!(DriverType::Sony.is_network_attached());
        assert!(DriverType::Ibm3494.is_network_attached());
        assert!(!DriverType::Acsls.is_network_attached());
        assert!(!DriverType::Samst.is_network_attached());
    }

    #[test]
    fn test_parse_status() {
        use RemovableMediaStatus::*;

        assert_eq!(parse_removable_media_status("m----r"), vec![Operational, Ready]);
        assert_eq!(parse_removable_media_status("-----R"), vec![Reserved]);
        assert_eq!(parse_removable_media_status("R-----"), vec![ReadOnlyReady]);
        assert_eq!(parse_removable_media_status("sl-x-W"), vec![MediaScan, LabelPresent, WriteProtected]);
        assert!(parse_removable_media_status("").is_empty());
    }
}
