//! Packer configuration

use crate::{Error, Result};

/// Default asset storage: 256 sectors of 64 KiB
pub const DEFAULT_CAPACITY_BYTES: u64 = 256 * 65536;

/// Largest capacity whose remaining-bytes figure still fits the signed define
pub const MAX_CAPACITY_BYTES: u64 = i64::MAX as u64;

/// Default serial rate used for the transfer time estimate
pub const DEFAULT_TRANSFER_RATE_BAUD: u32 = 57600;

pub const DEFAULT_EXTENSION: &str = "bmp";
pub const DEFAULT_DATA_FILE_NAME: &str = "pictureFiles.txt";
pub const DEFAULT_HEADER_FILE_NAME: &str = "pictureFilesHeader.h";

/// Fixed byte capacity of the target's asset storage region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryBudget {
    pub capacity_bytes: u64,
}

impl MemoryBudget {
    pub fn new(capacity_bytes: u64) -> Self {
        Self { capacity_bytes }
    }
}

impl Default for MemoryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_BYTES)
    }
}

/// What to do when a bitmap cannot be decoded or is malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailurePolicy {
    /// Stop the whole run on the first bad file
    #[default]
    Abort,
    /// Log the file, leave it out of both outputs and carry on
    Skip,
}

/// Order in which files found by a directory scan are packed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FileOrder {
    /// Sorted by file name
    #[default]
    Listing,
    /// Sorted by file name, last first
    ReverseListing,
}

/// Packer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct PackerConfig {
    /// Recognized bitmap extension, without the dot
    pub extension: String,
    /// Storage budget the summary is computed against
    pub budget: MemoryBudget,
    /// Nominal transfer rate in bits per second
    pub transfer_rate_baud: u32,
    /// File name of the packed data blob
    pub data_file_name: String,
    /// File name of the generated header
    pub header_file_name: String,
    pub failure_policy: FailurePolicy,
    pub file_order: FileOrder,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            budget: MemoryBudget::default(),
            transfer_rate_baud: DEFAULT_TRANSFER_RATE_BAUD,
            data_file_name: DEFAULT_DATA_FILE_NAME.to_string(),
            header_file_name: DEFAULT_HEADER_FILE_NAME.to_string(),
            failure_policy: FailurePolicy::default(),
            file_order: FileOrder::default(),
        }
    }
}

impl PackerConfig {
    /// Checks that the summary can be computed and the outputs don't collide
    pub fn validate(&self) -> Result<()> {
        if self.budget.capacity_bytes == 0 {
            return Err(Error::InvalidConfig("capacity must be non-zero".into()));
        }
        if self.budget.capacity_bytes > MAX_CAPACITY_BYTES {
            return Err(Error::InvalidConfig(format!(
                "capacity {} exceeds {} bytes",
                self.budget.capacity_bytes, MAX_CAPACITY_BYTES
            )));
        }
        if self.transfer_rate_baud == 0 {
            return Err(Error::InvalidConfig("transfer rate must be non-zero".into()));
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(Error::InvalidConfig("bitmap extension is empty".into()));
        }
        if self.data_file_name.is_empty() || self.header_file_name.is_empty() {
            return Err(Error::InvalidConfig("output file names must be set".into()));
        }
        if self.data_file_name == self.header_file_name {
            return Err(Error::InvalidConfig(format!(
                "data and header outputs share the name {}",
                self.data_file_name
            )));
        }
        Ok(())
    }

    /// Returns true if `path` carries the recognized extension (case-insensitive)
    pub fn accepts(&self, path: &std::path::Path) -> bool {
        let wanted = self.extension.trim_start_matches('.');
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
    }

    /// Loads a configuration from a JSON file. Missing keys keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_file(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults() {
        let config = PackerConfig::default();
        assert_eq!(config.budget.capacity_bytes, 16_777_216);
        assert_eq!(config.transfer_rate_baud, 57600);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.file_order, FileOrder::Listing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_accepts_extension_case_insensitive() {
        let config = PackerConfig::default();
        assert!(config.accepts(Path::new("a/icon.bmp")));
        assert!(config.accepts(Path::new("ICON.BMP")));
        assert!(!config.accepts(Path::new("icon.png")));
        assert!(!config.accepts(Path::new("bmp")));
        assert!(!config.accepts(Path::new("icon.bmp.bak")));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PackerConfig::default();
        config.budget = MemoryBudget::new(0);
        assert!(config.validate().is_err());

        let mut config = PackerConfig::default();
        config.budget = MemoryBudget::new(MAX_CAPACITY_BYTES + 1);
        assert!(config.validate().is_err());
        config.budget = MemoryBudget::new(MAX_CAPACITY_BYTES);
        assert!(config.validate().is_ok());

        let mut config = PackerConfig::default();
        config.transfer_rate_baud = 0;
        assert!(config.validate().is_err());

        let mut config = PackerConfig::default();
        config.header_file_name = config.data_file_name.clone();
        assert!(config.validate().is_err());

        let mut config = PackerConfig::default();
        config.extension = ".".into();
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json() {
        let config: PackerConfig =
            serde_json::from_str(r#"{"transfer_rate_baud": 115200, "failure_policy": "skip"}"#)
                .unwrap();
        assert_eq!(config.transfer_rate_baud, 115200);
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
        assert_eq!(config.extension, "bmp");
    }
}
