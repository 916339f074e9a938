//! Deserializer configuration

use crate::error::{BinlogError, Result};
use serde::{Deserialize, Serialize};

/// Binlog checksum algorithm, as negotiated with the server
/// (`binlog_checksum` / `@master_binlog_checksum`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumType {
    #[default]
    None,
    Crc32,
}

impl ChecksumType {
    /// Number of trailer bytes following every event body
    pub fn length(&self) -> usize {
        match self {
            ChecksumType::None => 0,
            ChecksumType::Crc32 => 4,
        }
    }

    /// Parse the server's variable value (`NONE`, `CRC32`).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(ChecksumType::None),
            "CRC32" => Ok(ChecksumType::Crc32),
            other => Err(BinlogError::config(format!(
                "unknown checksum algorithm: {}",
                other
            ))),
        }
    }
}

/// Event deserializer configuration
///
/// # Example
///
/// ```rust
/// use rivven_binlog::{BinlogConfig, ChecksumType};
///
/// let config = BinlogConfig::new()
///     .with_checksum_type(ChecksumType::Crc32)
///     .with_max_event_size(16 * 1024 * 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinlogConfig {
    /// Checksum trailer appended to every event
    pub checksum_type: ChecksumType,
    /// Largest accepted data length (body + checksum). Unlimited by default,
    /// since the server accepts events up to `max_allowed_packet`.
    pub max_event_size: Option<u32>,
}

impl Default for BinlogConfig {
    fn default() -> Self {
        Self {
            checksum_type: ChecksumType::None,
            max_event_size: None,
        }
    }
}

impl BinlogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checksum_type(mut self, checksum_type: ChecksumType) -> Self {
        self.checksum_type = checksum_type;
        self
    }

    pub fn with_max_event_size(mut self, max_event_size: u32) -> Self {
        self.max_event_size = Some(max_event_size);
        self
    }

    pub fn without_event_size_limit(mut self) -> Self {
        self.max_event_size = None;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_event_size == Some(0) {
            return Err(BinlogError::config("max_event_size must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_length() {
        assert_eq!(ChecksumType::None.length(), 0);
        assert_eq!(ChecksumType::Crc32.length(), 4);
    }

    #[test]
    fn test_checksum_from_name() {
        assert_eq!(ChecksumType::from_name("crc32").unwrap(), ChecksumType::Crc32);
        assert_eq!(ChecksumType::from_name(" NONE ").unwrap(), ChecksumType::None);
        assert!(ChecksumType::from_name("sha1").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = BinlogConfig::default();
        assert_eq!(config.checksum_type, ChecksumType::None);
        assert_eq!(config.max_event_size, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = BinlogConfig::new()
            .with_checksum_type(ChecksumType::Crc32)
            .with_max_event_size(1024);
        assert_eq!(config.max_event_size, Some(1024));

        let config = config.without_event_size_limit();
        assert_eq!(config.checksum_type, ChecksumType::Crc32);
        assert_eq!(config.max_event_size, None);
    }

    #[test]
    fn test_config_rejects_zero_max_size() {
        let config = BinlogConfig::new().with_max_event_size(0);
        assert!(matches!(config.validate(), Err(BinlogError::Config(_))));
    }

    #[test]
    fn test_config_deserialize() {
        let config: BinlogConfig =
            serde_json::from_str(r#"{"checksum_type": "crc32"}"#).unwrap();
        assert_eq!(config.checksum_type, ChecksumType::Crc32);
        assert_eq!(config.max_event_size, None);

        let config: BinlogConfig =
            serde_json::from_str(r#"{"max_event_size": 1048576}"#).unwrap();
        assert_eq!(config.max_event_size, Some(1024 * 1024));
    }
}
