//! Bootstrap configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the packaged configuration asset read by mobile hosts.
pub const CONFIG_ASSET: &str = "xrboot.json";

/// Tunables for the XR/Vulkan bootstrap.
///
/// Every field has a default, so a partial JSON document only overrides what
/// it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    pub application_name: String,
    pub application_version: u32,
    pub engine_name: String,
    pub engine_version: u32,
    /// Look for a Vulkan validation layer while creating the instance.
    pub enable_validation: bool,
    /// Validation layer candidates in priority order.
    pub validation_layers: Vec<String>,
    /// Request the debug-utils extensions and register both messengers.
    pub debug_messengers: bool,
    /// Also report info and verbose messages through the messengers.
    pub verbose_debug: bool,
    /// Begin and end every waited frame with no layers.
    pub submit_empty_frames: bool,
    pub log_level: String,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            application_name: "xrboot".to_string(),
            application_version: 1,
            engine_name: "xrboot".to_string(),
            engine_version: 1,
            enable_validation: cfg!(debug_assertions),
            validation_layers: vec![
                "VK_LAYER_KHRONOS_validation".to_string(),
                "VK_LAYER_LUNARG_standard_validation".to_string(),
            ],
            debug_messengers: true,
            verbose_debug: cfg!(debug_assertions),
            submit_empty_frames: true,
            log_level: "info".to_string(),
        }
    }
}

impl BootConfig {
    /// Parse a configuration from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(Error::config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = BootConfig::from_json(br#"{"application_name": "demo"}"#).unwrap();
        assert_eq!(config.application_name, "demo");
        assert_eq!(config.engine_name, "xrboot");
        assert_eq!(config.validation_layers.len(), 2);
        assert!(config.debug_messengers);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config = BootConfig::from_json(b"{}").unwrap();
        assert_eq!(config, BootConfig::default());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = BootConfig::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validation_layer_override() {
        let config =
            BootConfig::from_json(br#"{"validation_layers": ["VK_LAYER_custom"]}"#).unwrap();
        assert_eq!(config.validation_layers, vec!["VK_LAYER_custom".to_string()]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = BootConfig::load("/nonexistent/xrboot.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
