//! JSON persistence for [`ChannelConfig`].

use std::path::Path;

use crate::core::types::ChannelConfig;
use crate::error::{ChannelError, Result};

impl ChannelConfig {
    /// Serializes the config as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChannelError::InvalidConfig(format!("failed to serialize channel config: {}", e))
        })
    }

    /// Parses and validates a config from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            ChannelError::InvalidConfig(format!("failed to parse channel config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Writes a channel config as JSON.
pub fn write_config_json(path: &Path, config: &ChannelConfig) -> Result<()> {
    std::fs::write(path, config.to_json_string()?)?;
    Ok(())
}

/// Reads and validates a channel config from JSON.
pub fn read_config_json(path: &Path) -> Result<ChannelConfig> {
    let data = std::fs::read_to_string(path)?;
    ChannelConfig::from_json_str(&data).map_err(|e| match e {
        ChannelError::InvalidConfig(msg) => {
            ChannelError::InvalidConfig(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}
