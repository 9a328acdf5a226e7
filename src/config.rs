//! Mapper Configuration
//!
//! Settings that shape how records become graphs and layouts. Every field is
//! optional in YAML:
//!
//! ```yaml
//! connection_policy: drop
//! default_lane: Staff
//! layout:
//!   lane_height: 150
//!   x_spacing: 200
//! ```

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::ProcessError;
use crate::layout::LayoutConfig;
use crate::process::{ConnectionPolicy, DEFAULT_LANE};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MapperConfig {
    /// Handling of malformed connection tokens
    pub connection_policy: ConnectionPolicy,

    /// Lane used when a step names none
    pub default_lane: String,

    pub layout: LayoutConfig,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            connection_policy: ConnectionPolicy::default(),
            default_lane: DEFAULT_LANE.to_string(),
            layout: LayoutConfig::default(),
        }
    }
}

impl MapperConfig {
    /// Loads and validates a configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProcessError> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;

        debug!("Configuration: {:?}", config);
        Ok(config)
    }

    /// Parses and validates a YAML configuration string.
    pub fn from_yaml(content: &str) -> Result<Self, ProcessError> {
        // An empty file parses as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ProcessError> {
        if self.default_lane.trim().is_empty() {
            return Err(ProcessError::Config(
                "default_lane must not be empty".to_string(),
            ));
        }
        self.layout.validate()
    }

    pub fn with_connection_policy(mut self, policy: ConnectionPolicy) -> Self {
        self.connection_policy = policy;
        self
    }
}
