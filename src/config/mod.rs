//! Configuration system
//!
//! Engine tunables loaded from TOML. Missing sections fall back to their
//! defaults, so a partial file is always valid.

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Message bus tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Maximum queued normal-priority messages delivered per update tick
    pub queue_drain_cap: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self { queue_drain_cap: 10 }
    }
}

/// Collision system tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Extents used for shapes registered without explicit dimensions
    pub default_extents: [f32; 3],
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            default_extents: [1.0, 1.0, 1.0],
        }
    }
}

/// Render pass tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Clear color applied at the start of every frame (RGBA)
    pub clear_color: [f32; 4],

    /// Viewport dimensions in pixels
    pub viewport: [u32; 2],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            viewport: [800, 600],
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Message bus settings
    pub messaging: MessagingConfig,

    /// Collision system settings
    pub collision: CollisionConfig,

    /// Render pass settings
    pub render: RenderConfig,
}

impl EngineConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a configuration from a file path
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        if !path.ends_with(".toml") {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
