//! Configuration management for the record generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (structgen.toml)
//! - Environment variables (STRUCTGEN__*)
//!
//! Command-line flags override all of these.
//!
//! ## Example config file (structgen.toml):
//! ```toml
//! [input]
//! paths = ["schemas"]
//! extension = "json"
//!
//! [output]
//! path = "src/models.rs"
//! package = "models"
//!
//! [naming]
//! root_name = "Root"
//! ```

use config_crate::{Config, Environment, File};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the record generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructgenConfig {
    /// Where schemas are read from
    #[serde(default)]
    pub input: InputConfig,

    /// Where generated code goes
    #[serde(default)]
    pub output: OutputConfig,

    /// Naming settings
    #[serde(default)]
    pub naming: NamingConfig,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Schema files or directories of schema files
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// File extension picked up from directories
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output file; stdout when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Name of the generated module
    #[serde(default = "default_package")]
    pub package: String,
}

/// Naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Name given to untitled document roots
    #[serde(default = "default_root_name")]
    pub root_name: String,
}

// Default value functions
fn default_extension() -> String {
    "json".to_string()
}

fn default_package() -> String {
    "models".to_string()
}

fn default_root_name() -> String {
    "Root".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            extension: default_extension(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            package: default_package(),
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            root_name: default_root_name(),
        }
    }
}

impl StructgenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding an explicit file on top of the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["structgen.toml", ".structgen.toml", "config/structgen.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "structgen") {
            let xdg_config = config_dir.config_dir().join("structgen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Load from environment variables (STRUCTGEN__SECTION__KEY)
        builder = builder.add_source(
            Environment::with_prefix("STRUCTGEN")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
