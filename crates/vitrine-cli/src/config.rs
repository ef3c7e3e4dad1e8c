//! Configuration loading and validation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use vitrine_core::{install_builtin_templates, DeviceType, GenericDevice, Macros, SearchConfig, View};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    /// Devices that can be displayed by name
    #[serde(default, rename = "device")]
    pub devices: Vec<GenericDevice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// View shown when none is given on the command line
    #[serde(default)]
    pub view: View,
    /// Template forced for every device
    #[serde(default)]
    pub template: Option<PathBuf>,
}

impl Config {
    /// Look up a configured device by name
    pub fn device(&self, name: &str) -> Option<&GenericDevice> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Every device type declared by the configured devices
    pub fn device_types(&self) -> impl Iterator<Item = DeviceType> + '_ {
        self.devices.iter().map(|d| d.device_type.clone())
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), devices = config.devices.len(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save an example configuration to file
///
/// The built-in templates are installed into a `builtin` directory next to
/// the configuration, which the configuration then points at.
pub fn save_default_config(path: &Path) -> Result<()> {
    let builtin_dir = path.parent().unwrap_or(Path::new("")).join("builtin");
    install_builtin_templates(&builtin_dir)?;

    let metadata: Macros = [("beamline".to_string(), "TST".to_string())].into();
    let config = Config {
        search: SearchConfig {
            directories: vec![PathBuf::from("./templates")],
            builtin_dir,
            ..SearchConfig::default()
        },
        display: DisplayConfig::default(),
        devices: vec![GenericDevice::new(
            "m1",
            DeviceType::new("Motor").with_parents(["PositionerBase", "Device"]),
        )
        .with_prefix("TST:MTR:01")
        .with_metadata(metadata)],
    };

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content)?;
    Ok(())
}
