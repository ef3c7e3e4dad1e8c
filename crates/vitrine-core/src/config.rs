//! Template search configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::ancestors::DEFAULT_ROOT_TYPE;
use crate::search::default_extensions;

/// Environment variable holding extra template directories
pub const TEMPLATE_PATH_ENV: &str = "VITRINE_TEMPLATE_PATH";

/// Environment variable overriding the built-in template directory
pub const BUILTIN_DIR_ENV: &str = "VITRINE_BUILTIN_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read search config: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse search config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Where and how to look for templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search directories, highest priority first
    #[serde(default)]
    pub directories: Vec<PathBuf>,
    /// Template file extensions, highest precedence first
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Directory holding the built-in per-view defaults
    #[serde(default = "default_builtin_dir")]
    pub builtin_dir: PathBuf,
    /// Common root type excluded from ancestor chains
    #[serde(default = "default_root_type")]
    pub root_type: String,
}

/// Directory holding the built-in templates
///
/// Checked in order: `VITRINE_BUILTIN_DIR`, `templates/` next to the running
/// executable, `../share/vitrine/templates` relative to it, and finally the
/// templates in this crate's source tree.
pub fn default_builtin_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(BUILTIN_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }
    let installed = std::env::current_exe().ok().and_then(|exe| {
        let bin = exe.parent()?.to_path_buf();
        [bin.join("templates"), bin.join("../share/vitrine/templates")]
            .into_iter()
            .find(|dir| dir.is_dir())
    });
    installed.unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates"))
}

fn default_root_type() -> String {
    DEFAULT_ROOT_TYPE.to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            extensions: default_extensions(),
            builtin_dir: default_builtin_dir(),
            root_type: default_root_type(),
        }
    }
}

impl SearchConfig {
    /// Load search config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load search config from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Append the directories listed in `VITRINE_TEMPLATE_PATH`
    pub fn with_env_path(self) -> Self {
        match std::env::var_os(TEMPLATE_PATH_ENV) {
            Some(value) => self.with_path_list(&value),
            None => self,
        }
    }

    /// Append directories from a platform path list (`:`-separated on Unix)
    pub fn with_path_list(mut self, paths: &std::ffi::OsStr) -> Self {
        for dir in std::env::split_paths(paths) {
            if dir.as_os_str().is_empty() || self.directories.contains(&dir) {
                continue;
            }
            debug!(directory = %dir.display(), "Adding template directory from environment");
            self.directories.push(dir);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::from_toml("").unwrap();
        assert!(config.directories.is_empty());
        assert_eq!(config.extensions, vec!["ui", "toml"]);
        assert_eq!(config.root_type, "Device");
        assert!(config.builtin_dir.ends_with("templates"));
    }

    #[test]
    fn test_parse() {
        let config = SearchConfig::from_toml(
            r#"
directories = ["/app/templates", "/site/templates"]
extensions = ["toml"]
builtin_dir = "/opt/vitrine/builtin"
root_type = "Component"
"#,
        )
        .unwrap();

        assert_eq!(config.directories[1], PathBuf::from("/site/templates"));
        assert_eq!(config.extensions, vec!["toml"]);
        assert_eq!(config.builtin_dir, PathBuf::from("/opt/vitrine/builtin"));
        assert_eq!(config.root_type, "Component");
    }

    #[test]
    fn test_path_list_appends_without_duplicates() {
        let config = SearchConfig {
            directories: vec![PathBuf::from("/app/templates")],
            ..SearchConfig::default()
        };
        let list = std::env::join_paths(["/app/templates", "/extra/one", "/extra/two"]).unwrap();
        let config = config.with_path_list(&list);
        assert_eq!(
            config.directories,
            vec![
                PathBuf::from("/app/templates"),
                PathBuf::from("/extra/one"),
                PathBuf::from("/extra/two"),
            ]
        );
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(matches!(
            SearchConfig::from_toml("directories = 3"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
