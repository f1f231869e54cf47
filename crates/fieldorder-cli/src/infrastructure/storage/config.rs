//! TOML settings for the field-order tool itself.
//!
//! Stored in the platform-appropriate config file:
//! - Windows:  `%APPDATA%\fieldorder\config.toml`
//! - Linux:    `~/.config/fieldorder/config.toml`
//! - macOS:    `~/Library/Application Support/fieldorder/config.toml`
//!
//! ```toml
//! [general]
//! log_level = "info"
//!
//! [host]
//! kicad_version = "9.0"
//! eeschema_path = "/home/me/.config/kicad/9.0/eeschema.json"
//! show_toolbar_button = true
//! ```
//!
//! # Serde default values
//!
//! Every field carries `#[serde(default = "...")]`, so the tool works on first
//! run (no file) and with a partial file that only sets one value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::locate::DEFAULT_KICAD_VERSION;

/// Error type for tool settings operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ToolConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub host: HostConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where to find the schematic editor's settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostConfig {
    /// Editor version directory, e.g. `"9.0"`.
    #[serde(default = "default_kicad_version")]
    pub kicad_version: String,
    /// Explicit `eeschema.json` path; skips the search when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eeschema_path: Option<PathBuf>,
    /// Whether the host shows a toolbar button for the editor dialog.
    /// Owned by the host; reported by `fieldorder config`, never acted on.
    #[serde(default = "default_true")]
    pub show_toolbar_button: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_kicad_version() -> String {
    DEFAULT_KICAD_VERSION.to_string()
}
fn default_true() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            kicad_version: default_kicad_version(),
            eeschema_path: None,
            show_toolbar_button: default_true(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads settings from the platform config file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<ToolConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads settings from `path`, returning `ToolConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<ToolConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ToolConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Resolves the platform config base directory plus the `fieldorder` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("fieldorder"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("fieldorder"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("fieldorder")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_tool_config_defaults() {
        // Arrange / Act
        let cfg = ToolConfig::default();

        // Assert
        assert_eq!(cfg.general.log_level, "info");
        assert_eq!(cfg.host.kicad_version, "9.0");
        assert_eq!(cfg.host.eeschema_path, None);
        assert!(cfg.host.show_toolbar_button);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: ToolConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, ToolConfig::default());
    }

    #[test]
    fn test_partial_host_section_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[host]
kicad_version = "8.0"
"#;

        // Act
        let cfg: ToolConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.host.kicad_version, "8.0");
        assert!(cfg.host.show_toolbar_button);
        assert_eq!(cfg.general.log_level, "info");
    }

    #[test]
    fn test_unset_eeschema_path_is_omitted_from_toml() {
        let toml_str = toml::to_string_pretty(&ToolConfig::default()).expect("serialize");
        assert!(!toml_str.contains("eeschema_path"));
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("fieldorder_cfg_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        // Act
        let result = load_config_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");
        assert_eq!(load_config_from(&path).unwrap(), ToolConfig::default());
    }

    #[test]
    fn test_load_config_from_temp_dir() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("fieldorder_cfg_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut cfg = ToolConfig::default();
        cfg.general.log_level = "debug".to_string();
        cfg.host.eeschema_path = Some(PathBuf::from("/tmp/eeschema.json"));
        cfg.host.show_toolbar_button = false;
        std::fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();

        // Act
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("fieldorder/config.toml"),
                "unexpected config path {path:?}"
            );
        }
        // NoPlatformConfigDir in a stripped environment is also acceptable.
    }
}
