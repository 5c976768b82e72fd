//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `L10_ROOT_FOLDER` environment variable
//! 3. `root_folder` key of the TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file is not an error: every key has a default.

use crate::api::types::AgendaSection;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "L10_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "l10.db";

/// Pace classification cut-offs, in percent of total planned meeting time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceThresholds {
    /// Behind by more than this ⇒ critical
    pub critical_pct: f64,
    /// Behind by more than this ⇒ behind
    pub behind_pct: f64,
    /// Ahead by more than this ⇒ ahead
    pub ahead_pct: f64,
}

impl Default for PaceThresholds {
    fn default() -> Self {
        Self {
            critical_pct: 20.0,
            behind_pct: 10.0,
            ahead_pct: 5.0,
        }
    }
}

/// Stale session cleanup settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Active sessions older than this are ended automatically
    pub stale_after_hours: u64,
    /// Time between cleanup sweeps
    pub interval_minutes: u64,
    /// Active sessions older than this are reported as stuck
    pub stuck_after_hours: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            stale_after_hours: 8,
            interval_minutes: 60,
            stuck_after_hours: 4,
        }
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub pace: PaceThresholds,
    pub cleanup: CleanupConfig,
    /// Agenda overrides keyed by meeting type
    pub agenda: HashMap<String, Vec<AgendaSection>>,
}

impl TomlConfig {
    /// Parse config from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from an explicit path, or from the platform default location
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file yields the compiled defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    info!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let pace = &self.pace;
        if pace.critical_pct < pace.behind_pct {
            return Err(Error::Config(format!(
                "pace.critical_pct ({}) must not be below pace.behind_pct ({})",
                pace.critical_pct, pace.behind_pct
            )));
        }
        if pace.behind_pct < 0.0 || pace.ahead_pct < 0.0 {
            return Err(Error::Config("pace thresholds must be non-negative".to_string()));
        }
        if self.cleanup.interval_minutes == 0 {
            return Err(Error::Config("cleanup.interval_minutes must be > 0".to_string()));
        }
        for (meeting_type, sections) in &self.agenda {
            if sections.is_empty() {
                return Err(Error::Config(format!(
                    "agenda.{} must list at least one section",
                    meeting_type
                )));
            }
        }
        Ok(())
    }
}

/// Platform config file location (`<config_dir>/l10/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("l10").join("config.toml"))
}

/// Resolves the root folder following the documented priority order
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    config_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            config_root: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_config(mut self, config: &TomlConfig) -> Self {
        self.config_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("{}: root folder from command line", self.module_name);
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.is_empty() {
                info!("{}: root folder from {}", self.module_name, ROOT_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.config_root {
            info!("{}: root folder from config file", self.module_name);
            return path.clone();
        }

        let default = default_root_folder();
        info!("{}: using default root folder", self.module_name);
        default
    }
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("l10"))
        .unwrap_or_else(|| PathBuf::from("./l10_data"))
}

/// Creates the root folder and locates the database inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            warn!(
                "Root folder {} does not exist, creating it",
                self.root_folder.display()
            );
            std::fs::create_dir_all(&self.root_folder)?;
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.pace.critical_pct, 20.0);
        assert_eq!(config.pace.behind_pct, 10.0);
        assert_eq!(config.pace.ahead_pct, 5.0);
        assert_eq!(config.cleanup.stale_after_hours, 8);
        assert_eq!(config.cleanup.stuck_after_hours, 4);
    }

    #[test]
    fn test_partial_pace_section_keeps_other_defaults() {
        let config = TomlConfig::from_toml_str("[pace]\ncritical_pct = 30.0\n").unwrap();
        assert_eq!(config.pace.critical_pct, 30.0);
        assert_eq!(config.pace.behind_pct, 10.0);
    }

    #[test]
    fn test_agenda_override_parses() {
        let content = r#"
            [[agenda.quarterly]]
            id = "review"
            name = "Review"
            duration_minutes = 90

            [[agenda.quarterly]]
            id = "plan"
            name = "Plan"
            duration_minutes = 120
        "#;
        let config = TomlConfig::from_toml_str(content).unwrap();
        let quarterly = &config.agenda["quarterly"];
        assert_eq!(quarterly.len(), 2);
        assert_eq!(quarterly[1].allocated_seconds(), 7200);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let result = TomlConfig::from_toml_str("[pace]\ncritical_pct = 5.0\nbehind_pct = 10.0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_cleanup_interval_rejected() {
        let result = TomlConfig::from_toml_str("[cleanup]\ninterval_minutes = 0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_initializer_database_path() {
        let init = RootFolderInitializer::new(PathBuf::from("/tmp/l10-root"));
        assert_eq!(init.database_path(), PathBuf::from("/tmp/l10-root/l10.db"));
    }
}
