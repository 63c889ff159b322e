use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scanner::targets::{Category, CleanTarget};

/// Overrides the data directory, mostly for tests and portable installs
pub const HOME_ENV: &str = "SWEEPSAFE_HOME";

/// Global SweepSafe configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// `clean` previews unless `--execute` is passed
    #[serde(default = "default_dry_run")]
    pub dry_run_by_default: bool,

    /// Verbose logging without `-v`
    #[serde(default)]
    pub debug: bool,

    /// Whitelist file; `<data_dir>/whitelist.txt` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitelist_file: Option<PathBuf>,

    /// Target catalog; the built-in catalog is used when unset or missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets_file: Option<PathBuf>,

    /// Where dry-run reports are exported; `<data_dir>/clean-list.txt` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_file: Option<PathBuf>,
}

fn default_dry_run() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dry_run_by_default: default_dry_run(),
            debug: false,
            whitelist_file: None,
            targets_file: None,
            export_file: None,
        }
    }
}

impl Config {
    /// Get the SweepSafe data directory (`$SWEEPSAFE_HOME` or `~/.sweepsafe`)
    pub fn data_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".sweepsafe")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Get the logs directory
    pub fn logs_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Load config from file, or fall back to defaults if it does not exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Create the data and log directories
    pub fn init_dirs() -> Result<()> {
        for dir in [Self::data_dir(), Self::logs_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn whitelist_path(&self) -> PathBuf {
        self.whitelist_file
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("whitelist.txt"))
    }

    pub fn export_path(&self) -> PathBuf {
        self.export_file
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("clean-list.txt"))
    }

    pub fn targets_path(&self) -> PathBuf {
        self.targets_file
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("targets.toml"))
    }
}

/// The list of clean targets handed to the scan engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetCatalog {
    #[serde(rename = "target", default)]
    pub targets: Vec<CleanTarget>,
}

impl TargetCatalog {
    /// Parse a catalog of `[[target]]` tables
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read targets: {}", path.display()))?;
        let catalog: TargetCatalog = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse targets: {}", path.display()))?;
        Ok(catalog)
    }

    /// The catalog at `path` when it exists, the built-in one otherwise
    pub fn load_or_builtin(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::builtin())
        }
    }

    /// The user temp directory only. `%SystemRoot%\Temp` sits inside the
    /// protected `C:\Windows` tree, so it has no built-in entry.
    pub fn builtin() -> Self {
        Self {
            targets: vec![CleanTarget::new("UserTemp", Category::User)
                .with_path("%TEMP%")
                .with_description("User temporary files")],
        }
    }

    /// Targets restricted to `categories`; all of them when empty
    pub fn filter(&self, categories: &[Category]) -> Vec<CleanTarget> {
        self.targets
            .iter()
            .filter(|t| categories.is_empty() || categories.contains(&t.category))
            .cloned()
            .collect()
    }
}
