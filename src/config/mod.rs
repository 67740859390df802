use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{ensure_dir, tmp_path, PathResolver},
    errors::{LedgerError, Result},
    ledger::DEFAULT_CATEGORY,
};

pub const CONFIG_KEYS: [&str; 4] = ["store_path", "default_category", "ui_color_enabled", "quiet_mode"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    pub default_category: String,
    pub ui_color_enabled: bool,
    pub quiet_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            default_category: DEFAULT_CATEGORY.into(),
            ui_color_enabled: true,
            quiet_mode: false,
        }
    }
}

impl Config {
    /// Ledger file to open: the override when set, `<base>/database.json`
    /// otherwise. Relative overrides are taken from `base`.
    pub fn resolve_store_path(&self, base: &Path) -> PathBuf {
        match &self.store_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => PathResolver::store_file_in(base),
        }
    }

    /// Updates one key from its textual form. `color` and `quiet` are
    /// accepted as short aliases.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "store_path" => {
                self.store_path = match value {
                    "" | "none" | "default" => None,
                    other => Some(PathBuf::from(other)),
                };
            }
            "default_category" => {
                if value.is_empty() {
                    return Err(LedgerError::malformed("default_category cannot be empty"));
                }
                self.default_category = value.to_string();
            }
            "ui_color_enabled" | "color" => self.ui_color_enabled = parse_flag(key, value)?,
            "quiet_mode" | "quiet" => self.quiet_mode = parse_flag(key, value)?,
            other => {
                return Err(LedgerError::malformed(format!(
                    "unknown config key `{other}` (expected one of: {})",
                    CONFIG_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Key/value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "store_path",
                self.store_path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "(default)".into()),
            ),
            ("default_category", self.default_category.clone()),
            ("ui_color_enabled", self.ui_color_enabled.to_string()),
            ("quiet_mode", self.quiet_mode.to_string()),
        ]
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(LedgerError::malformed(format!(
            "`{value}` is not a valid value for {key}; use true or false"
        ))),
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}
