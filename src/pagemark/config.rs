//! # Configuration
//!
//! Pagemark configuration is managed by [`confique`], which handles layered
//! loading from environment variables, a TOML file and compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `PAGEMARK_CONFIG_DIR`, `PAGEMARK_SHARED_DIR`, etc.
//! 2. **Config file**: `pagemark.toml` inside the config directory.
//! 3. **Compiled defaults**: via `#[config(default = ...)]` and [`SettingsPaths`].
//!
//! ## Available Settings
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | `config_dir` | `PAGEMARK_CONFIG_DIR` | OS config dir (via `directories`) |
//! | `shared_dir` | `PAGEMARK_SHARED_DIR` | `~/OneDrive/.pagemark` if present, else `config_dir` |
//! | `device_id` | `PAGEMARK_DEVICE_ID` | `COMPUTERNAME`, then `HOSTNAME`, then `default` |
//! | `position_capacity` | `PAGEMARK_POSITION_CAPACITY` | `100` |
//! | `folder_capacity` | `PAGEMARK_FOLDER_CAPACITY` | `10` |

use crate::error::{PagemarkError, Result};
use crate::model::{DEFAULT_FOLDER_CAPACITY, DEFAULT_POSITION_CAPACITY};
use confique::Config;
use directories::{BaseDirs, ProjectDirs};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "pagemark.toml";
pub const SHARED_FILE_NAME: &str = "shared_settings.json";
pub const DEFAULT_DEVICE_ID: &str = "default";

const CONFIG_DIR_ENV: &str = "PAGEMARK_CONFIG_DIR";
const SYNC_FOLDER: &str = "OneDrive";
const APP_DIR_NAME: &str = ".pagemark";

#[derive(Config, Debug, Clone, PartialEq, Eq)]
pub struct PagemarkConfig {
    /// Directory holding the device record (and the shared record when no
    /// sync folder exists).
    #[config(env = "PAGEMARK_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory holding the shared record.
    #[config(env = "PAGEMARK_SHARED_DIR")]
    pub shared_dir: Option<PathBuf>,

    /// Identifier embedded in the device record's file name.
    #[config(env = "PAGEMARK_DEVICE_ID")]
    pub device_id: Option<String>,

    /// How many document positions to remember.
    #[config(env = "PAGEMARK_POSITION_CAPACITY", default = 100)]
    pub position_capacity: usize,

    /// How many recent folders to remember.
    #[config(env = "PAGEMARK_FOLDER_CAPACITY", default = 10)]
    pub folder_capacity: usize,
}

impl Default for PagemarkConfig {
    fn default() -> Self {
        Self {
            config_dir: None,
            shared_dir: None,
            device_id: None,
            position_capacity: DEFAULT_POSITION_CAPACITY,
            folder_capacity: DEFAULT_FOLDER_CAPACITY,
        }
    }
}

/// Where the two records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPaths {
    pub config_dir: PathBuf,
    pub shared_dir: PathBuf,
    pub device_id: String,
}

impl SettingsPaths {
    pub fn device_file(&self) -> PathBuf {
        self.config_dir
            .join(format!("settings_{}.json", self.device_id))
    }

    pub fn shared_file(&self) -> PathBuf {
        self.shared_dir.join(SHARED_FILE_NAME)
    }
}

impl PagemarkConfig {
    /// Load from the environment and `pagemark.toml`, falling back to defaults.
    pub fn load() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_config_dir()?,
        };
        Self::load_from(&config_dir)
    }

    /// Load from the environment and `<config_dir>/pagemark.toml`.
    pub fn load_from(config_dir: &Path) -> Result<Self> {
        let config = PagemarkConfig::builder()
            .env()
            .file(config_dir.join(CONFIG_FILE_NAME))
            .load()?;
        Ok(config)
    }

    /// Turn the configured values into concrete locations.
    pub fn resolve(&self) -> Result<SettingsPaths> {
        if self.position_capacity == 0 || self.folder_capacity == 0 {
            return Err(PagemarkError::Configuration(
                "capacities must be at least 1".to_string(),
            ));
        }

        let config_dir = match &self.config_dir {
            Some(dir) => dir.clone(),
            None => default_config_dir()?,
        };
        let shared_dir = match &self.shared_dir {
            Some(dir) => dir.clone(),
            None => {
                let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
                default_shared_dir(home.as_deref(), &config_dir)
            }
        };
        let device_id = match &self.device_id {
            Some(id) => sanitize_device_id(id),
            None => device_id_from(|name| std::env::var(name).ok()),
        };

        Ok(SettingsPaths {
            config_dir,
            shared_dir,
            device_id,
        })
    }
}

fn default_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "pagemark", "pagemark")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            PagemarkError::Configuration("could not determine a config directory".to_string())
        })
}

/// The sync folder's app directory if it already exists, else `config_dir`.
pub fn default_shared_dir(home: Option<&Path>, config_dir: &Path) -> PathBuf {
    home.map(|home| home.join(SYNC_FOLDER).join(APP_DIR_NAME))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| config_dir.to_path_buf())
}

/// Device identity from `COMPUTERNAME`, then `HOSTNAME`, then `"default"`.
pub fn device_id_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    ["COMPUTERNAME", "HOSTNAME"]
        .into_iter()
        .filter_map(lookup)
        .find(|id| !id.trim().is_empty())
        .map(|id| sanitize_device_id(&id))
        .unwrap_or_else(|| DEFAULT_DEVICE_ID.to_string())
}

/// Make an identifier safe to embed in a file name.
pub fn sanitize_device_id(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        DEFAULT_DEVICE_ID.to_string()
    } else {
        cleaned
    }
}
