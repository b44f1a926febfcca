//! # Startup
//!
//! [`initialize`] builds the one [`PagemarkContext`] a process needs: it
//! resolves locations from [`PagemarkConfig`], wires both records to file
//! backends and loads them. The host keeps the context and passes it (or the
//! repository inside it) to every component that reads or records settings.
//! There is no global accessor.

use crate::config::{PagemarkConfig, SettingsPaths};
use crate::error::Result;
use crate::repository::{DeviceRepository, FileSettings, SettingsRepository, SharedRepository};
use crate::store::FsBackend;
use tracing::debug;

pub struct PagemarkContext {
    pub settings: FileSettings,
    pub paths: SettingsPaths,
    pub config: PagemarkConfig,
}

/// Initialize from the process environment and `pagemark.toml`.
pub fn initialize_from_env() -> Result<PagemarkContext> {
    initialize(PagemarkConfig::load()?)
}

/// Initialize from an already-loaded config.
///
/// Only misconfiguration fails here. Missing or corrupt records load as
/// defaults.
pub fn initialize(config: PagemarkConfig) -> Result<PagemarkContext> {
    let paths = config.resolve()?;
    debug!(
        device = %paths.device_file().display(),
        shared = %paths.shared_file().display(),
        "resolved settings locations"
    );

    let device = DeviceRepository::new(FsBackend::new(paths.device_file()), config.folder_capacity)?;
    let shared =
        SharedRepository::new(FsBackend::new(paths.shared_file()), config.position_capacity)?;
    let settings = SettingsRepository::open(device, shared);

    Ok(PagemarkContext {
        settings,
        paths,
        config,
    })
}
