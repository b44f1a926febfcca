use crate::error::{PagemarkError, Result};
use crate::recency::RecencyStore;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_POSITION_CAPACITY: usize = 100;
pub const DEFAULT_FOLDER_CAPACITY: usize = 10;

pub const DEFAULT_ZOOM_LEVEL: u16 = 100;
pub const MIN_ZOOM_LEVEL: u16 = 50;
pub const MAX_ZOOM_LEVEL: u16 = 300;
pub const ZOOM_STEP: u16 = 10;

pub const DEFAULT_LISTENER_PORT: u16 = 8765;

/// Last page viewed in a document, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionEntry {
    pub page: u32,
    pub touched_at: DateTime<Utc>,
}

impl PositionEntry {
    pub fn new(page: u32) -> Self {
        Self {
            page,
            touched_at: Utc::now(),
        }
    }
}

pub type PositionStore = RecencyStore<String, PositionEntry>;
pub type FolderStore = RecencyStore<String, ()>;

/// Settings owned by one installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub window_geometry: Option<Vec<u8>>,
    pub window_state: Option<Vec<u8>>,
    /// Newest folder last. Display order is the reverse.
    pub recent_folders: FolderStore,
    pub sidebar_visible: bool,
    pub zoom_level: u16,
    pub listener_port: u16,
}

impl DeviceRecord {
    pub fn with_capacity(folder_capacity: usize) -> Result<Self> {
        Ok(Self {
            window_geometry: None,
            window_state: None,
            recent_folders: RecencyStore::new(folder_capacity)?,
            sidebar_visible: true,
            zoom_level: DEFAULT_ZOOM_LEVEL,
            listener_port: DEFAULT_LISTENER_PORT,
        })
    }
}

/// Settings that may be synchronized across devices: document positions only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedRecord {
    pub positions: PositionStore,
}

impl SharedRecord {
    pub fn with_capacity(position_capacity: usize) -> Result<Self> {
        Ok(Self {
            positions: RecencyStore::new(position_capacity)?,
        })
    }
}

/// The merged settings callers work with.
///
/// Every field but the positions comes from the device record; positions come
/// from the shared record. The repository assembles and splits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    pub device: DeviceRecord,
    pub shared: SharedRecord,
}

impl SettingsView {
    pub fn assemble(device: DeviceRecord, shared: SharedRecord) -> Self {
        Self { device, shared }
    }

    pub fn positions(&self) -> &PositionStore {
        &self.shared.positions
    }

    pub fn position_of(&self, document_key: &str) -> u32 {
        self.shared
            .positions
            .get(document_key)
            .map(|entry| entry.page)
            .unwrap_or(0)
    }

    /// Recent folders, most recent first.
    pub fn recent_folders(&self) -> Vec<String> {
        self.device.recent_folders.keys().rev().cloned().collect()
    }

    pub fn get(&self, setting: Setting) -> SettingValue {
        let device = &self.device;
        match setting {
            Setting::WindowGeometry => SettingValue::Blob(device.window_geometry.clone()),
            Setting::WindowState => SettingValue::Blob(device.window_state.clone()),
            Setting::SidebarVisible => SettingValue::Flag(device.sidebar_visible),
            Setting::ZoomLevel => SettingValue::Number(device.zoom_level),
            Setting::StreamDeckPort => SettingValue::Number(device.listener_port),
        }
    }

    /// Validate and store a scalar device setting. Leaves the view untouched on error.
    pub fn apply(&mut self, setting: Setting, value: SettingValue) -> Result<()> {
        let device = &mut self.device;
        match (setting, value) {
            (Setting::WindowGeometry, SettingValue::Blob(blob)) => device.window_geometry = blob,
            (Setting::WindowState, SettingValue::Blob(blob)) => device.window_state = blob,
            (Setting::SidebarVisible, SettingValue::Flag(flag)) => device.sidebar_visible = flag,
            (Setting::ZoomLevel, SettingValue::Number(zoom)) => {
                device.zoom_level = validate_zoom(zoom)?;
            }
            (Setting::StreamDeckPort, SettingValue::Number(port)) => {
                device.listener_port = validate_port(port)?;
            }
            (setting, value) => {
                return Err(PagemarkError::InvalidArgument(format!(
                    "{} cannot hold {}",
                    setting,
                    value.kind()
                )))
            }
        }
        Ok(())
    }
}

pub fn validate_zoom(zoom: u16) -> Result<u16> {
    if (MIN_ZOOM_LEVEL..=MAX_ZOOM_LEVEL).contains(&zoom) {
        Ok(zoom)
    } else {
        Err(PagemarkError::InvalidArgument(format!(
            "zoom_level must be between {} and {}, got {}",
            MIN_ZOOM_LEVEL, MAX_ZOOM_LEVEL, zoom
        )))
    }
}

pub fn validate_port(port: u16) -> Result<u16> {
    if port == 0 {
        return Err(PagemarkError::InvalidArgument(
            "stream_deck_port must be non-zero".to_string(),
        ));
    }
    Ok(port)
}

/// Scalar fields of the device record addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    WindowGeometry,
    WindowState,
    SidebarVisible,
    ZoomLevel,
    StreamDeckPort,
}

impl Setting {
    pub const ALL: [Setting; 5] = [
        Setting::WindowGeometry,
        Setting::WindowState,
        Setting::SidebarVisible,
        Setting::ZoomLevel,
        Setting::StreamDeckPort,
    ];

    /// Field name in the device record.
    pub fn key(self) -> &'static str {
        match self {
            Setting::WindowGeometry => "window_geometry",
            Setting::WindowState => "window_state",
            Setting::SidebarVisible => "sidebar_visible",
            Setting::ZoomLevel => "zoom_level",
            Setting::StreamDeckPort => "stream_deck_port",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Setting {
    type Err = PagemarkError;

    fn from_str(s: &str) -> Result<Self> {
        Setting::ALL
            .into_iter()
            .find(|setting| setting.key() == s)
            .ok_or_else(|| PagemarkError::InvalidArgument(format!("Unknown setting: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Blob(Option<Vec<u8>>),
    Flag(bool),
    Number(u16),
}

impl SettingValue {
    /// Parse the textual form of a value for `setting`.
    ///
    /// Blobs are hex; an empty string or `none` clears them.
    pub fn parse(setting: Setting, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let invalid = |expected: &str| {
            PagemarkError::InvalidArgument(format!(
                "{} expects {}, got '{}'",
                setting, expected, raw
            ))
        };
        match setting {
            Setting::WindowGeometry | Setting::WindowState => {
                if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
                    Ok(SettingValue::Blob(None))
                } else {
                    hex::decode(raw)
                        .map(|bytes| SettingValue::Blob(Some(bytes)))
                        .map_err(|_| invalid("a hex string"))
                }
            }
            Setting::SidebarVisible => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(SettingValue::Flag(true)),
                "false" | "no" | "off" | "0" => Ok(SettingValue::Flag(false)),
                _ => Err(invalid("a boolean")),
            },
            Setting::ZoomLevel | Setting::StreamDeckPort => raw
                .parse::<u16>()
                .map(SettingValue::Number)
                .map_err(|_| invalid("an integer")),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SettingValue::Blob(_) => "a blob",
            SettingValue::Flag(_) => "a boolean",
            SettingValue::Number(_) => "a number",
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Blob(Some(bytes)) => f.write_str(&hex::encode(bytes)),
            SettingValue::Blob(None) => f.write_str("none"),
            SettingValue::Flag(flag) => write!(f, "{}", flag),
            SettingValue::Number(n) => write!(f, "{}", n),
        }
    }
}
