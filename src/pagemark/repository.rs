//! # Settings Repository
//!
//! Settings are split across two durable records with different owners:
//!
//! 1. **Device record**: window layout, recent folders, sidebar, zoom and
//!    listener port. Owned by one installation.
//! 2. **Shared record**: document positions. May live in a synchronized folder
//!    and be rewritten by another device at any time.
//!
//! [`DeviceRepository`] and [`SharedRepository`] each own one record and one
//! [`RecordBackend`]. [`SettingsRepository`] is the facade callers use: it
//! merges the two on load and splits the view again on save.
//!
//! ## Load
//!
//! Loading never fails. A missing, unreadable or malformed record is replaced
//! by defaults for that record only, recorded as a [`LoadIssue`] and logged.
//! Positions always come from the shared record; anything position-like in a
//! legacy device file is ignored.
//!
//! ## Save
//!
//! Write-through: every mutating call rewrites both records in full before it
//! returns. A failed write is reported as a [`PersistWarning`] in the returned
//! [`SaveOutcome`] and does not stop the other record from being written. The
//! in-memory view stays authoritative for the rest of the process.
//!
//! ## Cross-Device Writes
//!
//! The shared record is last-writer-wins at file granularity. Two devices that
//! save within the same window lose each other's updates to *different*
//! documents, because each rewrites the whole record from its own view. There
//! is no locking and no per-key merge.
//!
//! ## Threading
//!
//! A repository has one logical owner. Wrap it in a `Mutex` if several threads
//! need it.

use crate::error::{PagemarkError, Result};
use crate::model::{
    DeviceRecord, PositionEntry, PositionStore, Setting, SettingValue, SettingsView, SharedRecord,
};
use crate::record::{self, Decoded};
use crate::store::{FsBackend, RecordBackend};
use std::fmt;
use std::path::Path;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Device,
    Shared,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Device => f.write_str("device"),
            RecordKind::Shared => f.write_str("shared"),
        }
    }
}

/// A record, or part of one, that was replaced by defaults during load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadIssue {
    pub record: RecordKind,
    pub location: String,
    pub reason: String,
}

/// A record that could not be written during save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistWarning {
    pub record: RecordKind,
    pub location: String,
    pub reason: String,
}

impl fmt::Display for PersistWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not save {} settings to {}: {}",
            self.record, self.location, self.reason
        )
    }
}

/// Result of persisting both records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub warnings: Vec<PersistWarning>,
}

impl SaveOutcome {
    /// Both records were written.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn record_failure(&mut self, record: RecordKind, location: String, err: PagemarkError) {
        let warning = PersistWarning {
            record,
            location,
            reason: err.to_string(),
        };
        warn!(record = %warning.record, location = %warning.location, error = %warning.reason, "settings not persisted");
        self.warnings.push(warning);
    }
}

/// Read a record through `backend`. `None` means the caller should use
/// defaults; any reason for that has already been noted in `issues`.
fn load_record<B, T>(
    kind: RecordKind,
    backend: &B,
    issues: &mut Vec<LoadIssue>,
    decode: impl FnOnce(&str) -> Result<Decoded<T>>,
) -> Option<T>
where
    B: RecordBackend,
{
    let location = backend.location();
    let mut issue = |reason: String| {
        warn!(record = %kind, location = %location, reason = %reason, "using defaults");
        issues.push(LoadIssue {
            record: kind,
            location: location.clone(),
            reason,
        });
    };

    let raw = match backend.read() {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(record = %kind, location = %backend.location(), "no record yet, using defaults");
            return None;
        }
        Err(e) => {
            issue(format!("unreadable: {}", e));
            return None;
        }
    };

    match decode(&raw) {
        Ok(decoded) => {
            for note in decoded.notes {
                issue(note);
            }
            debug!(record = %kind, location = %backend.location(), "loaded");
            Some(decoded.record)
        }
        Err(e) => {
            issue(format!("unparsable: {}", e));
            None
        }
    }
}

/// Owns the per-installation record.
pub struct DeviceRepository<B: RecordBackend> {
    backend: B,
    empty: DeviceRecord,
}

impl<B: RecordBackend> DeviceRepository<B> {
    pub fn new(backend: B, folder_capacity: usize) -> Result<Self> {
        let empty = DeviceRecord::with_capacity(folder_capacity)?;
        Ok(Self { backend, empty })
    }

    pub fn defaults(&self) -> DeviceRecord {
        self.empty.clone()
    }

    pub fn load(&self, issues: &mut Vec<LoadIssue>) -> DeviceRecord {
        let capacity = self.empty.recent_folders.capacity();
        load_record(
            RecordKind::Device,
            &self.backend,
            issues,
            |raw| record::decode_device(raw, capacity),
        )
        .unwrap_or_else(|| self.defaults())
    }

    pub fn save(&self, device: &DeviceRecord) -> Result<()> {
        let contents = record::encode_device(device)?;
        self.backend.write(&contents)?;
        debug!(location = %self.backend.location(), "device settings saved");
        Ok(())
    }
}

/// Owns the record shared across devices.
pub struct SharedRepository<B: RecordBackend> {
    backend: B,
    empty: SharedRecord,
}

impl<B: RecordBackend> SharedRepository<B> {
    pub fn new(backend: B, position_capacity: usize) -> Result<Self> {
        let empty = SharedRecord::with_capacity(position_capacity)?;
        Ok(Self { backend, empty })
    }

    pub fn defaults(&self) -> SharedRecord {
        self.empty.clone()
    }

    pub fn load(&self, issues: &mut Vec<LoadIssue>) -> SharedRecord {
        let capacity = self.empty.positions.capacity();
        load_record(
            RecordKind::Shared,
            &self.backend,
            issues,
            |raw| record::decode_shared(raw, capacity),
        )
        .unwrap_or_else(|| self.defaults())
    }

    pub fn save(&self, shared: &SharedRecord) -> Result<()> {
        let contents = record::encode_shared(shared)?;
        self.backend.write(&contents)?;
        debug!(location = %self.backend.location(), "shared settings saved");
        Ok(())
    }
}

/// The settings facade: one instance per process, passed explicitly to
/// whatever needs it.
pub struct SettingsRepository<D: RecordBackend, S: RecordBackend> {
    device: DeviceRepository<D>,
    shared: SharedRepository<S>,
    view: SettingsView,
    issues: Vec<LoadIssue>,
}

/// Production repository: both records on disk.
pub type FileSettings = SettingsRepository<FsBackend, FsBackend>;

impl<D: RecordBackend, S: RecordBackend> SettingsRepository<D, S> {
    /// Build the facade and load both records.
    pub fn open(device: DeviceRepository<D>, shared: SharedRepository<S>) -> Self {
        let view = SettingsView::assemble(device.defaults(), shared.defaults());
        let mut repo = Self {
            device,
            shared,
            view,
            issues: Vec::new(),
        };
        repo.load();
        repo
    }

    /// Re-read both records and replace the in-memory view.
    pub fn load(&mut self) -> &SettingsView {
        let mut issues = Vec::new();
        let device = self.device.load(&mut issues);
        let shared = self.shared.load(&mut issues);
        self.view = SettingsView::assemble(device, shared);
        self.issues = issues;
        &self.view
    }

    /// Adopt `view` as the current state, then split it into its two records
    /// and write each one.
    pub fn save(&mut self, view: &SettingsView) -> SaveOutcome {
        self.view = view.clone();
        self.persist()
    }

    fn persist(&self) -> SaveOutcome {
        let view = &self.view;
        let mut outcome = SaveOutcome::default();
        if let Err(e) = self.device.save(&view.device) {
            outcome.record_failure(RecordKind::Device, self.device.backend.location(), e);
        }
        if let Err(e) = self.shared.save(&view.shared) {
            outcome.record_failure(RecordKind::Shared, self.shared.backend.location(), e);
        }
        outcome
    }

    pub fn view(&self) -> &SettingsView {
        &self.view
    }

    /// Issues found by the most recent load.
    pub fn load_issues(&self) -> &[LoadIssue] {
        &self.issues
    }

    pub fn device_location(&self) -> String {
        self.device.backend.location()
    }

    pub fn shared_location(&self) -> String {
        self.shared.backend.location()
    }

    // --- Positions ---

    /// Remember `page` as the last page viewed in `document_key`, then persist.
    ///
    /// A negative page is rejected before anything changes or is written.
    pub fn record_position(&mut self, document_key: &str, page: i64) -> Result<SaveOutcome> {
        let page = u32::try_from(page).map_err(|_| {
            PagemarkError::InvalidArgument(format!(
                "page must be a non-negative integer, got {}",
                page
            ))
        })?;

        if let Some((evicted, _)) = self
            .view
            .shared
            .positions
            .touch(document_key.to_string(), PositionEntry::new(page))
        {
            trace!(document = %evicted, "evicted least recently viewed position");
        }
        Ok(self.persist())
    }

    /// Last recorded page for `document_key`, 0 if unknown.
    pub fn position_of(&self, document_key: &str) -> u32 {
        self.view.position_of(document_key)
    }

    pub fn positions(&self) -> &PositionStore {
        self.view.positions()
    }

    // --- Recent folders ---

    /// Promote `path` to the most recent folder, then persist.
    pub fn record_recent_folder(&mut self, path: &str) -> SaveOutcome {
        if let Some((evicted, _)) = self
            .view
            .device
            .recent_folders
            .touch(path.to_string(), ())
        {
            trace!(folder = %evicted, "evicted least recently used folder");
        }
        self.persist()
    }

    /// Most recent first.
    pub fn recent_folders(&self) -> Vec<String> {
        self.view.recent_folders()
    }

    pub fn last_folder(&self) -> Option<String> {
        self.view
            .device
            .recent_folders
            .newest()
            .map(|(folder, _)| folder.clone())
    }

    /// Most recent first, skipping folders that no longer exist.
    pub fn existing_recent_folders(&self) -> Vec<String> {
        self.recent_folders()
            .into_iter()
            .filter(|folder| Path::new(folder).is_dir())
            .collect()
    }

    // --- Scalar device settings ---

    pub fn get(&self, setting: Setting) -> SettingValue {
        self.view.get(setting)
    }

    /// Store a scalar setting, then persist. Invalid values change nothing.
    pub fn set(&mut self, setting: Setting, value: SettingValue) -> Result<SaveOutcome> {
        self.view.apply(setting, value)?;
        Ok(self.persist())
    }

    /// Store window geometry and state together with a single save.
    pub fn set_window_layout(
        &mut self,
        geometry: Option<Vec<u8>>,
        state: Option<Vec<u8>>,
    ) -> SaveOutcome {
        self.view.device.window_geometry = geometry;
        self.view.device.window_state = state;
        self.persist()
    }

    pub fn window_geometry(&self) -> Option<&[u8]> {
        self.view.device.window_geometry.as_deref()
    }

    pub fn window_state(&self) -> Option<&[u8]> {
        self.view.device.window_state.as_deref()
    }

    pub fn sidebar_visible(&self) -> bool {
        self.view.device.sidebar_visible
    }

    pub fn zoom_level(&self) -> u16 {
        self.view.device.zoom_level
    }

    pub fn listener_port(&self) -> u16 {
        self.view.device.listener_port
    }
}
