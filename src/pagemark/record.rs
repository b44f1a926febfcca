//! # Record Layout
//!
//! Encoding and decoding of the two durable records. Both are pretty-printed
//! JSON objects.
//!
//! ```text
//! settings_<device>.json              shared_settings.json
//! {                                   {
//!   "window_geometry": "01d9..",        "pdf_positions": {
//!   "window_state": null,                 "/docs/a.pdf": {
//!   "recent_folders": ["/new", "/old"],     "page": 4,
//!   "sidebar_visible": true,                "timestamp": "2025-03-01T09:12:44.5Z"
//!   "zoom_level": 100,                    },
//!   "stream_deck_port": 8765              ...
//! }                                     }
//!                                     }
//! ```
//!
//! `recent_folders` is written most-recent-first; `pdf_positions` is written
//! oldest-first, in recency order.
//!
//! ## Leniency
//!
//! Decoding never throws away more than it has to. Each device field is read
//! on its own and falls back to its default when missing or ill-typed, and a
//! malformed position entry is skipped rather than failing the shared record.
//! Every such fallback is reported as a note so the caller can log it. Only a
//! document that is not a JSON object at all is an error.

use crate::error::{PagemarkError, Result};
use crate::model::{
    validate_port, validate_zoom, DeviceRecord, PositionEntry, PositionStore, SharedRecord,
};
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

const WINDOW_GEOMETRY: &str = "window_geometry";
const WINDOW_STATE: &str = "window_state";
const RECENT_FOLDERS: &str = "recent_folders";
const SIDEBAR_VISIBLE: &str = "sidebar_visible";
const ZOOM_LEVEL: &str = "zoom_level";
const STREAM_DECK_PORT: &str = "stream_deck_port";
const PDF_POSITIONS: &str = "pdf_positions";

/// A decoded record plus the fields that had to fall back to defaults.
#[derive(Debug)]
pub struct Decoded<T> {
    pub record: T,
    pub notes: Vec<String>,
}

#[derive(Serialize)]
struct DeviceFile<'a> {
    window_geometry: Option<String>,
    window_state: Option<String>,
    recent_folders: Vec<&'a str>,
    sidebar_visible: bool,
    zoom_level: u16,
    stream_deck_port: u16,
}

#[derive(Serialize)]
struct SharedFile<'a> {
    pdf_positions: PositionsOut<'a>,
}

struct PositionsOut<'a>(&'a PositionStore);

#[derive(Serialize)]
struct PositionOut {
    page: u32,
    timestamp: String,
}

impl Serialize for PositionsOut<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, entry) in self.0.entries() {
            map.serialize_entry(
                key,
                &PositionOut {
                    page: entry.page,
                    timestamp: format_timestamp(entry.touched_at),
                },
            )?;
        }
        map.end()
    }
}

pub fn encode_device(record: &DeviceRecord) -> Result<String> {
    let file = DeviceFile {
        window_geometry: record.window_geometry.as_ref().map(hex::encode),
        window_state: record.window_state.as_ref().map(hex::encode),
        recent_folders: record
            .recent_folders
            .keys()
            .rev()
            .map(String::as_str)
            .collect(),
        sidebar_visible: record.sidebar_visible,
        zoom_level: record.zoom_level,
        stream_deck_port: record.listener_port,
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

pub fn encode_shared(record: &SharedRecord) -> Result<String> {
    let file = SharedFile {
        pdf_positions: PositionsOut(&record.positions),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

pub fn decode_device(raw: &str, folder_capacity: usize) -> Result<Decoded<DeviceRecord>> {
    let mut object = parse_object(raw)?;
    let mut record = DeviceRecord::with_capacity(folder_capacity)?;
    let mut notes = Vec::new();

    if let Some(value) = object.remove(WINDOW_GEOMETRY) {
        record.window_geometry = decode_blob(WINDOW_GEOMETRY, value, &mut notes);
    }
    if let Some(value) = object.remove(WINDOW_STATE) {
        record.window_state = decode_blob(WINDOW_STATE, value, &mut notes);
    }
    if let Some(value) = object.remove(RECENT_FOLDERS) {
        match value {
            Value::Array(items) => {
                // Stored most-recent-first; touch oldest first so the newest ends last.
                for item in items.into_iter().rev() {
                    match item {
                        Value::String(folder) => {
                            record.recent_folders.touch(folder, ());
                        }
                        other => notes.push(format!(
                            "{}: skipped non-string entry {}",
                            RECENT_FOLDERS, other
                        )),
                    }
                }
            }
            Value::Null => {}
            other => notes.push(type_note(RECENT_FOLDERS, "an array", &other)),
        }
    }
    if let Some(value) = object.remove(SIDEBAR_VISIBLE) {
        match value {
            Value::Bool(flag) => record.sidebar_visible = flag,
            other => notes.push(type_note(SIDEBAR_VISIBLE, "a boolean", &other)),
        }
    }
    if let Some(value) = object.remove(ZOOM_LEVEL) {
        match as_u16(&value).map(validate_zoom) {
            Some(Ok(zoom)) => record.zoom_level = zoom,
            _ => notes.push(type_note(ZOOM_LEVEL, "a zoom percentage", &value)),
        }
    }
    if let Some(value) = object.remove(STREAM_DECK_PORT) {
        match as_u16(&value).map(validate_port) {
            Some(Ok(port)) => record.listener_port = port,
            _ => notes.push(type_note(STREAM_DECK_PORT, "a port number", &value)),
        }
    }

    Ok(Decoded { record, notes })
}

pub fn decode_shared(raw: &str, position_capacity: usize) -> Result<Decoded<SharedRecord>> {
    let mut object = parse_object(raw)?;
    let mut record = SharedRecord::with_capacity(position_capacity)?;
    let mut notes = Vec::new();

    match object.remove(PDF_POSITIONS) {
        Some(Value::Object(entries)) => {
            for (key, value) in entries {
                match decode_position(value) {
                    Ok(entry) => {
                        record.positions.touch(key, entry);
                    }
                    Err(reason) => {
                        notes.push(format!("{}: skipped '{}': {}", PDF_POSITIONS, key, reason))
                    }
                }
            }
        }
        Some(Value::Null) | None => {}
        Some(other) => notes.push(type_note(PDF_POSITIONS, "an object", &other)),
    }

    Ok(Decoded { record, notes })
}

fn parse_object(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(object) => Ok(object),
        other => Err(PagemarkError::Store(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

fn decode_blob(field: &str, value: Value, notes: &mut Vec<String>) -> Option<Vec<u8>> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => match hex::decode(&text) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                notes.push(format!("{}: invalid hex ({})", field, e));
                None
            }
        },
        other => {
            notes.push(type_note(field, "a hex string", &other));
            None
        }
    }
}

fn decode_position(value: Value) -> std::result::Result<PositionEntry, String> {
    let fields = match value {
        Value::Object(fields) => fields,
        other => return Err(format!("expected an object, found {}", json_kind(&other))),
    };

    let page = match fields.get("page") {
        None | Some(Value::Null) => 0,
        Some(value) => value
            .as_i64()
            .and_then(|page| u32::try_from(page).ok())
            .ok_or_else(|| format!("page must be a non-negative integer, found {}", value))?,
    };

    let touched_at = fields
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    Ok(PositionEntry { page, touched_at })
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Accepts RFC 3339, and offset-less ISO-8601 read as local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|at| at.with_timezone(&Utc))
}

fn as_u16(value: &Value) -> Option<u16> {
    value.as_u64().and_then(|n| u16::try_from(n).ok())
}

fn type_note(field: &str, expected: &str, found: &Value) -> String {
    format!("{}: expected {}, found {}", field, expected, json_kind(found))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
