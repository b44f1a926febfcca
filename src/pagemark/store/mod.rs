//! # Storage Layer
//!
//! Raw durable-record I/O. A [`RecordBackend`] reads and replaces exactly one
//! record as a whole; it knows nothing about what the record contains. The
//! repositories in [`crate::repository`] own encoding, defaults and merging.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: Production. One JSON file per record, replaced
//!   atomically (write to a temp file in the same directory, then rename).
//! - [`mem_backend::MemBackend`]: In-memory, for tests. Clones share state so a
//!   test can keep a handle and inspect what the repository wrote.
//!
//! ## Storage Layout
//!
//! ```text
//! <config_dir>/
//! ├── pagemark.toml                # Optional layered config
//! ├── settings_<device_id>.json    # Device record
//! └── shared_settings.json         # Shared record, unless a sync folder exists
//!
//! <home>/OneDrive/.pagemark/
//! └── shared_settings.json         # Shared record, when this folder exists
//! ```

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::RecordBackend;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
