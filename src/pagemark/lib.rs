//! # Pagemark Architecture
//!
//! Pagemark is the **durable reading state of a desktop document viewer**: the
//! last page viewed per document, recently used folders and a handful of
//! window/viewer preferences. Rendering, UI and the command listener belong to
//! the host; this crate only manages bounded, ordered, persisted state.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host (the viewer, or the `pagemark` binary)                │
//! │  - Owns the PagemarkContext and passes it explicitly        │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session / Commands (session.rs, command.rs)                │
//! │  - Drive a document provider, record positions on change    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository (repository.rs)                                 │
//! │  - Merges device + shared records on load, splits on save   │
//! │  - Write-through, failures per record are independent       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Records & Storage (model.rs, record.rs, store/)            │
//! │  - RecencyStore bounds and orders positions and folders     │
//! │  - RecordBackend: FsBackend (production), MemBackend (test) │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Degrade, Don't Fail
//!
//! Only misconfiguration (a zero capacity, no resolvable config directory) and
//! invalid arguments are errors. A missing or corrupt record loads as defaults,
//! and a failed write is returned as a warning while the in-memory state keeps
//! working for the rest of the process.
//!
//! ## Module Overview
//!
//! - [`recency`]: Bounded least-recently-touched map
//! - [`model`]: Records, the merged view and addressable settings
//! - [`record`]: JSON encoding of both records
//! - [`store`]: Storage abstraction and implementations
//! - [`repository`]: Device, shared and merged repositories
//! - [`config`]: Configuration management
//! - [`init`]: Startup wiring
//! - [`session`]: Page navigation over a document provider
//! - [`command`]: Named viewer commands
//! - [`error`]: Error types

pub mod command;
pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod recency;
pub mod record;
pub mod repository;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_utils;
