use crate::error::Result;

/// Abstract interface for one durable record.
///
/// Backends handle the "where" (filesystem, memory, database) while the
/// repositories handle the "what" (format, defaults, merge rules).
pub trait RecordBackend {
    /// Read the whole record.
    /// Returns Ok(None) if it has never been written.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read(&self) -> Result<Option<String>>;

    /// Replace the whole record.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes,
    /// and MUST create any missing parent location.
    fn write(&self, contents: &str) -> Result<()>;

    /// Where the record lives, for logs and diagnostics.
    fn location(&self) -> String;
}
