use super::backend::RecordBackend;
use crate::error::{PagemarkError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A record stored as a single file.
#[derive(Debug, Clone)]
pub struct FsBackend {
    path: PathBuf,
}

impl FsBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> Result<&Path> {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                PagemarkError::Store(format!("{} has no parent directory", self.path.display()))
            })
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(PagemarkError::Io)?;
        }
        Ok(())
    }
}

impl RecordBackend for FsBackend {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(PagemarkError::Io)?;
        Ok(Some(content))
    }

    fn write(&self, contents: &str) -> Result<()> {
        let dir = self.parent_dir()?;
        self.ensure_dir(dir)?;

        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("record");

        // Atomic write
        let tmp_path = dir.join(format!(".{}-{}.tmp", stem, Uuid::new_v4()));
        fs::write(&tmp_path, contents).map_err(PagemarkError::Io)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(PagemarkError::Io(e));
        }

        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
