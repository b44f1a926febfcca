use crate::config::PagemarkConfig;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    pub fn shared_dir(&self) -> PathBuf {
        self.root.join("OneDrive").join(".pagemark")
    }

    pub fn config(&self) -> PagemarkConfig {
        PagemarkConfig {
            config_dir: Some(self.config_dir()),
            shared_dir: Some(self.shared_dir()),
            device_id: Some("test-device".to_string()),
            ..Default::default()
        }
    }
}
