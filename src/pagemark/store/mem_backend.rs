use super::backend::RecordBackend;
use crate::error::{PagemarkError, Result};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct MemState {
    contents: Option<String>,
    writes: usize,
    simulate_write_error: bool,
}

/// In-memory record backend for testing.
///
/// Uses `Rc<RefCell<..>>` since pagemark is single-threaded: clones share the
/// same record, so a test can hand one clone to a repository and inspect the
/// other.
#[derive(Clone, Default)]
pub struct MemBackend {
    state: Rc<RefCell<MemState>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        let backend = Self::new();
        backend.state.borrow_mut().contents = Some(contents.to_string());
        backend
    }

    pub fn contents(&self) -> Option<String> {
        self.state.borrow().contents.clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.state.borrow().writes
    }

    /// Forget the record, as if its file had been deleted.
    pub fn clear(&self) {
        self.state.borrow_mut().contents = None;
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.state.borrow_mut().simulate_write_error = simulate;
    }
}

impl RecordBackend for MemBackend {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.state.borrow().contents.clone())
    }

    fn write(&self, contents: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.simulate_write_error {
            return Err(PagemarkError::Store("Simulated write error".to_string()));
        }
        state.contents = Some(contents.to_string());
        state.writes += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory://record".to_string()
    }
}
