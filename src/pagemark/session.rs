//! # Viewer Session
//!
//! A [`ViewerSession`] is one open document: which page is showing and at what
//! zoom. Rendering is delegated to a [`DocumentProvider`]; the session never
//! looks at document content.
//!
//! Every page change is recorded through the [`SettingsRepository`] the host
//! passes in, so reopening the document later resumes where it was left.
//! Opening a document restores the saved page, clamped to the document's
//! length, and records it straight away.
//!
//! Zoom starts at the configured `zoom_level` and is not persisted by the
//! session.

use crate::error::{PagemarkError, Result};
use crate::model::{DEFAULT_ZOOM_LEVEL, MAX_ZOOM_LEVEL, MIN_ZOOM_LEVEL, ZOOM_STEP};
use crate::repository::{SaveOutcome, SettingsRepository};
use crate::store::RecordBackend;
use std::path::Path;
use tracing::{debug, info};

/// The rendering library, seen from the session.
pub trait DocumentProvider {
    type Handle;
    type Pixmap;

    /// Fails with [`PagemarkError::Load`] when the document cannot be opened.
    fn open(&mut self, path: &Path) -> Result<Self::Handle>;

    fn page_count(&self, handle: &Self::Handle) -> usize;

    fn render_page(
        &mut self,
        handle: &Self::Handle,
        index: usize,
        zoom_percent: u16,
    ) -> Result<Self::Pixmap>;

    fn close(&mut self, handle: Self::Handle);
}

pub struct ViewerSession<H> {
    handle: H,
    document_key: String,
    page_count: usize,
    page: usize,
    zoom: u16,
}

impl<H> ViewerSession<H> {
    /// Open `path` and restore its last recorded page.
    pub fn open<P, D, S>(
        provider: &mut P,
        settings: &mut SettingsRepository<D, S>,
        path: &Path,
    ) -> Result<(Self, SaveOutcome)>
    where
        P: DocumentProvider<Handle = H>,
        D: RecordBackend,
        S: RecordBackend,
    {
        let handle = provider.open(path)?;
        let page_count = provider.page_count(&handle);
        if page_count == 0 {
            provider.close(handle);
            return Err(PagemarkError::Load(format!(
                "{} has no pages",
                path.display()
            )));
        }

        let document_key = path.display().to_string();
        let saved = settings.position_of(&document_key) as usize;
        let page = saved.min(page_count - 1);
        let (handle, outcome) = record_or_close(provider, handle, settings, &document_key, page)?;
        info!(document = %document_key, page, page_count, "opened document");

        let session = Self {
            handle,
            document_key,
            page_count,
            page,
            zoom: settings.zoom_level(),
        };
        Ok((session, outcome))
    }

    pub fn document_key(&self) -> &str {
        &self.document_key
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn zoom(&self) -> u16 {
        self.zoom
    }

    /// Show `page` if it exists and differs from the current one.
    ///
    /// Returns `None` when nothing moved (and nothing was written).
    pub fn go_to<D, S>(
        &mut self,
        settings: &mut SettingsRepository<D, S>,
        page: usize,
    ) -> Result<Option<SaveOutcome>>
    where
        D: RecordBackend,
        S: RecordBackend,
    {
        if page >= self.page_count || page == self.page {
            return Ok(None);
        }
        let outcome = settings.record_position(&self.document_key, page_number(page)?)?;
        self.page = page;
        debug!(document = %self.document_key, page, "page changed");
        Ok(Some(outcome))
    }

    pub fn next_page<D, S>(
        &mut self,
        settings: &mut SettingsRepository<D, S>,
    ) -> Result<Option<SaveOutcome>>
    where
        D: RecordBackend,
        S: RecordBackend,
    {
        self.go_to(settings, self.page + 1)
    }

    pub fn prev_page<D, S>(
        &mut self,
        settings: &mut SettingsRepository<D, S>,
    ) -> Result<Option<SaveOutcome>>
    where
        D: RecordBackend,
        S: RecordBackend,
    {
        match self.page.checked_sub(1) {
            Some(page) => self.go_to(settings, page),
            None => Ok(None),
        }
    }

    /// Returns whether the zoom changed.
    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom.saturating_add(ZOOM_STEP).min(MAX_ZOOM_LEVEL))
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom.saturating_sub(ZOOM_STEP).max(MIN_ZOOM_LEVEL))
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.set_zoom(DEFAULT_ZOOM_LEVEL)
    }

    fn set_zoom(&mut self, zoom: u16) -> bool {
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        true
    }

    /// Render the current page at the current zoom.
    pub fn render<P>(&self, provider: &mut P) -> Result<P::Pixmap>
    where
        P: DocumentProvider<Handle = H>,
    {
        provider.render_page(&self.handle, self.page, self.zoom)
    }

    pub fn close<P>(self, provider: &mut P)
    where
        P: DocumentProvider<Handle = H>,
    {
        debug!(document = %self.document_key, "closed document");
        provider.close(self.handle);
    }
}

fn page_number(page: usize) -> Result<i64> {
    i64::try_from(page)
        .map_err(|_| PagemarkError::InvalidArgument(format!("page {} is out of range", page)))
}

/// Record `page` for a freshly opened document, releasing the handle if that
/// fails.
fn record_or_close<P, D, S>(
    provider: &mut P,
    handle: P::Handle,
    settings: &mut SettingsRepository<D, S>,
    document_key: &str,
    page: usize,
) -> Result<(P::Handle, SaveOutcome)>
where
    P: DocumentProvider,
    D: RecordBackend,
    S: RecordBackend,
{
    match page_number(page).and_then(|page| settings.record_position(document_key, page)) {
        Ok(outcome) => Ok((handle, outcome)),
        Err(e) => {
            provider.close(handle);
            Err(e)
        }
    }
}
