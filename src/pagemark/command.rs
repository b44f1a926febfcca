//! Named commands the viewer accepts from its local command listener.
//!
//! The listener itself lives in the host. It hands over either a bare name
//! (`zoom_in`) or the request path it received (`/zoom_in?src=deck`), and
//! [`ViewerCommand`] turns that into something the viewer can dispatch on.

use crate::error::{PagemarkError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerCommand {
    NextPage,
    PrevPage,
    ZoomIn,
    ZoomOut,
    Fullscreen,
    NextTab,
    PrevTab,
}

impl ViewerCommand {
    pub const ALL: [ViewerCommand; 7] = [
        ViewerCommand::NextPage,
        ViewerCommand::PrevPage,
        ViewerCommand::ZoomIn,
        ViewerCommand::ZoomOut,
        ViewerCommand::Fullscreen,
        ViewerCommand::NextTab,
        ViewerCommand::PrevTab,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewerCommand::NextPage => "next",
            ViewerCommand::PrevPage => "prev",
            ViewerCommand::ZoomIn => "zoom_in",
            ViewerCommand::ZoomOut => "zoom_out",
            ViewerCommand::Fullscreen => "fullscreen",
            ViewerCommand::NextTab => "next_tab",
            ViewerCommand::PrevTab => "prev_tab",
        }
    }

    /// Parse the path of a listener request, ignoring slashes, query and
    /// fragment.
    pub fn from_request_path(path: &str) -> Result<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        path.trim_matches('/').parse()
    }
}

impl fmt::Display for ViewerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewerCommand {
    type Err = PagemarkError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        ViewerCommand::ALL
            .into_iter()
            .find(|command| command.as_str() == name)
            .ok_or_else(|| PagemarkError::InvalidArgument(format!("Unknown command: {}", name)))
    }
}
