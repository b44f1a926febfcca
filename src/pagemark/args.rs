use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pagemark")]
#[command(about = "Inspect and maintain a document viewer's reading state", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show every setting, recent folder and recorded position
    Show,

    /// Print the last recorded page of a document
    #[command(alias = "pos")]
    Position {
        /// Document key (usually its absolute path)
        document: String,
    },

    /// Record the page last viewed in a document
    Record {
        /// Document key (usually its absolute path)
        document: String,

        /// Zero-based page number
        #[arg(allow_negative_numbers = true)]
        page: i64,
    },

    /// List recent folders, most recent first
    Folders,

    /// Mark a folder as most recently used
    Folder { path: String },

    /// Print one device setting
    Get {
        /// Setting key (e.g. zoom_level)
        key: String,
    },

    /// Change one device setting
    Set {
        /// Setting key (e.g. zoom_level)
        key: String,

        /// New value (hex or `none` for window blobs)
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Print where the device and shared records live
    Paths,
}
