//! Host capabilities the handlers act through.
//!
//! The clipboard, popover, save dialog and filesystem are shared OS state.
//! Handlers only see these traits; the Tauri shell provides the real
//! implementations and tests provide recording fakes.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from host capabilities.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    /// Clipboard read or write failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),
    /// The popover could not be shown.
    #[error("popover error: {0}")]
    Popover(String),
}

/// Plain-text system clipboard.
pub trait Clipboard: Send + Sync {
    /// First plain-text item on the clipboard, if any.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Clipboard`] if the clipboard cannot be read.
    fn read_text(&self) -> Result<Option<String>, HostError>;

    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Clipboard`] if the clipboard cannot be written.
    fn write_text(&self, text: &str) -> Result<(), HostError>;
}

/// The extension's toolbar popover.
pub trait Popover: Send + Sync {
    /// Show the popover.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Popover`] if there is no window to anchor to.
    fn show_popover(&self) -> Result<(), HostError>;
}

/// Modal save dialog.
pub trait SaveDialog: Send + Sync {
    /// Ask the user where to save `file_name`. `None` when cancelled.
    fn choose_destination(&self, file_name: &str) -> Option<PathBuf>;
}

/// Destination for downloaded files.
pub trait FileSink: Send + Sync {
    /// Create `path` if absent, then overwrite it with `data`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write_file(&self, path: &Path, data: &[u8]) -> std::io::Result<()>;
}

/// [`FileSink`] writing to the local filesystem.
pub struct LocalFileSink;

impl FileSink for LocalFileSink {
    fn write_file(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        if !path.exists() {
            fs::File::create(path)?;
        }
        fs::write(path, data)
    }
}
