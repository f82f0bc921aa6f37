//! Native save panel for `downloadFile`.

use std::path::PathBuf;

use latchkey_bridge::SaveDialog;
use tauri::{AppHandle, Runtime};
use tauri_plugin_dialog::DialogExt;

/// [`SaveDialog`] backed by `tauri-plugin-dialog`.
///
/// Blocks until the user answers; never call it from the main thread.
pub struct NativeSaveDialog<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> NativeSaveDialog<R> {
    /// Create the adapter.
    #[must_use]
    pub const fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> SaveDialog for NativeSaveDialog<R> {
    fn choose_destination(&self, file_name: &str) -> Option<PathBuf> {
        let chosen = self
            .app
            .dialog()
            .file()
            .set_file_name(file_name)
            .set_can_create_directories(true)
            .blocking_save_file()?;
        match chosen.into_path() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("save panel returned a non-file destination: {e}");
                None
            }
        }
    }
}
