use crate::app::BinDiffApp;
use bindifflib::Side;
use std::path::Path;

impl BinDiffApp {
    /// Map a file from disk into one pane.
    /// If the file cannot be opened, the pane keeps what it showed before and an error
    /// message is displayed. If only the diff map cannot be allocated, the file is still
    /// shown (without differences) next to the error message.
    pub(crate) fn load_file(&mut self, side: Side, path: &Path) {
        // Skip re-opening the file that is already shown
        if self
            .session
            .source(side)
            .is_some_and(|file| file.path() == path)
        {
            return;
        }

        if let Err(err) = self.session.open(side, path) {
            if err.disables_diffing() {
                // File is shown, only the comparison is off
                log::warn!("Opened {} without diffing: {err}", path.display());
                self.notice = Some("Diffing disabled".to_string());
            } else {
                log::error!("Failed to open {}: {err}", path.display());
            }
            self.error.borrow_mut().replace(err.to_string());
            return;
        }

        self.notice = self
            .session
            .diff_disabled_reason()
            .map(|reason| format!("Diffing disabled: {reason}"));
    }

    /// Close the file shown in one pane
    pub(crate) fn close_file(&mut self, side: Side) {
        if let Some(file) = self.session.unload(side) {
            log::info!("Closed {}", file.path().display());
            self.notice = None;
        }
    }
}
