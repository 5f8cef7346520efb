//! System clipboard access for `/copy`.

use arboard::Clipboard;

/// Lazily opened system clipboard.
///
/// The handle is kept for the REPL's lifetime; on X11 the copied text is
/// only served while the owning handle is alive.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn copy(&mut self, text: &str) -> Result<(), String> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new().map_err(|error| error.to_string())?);
        }

        self.clipboard
            .as_mut()
            .ok_or_else(|| "clipboard unavailable".to_string())?
            .set_text(text.to_string())
            .map_err(|error| error.to_string())
    }
}
