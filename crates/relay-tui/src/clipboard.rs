//! Clipboard support.
//!
//! Tries the OSC 52 escape sequence first (works over SSH), then the system
//! clipboard via `arboard`.

use std::io::Write;

use base64::Engine;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("OSC 52 clipboard failed: {0}")]
    Osc52(#[source] std::io::Error),
    #[error("System clipboard failed: {0}")]
    System(#[source] arboard::Error),
}

/// Copies `text` to the clipboard.
pub fn copy(text: &str) -> Result<(), ClipboardError> {
    if copy_osc52(text).is_ok() {
        return Ok(());
    }
    copy_system(text)
}

/// `ESC ] 52 ; c ; <base64> ESC \`, intercepted by the terminal.
fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    format!("\x1b]52;c;{encoded}\x1b\\")
}

fn copy_osc52(text: &str) -> Result<(), ClipboardError> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(osc52_sequence(text).as_bytes())
        .map_err(ClipboardError::Osc52)?;
    stdout.flush().map_err(ClipboardError::Osc52)
}

fn copy_system(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = arboard::Clipboard::new().map_err(ClipboardError::System)?;
    clipboard.set_text(text).map_err(ClipboardError::System)
}
