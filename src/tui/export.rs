use anyhow::{Context, Result};
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

use super::state::UiState;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Text summary of the dashboard currently on screen.
pub fn summary_text(state: &UiState) -> Result<String> {
    let result = state
        .last_result
        .as_ref()
        .context("no analysis result to copy")?;
    let summary = crate::text_summary::build_text_summary(
        &state.dashboard,
        result,
        state.completed_at.as_deref(),
    )?;
    Ok(summary.to_text())
}

/// Copy the current summary and report the outcome in the status line.
pub fn copy_summary(state: &mut UiState) {
    state.info = match summary_text(state).and_then(|text| copy_to_clipboard(&text)) {
        Ok(()) => "Summary copied to clipboard".into(),
        Err(e) => format!("Copy failed: {e:#}"),
    };
}

/// Initialize the clipboard manager thread if not already initialized.
/// Each clipboard instance is kept alive long enough for clipboard managers to read it.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue text for the clipboard without blocking the UI thread.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::alice;
    use crate::render::render;

    #[test]
    fn summary_requires_a_result() {
        let state = UiState::default();
        assert!(summary_text(&state).is_err());
    }

    #[test]
    fn summary_uses_rendered_dashboard() {
        let mut state = UiState::default();
        let result = alice();
        render(&result).unwrap().apply_to(&mut state.dashboard);
        state.last_result = Some(result);
        let text = summary_text(&state).unwrap();
        assert!(text.starts_with("Alice | ID: S1 | GPA: 3.8"));
    }
}
