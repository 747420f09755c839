//! Clipboard sink used by `cp` and `gen`.
//!
//! The vault core hands a plaintext field to a `ClipboardSink` exactly
//! once; clearing it afterwards is the sink's job. `ArboardSink` puts the
//! value on the system clipboard and clears it after a timeout, but only
//! if the clipboard still holds that value.

use std::thread;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::errors::{AcctMgrError, Result};

/// Destination for copied secrets.
pub trait ClipboardSink {
    fn set(&mut self, value: &str) -> Result<()>;
}

/// System clipboard via `arboard`, with a timed clear.
///
/// The clipboard handle is kept open for the life of the sink; on X11 and
/// Wayland the copied text is served by this process and would vanish with
/// the last handle. Dropping the sink clears a value that is still pending.
pub struct ArboardSink {
    clear_after: Duration,
    clipboard: Option<arboard::Clipboard>,
    pending: Option<Zeroizing<String>>,
}

impl ArboardSink {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            clear_after,
            clipboard: None,
            pending: None,
        }
    }

    pub fn clear_after(&self) -> Duration {
        self.clear_after
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard> {
        let clipboard = match self.clipboard.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()
                .map_err(|e| AcctMgrError::ClipboardError(e.to_string()))?,
        };
        Ok(self.clipboard.insert(clipboard))
    }
}

impl ClipboardSink for ArboardSink {
    fn set(&mut self, value: &str) -> Result<()> {
        self.handle()?
            .set_text(value.to_owned())
            .map_err(|e| AcctMgrError::ClipboardError(e.to_string()))?;

        if self.clear_after.is_zero() {
            return Ok(());
        }

        self.pending = Some(Zeroizing::new(value.to_owned()));
        let copied = Zeroizing::new(value.to_owned());
        let delay = self.clear_after;
        thread::spawn(move || {
            thread::sleep(delay);
            match arboard::Clipboard::new() {
                Ok(mut clipboard) => clear_if_unchanged(&mut clipboard, &copied),
                Err(e) => tracing::warn!(error = %e, "could not open clipboard to clear it"),
            }
        });
        Ok(())
    }
}

impl Drop for ArboardSink {
    fn drop(&mut self) {
        if let (Some(clipboard), Some(pending)) = (self.clipboard.as_mut(), self.pending.take()) {
            clear_if_unchanged(clipboard, &pending);
        }
    }
}

fn clear_if_unchanged(clipboard: &mut arboard::Clipboard, copied: &str) {
    let current = match clipboard.get_text() {
        Ok(text) => Zeroizing::new(text),
        Err(e) => {
            tracing::debug!(error = %e, "could not read clipboard before clearing");
            return;
        }
    };
    if current.as_str() != copied {
        return;
    }
    if let Err(e) = clipboard.clear() {
        tracing::warn!(error = %e, "failed to clear clipboard");
    }
}

/// Sink that keeps copied values in memory. Used by tests and by
/// embedders without a system clipboard.
#[derive(Debug, Default)]
pub struct MemorySink {
    values: Vec<Zeroizing<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently copied value.
    pub fn last(&self) -> Option<&str> {
        self.values.last().map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ClipboardSink for MemorySink {
    fn set(&mut self, value: &str) -> Result<()> {
        self.values.push(Zeroizing::new(value.to_owned()));
        Ok(())
    }
}
