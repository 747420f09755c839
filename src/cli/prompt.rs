//! Line and hidden input for the interactive loop.
//!
//! Commands read input through the `Prompt` trait so the REPL can be
//! driven by a script in tests. `LinePrompt::stdin()` is the terminal
//! implementation: plain lines from stdin, and hidden input through
//! `dialoguer` when stdin is a TTY.

use std::io::{self, BufRead, IsTerminal, StdinLock, Write};

use zeroize::{Zeroize, Zeroizing};

use crate::errors::{AcctMgrError, Result};

/// Source of user input. `Ok(None)` means end of input.
pub trait Prompt {
    /// Read one line, shown as typed.
    fn line(&mut self, prompt: &str) -> Result<Option<Zeroizing<String>>>;

    /// Read one line without echo.
    fn secret(&mut self, prompt: &str) -> Result<Option<Zeroizing<String>>>;
}

/// `Prompt` over any buffered reader.
pub struct LinePrompt<R> {
    reader: R,
    hidden_tty: bool,
}

impl LinePrompt<StdinLock<'static>> {
    /// Read from the process's stdin.
    pub fn stdin() -> Self {
        let stdin = io::stdin();
        let hidden_tty = stdin.is_terminal();
        Self {
            reader: stdin.lock(),
            hidden_tty,
        }
    }
}

impl<R: BufRead> LinePrompt<R> {
    /// Read from `reader`; secrets are read as plain lines.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            hidden_tty: false,
        }
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<Zeroizing<String>>> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut buf = Zeroizing::new(Vec::with_capacity(256));
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }

        // The whole line has been consumed, so a bad line never leaks into
        // the next read.
        match String::from_utf8(std::mem::take(&mut *buf)) {
            Ok(line) => Ok(Some(Zeroizing::new(line))),
            Err(e) => {
                e.into_bytes().zeroize();
                Err(AcctMgrError::CommandFailed(
                    "input is not valid UTF-8; line ignored".into(),
                ))
            }
        }
    }
}

impl<R: BufRead> Prompt for LinePrompt<R> {
    fn line(&mut self, prompt: &str) -> Result<Option<Zeroizing<String>>> {
        self.read_line(prompt)
    }

    fn secret(&mut self, prompt: &str) -> Result<Option<Zeroizing<String>>> {
        if !self.hidden_tty {
            return self.read_line(prompt);
        }

        let prompt = prompt.trim_end().trim_end_matches(':');
        let value = dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| AcctMgrError::CommandFailed(format!("password prompt: {e}")))?;
        Ok(Some(Zeroizing::new(value)))
    }
}
