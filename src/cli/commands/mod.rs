//! Handlers for the interactive commands.
//!
//! Each handler takes a `Context` borrowed from the REPL: the open session,
//! the input source and the clipboard. Handlers print their own output and
//! return an error only for failures the REPL should report.

pub mod add;
pub mod copy;
pub mod delete;
pub mod edit;
pub mod generate;
pub mod list;
pub mod search;
pub mod show;

use std::time::Duration;

use zeroize::Zeroizing;

use crate::cli::prompt::Prompt;
use crate::clipboard::ClipboardSink;
use crate::crypto::generate::{generate_password, ENTRY_PASSWORD_LEN};
use crate::errors::{AcctMgrError, Result};
use crate::vault::Session;

/// Everything a command handler may touch.
pub struct Context<'a> {
    pub session: &'a mut Session,
    pub prompt: &'a mut dyn Prompt,
    pub clipboard: &'a mut dyn ClipboardSink,
    pub clipboard_clear: Duration,
    pub generated_len: usize,
}

impl Context<'_> {
    /// Read a line, treating end of input as cancellation.
    pub(crate) fn ask(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        self.prompt
            .line(prompt)?
            .ok_or(AcctMgrError::UserCancelled)
    }

    /// Read a password field. `g` generates one; an empty answer is `None`.
    pub(crate) fn ask_password(&mut self, prompt: &str) -> Result<Option<Zeroizing<String>>> {
        let answer = self
            .prompt
            .secret(prompt)?
            .ok_or(AcctMgrError::UserCancelled)?;

        let trimmed = answer.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed == "g" {
            let generated = generate_password(ENTRY_PASSWORD_LEN);
            crate::cli::output::info(&format!("Generated: {}", generated.as_str()));
            return Ok(Some(generated));
        }
        Ok(Some(answer))
    }

    pub(crate) fn clipboard_note(&self) -> String {
        if self.clipboard_clear.is_zero() {
            String::new()
        } else {
            format!(" (clears in {}s)", self.clipboard_clear.as_secs())
        }
    }
}

/// Parse a 1-based entry number from user input into a 0-based index.
pub(crate) fn parse_entry_number(arg: Option<&str>, usage: &str, count: usize) -> Result<usize> {
    let arg = arg.ok_or_else(|| AcctMgrError::CommandFailed(format!("Usage: {usage}")))?;
    match arg.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(AcctMgrError::CommandFailed(format!(
            "Invalid entry number '{arg}' (vault has {count} entries)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompt::LinePrompt;
    use crate::clipboard::MemorySink;

    #[test]
    fn entry_numbers_are_one_based() {
        assert_eq!(parse_entry_number(Some("1"), "show <n>", 3).unwrap(), 0);
        assert_eq!(parse_entry_number(Some("3"), "show <n>", 3).unwrap(), 2);
    }

    #[test]
    fn entry_number_out_of_range_or_garbage() {
        assert!(parse_entry_number(Some("0"), "show <n>", 3).is_err());
        assert!(parse_entry_number(Some("4"), "show <n>", 3).is_err());
        assert!(parse_entry_number(Some("two"), "show <n>", 3).is_err());
    }

    #[test]
    fn missing_entry_number_shows_usage() {
        match parse_entry_number(None, "rm <n>", 3) {
            Err(AcctMgrError::CommandFailed(msg)) => assert_eq!(msg, "Usage: rm <n>"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn answers_stay_in_wiped_buffers_until_cancelled() {
        let mut session = Session::new("unused-vault.dat");
        let mut prompt = LinePrompt::new("  octocat  \n".as_bytes());
        let mut sink = MemorySink::new();
        let mut ctx = Context {
            session: &mut session,
            prompt: &mut prompt,
            clipboard: &mut sink,
            clipboard_clear: Duration::ZERO,
            generated_len: 20,
        };

        let answer: Zeroizing<String> = ctx.ask("Username: ").unwrap();
        assert_eq!(answer.trim(), "octocat");
        assert!(matches!(
            ctx.ask("URL: "),
            Err(AcctMgrError::UserCancelled)
        ));
    }
}
