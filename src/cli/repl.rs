//! The interactive command loop.
//!
//! `Repl::run` reads commands until the user locks, input ends, the idle
//! timer expires or a lock is requested, then locks the session (saving
//! pending changes) before returning.

use std::time::Duration;

use crate::cli::commands::{self, Context};
use crate::cli::output;
use crate::cli::prompt::Prompt;
use crate::clipboard::ClipboardSink;
use crate::errors::{AcctMgrError, Result};
use crate::idle::{IdleTimer, LockRequest};
use crate::vault::Session;

const PROMPT: &str = "acctmgr> ";

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// `lock`, `quit` or `exit`.
    Locked,
    EndOfInput,
    IdleTimeout,
    LockRequested,
}

enum Flow {
    Continue,
    Stop(ExitReason),
}

pub struct Repl<'a> {
    session: &'a mut Session,
    prompt: &'a mut dyn Prompt,
    clipboard: &'a mut dyn ClipboardSink,
    idle: IdleTimer,
    lock_request: LockRequest,
    clipboard_clear: Duration,
    generated_len: usize,
}

impl<'a> Repl<'a> {
    pub fn new(
        session: &'a mut Session,
        prompt: &'a mut dyn Prompt,
        clipboard: &'a mut dyn ClipboardSink,
    ) -> Self {
        Self {
            session,
            prompt,
            clipboard,
            idle: IdleTimer::new(Duration::ZERO),
            lock_request: LockRequest::new(),
            clipboard_clear: Duration::ZERO,
            generated_len: 20,
        }
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle = IdleTimer::new(timeout);
        self
    }

    pub fn lock_request(mut self, request: LockRequest) -> Self {
        self.lock_request = request;
        self
    }

    /// Only used in messages; the sink does the clearing.
    pub fn clipboard_clear(mut self, after: Duration) -> Self {
        self.clipboard_clear = after;
        self
    }

    pub fn generated_len(mut self, len: usize) -> Self {
        self.generated_len = len;
        self
    }

    /// Run until the session should lock, then lock it.
    ///
    /// The session is locked on every path. A failed final save is
    /// returned as an error.
    pub fn run(mut self) -> Result<ExitReason> {
        let reason = self.read_loop();
        let locked = self.session.lock();
        let reason = reason?;
        locked?;
        Ok(reason)
    }

    fn read_loop(&mut self) -> Result<ExitReason> {
        output::info(&format!(
            "Vault unlocked ({} entries). Type 'help' for commands.",
            self.session.len()?
        ));

        loop {
            if self.lock_request.take() {
                return Ok(ExitReason::LockRequested);
            }

            let line = match self.prompt.line(PROMPT) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(ExitReason::EndOfInput),
                Err(e @ AcctMgrError::CommandFailed(_)) => {
                    output::error(&e.to_string());
                    continue;
                }
                Err(e) => return Err(e),
            };

            if self.idle.is_expired() {
                output::warning("Session timed out. Locking vault...");
                return Ok(ExitReason::IdleTimeout);
            }
            if self.lock_request.take() {
                return Ok(ExitReason::LockRequested);
            }
            self.idle.touch();

            match self.dispatch(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop(reason)) => return Ok(reason),
                Err(AcctMgrError::UserCancelled) => return Ok(ExitReason::EndOfInput),
                Err(e) => output::error(&e.to_string()),
            }
            self.idle.touch();
        }
    }

    fn dispatch(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();
        let arg1 = args.next();
        let arg2 = args.next();

        let mut ctx = Context {
            session: &mut *self.session,
            prompt: &mut *self.prompt,
            clipboard: &mut *self.clipboard,
            clipboard_clear: self.clipboard_clear,
            generated_len: self.generated_len,
        };

        match cmd {
            "" => {}
            "add" => commands::add::execute(&mut ctx)?,
            "ls" | "list" => commands::list::execute(&mut ctx, arg1)?,
            "show" => commands::show::execute(&mut ctx, arg1)?,
            "cp" | "copy" => commands::copy::execute(&mut ctx, arg1, arg2)?,
            "edit" => commands::edit::execute(&mut ctx, arg1)?,
            "rm" | "delete" => commands::delete::execute(&mut ctx, arg1)?,
            "search" | "find" => commands::search::execute(&mut ctx, rest)?,
            "gen" => commands::generate::execute(&mut ctx, arg1)?,
            "save" => {
                if ctx.session.is_modified() {
                    ctx.session.save()?;
                    output::success("Vault saved.");
                } else {
                    output::info("No changes to save.");
                }
            }
            "lock" | "quit" | "exit" => return Ok(Flow::Stop(ExitReason::Locked)),
            "help" | "?" => output::print_help(),
            other => output::warning(&format!(
                "Unknown command: {other} (type 'help' for commands)"
            )),
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompt::LinePrompt;
    use crate::clipboard::MemorySink;
    use crate::crypto::KdfParams;
    use crate::vault::{Field, RecordFields};
    use tempfile::TempDir;

    const PASSWORD: &[u8] = b"correct horse";

    fn new_session(dir: &TempDir, names: &[&str]) -> Session {
        let mut session = Session::with_params(dir.path().join("vault.dat"), KdfParams::minimum());
        session.create(PASSWORD).unwrap();
        for name in names {
            let mut fields = RecordFields::named(*name);
            fields.secret = format!("{name}-pw");
            fields.username = format!("{name}-user");
            session.add(fields).unwrap();
        }
        session
    }

    fn run_script(session: &mut Session, script: &str, sink: &mut MemorySink) -> ExitReason {
        let mut prompt = LinePrompt::new(script.as_bytes());
        Repl::new(session, &mut prompt, sink)
            .generated_len(20)
            .run()
            .unwrap()
    }

    fn reopen(session: &mut Session) {
        assert!(!session.is_unlocked());
        session.open(PASSWORD).unwrap();
    }

    fn names(session: &Session) -> Vec<String> {
        session
            .entries()
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    #[test]
    fn add_then_lock_persists_entry() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &[]);
        let mut sink = MemorySink::new();

        let script = "add\nGitHub\ndev\noctocat\nhunter2\nhttps://github.com\n\nwork account\nlock\n";
        assert_eq!(
            run_script(&mut session, script, &mut sink),
            ExitReason::Locked
        );

        reopen(&mut session);
        let record = session.get(0).unwrap();
        assert_eq!(record.name(), "GitHub");
        assert_eq!(record.category(), "dev");
        assert_eq!(record.username(), "octocat");
        assert_eq!(record.get(Field::Secret), "hunter2");
        assert_eq!(record.get(Field::Url), "https://github.com");
        assert_eq!(record.get(Field::KeyFile), "");
        assert_eq!(record.get(Field::Notes), "work account");
    }

    #[test]
    fn add_with_generated_password() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &[]);
        let mut sink = MemorySink::new();

        run_script(&mut session, "add\nmail\n\n\ng\n\n\n\nquit\n", &mut sink);

        reopen(&mut session);
        let record = session.get(0).unwrap();
        assert_eq!(record.category(), "general");
        assert_eq!(record.get(Field::Secret).len(), 24);
    }

    #[test]
    fn rm_requires_yes_and_preserves_order() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &["A", "B", "C"]);
        let mut sink = MemorySink::new();

        run_script(&mut session, "rm 2\ny\nrm 2\nyes\nexit\n", &mut sink);

        reopen(&mut session);
        assert_eq!(names(&session), vec!["A", "C"]);
    }

    #[test]
    fn eof_locks_and_saves() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &["A", "B"]);
        let mut sink = MemorySink::new();

        let reason = run_script(&mut session, "rm 1\nyes\n", &mut sink);
        assert_eq!(reason, ExitReason::EndOfInput);

        reopen(&mut session);
        assert_eq!(names(&session), vec!["B"]);
    }

    #[test]
    fn eof_in_the_middle_of_add_adds_nothing() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &[]);
        let mut sink = MemorySink::new();

        let reason = run_script(&mut session, "add\nhalf-typed\n", &mut sink);
        assert_eq!(reason, ExitReason::EndOfInput);

        reopen(&mut session);
        assert!(session.is_empty().unwrap());
    }

    #[test]
    fn cp_sends_field_to_clipboard() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &["bank"]);
        let mut sink = MemorySink::new();

        run_script(&mut session, "cp 1 pass\ncp 1 user\n", &mut sink);
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.last(), Some("bank-user"));
    }

    #[test]
    fn cp_rejects_unknown_field_and_bad_number() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &["bank"]);
        let mut sink = MemorySink::new();

        run_script(&mut session, "cp 1 notes\ncp 9 pass\ncp\n", &mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn edit_keeps_blank_answers_and_changes_the_rest() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &["mail"]);
        let mut sink = MemorySink::new();

        // name, category, username, password, url, ssh, notes
        run_script(&mut session, "edit 1\n\n\nnew-user\n\n\n\nrotated\n", &mut sink);

        reopen(&mut session);
        let record = session.get(0).unwrap();
        assert_eq!(record.name(), "mail");
        assert_eq!(record.username(), "new-user");
        assert_eq!(record.get(Field::Secret), "mail-pw");
        assert_eq!(record.get(Field::Notes), "rotated");
    }

    #[test]
    fn invalid_edit_leaves_entry_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &["mail"]);
        let mut sink = MemorySink::new();

        let long_category = "c".repeat(40);
        let script = format!("edit 1\n\n{long_category}\nnew-user\n\n\n\n\n");
        run_script(&mut session, &script, &mut sink);

        reopen(&mut session);
        let record = session.get(0).unwrap();
        assert_eq!(record.category(), "general");
        assert_eq!(record.username(), "mail-user");
    }

    #[test]
    fn gen_copies_when_confirmed() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &[]);
        let mut sink = MemorySink::new();

        run_script(&mut session, "gen 12\ny\ngen 500\nn\ngen\nY\n", &mut sink);
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.last().map(str::len), Some(20));
    }

    #[test]
    fn gen_clamps_short_lengths() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &[]);
        let mut sink = MemorySink::new();

        run_script(&mut session, "gen 3\ny\n", &mut sink);
        assert_eq!(sink.last().map(str::len), Some(8));
    }

    #[test]
    fn unknown_and_read_only_commands_keep_running() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &["bank", "mail"]);
        let mut sink = MemorySink::new();

        let script = "frobnicate\nhelp\n?\nls\nls general\nshow 2\nsearch BANK\nfind\n\nlock\n";
        assert_eq!(
            run_script(&mut session, script, &mut sink),
            ExitReason::Locked
        );
    }

    #[test]
    fn invalid_utf8_line_is_reported_and_session_continues() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &[]);
        let mut sink = MemorySink::new();
        let mut prompt = LinePrompt::new(&b"search \xff\xfe\n\xff\nadd\nkept\n\n\n\n\n\n\nlock\n"[..]);

        let reason = Repl::new(&mut session, &mut prompt, &mut sink)
            .run()
            .unwrap();

        assert_eq!(reason, ExitReason::Locked);
        reopen(&mut session);
        assert_eq!(names(&session), vec!["kept"]);
    }

    #[test]
    fn pending_lock_request_stops_before_reading() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &[]);
        let mut sink = MemorySink::new();
        let mut prompt = LinePrompt::new("add\nnever\n\n\n\n\n\n\n".as_bytes());

        let request = LockRequest::new();
        request.request();
        let reason = Repl::new(&mut session, &mut prompt, &mut sink)
            .lock_request(request)
            .run()
            .unwrap();

        assert_eq!(reason, ExitReason::LockRequested);
        reopen(&mut session);
        assert!(session.is_empty().unwrap());
    }

    #[test]
    fn idle_timeout_discards_late_command() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &["A"]);
        let mut sink = MemorySink::new();
        let mut prompt = LinePrompt::new("rm 1\nyes\n".as_bytes());

        let repl = Repl::new(&mut session, &mut prompt, &mut sink)
            .idle_timeout(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(repl.run().unwrap(), ExitReason::IdleTimeout);

        reopen(&mut session);
        assert_eq!(names(&session), vec!["A"]);
    }

    #[test]
    fn explicit_save_writes_without_locking_first() {
        let dir = TempDir::new().unwrap();
        let mut session = new_session(&dir, &[]);
        session.save().unwrap();
        let path = session.path().to_path_buf();
        let before = std::fs::read(&path).unwrap();
        let mut sink = MemorySink::new();

        run_script(&mut session, "add\nx\n\n\n\n\n\n\nsave\n", &mut sink);
        assert_ne!(std::fs::read(&path).unwrap(), before);
    }
}
