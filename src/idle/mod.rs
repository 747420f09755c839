//! Idle timeout and lock requests for the interactive loop.
//!
//! Both are observed by the REPL between commands only; neither touches the
//! vault directly. The SIGINT/SIGTERM handler just raises a flag. A second
//! signal before the flag is handled exits the process immediately.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tracks time since the last user activity.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    timeout: Option<Duration>,
    last_activity: Instant,
}

impl IdleTimer {
    /// A zero timeout disables the timer.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: (!timeout.is_zero()).then_some(timeout),
            last_activity: Instant::now(),
        }
    }

    /// Record activity now.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        match self.timeout {
            Some(timeout) => now.saturating_duration_since(self.last_activity) >= timeout,
            None => false,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Set by the signal handler; shared by every `LockRequest` that observes
/// signals.
static SIGNALLED: AtomicBool = AtomicBool::new(false);

/// A cooperative "please lock now" flag.
#[derive(Debug, Clone, Default)]
pub struct LockRequest {
    flag: Arc<AtomicBool>,
    observe_signals: bool,
}

impl LockRequest {
    /// A flag raised only through `request`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that is also raised by SIGINT and SIGTERM.
    pub fn from_signals() -> io::Result<Self> {
        install_handlers()?;
        Ok(Self {
            flag: Arc::new(AtomicBool::new(false)),
            observe_signals: true,
        })
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether a lock was requested. Clears the request.
    pub fn take(&self) -> bool {
        let local = self.flag.swap(false, Ordering::SeqCst);
        let signalled = self.observe_signals && SIGNALLED.swap(false, Ordering::SeqCst);
        local || signalled
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
extern "C" fn on_signal(_sig: libc::c_int) {
    const MSG: &[u8] = b"\nLock requested; press Enter to lock and exit (again to quit now).\n";
    if SIGNALLED.swap(true, Ordering::SeqCst) {
        // SAFETY: `_exit` is async-signal-safe and never returns.
        unsafe { libc::_exit(130) };
    }
    // SAFETY: `write` is async-signal-safe; MSG is a static buffer.
    unsafe {
        libc::write(libc::STDERR_FILENO, MSG.as_ptr().cast(), MSG.len());
    }
}

#[cfg(unix)]
fn install_handlers() -> io::Result<()> {
    for sig in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: the `sigaction` struct is zero-initialised and then given a
        // valid handler; the handler only touches an atomic and calls
        // async-signal-safe functions.
        #[allow(unsafe_code)]
        let rc = unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
            action.sa_flags = libc::SA_RESTART;
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(sig, &action, std::ptr::null_mut())
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn install_handlers() -> io::Result<()> {
    Ok(())
}
