//! Page pinning and core dump suppression.
//!
//! - `lock` / `unlock` wrap `mlock(2)` / `munlock(2)` for a single buffer so
//!   key material is never written to swap while it is resident.
//! - `disable_core_dumps` sets `RLIMIT_CORE` to 0 so a crash cannot leave
//!   plaintext records in a core file.
//!
//! Everything here is best-effort: callers log failures and carry on.
//! On non-Unix platforms the functions are no-ops.

use std::io;

/// Pin the pages backing `region` into RAM.
#[cfg(unix)]
pub fn lock(region: &[u8]) -> io::Result<()> {
    if region.is_empty() {
        return Ok(());
    }
    // SAFETY: `mlock` only changes the residency of the pages backing the
    // slice. The pointer and length come from a live borrowed slice, so the
    // range is mapped for the duration of the call. No memory is read or
    // written.
    #[allow(unsafe_code)]
    let rc = unsafe { libc::mlock(region.as_ptr().cast(), region.len()) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Release a pin taken with `lock`.
#[cfg(unix)]
pub fn unlock(region: &[u8]) -> io::Result<()> {
    if region.is_empty() {
        return Ok(());
    }
    // SAFETY: same argument as `lock`; `munlock` on a range that was never
    // locked is harmless.
    #[allow(unsafe_code)]
    let rc = unsafe { libc::munlock(region.as_ptr().cast(), region.len()) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Set `RLIMIT_CORE` to 0 for this process.
#[cfg(unix)]
pub fn disable_core_dumps() -> io::Result<()> {
    // SAFETY: `setrlimit` receives a valid, fully initialised `rlimit`.
    // It only affects the kernel's willingness to write core files.
    #[allow(unsafe_code)]
    let rc = unsafe {
        let rlim = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        libc::setrlimit(libc::RLIMIT_CORE, &rlim)
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub fn lock(_region: &[u8]) -> io::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
pub fn unlock(_region: &[u8]) -> io::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
pub fn disable_core_dumps() -> io::Result<()> {
    Ok(())
}
