//! Process replacement and identity.

use std::ffi::CString;
use std::path::Path;

use rustix::io::Errno;

use crate::{cstr, last_errno};

/// Replaces the current process image with `path`.
///
/// `argv` and `envv` are passed as-is; `envv` entries are `KEY=VALUE` pairs.
/// On success this never returns, so the only possible result is the error
/// from `execve`.
pub fn exec<P, A, E>(path: P, argv: &[A], envv: &[E]) -> Errno
where
    P: AsRef<Path>,
    A: AsRef<str>,
    E: AsRef<str>,
{
    let Ok(path) = cstr(path.as_ref()) else {
        return Errno::INVAL;
    };
    let Ok(argv) = to_cstrings(argv) else {
        return Errno::INVAL;
    };
    let Ok(envv) = to_cstrings(envv) else {
        return Errno::INVAL;
    };

    let argv_ptrs = null_terminated(&argv);
    let envv_ptrs = null_terminated(&envv);

    tracing::debug!(path = ?path, argc = argv.len(), "exec");
    // SAFETY: all pointers reference NUL-terminated strings that outlive the
    // call, and both arrays end in a null pointer.
    unsafe { libc::execve(path.as_ptr(), argv_ptrs.as_ptr(), envv_ptrs.as_ptr()) };
    last_errno()
}

fn to_cstrings<S: AsRef<str>>(items: &[S]) -> Result<Vec<CString>, Errno> {
    items
        .iter()
        .map(|s| CString::new(s.as_ref()).map_err(|_| Errno::INVAL))
        .collect()
}

fn null_terminated(items: &[CString]) -> Vec<*const libc::c_char> {
    items
        .iter()
        .map(|s| s.as_ptr())
        .chain(std::iter::once(std::ptr::null()))
        .collect()
}

/// The calling process's ID.
pub fn getpid() -> i32 {
    rustix::process::getpid().as_raw_nonzero().get()
}

/// The calling process's real user ID.
pub fn getuid() -> u32 {
    rustix::process::getuid().as_raw()
}

/// The calling process's real group ID.
pub fn getgid() -> u32 {
    rustix::process::getgid().as_raw()
}
