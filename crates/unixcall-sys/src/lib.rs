//! Thin Unix syscall wrappers.
//!
//! Each function maps onto one kernel entry point and returns the kernel's
//! error as a [`rustix::io::Errno`]. Standard calls go through rustix where it
//! has them; everything else is a direct libc call.
//!
//! ## Modules
//!
//! - **rights** - Capsicum capability-rights encoding (`cap_rights_t`), all platforms
//! - **capsicum** - `cap_enter`, `cap_rights_limit`, `cap_rights_get` (FreeBSD)
//! - **fs** - `open`, `openat`, `stat`, `fstat`
//! - **process** - `exec` and process identity
//! - **env** - Environment get/set
//! - **system** - `uname`
//! - **shm** - System V shared memory (Linux, macOS)
//! - **clone** - `clonefile` family and `F_PREALLOCATE` (macOS)
//! - **cred** - Socket pairs and peer credentials
//! - **sysctl** - `sysctlbyname` readers (FreeBSD, macOS)
//! - **check** - Runtime detection of optional kernel features
//!
//! ## Capability rights
//!
//! A rights set is a small array of 64-bit words. Each word carries an index
//! marker in bits 57..61 and the version lives in the top two bits of word 0.
//! Once a process has entered capability mode the kernel only ever lets a
//! descriptor's rights shrink.
//!
//! # Safety
//!
//! This crate contains raw syscall wrappers. Casts between integer types
//! are unavoidable when interfacing with the kernel ABI.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

#[cfg(target_os = "freebsd")]
pub mod capsicum;
pub mod check;
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub mod clone;
pub mod cred;
pub mod env;
pub mod fs;
pub mod process;
pub mod rights;
#[cfg(any(target_os = "linux", all(target_os = "macos", target_arch = "x86_64")))]
pub mod shm;
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub mod sysctl;
pub mod system;

pub use check::{CheckError, SystemInfo, check};
pub use rights::{CapRights, RightsError};
pub use rustix::io::Errno;

/// Returns the calling thread's current `errno` as an [`Errno`].
#[inline]
pub fn last_errno() -> Errno {
    Errno::from_raw_os_error(std::io::Error::last_os_error().raw_os_error().unwrap_or(0))
}

/// Maps a libc-style return value (`-1` on failure) to a `Result`.
#[inline]
pub(crate) fn cvt(ret: libc::c_int) -> Result<libc::c_int, Errno> {
    if ret < 0 { Err(last_errno()) } else { Ok(ret) }
}

/// Converts a Rust string into a `CString`, rejecting interior NULs with `EINVAL`.
pub(crate) fn cstr(s: impl AsRef<std::ffi::OsStr>) -> Result<std::ffi::CString, Errno> {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::CString::new(s.as_ref().as_bytes()).map_err(|_| Errno::INVAL)
}
