//! Capsicum capability mode (FreeBSD).
//!
//! After [`cap_enter`] the process loses access to global namespaces: paths
//! can only be resolved relative to a directory descriptor through
//! [`openat`](crate::fs::openat), and every descriptor is bounded by the
//! rights attached to it.
//!
//! ## Errors
//!
//! | errno | When |
//! |-------|------|
//! | `ECAPMODE` | A global-namespace call (`open`, `mkdir`, ...) in capability mode |
//! | `ENOTCAPABLE` | The descriptor lacks a right the call needs |
//!
//! ## Important
//!
//! - `cap_enter` cannot be undone and is inherited by children
//! - `cap_rights_limit` can only remove rights; asking for more fails with `ENOTCAPABLE`

use std::os::fd::{AsFd, AsRawFd};

use rustix::io::Errno;

use crate::rights::{CAP_RIGHTS_VERSION, CapRights};
use crate::{cvt, last_errno};

/// Operation not permitted in capability mode.
pub const ECAPMODE: Errno = Errno::CAPMODE;
/// Capabilities insufficient.
pub const ENOTCAPABLE: Errno = Errno::NOTCAPABLE;

// CapRights has the layout of cap_rights_t.
const _: () = assert!(size_of::<CapRights>() == size_of::<libc::cap_rights_t>());

/// Places the calling process into capability mode.
pub fn cap_enter() -> Result<(), Errno> {
    tracing::debug!("entering capability mode");
    // SAFETY: cap_enter takes no arguments.
    cvt(unsafe { libc::cap_enter() })?;
    Ok(())
}

/// Returns `true` if the process is in capability mode.
pub fn cap_getmode() -> Result<bool, Errno> {
    let mut mode: libc::c_uint = 0;
    // SAFETY: mode is a valid out pointer.
    cvt(unsafe { libc::cap_getmode(&raw mut mode) })?;
    Ok(mode != 0)
}

/// Reduces the operations permitted on `fd` to at most `rights`.
pub fn cap_rights_limit<Fd: AsFd>(fd: Fd, rights: &CapRights) -> Result<(), Errno> {
    let fd = fd.as_fd().as_raw_fd();
    tracing::debug!(fd, rights = %rights, "limiting descriptor rights");
    // SAFETY: rights points to a valid cap_rights_t for the duration of the call.
    cvt(unsafe { libc::cap_rights_limit(fd, std::ptr::from_ref(rights).cast()) })?;
    Ok(())
}

/// Returns the rights currently attached to `fd`.
pub fn cap_rights_get<Fd: AsFd>(fd: Fd) -> Result<CapRights, Errno> {
    let mut rights = CapRights::empty();
    // SAFETY: rights is a valid cap_rights_t of the version we pass.
    let ret = unsafe {
        libc::__cap_rights_get(
            CAP_RIGHTS_VERSION as libc::c_int,
            fd.as_fd().as_raw_fd(),
            (&raw mut rights).cast::<libc::cap_rights_t>(),
        )
    };
    if ret < 0 { Err(last_errno()) } else { Ok(rights) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rights::{CAP_LOOKUP, CAP_READ, CAP_WRITE};

    #[test]
    fn not_in_capability_mode_by_default() {
        assert_eq!(cap_getmode(), Ok(false));
    }

    #[test]
    fn fresh_descriptor_has_all_rights() {
        let dir = tempfile::tempdir().unwrap();
        let fd = std::fs::File::open(dir.path()).unwrap();
        let rights = cap_rights_get(&fd).unwrap();
        assert!(rights.is_valid());
        assert!(rights.is_set(&[CAP_READ, CAP_WRITE, CAP_LOOKUP]).unwrap());
    }

    #[test]
    fn limit_then_widen_fails() {
        let dir = tempfile::tempdir().unwrap();
        let fd = std::fs::File::open(dir.path()).unwrap();

        let narrow = CapRights::init(&[CAP_READ, CAP_LOOKUP]).unwrap();
        cap_rights_limit(&fd, &narrow).unwrap();
        let got = cap_rights_get(&fd).unwrap();
        assert!(got.is_set(&[CAP_READ, CAP_LOOKUP]).unwrap());
        assert!(!got.is_set(&[CAP_WRITE]).unwrap());

        let wider = CapRights::init(&[CAP_READ, CAP_LOOKUP, CAP_WRITE]).unwrap();
        assert_eq!(cap_rights_limit(&fd, &wider), Err(ENOTCAPABLE));
    }
}
