//! System capability checking.
//!
//! Detects at runtime which optional kernel features are usable. The probe
//! runs once and the result is cached in a static `OnceLock`.
//!
//! ## Probed Features
//!
//! | Feature | Platforms | Check Method |
//! |---------|-----------|--------------|
//! | Release | all | `uname` syscall |
//! | Capsicum | FreeBSD | `cap_getmode` |
//! | System V shm | Linux, macOS x86_64 | `shmget(IPC_PRIVATE)` + `IPC_RMID` |
//!
//! ## Usage
//!
//! ```ignore
//! match check::check() {
//!     Ok(info) => println!("{} {:?}", info.sysname, info.release),
//!     Err(e) => eprintln!("system check failed: {}", e),
//! }
//! ```

use std::sync::OnceLock;

use thiserror::Error;

use crate::system::uname;

/// What the running kernel supports.
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub sysname: String,
    pub machine: String,
    pub release: (u32, u32, u32),
    pub capsicum: bool,
    pub capability_mode: bool,
    pub sysv_shm: bool,
}

/// Errors that can occur during system capability checking.
#[derive(Debug, Clone, Error)]
pub enum CheckError {
    #[error("failed to parse kernel release {0:?}")]
    ReleaseUnreadable(String),
}

static SYSTEM_INFO: OnceLock<Result<SystemInfo, CheckError>> = OnceLock::new();

/// Probe system capabilities and cache the result.
pub fn check() -> Result<&'static SystemInfo, &'static CheckError> {
    SYSTEM_INFO.get_or_init(check_impl).as_ref()
}

fn check_impl() -> Result<SystemInfo, CheckError> {
    let uts = uname();
    let release = parse_release(&uts.release)?;
    let (capsicum, capability_mode) = probe_capsicum();
    let info = SystemInfo {
        sysname: uts.sysname,
        machine: uts.machine,
        release,
        capsicum,
        capability_mode,
        sysv_shm: probe_sysv_shm(),
    };
    tracing::debug!(?info, "system check");
    Ok(info)
}

#[cfg(target_os = "freebsd")]
fn probe_capsicum() -> (bool, bool) {
    match crate::capsicum::cap_getmode() {
        Ok(mode) => (true, mode),
        Err(_) => (false, false),
    }
}

#[cfg(not(target_os = "freebsd"))]
fn probe_capsicum() -> (bool, bool) {
    (false, false)
}

#[cfg(any(target_os = "linux", all(target_os = "macos", target_arch = "x86_64")))]
fn probe_sysv_shm() -> bool {
    use crate::shm::{IPC_CREAT, IPC_PRIVATE, IPC_RMID, shm_ctl, shm_get};

    match shm_get(IPC_PRIVATE, 1, IPC_CREAT | 0o600) {
        Ok(id) => {
            if let Err(e) = shm_ctl(id, IPC_RMID, None) {
                tracing::warn!(id, error = %e, "failed to remove probe segment");
            }
            true
        }
        Err(_) => false,
    }
}

#[cfg(not(any(target_os = "linux", all(target_os = "macos", target_arch = "x86_64"))))]
fn probe_sysv_shm() -> bool {
    false
}

/// Parses `major.minor.patch` out of a kernel release string.
///
/// Each component keeps only its leading digits, so `14.0-RELEASE-p3`,
/// `6.1.0-generic` and `23.1.0` all parse. A missing patch is 0.
fn parse_release(release: &str) -> Result<(u32, u32, u32), CheckError> {
    let unreadable = || CheckError::ReleaseUnreadable(release.to_owned());
    let mut parts = release.split('.').map(leading_number);

    let major = parts.next().flatten().ok_or_else(unreadable)?;
    let minor = parts.next().flatten().ok_or_else(unreadable)?;
    let patch = parts.next().flatten().unwrap_or(0);

    Ok((major, minor, patch))
}

fn leading_number(part: &str) -> Option<u32> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}
