//! System identification.

use std::ffi::CStr;

/// Owned copy of `struct utsname`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utsname {
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

/// Returns the kernel's identification strings.
pub fn uname() -> Utsname {
    let uts = rustix::system::uname();
    Utsname {
        sysname: lossy(uts.sysname()),
        nodename: lossy(uts.nodename()),
        release: lossy(uts.release()),
        version: lossy(uts.version()),
        machine: lossy(uts.machine()),
    }
}

fn lossy(s: &CStr) -> String {
    s.to_string_lossy().into_owned()
}
