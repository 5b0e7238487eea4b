//! File opening and status.
//!
//! `open`/`openat` go through rustix. `stat` uses libc directly so the
//! timestamp fields can be exposed the same way on every target.

use std::mem::MaybeUninit;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::path::Path;

pub use rustix::fs::{Mode, OFlags};
use rustix::io::Errno;

use crate::{cstr, cvt};

/// Resolve relative paths against the current working directory.
pub const AT_FDCWD: BorrowedFd<'static> = rustix::fs::CWD;

/// Seconds and nanoseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timespec {
    pub sec: i64,
    pub nsec: i64,
}

/// File status, with the fields every supported platform agrees on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub dev: u64,
    pub ino: u64,
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub size: i64,
    pub blksize: i64,
    pub blocks: i64,
    pub atim: Timespec,
    pub mtim: Timespec,
    pub ctim: Timespec,
}

impl From<libc::stat> for Stat {
    #[allow(clippy::unnecessary_cast, clippy::useless_conversion)]
    fn from(st: libc::stat) -> Self {
        Self {
            dev: st.st_dev as u64,
            ino: st.st_ino as u64,
            mode: st.st_mode as u32,
            nlink: st.st_nlink as u64,
            uid: st.st_uid,
            gid: st.st_gid,
            rdev: st.st_rdev as u64,
            size: st.st_size as i64,
            blksize: st.st_blksize as i64,
            blocks: st.st_blocks as i64,
            atim: Timespec {
                sec: st.st_atime as i64,
                nsec: st.st_atime_nsec as i64,
            },
            mtim: Timespec {
                sec: st.st_mtime as i64,
                nsec: st.st_mtime_nsec as i64,
            },
            ctim: Timespec {
                sec: st.st_ctime as i64,
                nsec: st.st_ctime_nsec as i64,
            },
        }
    }
}

/// Opens `path` relative to the current directory.
pub fn open<P: AsRef<Path>>(path: P, flags: OFlags, mode: Mode) -> Result<OwnedFd, Errno> {
    rustix::fs::open(path.as_ref(), flags | OFlags::CLOEXEC, mode)
}

/// Opens `path` relative to the directory `dirfd`.
///
/// In Capsicum capability mode this is the only way to reach the filesystem,
/// and `dirfd` must carry `CAP_LOOKUP` plus whatever the open needs.
pub fn openat<Fd: AsFd, P: AsRef<Path>>(
    dirfd: Fd,
    path: P,
    flags: OFlags,
    mode: Mode,
) -> Result<OwnedFd, Errno> {
    rustix::fs::openat(dirfd, path.as_ref(), flags | OFlags::CLOEXEC, mode)
}

/// Returns the status of the file at `path`, following symlinks.
pub fn stat<P: AsRef<Path>>(path: P) -> Result<Stat, Errno> {
    let path = cstr(path.as_ref())?;
    let mut st = MaybeUninit::<libc::stat>::uninit();
    // SAFETY: path is NUL-terminated and st is a valid out pointer.
    cvt(unsafe { libc::stat(path.as_ptr(), st.as_mut_ptr()) })?;
    // SAFETY: stat succeeded and filled the buffer.
    Ok(Stat::from(unsafe { st.assume_init() }))
}

/// Returns the status of an open file.
pub fn fstat<Fd: AsFd>(fd: Fd) -> Result<Stat, Errno> {
    let mut st = MaybeUninit::<libc::stat>::uninit();
    // SAFETY: fd is a live descriptor and st is a valid out pointer.
    cvt(unsafe { libc::fstat(fd.as_fd().as_raw_fd(), st.as_mut_ptr()) })?;
    // SAFETY: fstat succeeded and filled the buffer.
    Ok(Stat::from(unsafe { st.assume_init() }))
}
