//! System V shared memory.
//!
//! [`shm_attach`] maps a segment and returns a [`ShmSegment`], a byte view
//! whose length is the segment size reported by `IPC_STAT`. Attaching the
//! same id twice yields two views of the same memory.
//!
//! Mutable access is only handed out for segments attached without
//! `SHM_RDONLY`; see [`ShmSegment::as_mut_slice`].
//!
//! A segment is detached when the view is dropped; use [`shm_detach`] to
//! observe the `shmdt` result. Removing the id (`IPC_RMID`) is separate and
//! only takes effect once every attachment is gone.

use std::ops::Deref;
use std::ptr::NonNull;

use rustix::io::Errno;

use crate::{cvt, last_errno};

pub use libc::{IPC_CREAT, IPC_EXCL, IPC_PRIVATE, IPC_RMID, IPC_SET, IPC_STAT, SHM_RDONLY};
/// Kernel segment descriptor used with [`shm_ctl`].
pub type ShmidDs = libc::shmid_ds;

/// An attached shared memory segment.
#[derive(Debug)]
pub struct ShmSegment {
    ptr: NonNull<u8>,
    len: usize,
    writable: bool,
}

impl ShmSegment {
    /// Address the segment is mapped at.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// `false` if the segment was attached with `SHM_RDONLY`.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Writable view of the segment, or `None` for a read-only attachment.
    pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        if !self.writable {
            return None;
        }
        // SAFETY: ptr is a live read-write mapping of len bytes until detach,
        // and the &mut self borrow makes this view unique.
        Some(unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) })
    }
}

impl Deref for ShmSegment {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: ptr is a live mapping of len bytes until detach.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for ShmSegment {
    fn drop(&mut self) {
        // SAFETY: ptr was returned by shmat and has not been detached.
        unsafe { libc::shmdt(self.ptr.as_ptr().cast()) };
    }
}

/// Returns the id of the segment for `key`, creating it if `flags` allow.
///
/// `flags` combines `IPC_CREAT`/`IPC_EXCL` with the permission bits.
pub fn shm_get(key: libc::key_t, size: usize, flags: i32) -> Result<i32, Errno> {
    // SAFETY: shmget takes only integer arguments.
    cvt(unsafe { libc::shmget(key, size, flags) })
}

/// Attaches segment `id` at `addr` (0 lets the kernel choose).
pub fn shm_attach(id: i32, addr: usize, flags: i32) -> Result<ShmSegment, Errno> {
    // SAFETY: the kernel validates addr; a null hint is always accepted.
    let ptr = unsafe { libc::shmat(id, addr as *const libc::c_void, flags) };
    if ptr as isize == -1 {
        return Err(last_errno());
    }
    let ptr = NonNull::new(ptr.cast::<u8>()).ok_or(Errno::INVAL)?;

    let mut info = zeroed_ds();
    // SAFETY: info is a valid out buffer.
    if let Err(e) = cvt(unsafe { libc::shmctl(id, IPC_STAT, &raw mut info) }) {
        // SAFETY: ptr was just returned by shmat.
        unsafe { libc::shmdt(ptr.as_ptr().cast()) };
        return Err(e);
    }

    let writable = flags & SHM_RDONLY == 0;
    tracing::debug!(id, len = info.shm_segsz, writable, "attached shared memory");
    Ok(ShmSegment {
        ptr,
        len: info.shm_segsz as usize,
        writable,
    })
}

/// Detaches a segment, reporting the `shmdt` result.
pub fn shm_detach(segment: ShmSegment) -> Result<(), Errno> {
    let segment = std::mem::ManuallyDrop::new(segment);
    // SAFETY: ptr was returned by shmat; ManuallyDrop prevents a second detach.
    cvt(unsafe { libc::shmdt(segment.ptr.as_ptr().cast()) })?;
    Ok(())
}

/// Performs control operation `cmd` on segment `id`.
pub fn shm_ctl(id: i32, cmd: i32, buf: Option<&mut ShmidDs>) -> Result<i32, Errno> {
    let buf = buf.map_or(std::ptr::null_mut(), std::ptr::from_mut);
    // SAFETY: buf is null or a valid shmid_ds.
    cvt(unsafe { libc::shmctl(id, cmd, buf) })
}

fn zeroed_ds() -> ShmidDs {
    // SAFETY: shmid_ds is a plain C struct; all-zero is a valid value.
    unsafe { std::mem::zeroed() }
}
