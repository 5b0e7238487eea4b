//! Copy-on-write file cloning and space preallocation (macOS).
//!
//! `clonefile` is only supported on APFS. Other filesystems report `ENOTSUP`,
//! and callers are expected to fall back to a plain copy.

use std::os::fd::{AsFd, AsRawFd};
use std::path::Path;

use rustix::io::Errno;

use crate::{cstr, cvt};

/// Don't follow a symlink at the source.
pub const CLONE_NOFOLLOW: u32 = 0x0001;
/// Don't copy ownership information from the source.
pub const CLONE_NOOWNERCOPY: u32 = 0x0002;

pub use libc::{F_ALLOCATEALL, F_ALLOCATECONTIG, F_PEOFPOSMODE, F_PREALLOCATE, F_VOLPOSMODE};

/// Argument of `fcntl(F_PREALLOCATE)`; `fst_bytesalloc` is filled in by the kernel.
pub type Fstore = libc::fstore_t;

/// Clones `src` to `dst`; `dst` must not exist.
pub fn clonefile<S: AsRef<Path>, D: AsRef<Path>>(src: S, dst: D, flags: u32) -> Result<(), Errno> {
    let src = cstr(src.as_ref())?;
    let dst = cstr(dst.as_ref())?;
    // SAFETY: both paths are NUL-terminated.
    cvt(unsafe { libc::clonefile(src.as_ptr(), dst.as_ptr(), flags) })?;
    Ok(())
}

/// Clones `src` (relative to `src_dirfd`) to `dst` (relative to `dst_dirfd`).
pub fn clonefileat<SF, DF, S, D>(
    src_dirfd: SF,
    src: S,
    dst_dirfd: DF,
    dst: D,
    flags: u32,
) -> Result<(), Errno>
where
    SF: AsFd,
    DF: AsFd,
    S: AsRef<Path>,
    D: AsRef<Path>,
{
    let src = cstr(src.as_ref())?;
    let dst = cstr(dst.as_ref())?;
    // SAFETY: descriptors are borrowed for the call; paths are NUL-terminated.
    cvt(unsafe {
        libc::clonefileat(
            src_dirfd.as_fd().as_raw_fd(),
            src.as_ptr(),
            dst_dirfd.as_fd().as_raw_fd(),
            dst.as_ptr(),
            flags,
        )
    })?;
    Ok(())
}

/// Clones the open file `srcfd` to `dst` relative to `dst_dirfd`.
pub fn fclonefileat<SF: AsFd, DF: AsFd, D: AsRef<Path>>(
    srcfd: SF,
    dst_dirfd: DF,
    dst: D,
    flags: u32,
) -> Result<(), Errno> {
    let dst = cstr(dst.as_ref())?;
    // SAFETY: descriptors are borrowed for the call; dst is NUL-terminated.
    cvt(unsafe {
        libc::fclonefileat(
            srcfd.as_fd().as_raw_fd(),
            dst_dirfd.as_fd().as_raw_fd(),
            dst.as_ptr(),
            flags,
        )
    })?;
    Ok(())
}

/// `fcntl(fd, cmd, &fstore)`, normally with [`F_PREALLOCATE`].
pub fn fcntl_fstore<Fd: AsFd>(fd: Fd, cmd: i32, fstore: &mut Fstore) -> Result<(), Errno> {
    // SAFETY: fstore is a valid fstore_t for the duration of the call.
    cvt(unsafe { libc::fcntl(fd.as_fd().as_raw_fd(), cmd, std::ptr::from_mut(fstore)) })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::fs::{AT_FDCWD, Mode, OFlags, open};

    const TEST_DATA: &[u8] = b"This is a test\n";

    fn create_test_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("source");
        std::fs::write(&path, TEST_DATA).unwrap();
        path
    }

    fn unsupported(e: Errno) -> bool {
        e == Errno::NOSYS || e == Errno::NOTSUP
    }

    #[test]
    fn clonefile_copies_contents() {
        let dir = tempfile::tempdir().unwrap();
        let src = create_test_file(dir.path());
        let dst = dir.path().join("cloned");
        match clonefile(&src, &dst, 0) {
            Err(e) if unsupported(e) => return,
            r => r.unwrap(),
        }
        assert_eq!(std::fs::read(&dst).unwrap(), TEST_DATA);
    }

    #[test]
    fn clonefileat_with_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let src = create_test_file(dir.path());
        let dst = dir.path().join("cloned");
        match clonefileat(AT_FDCWD, &src, AT_FDCWD, &dst, 0) {
            Err(e) if unsupported(e) => return,
            r => r.unwrap(),
        }
        assert_eq!(std::fs::read(&dst).unwrap(), TEST_DATA);
    }

    #[test]
    fn clonefileat_with_relative_paths() {
        let src_dir = tempfile::tempdir().unwrap();
        create_test_file(src_dir.path());
        let dst_dir = tempfile::tempdir().unwrap();

        let src_fd = open(src_dir.path(), OFlags::RDONLY | OFlags::DIRECTORY, Mode::empty()).unwrap();
        let dst_fd = open(dst_dir.path(), OFlags::RDONLY | OFlags::DIRECTORY, Mode::empty()).unwrap();

        match clonefileat(&src_fd, "source", &dst_fd, "cloned", 0) {
            Err(e) if unsupported(e) => return,
            r => r.unwrap(),
        }
        assert_eq!(std::fs::read(dst_dir.path().join("cloned")).unwrap(), TEST_DATA);
    }

    #[test]
    fn fclonefileat_from_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = create_test_file(dir.path());
        let fd = open(&src, OFlags::RDONLY, Mode::empty()).unwrap();
        let dst = dir.path().join("dst");
        match fclonefileat(&fd, AT_FDCWD, &dst, 0) {
            Err(e) if unsupported(e) => return,
            r => r.unwrap(),
        }
        assert_eq!(std::fs::read(&dst).unwrap(), TEST_DATA);
    }

    #[test]
    fn preallocate_does_not_change_size() {
        let mut file = tempfile::tempfile().unwrap();
        let mut fstore = Fstore {
            fst_flags: F_ALLOCATEALL,
            fst_posmode: F_PEOFPOSMODE,
            fst_offset: 0,
            fst_length: 1 << 10,
            fst_bytesalloc: 0,
        };
        match fcntl_fstore(&file, F_PREALLOCATE, &mut fstore) {
            Err(Errno::OPNOTSUPP) => return,
            r => r.unwrap(),
        }
        assert_eq!(file.metadata().unwrap().len(), 0);
        file.write_all(b"x").unwrap();
    }
}
