//! `sysctlbyname` readers (FreeBSD, macOS).
//!
//! Values are read in two steps: a sizing call with a null buffer, then the
//! real read. The kernel may report a larger size than it finally writes, so
//! the returned buffer is truncated to the written length.

use rustix::io::Errno;

use crate::{cstr, cvt};

/// Reads the raw bytes of a sysctl.
pub fn sysctl_raw(name: &str) -> Result<Vec<u8>, Errno> {
    let cname = cstr(name)?;
    let mut len: libc::size_t = 0;
    // SAFETY: a null old pointer asks only for the size.
    cvt(unsafe {
        libc::sysctlbyname(
            cname.as_ptr(),
            std::ptr::null_mut(),
            &raw mut len,
            std::ptr::null_mut(),
            0,
        )
    })?;

    let mut buf = vec![0u8; len];
    // SAFETY: buf holds len writable bytes.
    cvt(unsafe {
        libc::sysctlbyname(
            cname.as_ptr(),
            buf.as_mut_ptr().cast(),
            &raw mut len,
            std::ptr::null_mut(),
            0,
        )
    })?;
    buf.truncate(len);
    Ok(buf)
}

/// Reads a 64-bit integer sysctl such as `vm.swap_total`.
pub fn sysctl_uint64(name: &str) -> Result<u64, Errno> {
    let cname = cstr(name)?;
    let mut value: u64 = 0;
    let mut len: libc::size_t = size_of::<u64>();
    // SAFETY: value provides len writable bytes.
    cvt(unsafe {
        libc::sysctlbyname(
            cname.as_ptr(),
            (&raw mut value).cast(),
            &raw mut len,
            std::ptr::null_mut(),
            0,
        )
    })?;
    if len != size_of::<u64>() {
        return Err(Errno::IO);
    }
    Ok(value)
}

/// Reads a 32-bit integer sysctl.
pub fn sysctl_uint32(name: &str) -> Result<u32, Errno> {
    let buf = sysctl_raw(name)?;
    let bytes: [u8; 4] = buf.as_slice().try_into().map_err(|_| Errno::IO)?;
    Ok(u32::from_ne_bytes(bytes))
}

/// Reads a string sysctl, dropping the trailing NUL.
pub fn sysctl_string(name: &str) -> Result<String, Errno> {
    let mut buf = sysctl_raw(name)?;
    while buf.last() == Some(&0) {
        buf.pop();
    }
    String::from_utf8(buf).map_err(|_| Errno::ILSEQ)
}
