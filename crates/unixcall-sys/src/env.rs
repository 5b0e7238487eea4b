//! Environment variables.
//!
//! These operate on the process environment that `exec` children inherit.

use std::ffi::OsStr;

use rustix::io::Errno;

/// Returns the value of `key`, or `None` if it is not set.
///
/// A variable set to the empty string is reported as `Some("")`.
pub fn getenv<K: AsRef<OsStr>>(key: K) -> Option<String> {
    std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
}

/// Sets `key` to `value`, overwriting any existing value.
///
/// An empty `value` keeps the variable defined.
///
/// # Safety
///
/// No other thread may read or write the environment concurrently through
/// anything other than `std::env`.
pub unsafe fn setenv<K: AsRef<OsStr>, V: AsRef<OsStr>>(key: K, value: V) -> Result<(), Errno> {
    let key = key.as_ref();
    let value = value.as_ref();
    check_key(key)?;
    if value.as_encoded_bytes().contains(&0) {
        return Err(Errno::INVAL);
    }
    // SAFETY: upheld by the caller.
    unsafe { std::env::set_var(key, value) };
    Ok(())
}

/// Removes `key` from the environment.
///
/// # Safety
///
/// Same contract as [`setenv`].
pub unsafe fn unsetenv<K: AsRef<OsStr>>(key: K) -> Result<(), Errno> {
    let key = key.as_ref();
    check_key(key)?;
    // SAFETY: upheld by the caller.
    unsafe { std::env::remove_var(key) };
    Ok(())
}

fn check_key(key: &OsStr) -> Result<(), Errno> {
    let bytes = key.as_encoded_bytes();
    if bytes.is_empty() || bytes.contains(&b'=') || bytes.contains(&0) {
        Err(Errno::INVAL)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_and_get(key: &str, value: &str) {
        unsafe { setenv(key, value) }.unwrap();
        assert_eq!(getenv(key).as_deref(), Some(value));
    }

    #[test]
    fn set_then_get() {
        set_and_get("UNIXCALL_TESTENV", "AVALUE");
        // empty is a value, not a deletion
        set_and_get("UNIXCALL_TESTENV", "");
    }

    #[test]
    fn unset_removes() {
        unsafe { setenv("UNIXCALL_TESTENV_UNSET", "x") }.unwrap();
        unsafe { unsetenv("UNIXCALL_TESTENV_UNSET") }.unwrap();
        assert_eq!(getenv("UNIXCALL_TESTENV_UNSET"), None);
    }

    #[test]
    fn rejects_bad_keys() {
        assert_eq!(unsafe { setenv("", "x") }, Err(Errno::INVAL));
        assert_eq!(unsafe { setenv("A=B", "x") }, Err(Errno::INVAL));
        assert_eq!(unsafe { setenv("A", "x\0y") }, Err(Errno::INVAL));
    }
}
