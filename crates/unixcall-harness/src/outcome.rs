//! Exit helpers for child procedure bodies.
//!
//! A body reports its outcome only through the exit status, so every helper
//! here terminates the process. Diagnostics go straight to stderr because
//! confined children may not be able to open anything else.

use std::fmt::Display;
use std::io::{self, Write as _};

use unixcall_sys::Errno;

/// Exits the child with status 0.
pub fn exit_ok() -> ! {
    std::process::exit(0)
}

/// Writes `msg` to stderr and exits the child with status 1.
pub fn fail(msg: impl Display) -> ! {
    writeln!(io::stderr(), "{msg}").ok();
    std::process::exit(1)
}

/// Unwraps `result` or fails the child, naming the step that broke.
pub fn check<T, E: Display>(result: Result<T, E>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => fail(format_args!("{what}: {e}")),
    }
}

/// Errors that carry an OS error number.
pub trait OsErrno {
    fn os_errno(&self) -> Option<Errno>;
}

impl OsErrno for Errno {
    fn os_errno(&self) -> Option<Errno> {
        Some(*self)
    }
}

impl OsErrno for io::Error {
    fn os_errno(&self) -> Option<Errno> {
        self.raw_os_error().map(Errno::from_raw_os_error)
    }
}

/// Fails the child unless `result` is an error with errno `want`.
pub fn expect_errno<T, E>(result: Result<T, E>, want: Errno, what: &str)
where
    E: OsErrno + Display,
{
    match result {
        Ok(_) => fail(format_args!("{what}: succeeded, wanted {want}")),
        Err(e) => match e.os_errno() {
            Some(got) if got == want => {}
            _ => fail(format_args!("{what}: got {e}, wanted {want}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_of_io_error() {
        let err = io::Error::from_raw_os_error(Errno::NOENT.raw_os_error());
        assert_eq!(err.os_errno(), Some(Errno::NOENT));
        assert_eq!(io::Error::other("x").os_errno(), None);
        assert_eq!(Errno::ACCESS.os_errno(), Some(Errno::ACCESS));
    }

    #[test]
    fn expect_errno_accepts_matching_error() {
        expect_errno::<(), _>(Err(Errno::NOENT), Errno::NOENT, "open");
    }

    #[test]
    fn check_passes_through_ok() {
        assert_eq!(check(Ok::<_, Errno>(7), "seven"), 7);
    }
}
