//! Socket pairs and peer credentials.
//!
//! The BSDs expose the peer of a local socket through `LOCAL_PEERCRED`, which
//! fills a `struct xucred`. Linux uses `SO_PEERCRED` and `struct ucred`.
//!
//! On FreeBSD 11 and earlier `LOCAL_PEERCRED` is not supported on sockets
//! created with `socketpair` and fails with `ENOTCONN`.

use std::os::fd::{AsFd, OwnedFd};

use rustix::io::Errno;
pub use rustix::net::{AddressFamily, SocketType};
use rustix::net::SocketFlags;

/// Creates a connected pair of sockets, close-on-exec where the platform
/// can do it atomically.
pub fn socketpair(domain: AddressFamily, kind: SocketType) -> Result<(OwnedFd, OwnedFd), Errno> {
    #[cfg(not(target_vendor = "apple"))]
    let flags = SocketFlags::CLOEXEC;
    #[cfg(target_vendor = "apple")]
    let flags = SocketFlags::empty();
    rustix::net::socketpair(domain, kind, flags, None)
}

#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub use self::bsd::*;

#[cfg(any(target_os = "freebsd", target_os = "macos"))]
mod bsd {
    use std::fmt;
    use std::os::fd::{AsFd, AsRawFd};

    use rustix::io::Errno;

    use crate::cvt;

    pub use libc::{LOCAL_PEERCRED, SOL_LOCAL, XUCRED_VERSION};

    /// Peer credentials as reported in a `struct xucred`.
    #[derive(Clone, Copy)]
    pub struct Xucred(libc::xucred);

    impl Xucred {
        pub fn uid(&self) -> u32 {
            self.0.cr_uid
        }

        /// The supplementary groups the kernel reported.
        pub fn groups(&self) -> &[u32] {
            let n = usize::try_from(self.0.cr_ngroups)
                .unwrap_or(0)
                .min(self.0.cr_groups.len());
            &self.0.cr_groups[..n]
        }

        /// Peer process ID. FreeBSD 13 and later fill this in; older kernels
        /// leave 0.
        #[cfg(target_os = "freebsd")]
        pub fn pid(&self) -> i32 {
            // SAFETY: the union starts zeroed and the kernel only ever stores
            // a pid_t in it, so reading cr_pid is always initialised.
            unsafe { self.0.cr_pid__c_anonymous_union.cr_pid }
        }
    }

    impl fmt::Debug for Xucred {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut d = f.debug_struct("Xucred");
            d.field("uid", &self.uid()).field("groups", &self.groups());
            #[cfg(target_os = "freebsd")]
            d.field("pid", &self.pid());
            d.finish()
        }
    }

    /// Reads a `struct xucred` socket option, normally
    /// `(SOL_LOCAL, LOCAL_PEERCRED)`.
    pub fn getsockopt_xucred<Fd: AsFd>(fd: Fd, level: i32, opt: i32) -> Result<Xucred, Errno> {
        // SAFETY: xucred is a plain C struct; all-zero is a valid value.
        let mut cred: libc::xucred = unsafe { std::mem::zeroed() };
        let mut len = size_of::<libc::xucred>() as libc::socklen_t;
        // SAFETY: cred and len are valid out pointers sized for each other.
        cvt(unsafe {
            libc::getsockopt(
                fd.as_fd().as_raw_fd(),
                level,
                opt,
                (&raw mut cred).cast(),
                &raw mut len,
            )
        })?;
        if cred.cr_version != XUCRED_VERSION {
            return Err(Errno::INVAL);
        }
        Ok(Xucred(cred))
    }
}

/// Credentials of the process on the other end of a local socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerCred {
    pub uid: u32,
    /// Primary group, when the platform reports one.
    pub gid: Option<u32>,
    /// Process ID, when the platform reports one.
    pub pid: Option<i32>,
}

/// Returns the credentials of the peer of the local socket `fd`.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn peer_credentials<Fd: AsFd>(fd: Fd) -> Result<PeerCred, Errno> {
    use std::os::fd::AsRawFd;

    // SAFETY: ucred is a plain C struct; all-zero is a valid value.
    let mut cred: libc::ucred = unsafe { std::mem::zeroed() };
    let mut len = size_of::<libc::ucred>() as libc::socklen_t;
    // SAFETY: cred and len are valid out pointers sized for each other.
    crate::cvt(unsafe {
        libc::getsockopt(
            fd.as_fd().as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_PEERCRED,
            (&raw mut cred).cast(),
            &raw mut len,
        )
    })?;
    Ok(PeerCred {
        uid: cred.uid,
        gid: Some(cred.gid),
        pid: Some(cred.pid),
    })
}

/// Returns the credentials of the peer of the local socket `fd`.
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn peer_credentials<Fd: AsFd>(fd: Fd) -> Result<PeerCred, Errno> {
    let cred = getsockopt_xucred(fd, SOL_LOCAL, LOCAL_PEERCRED)?;
    #[cfg(target_os = "freebsd")]
    let pid = Some(cred.pid()).filter(|&p| p > 0);
    #[cfg(not(target_os = "freebsd"))]
    let pid = None;
    Ok(PeerCred {
        uid: cred.uid(),
        gid: cred.groups().first().copied(),
        pid,
    })
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::os::unix::net::UnixStream;

    use super::*;
    use crate::process::{getgid, getuid};

    #[test]
    fn socketpair_is_connected() {
        let (a, b) = socketpair(AddressFamily::UNIX, SocketType::STREAM).unwrap();
        let mut a = UnixStream::from(a);
        let mut b = UnixStream::from(b);
        a.write_all(b"ping").unwrap();
        let mut buf = [0u8; 4];
        b.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    #[test]
    fn peer_credentials_are_our_own() {
        let (_srv, cli) = socketpair(AddressFamily::UNIX, SocketType::STREAM).unwrap();
        let cred = peer_credentials(&cli).unwrap();
        assert_eq!(cred.uid, getuid());
        assert_eq!(cred.gid, Some(getgid()));
        assert_eq!(cred.pid, Some(std::process::id() as i32));
    }

    #[cfg(any(target_os = "freebsd", target_os = "macos"))]
    #[test]
    fn xucred_reports_our_uid() {
        let (_srv, cli) = socketpair(AddressFamily::UNIX, SocketType::STREAM).unwrap();
        let cred = match getsockopt_xucred(&cli, SOL_LOCAL, LOCAL_PEERCRED) {
            Err(Errno::NOTCONN) => return,
            r => r.unwrap(),
        };
        assert_eq!(cred.uid(), getuid());
        if let Some(&gid) = cred.groups().first() {
            assert_eq!(gid, getgid());
        }
        #[cfg(target_os = "freebsd")]
        assert!(
            cred.pid() == 0 || cred.pid() == std::process::id() as i32,
            "{cred:?}"
        );
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd", target_os = "macos"))]
    #[test]
    fn peer_credentials_on_non_socket_fails() {
        let file = tempfile::tempfile().unwrap();
        assert_eq!(peer_credentials(&file).unwrap_err(), Errno::NOTSOCK);
    }
}
