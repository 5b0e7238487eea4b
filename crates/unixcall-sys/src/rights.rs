//! Capsicum capability rights (`cap_rights_t`).
//!
//! A rights set is an array of `version + 2` 64-bit words. Every right names
//! exactly one word through an index marker stored in bits 57..61, and the
//! rights version is stored in the top two bits of word 0:
//!
//! ```text
//!  63 62 61        57 56                                   0
//! ┌─────┬────────────┬──────────────────────────────────────┐
//! │ ver │ index bit  │ right bits                           │
//! └─────┴────────────┴──────────────────────────────────────┘
//! ```
//!
//! The marker is one-hot: `1 << 0` selects word 0, `1 << 1` word 1, and so on.
//! Because the marker bits are part of every right value, testing a right is a
//! plain `word & right == right`, and clearing must mask the marker out first.
//!
//! This encoding is pure bit manipulation and is available on every platform.
//! On FreeBSD the same struct is handed to the kernel by
//! [`capsicum`](crate::capsicum).

use std::fmt;

use thiserror::Error;

pub const CAP_RIGHTS_VERSION_00: u64 = 0;
pub const CAP_RIGHTS_VERSION: u64 = CAP_RIGHTS_VERSION_00;

const CAP_ARRAY_SIZE_MIN: usize = CAP_RIGHTS_VERSION_00 as usize + 2;
const CAP_ARRAY_SIZE_MAX: usize = CAP_RIGHTS_VERSION as usize + 2;

const CAP_INDEX_SHIFT: u32 = 57;
const CAP_VERSION_SHIFT: u32 = 62;
/// Everything below the index marker.
const CAP_RIGHT_MASK: u64 = 0x01FF_FFFF_FFFF_FFFF;

/// Index marker (`1 << idx`) to word index.
const BIT2IDX: [i8; 32] = [
    -1, 0, 1, -1, 2, -1, -1, -1, 3, -1, -1, -1, -1, -1, -1, -1, //
    4, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
];

/// Builds a right value for word `idx`.
#[inline]
pub const fn capright(idx: u32, bit: u64) -> u64 {
    (1u64 << (CAP_INDEX_SHIFT + idx)) | bit
}

#[inline]
const fn capidxbit(right: u64) -> usize {
    ((right >> CAP_INDEX_SHIFT) & 0x1F) as usize
}

#[inline]
const fn caprver(right: u64) -> u64 {
    right >> CAP_VERSION_SHIFT
}

// Index 0

pub const CAP_READ: u64 = capright(0, 0x0000_0000_0000_0001);
pub const CAP_WRITE: u64 = capright(0, 0x0000_0000_0000_0002);
pub const CAP_SEEK_TELL: u64 = capright(0, 0x0000_0000_0000_0004);
pub const CAP_SEEK: u64 = CAP_SEEK_TELL | 0x0000_0000_0000_0008;
pub const CAP_PREAD: u64 = CAP_SEEK | CAP_READ;
pub const CAP_PWRITE: u64 = CAP_SEEK | CAP_WRITE;
pub const CAP_MMAP: u64 = capright(0, 0x0000_0000_0000_0010);
pub const CAP_MMAP_R: u64 = CAP_MMAP | CAP_SEEK | CAP_READ;
pub const CAP_MMAP_W: u64 = CAP_MMAP | CAP_SEEK | CAP_WRITE;
pub const CAP_MMAP_X: u64 = CAP_MMAP | CAP_SEEK | 0x0000_0000_0000_0020;
pub const CAP_MMAP_RW: u64 = CAP_MMAP_R | CAP_MMAP_W;
pub const CAP_MMAP_RX: u64 = CAP_MMAP_R | CAP_MMAP_X;
pub const CAP_MMAP_WX: u64 = CAP_MMAP_W | CAP_MMAP_X;
pub const CAP_MMAP_RWX: u64 = CAP_MMAP_R | CAP_MMAP_W | CAP_MMAP_X;
pub const CAP_CREATE: u64 = capright(0, 0x0000_0000_0000_0040);
pub const CAP_FEXECVE: u64 = capright(0, 0x0000_0000_0000_0080);
pub const CAP_FSYNC: u64 = capright(0, 0x0000_0000_0000_0100);
pub const CAP_FTRUNCATE: u64 = capright(0, 0x0000_0000_0000_0200);
pub const CAP_LOOKUP: u64 = capright(0, 0x0000_0000_0000_0400);
pub const CAP_FCHDIR: u64 = capright(0, 0x0000_0000_0000_0800);
pub const CAP_FCHFLAGS: u64 = capright(0, 0x0000_0000_0000_1000);
pub const CAP_CHFLAGSAT: u64 = CAP_FCHFLAGS | CAP_LOOKUP;
pub const CAP_FCHMOD: u64 = capright(0, 0x0000_0000_0000_2000);
pub const CAP_FCHMODAT: u64 = CAP_FCHMOD | CAP_LOOKUP;
pub const CAP_FCHOWN: u64 = capright(0, 0x0000_0000_0000_4000);
pub const CAP_FCHOWNAT: u64 = CAP_FCHOWN | CAP_LOOKUP;
pub const CAP_FCNTL: u64 = capright(0, 0x0000_0000_0000_8000);
pub const CAP_FLOCK: u64 = capright(0, 0x0000_0000_0001_0000);
pub const CAP_FPATHCONF: u64 = capright(0, 0x0000_0000_0002_0000);
pub const CAP_FSCK: u64 = capright(0, 0x0000_0000_0004_0000);
pub const CAP_FSTAT: u64 = capright(0, 0x0000_0000_0008_0000);
pub const CAP_FSTATAT: u64 = CAP_FSTAT | CAP_LOOKUP;
pub const CAP_FSTATFS: u64 = capright(0, 0x0000_0000_0010_0000);
pub const CAP_FUTIMES: u64 = capright(0, 0x0000_0000_0020_0000);
pub const CAP_FUTIMESAT: u64 = CAP_FUTIMES | CAP_LOOKUP;
pub const CAP_LINKAT_TARGET: u64 = CAP_LOOKUP | 0x0000_0000_0040_0000;
pub const CAP_MKDIRAT: u64 = CAP_LOOKUP | 0x0000_0000_0080_0000;
pub const CAP_MKFIFOAT: u64 = CAP_LOOKUP | 0x0000_0000_0100_0000;
pub const CAP_MKNODAT: u64 = CAP_LOOKUP | 0x0000_0000_0200_0000;
pub const CAP_RENAMEAT_SOURCE: u64 = CAP_LOOKUP | 0x0000_0000_0400_0000;
pub const CAP_SYMLINKAT: u64 = CAP_LOOKUP | 0x0000_0000_0800_0000;
pub const CAP_UNLINKAT: u64 = CAP_LOOKUP | 0x0000_0000_1000_0000;
pub const CAP_ACCEPT: u64 = capright(0, 0x0000_0000_2000_0000);
pub const CAP_BIND: u64 = capright(0, 0x0000_0000_4000_0000);
pub const CAP_CONNECT: u64 = capright(0, 0x0000_0000_8000_0000);
pub const CAP_GETPEERNAME: u64 = capright(0, 0x0000_0001_0000_0000);
pub const CAP_GETSOCKNAME: u64 = capright(0, 0x0000_0002_0000_0000);
pub const CAP_GETSOCKOPT: u64 = capright(0, 0x0000_0004_0000_0000);
pub const CAP_LISTEN: u64 = capright(0, 0x0000_0008_0000_0000);
pub const CAP_PEELOFF: u64 = capright(0, 0x0000_0010_0000_0000);
pub const CAP_RECV: u64 = CAP_READ;
pub const CAP_SEND: u64 = CAP_WRITE;
pub const CAP_SETSOCKOPT: u64 = capright(0, 0x0000_0020_0000_0000);
pub const CAP_SHUTDOWN: u64 = capright(0, 0x0000_0040_0000_0000);
pub const CAP_BINDAT: u64 = CAP_LOOKUP | 0x0000_0080_0000_0000;
pub const CAP_CONNECTAT: u64 = CAP_LOOKUP | 0x0000_0100_0000_0000;
pub const CAP_LINKAT_SOURCE: u64 = CAP_LOOKUP | 0x0000_0200_0000_0000;
pub const CAP_RENAMEAT_TARGET: u64 = CAP_LOOKUP | 0x0000_0400_0000_0000;
pub const CAP_SOCK_CLIENT: u64 = CAP_CONNECT
    | CAP_GETPEERNAME
    | CAP_GETSOCKNAME
    | CAP_GETSOCKOPT
    | CAP_PEELOFF
    | CAP_RECV
    | CAP_SEND
    | CAP_SETSOCKOPT
    | CAP_SHUTDOWN;
pub const CAP_SOCK_SERVER: u64 = CAP_ACCEPT
    | CAP_BIND
    | CAP_GETPEERNAME
    | CAP_GETSOCKNAME
    | CAP_GETSOCKOPT
    | CAP_LISTEN
    | CAP_PEELOFF
    | CAP_RECV
    | CAP_SEND
    | CAP_SETSOCKOPT
    | CAP_SHUTDOWN;
pub const CAP_ALL0: u64 = capright(0, 0x0000_07FF_FFFF_FFFF);
pub const CAP_UNUSED0_44: u64 = capright(0, 0x0000_0800_0000_0000);
pub const CAP_UNUSED0_57: u64 = capright(0, 0x0100_0000_0000_0000);

// Index 1

pub const CAP_MAC_GET: u64 = capright(1, 0x0000_0000_0000_0001);
pub const CAP_MAC_SET: u64 = capright(1, 0x0000_0000_0000_0002);
pub const CAP_SEM_GETVALUE: u64 = capright(1, 0x0000_0000_0000_0004);
pub const CAP_SEM_POST: u64 = capright(1, 0x0000_0000_0000_0008);
pub const CAP_SEM_WAIT: u64 = capright(1, 0x0000_0000_0000_0010);
pub const CAP_EVENT: u64 = capright(1, 0x0000_0000_0000_0020);
pub const CAP_KQUEUE_EVENT: u64 = capright(1, 0x0000_0000_0000_0040);
pub const CAP_IOCTL: u64 = capright(1, 0x0000_0000_0000_0080);
pub const CAP_TTYHOOK: u64 = capright(1, 0x0000_0000_0000_0100);
pub const CAP_PDGETPID: u64 = capright(1, 0x0000_0000_0000_0200);
pub const CAP_PDWAIT: u64 = capright(1, 0x0000_0000_0000_0400);
pub const CAP_PDKILL: u64 = capright(1, 0x0000_0000_0000_0800);
pub const CAP_EXTATTR_DELETE: u64 = capright(1, 0x0000_0000_0000_1000);
pub const CAP_EXTATTR_GET: u64 = capright(1, 0x0000_0000_0000_2000);
pub const CAP_EXTATTR_LIST: u64 = capright(1, 0x0000_0000_0000_4000);
pub const CAP_EXTATTR_SET: u64 = capright(1, 0x0000_0000_0000_8000);
pub const CAP_ACL_CHECK: u64 = capright(1, 0x0000_0000_0001_0000);
pub const CAP_ACL_DELETE: u64 = capright(1, 0x0000_0000_0002_0000);
pub const CAP_ACL_GET: u64 = capright(1, 0x0000_0000_0004_0000);
pub const CAP_ACL_SET: u64 = capright(1, 0x0000_0000_0008_0000);
pub const CAP_KQUEUE_CHANGE: u64 = capright(1, 0x0000_0000_0010_0000);
pub const CAP_KQUEUE: u64 = CAP_KQUEUE_EVENT | CAP_KQUEUE_CHANGE;
pub const CAP_ALL1: u64 = capright(1, 0x0000_0000_001F_FFFF);
pub const CAP_UNUSED1_22: u64 = capright(1, 0x0000_0000_0020_0000);
pub const CAP_UNUSED1_57: u64 = capright(1, 0x0100_0000_0000_0000);

/// Rights that own at least one bit of their own, by name.
///
/// Aliases (`recv`, `send`) and unions (`pread`, `mmap_rw`, `sock_client`, ...)
/// are accepted by [`parse_right`] but not listed here, so [`CapRights::names`]
/// reports each bit once.
const RIGHT_NAMES: &[(&str, u64)] = &[
    ("read", CAP_READ),
    ("write", CAP_WRITE),
    ("seek_tell", CAP_SEEK_TELL),
    ("seek", CAP_SEEK),
    ("mmap", CAP_MMAP),
    ("mmap_x", CAP_MMAP_X),
    ("create", CAP_CREATE),
    ("fexecve", CAP_FEXECVE),
    ("fsync", CAP_FSYNC),
    ("ftruncate", CAP_FTRUNCATE),
    ("lookup", CAP_LOOKUP),
    ("fchdir", CAP_FCHDIR),
    ("fchflags", CAP_FCHFLAGS),
    ("fchmod", CAP_FCHMOD),
    ("fchown", CAP_FCHOWN),
    ("fcntl", CAP_FCNTL),
    ("flock", CAP_FLOCK),
    ("fpathconf", CAP_FPATHCONF),
    ("fsck", CAP_FSCK),
    ("fstat", CAP_FSTAT),
    ("fstatfs", CAP_FSTATFS),
    ("futimes", CAP_FUTIMES),
    ("linkat_target", CAP_LINKAT_TARGET),
    ("mkdirat", CAP_MKDIRAT),
    ("mkfifoat", CAP_MKFIFOAT),
    ("mknodat", CAP_MKNODAT),
    ("renameat_source", CAP_RENAMEAT_SOURCE),
    ("symlinkat", CAP_SYMLINKAT),
    ("unlinkat", CAP_UNLINKAT),
    ("accept", CAP_ACCEPT),
    ("bind", CAP_BIND),
    ("connect", CAP_CONNECT),
    ("getpeername", CAP_GETPEERNAME),
    ("getsockname", CAP_GETSOCKNAME),
    ("getsockopt", CAP_GETSOCKOPT),
    ("listen", CAP_LISTEN),
    ("peeloff", CAP_PEELOFF),
    ("setsockopt", CAP_SETSOCKOPT),
    ("shutdown", CAP_SHUTDOWN),
    ("bindat", CAP_BINDAT),
    ("connectat", CAP_CONNECTAT),
    ("linkat_source", CAP_LINKAT_SOURCE),
    ("renameat_target", CAP_RENAMEAT_TARGET),
    ("mac_get", CAP_MAC_GET),
    ("mac_set", CAP_MAC_SET),
    ("sem_getvalue", CAP_SEM_GETVALUE),
    ("sem_post", CAP_SEM_POST),
    ("sem_wait", CAP_SEM_WAIT),
    ("event", CAP_EVENT),
    ("kqueue_event", CAP_KQUEUE_EVENT),
    ("ioctl", CAP_IOCTL),
    ("ttyhook", CAP_TTYHOOK),
    ("pdgetpid", CAP_PDGETPID),
    ("pdwait", CAP_PDWAIT),
    ("pdkill", CAP_PDKILL),
    ("extattr_delete", CAP_EXTATTR_DELETE),
    ("extattr_get", CAP_EXTATTR_GET),
    ("extattr_list", CAP_EXTATTR_LIST),
    ("extattr_set", CAP_EXTATTR_SET),
    ("acl_check", CAP_ACL_CHECK),
    ("acl_delete", CAP_ACL_DELETE),
    ("acl_get", CAP_ACL_GET),
    ("acl_set", CAP_ACL_SET),
    ("kqueue_change", CAP_KQUEUE_CHANGE),
];

const RIGHT_ALIASES: &[(&str, u64)] = &[
    ("recv", CAP_RECV),
    ("send", CAP_SEND),
    ("pread", CAP_PREAD),
    ("pwrite", CAP_PWRITE),
    ("mmap_r", CAP_MMAP_R),
    ("mmap_w", CAP_MMAP_W),
    ("mmap_rw", CAP_MMAP_RW),
    ("mmap_rx", CAP_MMAP_RX),
    ("mmap_wx", CAP_MMAP_WX),
    ("mmap_rwx", CAP_MMAP_RWX),
    ("chflagsat", CAP_CHFLAGSAT),
    ("fchmodat", CAP_FCHMODAT),
    ("fchownat", CAP_FCHOWNAT),
    ("fstatat", CAP_FSTATAT),
    ("futimesat", CAP_FUTIMESAT),
    ("sock_client", CAP_SOCK_CLIENT),
    ("sock_server", CAP_SOCK_SERVER),
    ("kqueue", CAP_KQUEUE),
    ("all0", CAP_ALL0),
    ("all1", CAP_ALL1),
];

/// Looks up a right by its lower-case name, with or without the `cap_` prefix.
pub fn parse_right(name: &str) -> Option<u64> {
    let name = name.trim().to_ascii_lowercase();
    let name = name.strip_prefix("cap_").unwrap_or(&name);
    RIGHT_NAMES
        .iter()
        .chain(RIGHT_ALIASES)
        .find(|(n, _)| *n == name)
        .map(|&(_, right)| right)
}

/// Returns the canonical name of a right, if it has one.
pub fn right_name(right: u64) -> Option<&'static str> {
    RIGHT_NAMES
        .iter()
        .chain(RIGHT_ALIASES)
        .find(|&&(_, r)| r == right)
        .map(|&(n, _)| n)
}

/// Errors from building or editing a rights set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RightsError {
    #[error("bad rights version {0}")]
    BadVersion(u64),

    #[error("bad rights size {0}")]
    BadSize(usize),

    #[error("bad right version in {0:#018x}")]
    BadRightVersion(u64),

    #[error("index for right {0:#018x} out of range")]
    IndexOutOfRange(u64),

    #[error("index of right {right:#018x} overflows a rights set of {size} words")]
    IndexOverflow { right: u64, size: usize },

    #[error("index mismatch for right {0:#018x}")]
    IndexMismatch(u64),

    #[error("malformed rights set [{0:#018x}, {1:#018x}]")]
    Malformed(u64, u64),

    #[error("requested rights are not a subset of the current rights")]
    NotCapable,
}

/// A capability rights set, laid out exactly like FreeBSD's `cap_rights_t`.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapRights {
    cr_rights: [u64; CAP_ARRAY_SIZE_MAX],
}

impl CapRights {
    /// An empty, valid rights set (version 0, index markers only).
    pub const fn empty() -> Self {
        Self {
            cr_rights: [
                (CAP_RIGHTS_VERSION << CAP_VERSION_SHIFT) | capright(0, 0),
                capright(1, 0),
            ],
        }
    }

    /// Builds a rights set holding `rights` (`cap_rights_init`).
    pub fn init(rights: &[u64]) -> Result<Self, RightsError> {
        let mut r = Self::empty();
        r.set(rights)?;
        Ok(r)
    }

    /// Wraps raw words without validating them; see [`is_valid`](Self::is_valid).
    pub const fn from_words(words: [u64; CAP_ARRAY_SIZE_MAX]) -> Self {
        Self { cr_rights: words }
    }

    pub const fn words(&self) -> &[u64; CAP_ARRAY_SIZE_MAX] {
        &self.cr_rights
    }

    /// Rights version stored in word 0.
    pub const fn version(&self) -> u64 {
        caprver(self.cr_rights[0])
    }

    /// Number of words the version says are in use.
    pub const fn array_size(&self) -> usize {
        self.version() as usize + 2
    }

    /// Adds `rights` to the set (`cap_rights_set`).
    ///
    /// Validation happens per right, so on error the rights before the
    /// offending one have already been added.
    pub fn set(&mut self, rights: &[u64]) -> Result<&mut Self, RightsError> {
        let n = self.checked_size()?;
        for &right in rights {
            let i = self.word_index(right, n)?;
            self.cr_rights[i] |= right;
            debug_assert_eq!(capidxbit(self.cr_rights[i]), capidxbit(right));
        }
        Ok(self)
    }

    /// Removes `rights` from the set (`cap_rights_clear`).
    ///
    /// The index marker of each word is preserved.
    pub fn clear(&mut self, rights: &[u64]) -> Result<&mut Self, RightsError> {
        let n = self.checked_size()?;
        for &right in rights {
            let i = self.word_index(right, n)?;
            self.cr_rights[i] &= !(right & CAP_RIGHT_MASK);
            debug_assert_eq!(capidxbit(self.cr_rights[i]), capidxbit(right));
        }
        Ok(self)
    }

    /// Returns `true` if every right in `rights` is fully present (`cap_rights_is_set`).
    pub fn is_set(&self, rights: &[u64]) -> Result<bool, RightsError> {
        let n = self.checked_size()?;
        for &right in rights {
            let i = self.word_index(right, n)?;
            if self.cr_rights[i] & right != right {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Structural check matching `cap_rights_is_valid`.
    pub fn is_valid(&self) -> bool {
        if self.version() != CAP_RIGHTS_VERSION_00 {
            return false;
        }
        let n = self.array_size();
        if !(CAP_ARRAY_SIZE_MIN..=CAP_ARRAY_SIZE_MAX).contains(&n) {
            return false;
        }
        if caprver(self.cr_rights[1]) != 0 {
            return false;
        }
        self.cr_rights[..n]
            .iter()
            .enumerate()
            .all(|(i, &word)| capidxbit(word) == 1 << i)
    }

    /// `true` if no right is set.
    pub fn is_empty(&self) -> bool {
        self.cr_rights.iter().all(|w| w & CAP_RIGHT_MASK == 0)
    }

    /// `true` if every right in `other` is also in `self` (`cap_rights_contains`).
    pub fn contains(&self, other: &Self) -> bool {
        self.cr_rights
            .iter()
            .zip(other.cr_rights.iter())
            .all(|(&mine, &theirs)| mine & theirs == theirs)
    }

    /// Adds every right of `other` (`cap_rights_merge`).
    pub fn merge(&mut self, other: &Self) -> &mut Self {
        for (mine, theirs) in self.cr_rights.iter_mut().zip(other.cr_rights.iter()) {
            *mine |= theirs & CAP_RIGHT_MASK;
        }
        self
    }

    /// Removes every right of `other` (`cap_rights_remove`).
    pub fn remove(&mut self, other: &Self) -> &mut Self {
        for (mine, theirs) in self.cr_rights.iter_mut().zip(other.cr_rights.iter()) {
            *mine &= !(theirs & CAP_RIGHT_MASK);
        }
        self
    }

    /// Applies the rule the kernel uses when a limited descriptor is limited
    /// again: the request must not add anything.
    pub fn narrow(&self, requested: &Self) -> Result<Self, RightsError> {
        let version = requested.version();
        if version != CAP_RIGHTS_VERSION_00 {
            return Err(RightsError::BadVersion(version));
        }
        if !requested.is_valid() {
            let [w0, w1] = requested.cr_rights;
            return Err(RightsError::Malformed(w0, w1));
        }
        if !self.contains(requested) {
            return Err(RightsError::NotCapable);
        }
        Ok(*requested)
    }

    /// Names of the primitive rights present in the set.
    pub fn names(&self) -> Vec<&'static str> {
        RIGHT_NAMES
            .iter()
            .filter(|&&(_, right)| self.is_set(&[right]).unwrap_or(false))
            .map(|&(name, _)| name)
            .collect()
    }

    fn checked_size(&self) -> Result<usize, RightsError> {
        let version = self.version();
        if version != CAP_RIGHTS_VERSION_00 {
            return Err(RightsError::BadVersion(version));
        }
        let n = self.array_size();
        if !(CAP_ARRAY_SIZE_MIN..=CAP_ARRAY_SIZE_MAX).contains(&n) {
            return Err(RightsError::BadSize(n));
        }
        Ok(n)
    }

    fn word_index(&self, right: u64, n: usize) -> Result<usize, RightsError> {
        if caprver(right) != CAP_RIGHTS_VERSION_00 {
            return Err(RightsError::BadRightVersion(right));
        }
        let i = usize::try_from(BIT2IDX[capidxbit(right)])
            .map_err(|_| RightsError::IndexOutOfRange(right))?;
        if i >= n {
            return Err(RightsError::IndexOverflow { right, size: n });
        }
        if capidxbit(self.cr_rights[i]) != capidxbit(right) {
            return Err(RightsError::IndexMismatch(right));
        }
        Ok(i)
    }
}

impl Default for CapRights {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for CapRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapRights")
            .field(
                "words",
                &format_args!("[{:#018x}, {:#018x}]", self.cr_rights[0], self.cr_rights[1]),
            )
            .field("names", &self.names())
            .finish()
    }
}

impl fmt::Display for CapRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            f.write_str("(none)")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}
