//! Capsicum confinement, checked from inside a child that has really entered
//! capability mode.

#![cfg(all(target_os = "freebsd", target_arch = "x86_64"))]

use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};

use unixcall_harness::{Harness, HarnessConfig, check, exit_ok, expect_errno, fail};
use unixcall_sys::{CapRights, Errno};
use unixcall_sys::capsicum::{
    ECAPMODE, ENOTCAPABLE, cap_enter, cap_getmode, cap_rights_get, cap_rights_limit,
};
use unixcall_sys::fs::{Mode, OFlags, open, openat};
use unixcall_sys::rights::{CAP_LOOKUP, CAP_READ, CAP_WRITE};

fn harness() -> Harness {
    Harness::new(HarnessConfig::default())
        .succeeds("cap_enter", enter_blocks_open)
        .succeeds("openat", openat_confined)
}

fn append(path: &Path) -> Result<OwnedFd, Errno> {
    open(
        path,
        OFlags::WRONLY | OFlags::CREATE | OFlags::APPEND,
        Mode::from_raw_mode(0o666),
    )
}

fn enter_blocks_open(dir: &Path) {
    drop(check(append(&dir.join("cap.test")), "open before cap_enter"));
    check(cap_enter(), "cap_enter");
    expect_errno(append(&dir.join("self.test")), ECAPMODE, "open after cap_enter");
    exit_ok();
}

fn openat_confined(dir: &Path) {
    let dirfd = check(
        open(dir, OFlags::RDONLY | OFlags::DIRECTORY, Mode::empty()),
        "open dir",
    );
    check(cap_enter(), "cap_enter");

    let created = openat(
        &dirfd,
        "xx",
        OFlags::WRONLY | OFlags::CREATE | OFlags::APPEND,
        Mode::from_raw_mode(0o666),
    );
    drop(check(created, "openat xx before limit"));

    expect_errno(append(&dir.join("xx")), ECAPMODE, "ambient open");
    let mut sibling = PathBuf::from(dir);
    sibling.as_mut_os_string().push("2");
    expect_errno(std::fs::create_dir(&sibling), ECAPMODE, "mkdir");

    let read_lookup = check(CapRights::init(&[CAP_READ, CAP_LOOKUP]), "rights init");
    check(cap_rights_limit(&dirfd, &read_lookup), "cap_rights_limit");

    let got = check(cap_rights_get(&dirfd), "cap_rights_get");
    if !check(got.is_set(&[CAP_READ, CAP_LOOKUP]), "is_set") {
        fail(format_args!("read/lookup missing after limit: {got}"));
    }
    if check(got.is_set(&[CAP_WRITE]), "is_set") {
        fail(format_args!("write still present after limit: {got}"));
    }

    let wider = check(
        CapRights::init(&[CAP_READ, CAP_LOOKUP, CAP_WRITE]),
        "rights init",
    );
    expect_errno(cap_rights_limit(&dirfd, &wider), ENOTCAPABLE, "widen rights");

    expect_errno(
        openat(
            &dirfd,
            "xx2",
            OFlags::WRONLY | OFlags::CREATE | OFlags::APPEND,
            Mode::from_raw_mode(0o666),
        ),
        ENOTCAPABLE,
        "openat create without write",
    );
    drop(check(
        openat(&dirfd, "xx", OFlags::RDONLY, Mode::empty()),
        "openat read",
    ));

    if !check(cap_getmode(), "cap_getmode") {
        fail("not in capability mode");
    }
    exit_ok();
}

#[test]
fn cap_enter_blocks_global_namespace() {
    let dir = tempfile::tempdir().unwrap();
    harness().exits_correctly("cap_enter", dir.path()).unwrap();
    assert!(dir.path().join("cap.test").exists());
    assert!(!dir.path().join("self.test").exists());
}

#[test]
fn openat_respects_descriptor_rights() {
    let dir = tempfile::tempdir().unwrap();
    harness().exits_correctly("openat", dir.path()).unwrap();

    assert!(dir.path().join("xx").exists());
    assert!(!dir.path().join("xx2").exists());
    let mut sibling = dir.path().as_os_str().to_owned();
    sibling.push("2");
    assert!(!Path::new(&sibling).exists());
}
