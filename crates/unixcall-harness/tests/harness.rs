//! Re-exec harness behaviour on any Unix.
//!
//! Every test here runs twice: once as the parent, and once more inside the
//! child it spawns, where `exits_correctly` dispatches to the registered body.

use std::path::Path;
use std::time::Duration;

use unixcall_harness::{Harness, HarnessConfig, HarnessError, check, exit_ok, fail};
use unixcall_sys::process::exec;

fn harness() -> Harness {
    Harness::new(HarnessConfig::default())
        .succeeds("exit_zero", exit_zero)
        .fails("exit_one", exit_one)
        .succeeds("forgets_to_exit_ok", forgets_to_exit)
        .fails("forgets_to_exit_fail", forgets_to_exit)
        .succeeds("writes_marker", writes_marker)
        .succeeds("exec_true", exec_true)
        .fails("exec_false", exec_false)
}

fn exit_zero(_: &Path) {
    exit_ok();
}

fn exit_one(_: &Path) {
    fail("exiting 1 on purpose");
}

fn forgets_to_exit(_: &Path) {}

fn writes_marker(dir: &Path) {
    check(std::fs::write(dir.join("marker"), b"child"), "write marker");
    exit_ok();
}

fn exec_true(_: &Path) {
    let err = exec("/bin/sh", &["sh", "-c", "exit 0"], &[] as &[&str]);
    fail(format_args!("exec /bin/sh: {err}"));
}

fn exec_false(_: &Path) {
    let err = exec("/bin/sh", &["sh", "-c", "exit 3"], &[] as &[&str]);
    // A failed exec would also fail the child and mask the real outcome.
    eprintln!("exec /bin/sh: {err}");
    exit_ok();
}

#[test]
fn zero_exit_succeeds() {
    harness().exits_correctly("exit_zero", Path::new("/")).unwrap();
}

#[test]
fn nonzero_exit_fails() {
    harness().exits_correctly("exit_one", Path::new("/")).unwrap();
}

#[test]
fn returning_body_inverts_success() {
    let err = harness()
        .exits_correctly("forgets_to_exit_ok", Path::new("/"))
        .unwrap_err();
    assert!(matches!(err, HarnessError::WrongOutcome { .. }), "{err}");
}

#[test]
fn returning_body_inverts_failure() {
    let err = harness()
        .exits_correctly("forgets_to_exit_fail", Path::new("/"))
        .unwrap_err();
    assert!(err.to_string().contains("did not fail"), "{err}");
}

#[test]
fn argument_reaches_child() {
    let dir = tempfile::tempdir().unwrap();
    harness().exits_correctly("writes_marker", dir.path()).unwrap();
    assert_eq!(std::fs::read(dir.path().join("marker")).unwrap(), b"child");
}

#[test]
fn exec_replaces_child() {
    harness().exits_correctly("exec_true", Path::new("/")).unwrap();
}

#[test]
fn exec_status_is_reported() {
    harness().exits_correctly("exec_false", Path::new("/")).unwrap();
}

#[test]
fn child_that_never_reaches_body_is_an_error() {
    // The libtest filter is the thread name; from a helper thread it matches
    // no test, so the child runs nothing and exits 0.
    let result = std::thread::Builder::new()
        .name("helper".into())
        .spawn(|| harness().exits_correctly("exit_zero", Path::new("/")))
        .unwrap()
        .join()
        .unwrap();
    let err = result.unwrap_err();
    assert!(matches!(err, HarnessError::NotDispatched { .. }), "{err}");
}

#[test]
fn unknown_proc_is_an_error() {
    let err = harness()
        .exits_correctly("no_such_proc", Path::new("/"))
        .unwrap_err();
    assert!(matches!(err, HarnessError::UnknownProc(_)));
}

fn sleeps(_: &Path) {
    std::thread::sleep(Duration::from_secs(30));
    exit_ok();
}

#[test]
fn hung_child_times_out() {
    let err = Harness::new(HarnessConfig::default().timeout(Duration::from_millis(300)))
        .succeeds("sleeps", sleeps)
        .exits_correctly("sleeps", Path::new("/"))
        .unwrap_err();
    assert!(matches!(err, HarnessError::Timeout { .. }), "{err}");
}

#[cfg(target_os = "linux")]
mod rlimit {
    use std::path::Path;

    use rustix::process::{Resource, Rlimit, setrlimit};
    use unixcall_harness::{Harness, HarnessConfig, check, exit_ok, expect_errno};
    use unixcall_sys::Errno;
    use unixcall_sys::fs::{Mode, OFlags, open};

    // Lowering the hard limit can't be undone, so it has to happen in a child.
    fn no_descriptors(_: &Path) {
        check(
            setrlimit(
                Resource::Nofile,
                Rlimit {
                    current: Some(0),
                    maximum: Some(0),
                },
            ),
            "setrlimit",
        );
        expect_errno(
            open("/dev/null", OFlags::RDONLY, Mode::empty()),
            Errno::MFILE,
            "open /dev/null",
        );
        exit_ok();
    }

    #[test]
    fn open_fails_without_descriptors() {
        Harness::new(HarnessConfig::default())
            .succeeds("no_descriptors", no_descriptors)
            .exits_correctly("no_descriptors", Path::new("/"))
            .unwrap();
    }
}
