//! Harness configuration with builder pattern.
//!
//! ```ignore
//! let config = HarnessConfig::default()
//!     .timeout(Duration::from_secs(10))
//!     .libtest_filter(false)
//!     .arg("--child-mode");
//! ```
//!
//! ## Defaults
//!
//! | Setting | Default |
//! |---------|---------|
//! | Proc name variable | `UNIXCALL_INTERNAL_PROCNAME` |
//! | Argument variable | `UNIXCALL_INTERNAL_ARG` |
//! | Dispatch marker variable | `UNIXCALL_INTERNAL_DISPATCHED` |
//! | Timeout | 60 seconds |
//! | libtest filter | enabled |

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PROC_VAR: &str = "UNIXCALL_INTERNAL_PROCNAME";
pub const DEFAULT_ARG_VAR: &str = "UNIXCALL_INTERNAL_ARG";
pub const DEFAULT_MARKER_VAR: &str = "UNIXCALL_INTERNAL_DISPATCHED";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How children are launched and recognised.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub proc_var: String,
    pub arg_var: String,
    /// Names the file a child writes its proc name to before running the body.
    pub marker_var: String,
    pub timeout: Duration,
    /// Forward `--exact <test name>` so the child only runs the calling test.
    ///
    /// The test name is taken from the current thread, which libtest names
    /// after the test. Disable this for `harness = false` binaries.
    pub libtest_filter: bool,
    pub extra_args: Vec<OsString>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            proc_var: DEFAULT_PROC_VAR.into(),
            arg_var: DEFAULT_ARG_VAR.into(),
            marker_var: DEFAULT_MARKER_VAR.into(),
            timeout: DEFAULT_TIMEOUT,
            libtest_filter: true,
            extra_args: Vec::new(),
        }
    }
}

impl HarnessConfig {
    pub fn proc_var(mut self, name: impl Into<String>) -> Self {
        self.proc_var = name.into();
        self
    }

    pub fn arg_var(mut self, name: impl Into<String>) -> Self {
        self.arg_var = name.into();
        self
    }

    pub fn marker_var(mut self, name: impl Into<String>) -> Self {
        self.marker_var = name.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn libtest_filter(mut self, enabled: bool) -> Self {
        self.libtest_filter = enabled;
        self
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Arguments passed to the re-executed binary.
    pub(crate) fn child_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if self.libtest_filter {
            if let Some(name) = current_test_name() {
                args.extend(["--exact".into(), name.into()]);
            }
            args.extend(["--nocapture".into(), "--quiet".into(), "--test-threads=1".into()]);
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// The request this process was started with, if it is a harness child.
    pub fn child_request(&self) -> Option<ChildRequest> {
        let name = std::env::var(&self.proc_var).ok().filter(|n| !n.is_empty())?;
        let arg = std::env::var_os(&self.arg_var)
            .map(PathBuf::from)
            .unwrap_or_default();
        let marker = std::env::var_os(&self.marker_var).map(PathBuf::from);
        Some(ChildRequest { name, arg, marker })
    }
}

/// What a harness child was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRequest {
    pub name: String,
    pub arg: PathBuf,
    /// Where to record that the body was reached.
    pub marker: Option<PathBuf>,
}

fn current_test_name() -> Option<String> {
    std::thread::current()
        .name()
        .filter(|name| *name != "main")
        .map(str::to_owned)
}
