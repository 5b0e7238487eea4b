//! Named child procedures and the parent-side driver.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write as _};
use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::{ChildRequest, HarnessConfig};

/// A child procedure body. It receives the argument passed by the parent and
/// must terminate the process.
pub type ProcFn = fn(&Path);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Exit code of a child that could not start the requested body.
const EXIT_DISPATCH_ERROR: i32 = 2;

/// What a zero exit from the child means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// The child proves its case by exiting 0.
    Success,
    /// The child proves its case by exiting non-zero.
    Failure,
}

impl Expect {
    fn matches(self, status: ExitStatus) -> bool {
        status.success() == (self == Self::Success)
    }

    /// Exit code for a body that returned instead of exiting.
    fn fallthrough_code(self) -> i32 {
        match self {
            Self::Success => 1,
            Self::Failure => 0,
        }
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "succeed",
            Self::Failure => "fail",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TestProc {
    pub body: ProcFn,
    pub expect: Expect,
}

impl TestProc {
    pub const fn new(body: ProcFn, expect: Expect) -> Self {
        Self { body, expect }
    }
}

/// Error from running a child procedure.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("unknown test proc {0:?}")]
    UnknownProc(String),

    #[error("locate test executable: {0}")]
    CurrentExe(io::Error),

    #[error("dispatch marker: {0}")]
    Marker(io::Error),

    #[error("spawn {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("wait for {name}: {source}")]
    Wait {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("process {name} did not {expected} when it was supposed to ({status})")]
    WrongOutcome {
        name: String,
        expected: Expect,
        status: ExitStatus,
    },

    #[error("process {name} exited ({status}) without running its body")]
    NotDispatched { name: String, status: ExitStatus },

    #[error("process {name} still running after {timeout:?}, killed")]
    Timeout { name: String, timeout: Duration },
}

/// A set of named child procedures sharing one configuration.
#[derive(Debug, Clone, Default)]
pub struct Harness {
    config: HarnessConfig,
    procs: HashMap<&'static str, TestProc>,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            procs: HashMap::new(),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn register(mut self, name: &'static str, proc: TestProc) -> Self {
        self.procs.insert(name, proc);
        self
    }

    /// Registers a proc that passes by exiting 0.
    pub fn succeeds(self, name: &'static str, body: ProcFn) -> Self {
        self.register(name, TestProc::new(body, Expect::Success))
    }

    /// Registers a proc that passes by exiting non-zero.
    pub fn fails(self, name: &'static str, body: ProcFn) -> Self {
        self.register(name, TestProc::new(body, Expect::Failure))
    }

    pub fn get(&self, name: &str) -> Option<&TestProc> {
        self.procs.get(name)
    }

    /// Runs the requested proc and exits if this process is a harness child.
    /// Returns normally otherwise.
    pub fn dispatch(&self) {
        if let Some(request) = self.config.child_request() {
            let code = self.run_child(&request);
            std::process::exit(code);
        }
    }

    fn run_child(&self, request: &ChildRequest) -> i32 {
        let Some(proc) = self.procs.get(request.name.as_str()) else {
            writeln!(io::stderr(), "unknown test proc {:?}", request.name).ok();
            return EXIT_DISPATCH_ERROR;
        };
        if let Some(marker) = &request.marker {
            if let Err(e) = std::fs::write(marker, request.name.as_bytes()) {
                writeln!(io::stderr(), "record dispatch of {:?}: {e}", request.name).ok();
                return EXIT_DISPATCH_ERROR;
            }
        }
        (proc.body)(&request.arg);
        writeln!(io::stderr(), "test function did not exit").ok();
        proc.expect.fallthrough_code()
    }

    /// Builds the command that re-executes this binary to run `name`.
    ///
    /// Fails with `InvalidInput` if `name` isn't registered.
    pub fn command(&self, name: &str, arg: &Path) -> io::Result<Command> {
        if !self.procs.contains_key(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unknown test proc {name:?}"),
            ));
        }
        let exe = std::env::current_exe()?;
        let mut cmd = Command::new(exe);
        cmd.args(self.config.child_args())
            .env(&self.config.proc_var, name)
            .env(&self.config.arg_var, arg);
        Ok(cmd)
    }

    /// Runs `name` in a child and checks its exit status against the proc's
    /// expectation.
    ///
    /// The child must record that it reached the body in a marker file before
    /// running it; an exit without that record is [`HarnessError::NotDispatched`]
    /// whatever the status.
    ///
    /// In a harness child this dispatches instead and never returns, so test
    /// functions can call it unconditionally.
    pub fn exits_correctly(&self, name: &str, arg: &Path) -> Result<(), HarnessError> {
        self.dispatch();

        let proc = self
            .get(name)
            .ok_or_else(|| HarnessError::UnknownProc(name.to_owned()))?;
        let marker = tempfile::NamedTempFile::new().map_err(HarnessError::Marker)?;
        let mut cmd = self.command(name, arg).map_err(HarnessError::CurrentExe)?;
        cmd.env(&self.config.marker_var, marker.path());
        let mut child = cmd
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                name: name.to_owned(),
                source,
            })?;
        tracing::debug!(proc = name, pid = child.id(), arg = %arg.display(), "spawned test proc");

        let status = self.wait(name, &mut child)?;
        tracing::debug!(proc = name, %status, "test proc exited");

        let recorded = std::fs::read(marker.path()).map_err(HarnessError::Marker)?;
        if recorded != name.as_bytes() {
            return Err(HarnessError::NotDispatched {
                name: name.to_owned(),
                status,
            });
        }

        if proc.expect.matches(status) {
            Ok(())
        } else {
            Err(HarnessError::WrongOutcome {
                name: name.to_owned(),
                expected: proc.expect,
                status,
            })
        }
    }

    fn wait(&self, name: &str, child: &mut Child) -> Result<ExitStatus, HarnessError> {
        let wait_err = |source| HarnessError::Wait {
            name: name.to_owned(),
            source,
        };
        let deadline = Instant::now() + self.config.timeout;
        loop {
            if let Some(status) = child.try_wait().map_err(wait_err)? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                tracing::warn!(proc = name, pid = child.id(), "test proc timed out, killing");
                child.kill().ok();
                child.wait().ok();
                return Err(HarnessError::Timeout {
                    name: name.to_owned(),
                    timeout: self.config.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}
