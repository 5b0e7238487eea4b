//! unixcall-harness: out-of-process confinement tests
//!
//! Some properties can only be tested by giving up privileges for good:
//! once a process calls `cap_enter` or lowers a hard limit, it can't undo it,
//! and neither can the rest of the test binary sharing that process. This crate
//! runs each such case in a fresh copy of the test executable.
//!
//! ## How it works
//!
//! 1. The parent test calls [`Harness::exits_correctly`] with a proc name
//! 2. The harness re-executes `current_exe()`, passing the name and an
//!    argument (usually a scratch directory) through the environment
//! 3. In the child the same test runs again; [`Harness::dispatch`] sees the
//!    environment, runs the registered body and exits
//! 4. Before the body runs, the child writes the proc name to a marker file
//!    the parent created; a child that never gets there is reported as
//!    [`HarnessError::NotDispatched`]
//! 5. The parent compares the child's exit status with what the proc expects
//!
//! A body must terminate the process itself, through [`exit_ok`], [`fail`] or
//! `exec`. Returning is an error and is reported as the opposite outcome.
//!
//! ## Quick Start
//!
//! ```ignore
//! use unixcall_harness::{Harness, HarnessConfig, exit_ok};
//!
//! fn confined(dir: &std::path::Path) {
//!     // drop privileges, probe forbidden operations...
//!     exit_ok();
//! }
//!
//! #[test]
//! fn confinement() {
//!     let dir = tempfile::tempdir().unwrap();
//!     Harness::new(HarnessConfig::default())
//!         .succeeds("confined", confined)
//!         .exits_correctly("confined", dir.path())
//!         .unwrap();
//! }
//! ```

pub mod config;
pub mod outcome;
pub mod registry;

pub use config::{ChildRequest, HarnessConfig};
pub use outcome::{OsErrno, check, exit_ok, expect_errno, fail};
pub use registry::{Expect, Harness, HarnessError, ProcFn, TestProc};
