//! An API to the Go compiler toolchain.
//!
//! `gobuild` models a Go build environment — target OS and architecture,
//! GOPATH/GOROOT, cgo policy, module mode and build tags — and translates it
//! into the subprocess environment variables and version-sensitive argument
//! lists needed to produce reproducible, stripped binaries with `go build`.
//!
//! The environment is captured once, up front, as an immutable [`BuildEnv`];
//! every invocation derived from it is a pure function of its fields, so the
//! same configuration always yields the same command line regardless of host
//! quirks.
//!
//! ```no_run
//! use gobuild::{BuildEnv, BuildOpts};
//!
//! let mut env = BuildEnv::from_env();
//! env.goos = "linux".to_string();
//! env.goarch = "amd64".to_string();
//! env.cgo_enabled = false;
//!
//! env.build_dir("/src/app", "/out/app", &BuildOpts::default())?;
//! # Ok::<(), gobuild::Error>(())
//! ```

mod build;
mod env;
mod error;
mod version;

pub use build::BuildOpts;
pub use env::BuildEnv;
pub use error::{Error, Result};
