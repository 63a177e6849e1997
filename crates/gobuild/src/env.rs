//! Go build environment modelling
//!
//! A [`BuildEnv`] holds the abstract build configuration (target OS and
//! architecture, workspace and toolchain roots, cgo policy, module mode,
//! build tags) and knows how to serialize itself into the environment
//! variables and command descriptors a `go` subprocess needs.

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use crate::error::Error;
use crate::Result;

/// The build environment for a single Go build operation.
///
/// Construct once (via [`BuildEnv::from_env`] or field-by-field), read many
/// times. All methods take `&self`, so a value can be shared read-only
/// across concurrent build calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildEnv {
    /// Target operating system (GOOS). Empty inherits the host default.
    pub goos: String,

    /// Target architecture (GOARCH). Empty inherits the host default.
    pub goarch: String,

    /// Workspace root (GOPATH). Empty uses the host default.
    pub gopath: PathBuf,

    /// Toolchain installation root (GOROOT). Empty resolves the `go` binary
    /// from the host PATH instead.
    pub goroot: PathBuf,

    /// Whether cgo is enabled (CGO_ENABLED).
    pub cgo_enabled: bool,

    /// Module mode (GO111MODULE), passed through verbatim. An empty value is
    /// itself meaningful to the toolchain ("use default").
    pub go111module: String,

    /// Build tags to enable.
    pub build_tags: Vec<String>,
}

impl BuildEnv {
    /// Build environment populated from the host: GOOS, GOARCH, GOROOT,
    /// CGO_ENABLED and GO111MODULE read from the inherited environment,
    /// GOPATH falling back to `$HOME/go`.
    ///
    /// Never fails; anything undiscoverable stays at its empty/host default.
    pub fn from_env() -> Self {
        let gopath = std::env::var_os("GOPATH").map(PathBuf::from).unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join("go"))
                .unwrap_or_default()
        });

        BuildEnv {
            goos: std::env::var("GOOS").unwrap_or_default(),
            goarch: std::env::var("GOARCH").unwrap_or_default(),
            gopath,
            goroot: std::env::var_os("GOROOT").map(PathBuf::from).unwrap_or_default(),
            cgo_enabled: std::env::var("CGO_ENABLED").map(|v| v != "0").unwrap_or(true),
            go111module: std::env::var("GO111MODULE").unwrap_or_default(),
            build_tags: Vec::new(),
        }
    }

    /// All environment variables for invoking a Go command, as ordered
    /// `KEY=VALUE` entries.
    ///
    /// CGO_ENABLED and GO111MODULE are always emitted; the remaining keys
    /// only when their field is set. When GOROOT is set, a PATH entry is
    /// also emitted that prepends `<goroot>/bin` to the inherited search
    /// path, so the configured toolchain also governs transitively invoked
    /// sub-tools.
    pub fn env_vars(&self) -> Vec<String> {
        let mut env = Vec::new();
        if !self.goarch.is_empty() {
            env.push(format!("GOARCH={}", self.goarch));
        }
        if !self.goos.is_empty() {
            env.push(format!("GOOS={}", self.goos));
        }
        if !self.gopath.as_os_str().is_empty() {
            env.push(format!("GOPATH={}", self.gopath.display()));
        }
        env.push(format!("CGO_ENABLED={}", u8::from(self.cgo_enabled)));
        env.push(format!("GO111MODULE={}", self.go111module));

        if !self.goroot.as_os_str().is_empty() {
            env.push(format!("GOROOT={}", self.goroot.display()));
            env.push(format!(
                "PATH={}:{}",
                self.goroot.join("bin").display(),
                std::env::var("PATH").unwrap_or_default()
            ));
        }
        env
    }

    /// Path to the `go` binary this environment invokes.
    pub fn go_bin(&self) -> PathBuf {
        if self.goroot.as_os_str().is_empty() {
            PathBuf::from("go")
        } else {
            self.goroot.join("bin").join("go")
        }
    }

    /// A ready-to-run descriptor for a go subcommand in this environment.
    ///
    /// The subprocess inherits the full host environment with
    /// [`env_vars`](Self::env_vars) overlaid on top (last-wins). Nothing is
    /// executed; running and output capture are the caller's responsibility.
    pub fn go_cmd<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(self.go_bin());
        cmd.args(args);
        for entry in self.env_vars() {
            if let Some((key, value)) = entry.split_once('=') {
                cmd.env(key, value);
            }
        }
        cmd
    }
}

impl fmt::Display for BuildEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.env_vars().join(" "))
    }
}

/// Run a prepared go command synchronously, capturing combined
/// stdout/stderr. Launch failures and non-zero exits both map to
/// [`Error::ToolchainExecution`].
pub(crate) fn run_captured(cmd: &mut Command, subcommand: &str) -> Result<String> {
    let output = cmd.output().map_err(|source| Error::ToolchainExecution {
        subcommand: subcommand.to_string(),
        output: String::new(),
        source: Some(source),
    })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(Error::ToolchainExecution {
            subcommand: subcommand.to_string(),
            output: text,
            source: None,
        });
    }
    Ok(text)
}
