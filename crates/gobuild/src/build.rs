//! Reproducible `go build` invocation
//!
//! Assembles the full, version-correct argument list for a build-and-strip
//! invocation and executes it. The argument skeleton is fixed: external
//! tooling snapshots the exact argument shape, so overlapping flags are
//! emitted as-is rather than deduplicated.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::env::{run_captured, BuildEnv};
use crate::error::Error;
use crate::Result;

/// Version tokens whose toolchains accept the unified `-trimpath` flag.
/// Older toolchains need the prefix spelled out per compile stage instead.
const UNIFIED_TRIMPATH_VERSIONS: &[&str] = &["go1.13", "go1.14", "gotip"];

/// Optional arguments to [`BuildEnv::build_dir`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildOpts {
    /// Build an unstripped binary.
    pub no_strip: bool,

    /// Extra arguments to `go build`.
    pub extra_args: Vec<String>,
}

impl BuildEnv {
    /// Compile the package in `dir`, writing the binary to `binary_path`.
    ///
    /// Output is reproducible byte-for-byte across hosts: the build cache is
    /// bypassed, symbols and the build id are stripped, and the workspace
    /// path is trimmed from the embedded debug metadata. The trim flag shape
    /// depends on the installed toolchain, so the version is probed first; a
    /// probe failure aborts the whole operation.
    pub fn build_dir(
        &self,
        dir: impl AsRef<Path>,
        binary_path: impl AsRef<Path>,
        opts: &BuildOpts,
    ) -> Result<()> {
        let dir = dir.as_ref();
        let binary_path = binary_path.as_ref();

        let version = self.version()?;
        let args = self.build_args(binary_path, opts, &version);

        info!(
            "building go package in {} -> {}",
            dir.display(),
            binary_path.display()
        );
        debug!("go {}", args.join(" "));

        let mut cmd = self.go_cmd(&args);
        cmd.current_dir(dir);

        match run_captured(&mut cmd, "build") {
            Ok(_) => Ok(()),
            Err(err) => Err(Error::BuildExecution {
                dir: dir.to_path_buf(),
                output: err.captured_output().to_string(),
                source: Box::new(err),
            }),
        }
    }

    /// Assemble the `go build` argument list for a toolchain reporting
    /// `version`. Pure function of the environment's fields; order is fixed.
    fn build_args(&self, binary_path: &Path, opts: &BuildOpts, version: &str) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            // Force rebuilding of packages.
            "-a".to_string(),
            // Strip all symbols, and don't embed a Go build ID to be reproducible.
            "-ldflags".to_string(),
            "-s -w -buildid=".to_string(),
            "-o".to_string(),
            binary_path.display().to_string(),
            "-installsuffix".to_string(),
            "uroot".to_string(),
            // Disable "function inlining" to get a smaller binary.
            "-gcflags=all=-l".to_string(),
        ];

        if !opts.no_strip {
            // Strip all symbols.
            args.push("-ldflags=-s -w".to_string());
        }

        // Trim the GOPATH out of the executable's debugging information.
        // E.g. trim /tmp/bb-*/ from /tmp/bb-12345567/src/github.com/...
        if UNIFIED_TRIMPATH_VERSIONS.iter().any(|marker| version.contains(marker)) {
            args.push("-trimpath".to_string());
        } else {
            args.push("-gcflags".to_string());
            args.push(format!("-trimpath={}", self.gopath.display()));
            args.push("-asmflags".to_string());
            args.push(format!("-trimpath={}", self.gopath.display()));
        }

        if !self.build_tags.is_empty() {
            args.push("-tags".to_string());
            args.push(self.build_tags.join(" "));
        }

        // The working directory is always set to `dir`, so this is always '.'.
        args.push(".".to_string());

        args
    }
}
