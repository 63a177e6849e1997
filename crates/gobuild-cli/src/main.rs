//! gobuild - reproducible Go builds from the command line.
//!
//! ## Commands
//!
//! - `env`: show the subprocess environment a go invocation would receive
//! - `version`: probe the installed toolchain's version token
//! - `build`: compile a source directory into a reproducible, stripped binary

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gobuild::{BuildEnv, BuildOpts};

#[derive(Parser)]
#[command(name = "gobuild")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reproducible Go builds", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    overrides: EnvOverrides,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides applied on top of the host-derived build environment.
#[derive(Args)]
struct EnvOverrides {
    /// Target operating system (GOOS)
    #[arg(long, global = true)]
    goos: Option<String>,

    /// Target architecture (GOARCH)
    #[arg(long, global = true)]
    goarch: Option<String>,

    /// Workspace root (GOPATH)
    #[arg(long, global = true)]
    gopath: Option<PathBuf>,

    /// Toolchain installation root (GOROOT)
    #[arg(long, global = true)]
    goroot: Option<PathBuf>,

    /// Enable or disable cgo (CGO_ENABLED)
    #[arg(long, global = true, value_name = "BOOL")]
    cgo: Option<bool>,

    /// Module mode (GO111MODULE: on, off, auto)
    #[arg(long, global = true)]
    go111module: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the environment variables a go invocation would receive
    Env {
        /// Emit the build environment as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe the installed toolchain and print its version token
    Version,

    /// Compile a source directory into a reproducible, stripped binary
    Build {
        /// Directory containing the package to build
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Output path for the built binary
        #[arg(short, long)]
        output: PathBuf,

        /// Keep symbols (skip the extra strip pass)
        #[arg(long)]
        no_strip: bool,

        /// Build tags to enable
        #[arg(short, long)]
        tags: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json_logs, level);

    let mut env = BuildEnv::from_env();
    apply_overrides(&mut env, &cli.overrides);

    match cli.command {
        Commands::Env { json } => cmd_env(&env, json),
        Commands::Version => cmd_version(&env),
        Commands::Build {
            dir,
            output,
            no_strip,
            tags,
        } => {
            env.build_tags = tags;
            cmd_build(&env, &dir, &output, no_strip)
        }
    }
}

fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

fn apply_overrides(env: &mut BuildEnv, overrides: &EnvOverrides) {
    if let Some(goos) = &overrides.goos {
        env.goos = goos.clone();
    }
    if let Some(goarch) = &overrides.goarch {
        env.goarch = goarch.clone();
    }
    if let Some(gopath) = &overrides.gopath {
        env.gopath = gopath.clone();
    }
    if let Some(goroot) = &overrides.goroot {
        env.goroot = goroot.clone();
    }
    if let Some(cgo) = overrides.cgo {
        env.cgo_enabled = cgo;
    }
    if let Some(module) = &overrides.go111module {
        env.go111module = module.clone();
    }
}

/// Print the environment a go invocation would receive
fn cmd_env(env: &BuildEnv, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(env)?);
    } else {
        for entry in env.env_vars() {
            println!("{}", entry);
        }
    }
    Ok(())
}

/// Probe and print the toolchain version token
fn cmd_version(env: &BuildEnv) -> Result<()> {
    let version = env
        .version()
        .context("failed to probe the go toolchain version")?;
    println!("{}", version);
    Ok(())
}

/// Build a directory into a reproducible binary
fn cmd_build(env: &BuildEnv, dir: &Path, output: &Path, no_strip: bool) -> Result<()> {
    let opts = BuildOpts {
        no_strip,
        ..Default::default()
    };

    env.build_dir(dir, output, &opts)
        .with_context(|| format!("build failed for {}", dir.display()))?;

    println!("built {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_replaces_only_given_fields() {
        let mut env = BuildEnv {
            goos: "darwin".to_string(),
            goarch: "arm64".to_string(),
            cgo_enabled: true,
            ..Default::default()
        };

        let overrides = EnvOverrides {
            goos: Some("linux".to_string()),
            goarch: None,
            gopath: Some(PathBuf::from("/tmp/ws")),
            goroot: None,
            cgo: Some(false),
            go111module: Some("on".to_string()),
        };
        apply_overrides(&mut env, &overrides);

        assert_eq!(env.goos, "linux");
        assert_eq!(env.goarch, "arm64");
        assert_eq!(env.gopath, PathBuf::from("/tmp/ws"));
        assert!(env.goroot.as_os_str().is_empty());
        assert!(!env.cgo_enabled);
        assert_eq!(env.go111module, "on");
    }

    #[test]
    fn test_cli_parses_build_invocation() {
        let cli = Cli::try_parse_from([
            "gobuild", "--goos", "linux", "--goarch", "amd64", "build", "src/app", "-o",
            "out/app", "--tags", "netgo",
        ])
        .unwrap();

        assert_eq!(cli.overrides.goos.as_deref(), Some("linux"));
        match cli.command {
            Commands::Build { dir, output, tags, no_strip } => {
                assert_eq!(dir, PathBuf::from("src/app"));
                assert_eq!(output, PathBuf::from("out/app"));
                assert_eq!(tags, vec!["netgo".to_string()]);
                assert!(!no_strip);
            }
            _ => panic!("expected build subcommand"),
        }
    }
}
