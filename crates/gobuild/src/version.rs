//! Probing the installed toolchain's version.

use tracing::debug;

use crate::env::{run_captured, BuildEnv};
use crate::error::Error;
use crate::Result;

impl BuildEnv {
    /// The version token `go version` reports for the toolchain in this
    /// environment, e.g. `go1.14.1`.
    ///
    /// A single synchronous attempt: the call is cheap and deterministic, so
    /// a failure is treated as real rather than transient.
    pub fn version(&self) -> Result<String> {
        let raw = run_captured(&mut self.go_cmd(["version"]), "version")?;
        let token = parse_version_output(&raw)?;
        debug!("toolchain reports version {}", token);
        Ok(token)
    }
}

/// Extract the version token from `go version` output.
///
/// The self-report format is `go version <version-token> <platform-token>`;
/// anything with fewer than three whitespace-separated fields is rejected.
fn parse_version_output(raw: &str) -> Result<String> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(Error::MalformedVersionOutput {
            output: raw.to_string(),
        });
    }
    Ok(fields[2].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_output() {
        let token = parse_version_output("go version go1.13.8 linux/amd64\n").unwrap();
        assert_eq!(token, "go1.13.8");
    }

    #[test]
    fn test_parse_version_extra_fields_takes_third() {
        let token = parse_version_output("go version go1.14.1 linux/amd64 extra").unwrap();
        assert_eq!(token, "go1.14.1");
    }

    #[test]
    fn test_parse_version_rejects_short_output() {
        let err = parse_version_output("broken output").unwrap_err();
        match err {
            Error::MalformedVersionOutput { output } => assert_eq!(output, "broken output"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_version_rejects_empty_output() {
        assert!(matches!(
            parse_version_output(""),
            Err(Error::MalformedVersionOutput { .. })
        ));
    }
}
