//! Post-write formatting pass over an emitted file.
use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

pub const DEFAULT_GOFMT: &str = "gofmt";

/// Rewrites a generated file in place.
pub trait Formatter: Send + Sync {
    fn format(&self, path: &Path) -> Result<()>;
}

/// `gofmt -w <file>`.
#[derive(Debug, Clone)]
pub struct GoFmt {
    pub program: String,
}

impl Default for GoFmt {
    fn default() -> Self {
        Self { program: DEFAULT_GOFMT.to_string() }
    }
}

impl Formatter for GoFmt {
    fn format(&self, path: &Path) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("-w")
            .arg(path)
            .output()
            .map_err(|error| Error::FormatFailure {
                path: path.to_path_buf(),
                message: format!("cannot run `{}`: {error}", self.program),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::FormatFailure {
                path: path.to_path_buf(),
                message: format!("`{}` exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}

/// Leaves the file as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFormat;

impl Formatter for NoFormat {
    fn format(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_format_failure() {
        let fmt = GoFmt { program: "json2go-test-no-such-formatter".into() };
        let err = fmt.format(Path::new("whatever.go")).unwrap_err();
        match err {
            Error::FormatFailure { path, message } => {
                assert_eq!(path, Path::new("whatever.go"));
                assert!(message.contains("json2go-test-no-such-formatter"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_format_failure() {
        // `false` ignores its arguments and exits 1
        let fmt = GoFmt { program: "false".into() };
        let err = fmt.format(Path::new("generated.go")).unwrap_err();
        match err {
            Error::FormatFailure { path, message } => {
                assert_eq!(path, Path::new("generated.go"));
                assert!(message.contains("exited with"), "{message}");
                assert!(message.contains("exit status: 1"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn no_format_is_a_no_op() {
        assert!(NoFormat.format(Path::new("missing.go")).is_ok());
    }
}
