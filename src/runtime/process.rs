//! Subprocess invocation.

use anyhow::{Context, Result, bail};
use log::debug;
use std::process::Command;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn command_output_impl(&self, program: &str, args: &[String]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run `{} {}`", program, args.join(" ")))?;

        if !output.status.success() {
            bail!(
                "`{} {}` exited with {}: {}",
                program,
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8(output.stdout)
            .with_context(|| format!("`{} {}` printed non UTF-8 output", program, args.join(" ")))?;
        debug!("`{} {}` -> {:?}", program, args.join(" "), stdout.trim());
        Ok(stdout.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[test]
    #[cfg(unix)]
    fn test_command_output_is_trimmed() {
        let runtime = RealRuntime;
        let out = runtime
            .command_output("sh", &["-c".into(), "echo '  /proj/node_modules  '".into()])
            .unwrap();
        assert_eq!(out, "/proj/node_modules");
    }

    #[test]
    #[cfg(unix)]
    fn test_command_output_failure_status() {
        let runtime = RealRuntime;
        let err = runtime
            .command_output("sh", &["-c".into(), "echo boom >&2; exit 3".into()])
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_command_output_missing_program() {
        let runtime = RealRuntime;
        let result = runtime.command_output("goforblob-no-such-program", &[]);
        assert!(result.is_err());
    }
}
