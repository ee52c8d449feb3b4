use std::io;
use std::process::{Command, Output, Stdio};
use anyhow::{Context, Result};
use log::{debug, warn};
use crate::model::Entry;

const SHELL: &str = "sh";

fn shell(command: &str) -> Command {
    let mut cmd = Command::new(SHELL);
    cmd.arg("-c").arg(command).stdin(Stdio::null());
    cmd
}

/// Runs the entry's command to completion. The exit status is reported back
/// but never treated as an error; only failing to start the shell is.
pub fn execute(entry: &Entry) -> Result<Output> {
    debug!("Executing '{}': {}", entry.name, entry.command);

    let output = shell(&entry.command)
        .output()
        .with_context(|| format!("failed to run command for '{}'", entry.name))?;

    debug!(
        "Command for '{}' exited with {} (stdout {} bytes, stderr {} bytes)",
        entry.name,
        output.status,
        output.stdout.len(),
        output.stderr.len()
    );
    Ok(output)
}

/// Runs a generator command and returns one name per non-blank stdout line.
pub fn generate_names(command: &str) -> io::Result<Vec<String>> {
    let output = shell(command).output()?;
    if !output.status.success() {
        warn!("Generator '{}' exited with {}", command, output.status);
    }
    Ok(split_lines(&String::from_utf8_lossy(&output.stdout)))
}

fn split_lines(stdout: &str) -> Vec<String> {
    stdout
        .trim_end()
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(command: &str) -> Entry {
        Entry::new("foo".to_string(), command.to_string(), "test".to_string())
    }

    #[test]
    fn execute_runs_the_literal_command() {
        let output = execute(&entry("echo foo")).unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "foo\n");
    }

    #[test]
    fn failing_command_is_not_an_error() {
        let output = execute(&entry("exit 3")).unwrap();
        assert_eq!(output.status.code(), Some(3));
    }

    #[test]
    fn generator_splits_stdout_into_names() {
        let names = generate_names("printf 'one\\ntwo\\n\\nthree\\n\\n'").unwrap();
        assert_eq!(names, vec!["one", "two", "three"]);
    }

    #[test]
    fn generator_with_no_output_yields_nothing() {
        assert!(generate_names("true").unwrap().is_empty());
    }

    #[test]
    fn generator_output_is_kept_on_failure() {
        let names = generate_names("echo partial; exit 1").unwrap();
        assert_eq!(names, vec!["partial"]);
    }

    #[test]
    fn split_lines_strips_carriage_returns() {
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a", "b"]);
    }
}
