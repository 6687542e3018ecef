use log::{debug, warn};
use std::process::{Command, Output};

/// Result of a shell command run for a `$(...)` directive.
#[derive(Debug)]
pub struct ExecResult {
    pub stdout: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs `cmd` through `sh -c` and returns its stdout with trailing newlines
/// trimmed. A failing command still yields whatever it printed; a command
/// that cannot be spawned yields an empty string. Blocks until exit.
pub fn shell_exec(cmd: &str) -> String {
    let result = match Command::new("sh").arg("-c").arg(cmd).output() {
        Ok(output) => ExecResult::from(output),
        Err(e) => {
            warn!("failed to execute '{cmd}': {e}");
            return String::new();
        }
    };
    if !result.success {
        debug!("'{cmd}' exited with {}", result.code.unwrap_or(-1));
    }
    result.stdout.trim_end_matches(['\n', '\r']).to_string()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_without_trailing_newline() {
        assert_eq!(shell_exec("echo hello world"), "hello world");
    }

    #[test]
    fn supports_pipes() {
        assert_eq!(shell_exec("echo 'hello world' | cut -d' ' -f2"), "world");
    }

    #[test]
    fn failed_command_keeps_partial_output() {
        assert_eq!(shell_exec("echo partial; exit 3"), "partial");
        assert_eq!(shell_exec("exit 1"), "");
    }

    #[test]
    fn keeps_inner_newlines() {
        assert_eq!(shell_exec("printf 'a\\nb\\n\\n'"), "a\nb");
    }
}
