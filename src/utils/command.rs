use std::collections::HashMap;
use std::process::Command;
use tracing::debug;

use super::error::{GvmError, Result};

#[cfg(test)]
use mockall::automock;

/// Exit code and captured output of one child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs an external program. `argv[0]` is the program, `env` is added on top
/// of the inherited environment.
#[cfg_attr(test, automock)]
pub trait Executor {
    fn run(&self, argv: &[String], env: &HashMap<String, String>) -> Result<ExecutionResult>;
}

pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        CommandExecutor
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for CommandExecutor {
    fn run(&self, argv: &[String], env: &HashMap<String, String>) -> Result<ExecutionResult> {
        let (program, args) = argv.split_first().ok_or(GvmError::EmptyCommand)?;

        let output = Command::new(program)
            .args(args)
            .envs(env)
            .output()
            .map_err(|source| GvmError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(program = %program, exit_code, "process finished");

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
        })
    }
}
