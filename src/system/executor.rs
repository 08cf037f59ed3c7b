// src/system/executor.rs

use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Program '{0}' could not be started: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Program '{0}' exited with status {1:?}")]
    NonZeroExitStatus(String, Option<i32>),
    #[error("Nothing to run: no program given.")]
    MissingProgram,
}

/// Runs `program` with `args` as-is, sharing this process's stdio.
pub fn forward(program: &str, args: &[String]) -> Result<(), ExecutionError> {
    forward_in(program, args, None)
}

/// Same as [`forward`], inside `cwd` when given.
pub fn forward_in(program: &str, args: &[String], cwd: Option<&Path>) -> Result<(), ExecutionError> {
    log::info!("Forwarding to '{}' with {:?}", program, args);

    let mut command = StdCommand::new(program);
    command
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }

    let status = command
        .status()
        .map_err(|e| ExecutionError::CommandFailed(program.to_string(), e))?;

    if !status.success() {
        return Err(ExecutionError::NonZeroExitStatus(
            program.to_string(),
            status.code(),
        ));
    }

    Ok(())
}

/// Splits captured raw tokens into program and arguments, then forwards.
pub fn forward_tokens(tokens: &[&str]) -> Result<(), ExecutionError> {
    let (program, args) = tokens.split_first().ok_or(ExecutionError::MissingProgram)?;
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    forward(program, &args)
}
