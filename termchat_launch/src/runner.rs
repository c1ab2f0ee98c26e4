use std::process::{Command, ExitStatus};
use tracing::debug;
use crate::error::LaunchError;
use crate::launch::Invocation;

/// Runs an external program to completion.
pub trait ProcessRunner {
    /// Spawn the program, wait for it and return its exit code.
    fn run(&self, invocation: &Invocation) -> Result<i32, LaunchError>;
}

/// Runner that spawns real child processes with inherited stdio.
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {

    fn run(&self, invocation: &Invocation) -> Result<i32, LaunchError> {
        debug!(program = %invocation.program, argc = invocation.args.len(), "spawning chat program");

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|source| LaunchError::Spawn { program: invocation.program.clone(), source })?;

        let code = exit_code(status);
        debug!(code, "chat program finished");
        Ok(code)
    }
}

/// Map exit status to a shell-style exit code.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
