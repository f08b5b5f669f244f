// src/exec/backend.rs

//! Pluggable process launcher.
//!
//! The stage runner talks to a `Launcher` instead of spawning processes
//! itself, so tests can hand out fake [`ProcessHandle`]s while production
//! uses [`ProcessLauncher`].

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::info;

use crate::errors::{DevloopError, Result};
use crate::exec::command::StageCommand;
use crate::exec::handle::ProcessHandle;
use crate::exec::task_runner::{relay_stdout, supervise};

/// Trait abstracting how a stage command becomes a running process.
pub trait Launcher: Send + Sync {
    /// Start `command` and return a handle to the running process.
    ///
    /// Must be called from within a Tokio runtime.
    fn launch(&self, command: &StageCommand) -> Result<ProcessHandle>;
}

/// Real launcher used in production.
///
/// Each child gets its own process group so that killing it also takes down
/// whatever it spawned itself.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    kill_grace: Duration,
}

impl ProcessLauncher {
    pub fn new(kill_grace: Duration) -> Self {
        Self { kill_grace }
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, command: &StageCommand) -> Result<ProcessHandle> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| DevloopError::SpawnError {
            label: command.label.clone(),
            source,
        })?;

        let pid = child.id();
        info!(label = %command.label, pid = ?pid, cmd = %command, "started process");

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(relay_stdout(
                command.label.clone(),
                stdout,
                tokio::io::stdout(),
            ));
        }

        let (handle, monitor) = ProcessHandle::pair(command.label.clone(), pid);
        tokio::spawn(supervise(
            child,
            monitor,
            command.label.clone(),
            self.kill_grace,
        ));

        Ok(handle)
    }
}
