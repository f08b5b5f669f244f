// src/exec/stage_runner.rs

//! Turns stage commands into tracked processes and awaitable steps.

use tracing::debug;

use crate::errors::Result;
use crate::exec::backend::Launcher;
use crate::exec::command::StageCommand;
use crate::exec::handle::{ProcessExit, ProcessHandle};
use crate::exec::registry::ProcessRegistry;

/// Result of running one stage as a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The process exited with status 0.
    Passed,
    /// The stage is disabled; nothing was spawned.
    Skipped,
    /// The process exited with any other status, or was killed.
    Failed(ProcessExit),
}

#[derive(Debug)]
pub struct StageRunner<L: Launcher> {
    launcher: L,
    registry: ProcessRegistry,
}

impl<L: Launcher> StageRunner<L> {
    pub fn new(launcher: L, registry: ProcessRegistry) -> Self {
        Self { launcher, registry }
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// Spawn `command`, register it and return the live handle without
    /// waiting for it.
    pub fn invoke(&self, command: &StageCommand) -> Result<ProcessHandle> {
        let handle = self.launcher.launch(command)?;
        self.registry.track(handle.clone());
        Ok(handle)
    }

    /// Spawn `command` and wait for it; exit status 0 passes, anything else
    /// is a (non-fatal) step failure.
    pub async fn run_as_step(&self, command: &StageCommand) -> Result<StepOutcome> {
        let handle = self.invoke(command)?;
        let exit = handle.wait().await;
        debug!(label = %command.label, %exit, "step finished");

        Ok(if exit.success() {
            StepOutcome::Passed
        } else {
            StepOutcome::Failed(exit)
        })
    }

    /// [`run_as_step`](Self::run_as_step) gated by `enabled`.
    pub async fn run_step_if(&self, enabled: bool, command: &StageCommand) -> Result<StepOutcome> {
        if !enabled {
            debug!(label = %command.label, "step disabled; skipping");
            return Ok(StepOutcome::Skipped);
        }
        self.run_as_step(command).await
    }
}
