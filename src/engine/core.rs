// src/engine/core.rs

//! Pure exclusive re-run state machine.
//!
//! Consumes [`RuntimeEvent`]s and produces the commands the IO shell should
//! execute. No Tokio, no channels, no processes; unit tested directly.
//!
//! ```text
//!            trigger                    trigger
//!   Idle ─────────────▶ Running ─────────────────▶ RunningWithPendingRerun
//!    ▲                    │  ▲                          │        ▲   │
//!    └──── settled ───────┘  └──────── settled ─────────┘        └───┘
//!                               (starts the follow-up)          trigger
//! ```

use tracing::debug;

use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::types::BusyBehaviour;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
    RunningWithPendingRerun,
}

/// Command produced by the core, to be executed by the outer IO shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start a new pipeline run.
    StartRun,
    /// Kill the processes of the in-flight run so it settles early.
    CancelCurrentRun,
    /// Stop the runtime (no `--watch` and nothing left to do).
    RequestExit,
    /// Kill every tracked process before stopping (shutdown).
    TerminateAll,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    pub keep_running: bool,
}

impl CoreStep {
    fn proceed(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

#[derive(Debug)]
pub struct RerunController {
    state: ControllerState,
    behaviour: BusyBehaviour,
    options: RuntimeOptions,
}

impl RerunController {
    pub fn new(behaviour: BusyBehaviour, options: RuntimeOptions) -> Self {
        Self {
            state: ControllerState::Idle,
            behaviour,
            options,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn options(&self) -> RuntimeOptions {
        self.options
    }

    /// Handle a single runtime event, updating the state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        let step = match event {
            RuntimeEvent::Triggered { .. } => self.on_trigger(),
            RuntimeEvent::RunSettled => self.on_settled(),
            RuntimeEvent::ShutdownRequested => {
                self.state = ControllerState::Idle;
                CoreStep {
                    commands: vec![CoreCommand::TerminateAll],
                    keep_running: false,
                }
            }
        };
        debug!(state = ?self.state, commands = ?step.commands, "controller step");
        step
    }

    fn on_trigger(&mut self) -> CoreStep {
        match self.state {
            ControllerState::Idle => {
                self.state = ControllerState::Running;
                CoreStep::proceed(vec![CoreCommand::StartRun])
            }
            ControllerState::Running | ControllerState::RunningWithPendingRerun => {
                self.state = ControllerState::RunningWithPendingRerun;
                let commands = match self.behaviour {
                    BusyBehaviour::Queue => Vec::new(),
                    BusyBehaviour::Restart => vec![CoreCommand::CancelCurrentRun],
                };
                CoreStep::proceed(commands)
            }
        }
    }

    fn on_settled(&mut self) -> CoreStep {
        match self.state {
            ControllerState::RunningWithPendingRerun => {
                self.state = ControllerState::Running;
                CoreStep::proceed(vec![CoreCommand::StartRun])
            }
            ControllerState::Running => {
                self.state = ControllerState::Idle;
                if self.options.exit_when_idle {
                    CoreStep {
                        commands: vec![CoreCommand::RequestExit],
                        keep_running: false,
                    }
                } else {
                    CoreStep::proceed(Vec::new())
                }
            }
            ControllerState::Idle => {
                debug!("run settled while idle; ignoring");
                CoreStep::proceed(Vec::new())
            }
        }
    }
}
