// src/pipeline/mod.rs

//! One pipeline run: kill the previous run's processes, then
//! lint → build → launch app → test, stopping at the first failed step.
//!
//! - [`plan`] resolves the four stages from the session settings.

pub mod plan;

use std::fmt;

use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::{Launcher, ProcessExit, ProcessRegistry, StageRunner, StepOutcome};
use crate::types::StageKind;

pub use plan::{Stage, StagePlan};

/// Terminal result of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every enabled stage passed (the app was launched).
    Success,
    /// A step failed; later stages were not started.
    Aborted { stage: StageKind, exit: ProcessExit },
}

impl RunOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, RunOutcome::Success)
    }
}

/// Phases a single run moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    KillingPrevious,
    Linting,
    Building,
    LaunchingApp,
    Testing,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::KillingPrevious => "killing-previous",
            RunPhase::Linting => "linting",
            RunPhase::Building => "building",
            RunPhase::LaunchingApp => "launching-app",
            RunPhase::Testing => "testing",
        };
        f.write_str(s)
    }
}

/// The ordered, short-circuiting stage sequence.
#[derive(Debug)]
pub struct Pipeline<L: Launcher> {
    plan: StagePlan,
    runner: StageRunner<L>,
}

impl<L: Launcher> Pipeline<L> {
    pub fn new(plan: StagePlan, launcher: L, registry: ProcessRegistry) -> Self {
        Self {
            plan,
            runner: StageRunner::new(launcher, registry),
        }
    }

    pub fn registry(&self) -> &ProcessRegistry {
        self.runner.registry()
    }

    /// Execute one run.
    ///
    /// A failed step is an expected outcome (`Ok(RunOutcome::Aborted)`);
    /// `Err` is reserved for orchestration problems such as a tool that
    /// cannot be spawned.
    pub async fn run(&self, run_id: u64) -> Result<RunOutcome> {
        enter(run_id, RunPhase::KillingPrevious);
        self.runner.registry().kill_all().await;

        enter(run_id, RunPhase::Linting);
        if let Some(outcome) = self.step(run_id, &self.plan.lint).await? {
            return Ok(outcome);
        }

        enter(run_id, RunPhase::Building);
        if let Some(outcome) = self.step(run_id, &self.plan.build).await? {
            return Ok(outcome);
        }

        // Fire and forget: the app outlives the run.
        enter(run_id, RunPhase::LaunchingApp);
        let app = self.runner.invoke(&self.plan.app.command)?;
        debug!(run_id, pid = ?app.pid(), "app launched");

        enter(run_id, RunPhase::Testing);
        if let Some(outcome) = self.step(run_id, &self.plan.test).await? {
            return Ok(outcome);
        }

        info!(run_id, "run finished successfully");
        Ok(RunOutcome::Success)
    }

    /// Run one gated stage; `Some` means the run stops here.
    async fn step(&self, run_id: u64, stage: &Stage) -> Result<Option<RunOutcome>> {
        match self.runner.run_step_if(stage.enabled, &stage.command).await? {
            StepOutcome::Failed(exit) => {
                info!(run_id, stage = %stage.kind, %exit, "stage failed; run stopped");
                Ok(Some(RunOutcome::Aborted {
                    stage: stage.kind,
                    exit,
                }))
            }
            StepOutcome::Passed | StepOutcome::Skipped => Ok(None),
        }
    }
}

fn enter(run_id: u64, phase: RunPhase) {
    debug!(run_id, %phase, "run phase");
}
