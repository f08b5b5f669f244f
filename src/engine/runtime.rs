// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::exec::Launcher;
use crate::pipeline::{Pipeline, RunOutcome};

use super::core::RerunController;
use super::{CoreCommand, RuntimeEvent};

type RunResult = std::result::Result<Result<RunOutcome>, JoinError>;

/// What happened while the runtime was active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeSummary {
    pub runs_started: u64,
    pub last_outcome: Option<RunOutcome>,
    /// Runs that ended in an orchestration error rather than an outcome.
    pub errors: u64,
}

/// Drives pipeline runs in response to `RuntimeEvent`s.
///
/// IO shell around `RerunController`, which holds the exclusivity
/// semantics. At most one run is in flight; it executes on its own Tokio
/// task so events keep flowing (and coalescing) while it runs.
pub struct Runtime<L: Launcher + 'static> {
    core: RerunController,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    pipeline: Arc<Pipeline<L>>,
    in_flight: Option<JoinHandle<Result<RunOutcome>>>,
    summary: RuntimeSummary,
}

impl<L: Launcher + 'static> fmt::Debug for Runtime<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("in_flight", &self.in_flight.is_some())
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

enum Next {
    Event(Option<RuntimeEvent>),
    Settled(RunResult),
}

impl<L: Launcher + 'static> Runtime<L> {
    pub fn new(
        core: RerunController,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        pipeline: Pipeline<L>,
    ) -> Self {
        Self {
            core,
            event_rx,
            pipeline: Arc::new(pipeline),
            in_flight: None,
            summary: RuntimeSummary::default(),
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx` and run completions.
    /// - Feeds them into the core.
    /// - Executes the commands returned by the core.
    pub async fn run(mut self) -> Result<RuntimeSummary> {
        info!("devloop runtime started");

        loop {
            let Some(event) = self.next_event().await else {
                info!("runtime event channel closed; exiting");
                break;
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await;
            }

            if !step.keep_running {
                info!("stopping runtime");
                break;
            }
        }

        Ok(self.summary)
    }

    /// Wait for the next external event or for the in-flight run to settle.
    async fn next_event(&mut self) -> Option<RuntimeEvent> {
        let next = match self.in_flight.as_mut() {
            Some(run) => tokio::select! {
                joined = run => Next::Settled(joined),
                // A closed channel disables this branch; the run still settles.
                Some(event) = self.event_rx.recv() => Next::Event(Some(event)),
            },
            None => Next::Event(self.event_rx.recv().await),
        };

        match next {
            Next::Event(event) => event,
            Next::Settled(joined) => {
                self.in_flight = None;
                self.record(joined);
                Some(RuntimeEvent::RunSettled)
            }
        }
    }

    async fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::StartRun => self.start_run(),
            CoreCommand::CancelCurrentRun => {
                info!("sources changed during run; killing its processes");
                tokio::spawn(self.pipeline.registry().kill_all());
            }
            CoreCommand::RequestExit => {
                info!("run settled and not watching; leaving launched processes running");
            }
            CoreCommand::TerminateAll => {
                info!("shutting down; killing all processes");
                // Stop the run first so it cannot spawn anything after the
                // live set has been taken.
                if let Some(run) = self.in_flight.take() {
                    run.abort();
                    let _ = run.await;
                }
                self.pipeline.registry().kill_all().await;
            }
        }
    }

    fn start_run(&mut self) {
        self.summary.runs_started += 1;
        let run_id = self.summary.runs_started;

        if let Some(line) = divider_for(run_id, self.core.options().divider, terminal_width()) {
            println!("{line}");
        }

        info!(run_id, "starting pipeline run");
        let pipeline = Arc::clone(&self.pipeline);
        self.in_flight = Some(tokio::spawn(async move { pipeline.run(run_id).await }));
    }

    fn record(&mut self, joined: RunResult) {
        let run_id = self.summary.runs_started;
        match joined {
            Ok(Ok(outcome)) => {
                debug!(run_id, ?outcome, "run settled");
                self.summary.last_outcome = Some(outcome);
            }
            Ok(Err(err)) => {
                error!(run_id, error = %err, "pipeline run failed");
                self.summary.errors += 1;
            }
            Err(err) => {
                error!(run_id, error = %err, "pipeline task did not complete");
                self.summary.errors += 1;
            }
        }
    }
}

/// Separator printed before every run after the first one.
fn divider_for(run_id: u64, enabled: bool, width: usize) -> Option<String> {
    (enabled && run_id > 1).then(|| format!("\n{}\n", "_".repeat(width)))
}

fn terminal_width() -> usize {
    parse_width(std::env::var("COLUMNS").ok().as_deref())
}

fn parse_width(columns: Option<&str>) -> usize {
    columns
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|w| *w > 0)
        .unwrap_or(80)
}
