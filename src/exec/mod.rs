// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`handle`] defines `ProcessHandle`, an awaitable, killable view of one
//!   child process, and its supervisor-side `ProcessMonitor`.
//! - [`registry`] tracks the processes of the current run so they can be
//!   terminated together.
//! - [`backend`] provides the `Launcher` trait and the production
//!   `ProcessLauncher` built on `tokio::process`.
//! - [`task_runner`] supervises a spawned child (exit, kill escalation,
//!   output relaying).
//! - [`stage_runner`] runs stage commands as tracked, awaitable steps.

pub mod backend;
pub mod command;
pub mod handle;
pub mod registry;
pub mod stage_runner;
pub mod task_runner;

pub use backend::{Launcher, ProcessLauncher};
pub use command::StageCommand;
pub use handle::{ProcessExit, ProcessHandle, ProcessMonitor};
pub use registry::ProcessRegistry;
pub use stage_runner::{StageRunner, StepOutcome};
