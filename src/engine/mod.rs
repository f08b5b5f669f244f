// src/engine/mod.rs

//! Orchestration engine for devloop.
//!
//! This module ties together:
//! - the exclusive re-run state machine (at most one pipeline run at a time,
//!   bursts of triggers collapse into one follow-up run)
//! - the main runtime event loop that reacts to:
//!   - file-watch triggers
//!   - pipeline runs settling
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

/// Why a run was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The run started together with the orchestrator.
    Initial,
    /// Files under the source directory changed.
    FileChange,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Exit once a run has settled and nothing is pending (no `--watch`).
    pub exit_when_idle: bool,
    /// Print a divider line before every run after the first.
    pub divider: bool,
}

/// Events flowing into the runtime from the watcher and signal handlers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A new run should happen.
    Triggered { reason: TriggerReason },
    /// The in-flight run has settled (success, abort or error).
    RunSettled,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod runtime;

pub use self::core::{ControllerState, CoreCommand, CoreStep, RerunController};
pub use crate::types::BusyBehaviour;
pub use runtime::Runtime;
