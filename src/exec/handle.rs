// src/exec/handle.rs

//! Handle to a spawned process and the supervisor-side counterpart.
//!
//! A [`ProcessHandle`] is a cheap, cloneable view of one child process:
//! - its exit can be awaited any number of times, from any clone;
//! - a kill can be requested; repeated or late requests are harmless.
//!
//! The matching [`ProcessMonitor`] is held by whatever actually owns the
//! child (the real supervisor task, or a fake in tests). It publishes the
//! exit exactly once: [`ProcessMonitor::finish`] consumes the monitor.

use std::fmt;

use tokio::sync::{mpsc, watch};

/// How a tracked process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    /// The process exited on its own. `code` is `None` when it was ended by
    /// a signal we did not send (or its supervisor disappeared).
    Exited { code: Option<i32> },
    /// The process was terminated on request.
    Killed,
}

impl ProcessExit {
    pub fn success(self) -> bool {
        matches!(self, ProcessExit::Exited { code: Some(0) })
    }

    pub fn code(self) -> Option<i32> {
        match self {
            ProcessExit::Exited { code } => code,
            ProcessExit::Killed => None,
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessExit::Exited { code: Some(code) } => write!(f, "exit code {code}"),
            ProcessExit::Exited { code: None } => f.write_str("terminated by signal"),
            ProcessExit::Killed => f.write_str("killed"),
        }
    }
}

#[derive(Clone)]
pub struct ProcessHandle {
    label: String,
    pid: Option<u32>,
    exit_rx: watch::Receiver<Option<ProcessExit>>,
    kill_tx: mpsc::Sender<()>,
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("label", &self.label)
            .field("pid", &self.pid)
            .field("exit", &self.exit())
            .finish()
    }
}

/// Supervisor side of a [`ProcessHandle`].
#[derive(Debug)]
pub struct ProcessMonitor {
    exit_tx: watch::Sender<Option<ProcessExit>>,
    kill_rx: mpsc::Receiver<()>,
}

impl ProcessHandle {
    /// Create a connected handle/monitor pair for a process labelled `label`.
    pub fn pair(label: impl Into<String>, pid: Option<u32>) -> (ProcessHandle, ProcessMonitor) {
        let (exit_tx, exit_rx) = watch::channel(None);
        // A single slot is enough: one pending request means "kill".
        let (kill_tx, kill_rx) = mpsc::channel(1);

        let handle = ProcessHandle {
            label: label.into(),
            pid,
            exit_rx,
            kill_tx,
        };
        (handle, ProcessMonitor { exit_tx, kill_rx })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Exit status, or `None` while the process is still running.
    pub fn exit(&self) -> Option<ProcessExit> {
        *self.exit_rx.borrow()
    }

    pub fn has_exited(&self) -> bool {
        self.exit().is_some()
    }

    /// Ask the supervisor to terminate the process.
    ///
    /// Returns `false` when the request could not be delivered, which means
    /// the supervisor has already finished (the process is gone).
    pub fn request_kill(&self) -> bool {
        match self.kill_tx.try_send(()) {
            Ok(()) => true,
            // A request is already pending.
            Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }

    /// Wait until the process has exited or been killed.
    pub async fn wait(&self) -> ProcessExit {
        let mut rx = self.exit_rx.clone();
        match rx.wait_for(Option::is_some).await {
            Ok(exit) => (*exit).unwrap_or(ProcessExit::Exited { code: None }),
            // Monitor dropped without publishing: nothing is running anymore.
            Err(_) => ProcessExit::Exited { code: None },
        }
    }
}

impl ProcessMonitor {
    /// Resolves with `true` once a kill has been requested, or `false` when
    /// every handle is gone and no request can arrive anymore.
    pub async fn kill_requested(&mut self) -> bool {
        self.kill_rx.recv().await.is_some()
    }

    /// Publish the final exit status. Consumes the monitor, so the exit is
    /// published exactly once.
    pub fn finish(self, exit: ProcessExit) {
        self.exit_tx.send_replace(Some(exit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_resolves_for_every_clone() {
        let (handle, monitor) = ProcessHandle::pair("build", Some(42));
        let other = handle.clone();
        assert!(!handle.has_exited());

        monitor.finish(ProcessExit::Exited { code: Some(0) });

        assert_eq!(handle.wait().await, ProcessExit::Exited { code: Some(0) });
        assert_eq!(other.wait().await, ProcessExit::Exited { code: Some(0) });
        assert!(other.exit().is_some_and(ProcessExit::success));
    }

    #[tokio::test]
    async fn kill_request_reaches_monitor_once_and_late_requests_fail() {
        let (handle, mut monitor) = ProcessHandle::pair("app", None);

        assert!(handle.request_kill());
        assert!(handle.request_kill(), "second request while pending is accepted");
        assert!(monitor.kill_requested().await);
        monitor.finish(ProcessExit::Killed);

        assert_eq!(handle.wait().await, ProcessExit::Killed);
        assert!(!handle.request_kill(), "supervisor is gone");
    }

    #[tokio::test]
    async fn dropped_monitor_does_not_hang_waiters() {
        let (handle, monitor) = ProcessHandle::pair("lint", None);
        drop(monitor);
        assert_eq!(handle.wait().await, ProcessExit::Exited { code: None });
    }

    #[test]
    fn only_exit_code_zero_is_success() {
        assert!(ProcessExit::Exited { code: Some(0) }.success());
        assert!(!ProcessExit::Exited { code: Some(1) }.success());
        assert!(!ProcessExit::Exited { code: None }.success());
        assert!(!ProcessExit::Killed.success());
    }
}
