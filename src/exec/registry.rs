// src/exec/registry.rs

//! Registry of the processes spawned by the current pipeline run.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::exec::handle::ProcessHandle;

/// Live set of processes belonging to the most recently started run, plus
/// the processes still dying from earlier `kill_all` calls.
///
/// Clones share the same state. The lock is never held across an await.
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    inner: Arc<Mutex<Tracked>>,
}

#[derive(Debug, Default)]
struct Tracked {
    live: Vec<ProcessHandle>,
    /// Kill requested, exit not yet observed.
    terminating: Vec<ProcessHandle>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a freshly spawned process to the live set.
    ///
    /// Handles that have already exited are pruned at the same time.
    pub fn track(&self, handle: ProcessHandle) {
        let mut tracked = self.lock();
        tracked.live.retain(|h| !h.has_exited());
        debug!(label = %handle.label(), pid = ?handle.pid(), "tracking process");
        tracked.live.push(handle);
    }

    /// Number of live processes that are still running.
    pub fn len(&self) -> usize {
        self.lock().live.iter().filter(|h| !h.has_exited()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Terminate every tracked process.
    ///
    /// The live set is emptied and kill requests are issued *when this is
    /// called*; the returned future only waits for the processes to reach a
    /// terminal state. Processes that have already exited are skipped.
    ///
    /// The future also waits for processes killed by earlier calls that are
    /// still shutting down, so a run that starts after awaiting it never
    /// overlaps with a previous run's processes.
    pub fn kill_all(&self) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let pending = {
            let mut tracked = self.lock();
            let previous = std::mem::take(&mut tracked.live);
            for handle in previous {
                if handle.has_exited() {
                    continue;
                }
                debug!(label = %handle.label(), pid = ?handle.pid(), "requesting kill");
                // `false` means the supervisor finished in the meantime;
                // waiting below still resolves immediately in that case.
                handle.request_kill();
                tracked.terminating.push(handle);
            }
            tracked.terminating.retain(|h| !h.has_exited());
            tracked.terminating.clone()
        };

        let registry = self.clone();
        Box::pin(async move {
            for handle in &pending {
                let exit = handle.wait().await;
                debug!(label = %handle.label(), %exit, "process terminated");
            }
            registry.lock().terminating.retain(|h| !h.has_exited());
        })
    }

    /// Wait for every live process to exit on its own.
    pub async fn wait_all(&self) {
        let snapshot: Vec<ProcessHandle> = self.lock().live.clone();
        for handle in snapshot {
            handle.wait().await;
        }
    }
}
