use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use devloop::errors::{DevloopError, Result};
use devloop::exec::{Launcher, ProcessExit, ProcessHandle, StageCommand};

/// How a fake process behaves once launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBehaviour {
    /// Exit right away with this code.
    Exit(i32),
    /// Exit with this code after a delay, unless killed first.
    ExitAfter(Duration, i32),
    /// Keep running until killed (a long-lived app).
    RunUntilKilled,
    /// Keep running until killed, then take this long to actually exit.
    SlowToDie(Duration),
    /// Fail to spawn at all.
    SpawnError,
}

/// Something observable that happened to a fake process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    Spawned(String),
    Killed(String),
}

/// A launcher that hands out fake process handles and records every spawn
/// and kill, keyed by the stage label ("lint", "transpile", "app", "test").
///
/// Labels without a configured behaviour exit with code 0.
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    behaviours: Arc<Mutex<HashMap<String, FakeBehaviour>>>,
    events: Arc<Mutex<Vec<LaunchEvent>>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, label: &str, behaviour: FakeBehaviour) -> Self {
        self.set(label, behaviour);
        self
    }

    pub fn set(&self, label: &str, behaviour: FakeBehaviour) {
        self.behaviours
            .lock()
            .unwrap()
            .insert(label.to_string(), behaviour);
    }

    pub fn events(&self) -> Vec<LaunchEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Labels of all spawned processes, in spawn order.
    pub fn spawned(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LaunchEvent::Spawned(label) => Some(label),
                LaunchEvent::Killed(_) => None,
            })
            .collect()
    }

    pub fn spawn_count(&self, label: &str) -> usize {
        self.spawned().iter().filter(|l| *l == label).count()
    }

    pub fn kill_count(&self, label: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, LaunchEvent::Killed(l) if l == label))
            .count()
    }

    fn behaviour_for(&self, label: &str) -> FakeBehaviour {
        self.behaviours
            .lock()
            .unwrap()
            .get(label)
            .copied()
            .unwrap_or(FakeBehaviour::Exit(0))
    }
}

impl Launcher for FakeLauncher {
    fn launch(&self, command: &StageCommand) -> Result<ProcessHandle> {
        let label = command.label.clone();
        let behaviour = self.behaviour_for(&label);

        if behaviour == FakeBehaviour::SpawnError {
            return Err(DevloopError::SpawnError {
                label,
                source: io::Error::new(io::ErrorKind::NotFound, "fake tool not found"),
            });
        }

        self.events
            .lock()
            .unwrap()
            .push(LaunchEvent::Spawned(label.clone()));

        let (handle, mut monitor) = ProcessHandle::pair(label.clone(), None);
        let events = Arc::clone(&self.events);

        tokio::spawn(async move {
            let exit = match behaviour {
                FakeBehaviour::Exit(code) => ProcessExit::Exited { code: Some(code) },
                FakeBehaviour::ExitAfter(delay, code) => tokio::select! {
                    _ = tokio::time::sleep(delay) => ProcessExit::Exited { code: Some(code) },
                    true = monitor.kill_requested() => ProcessExit::Killed,
                },
                FakeBehaviour::RunUntilKilled => {
                    if !monitor.kill_requested().await {
                        return;
                    }
                    ProcessExit::Killed
                }
                FakeBehaviour::SlowToDie(delay) => {
                    if !monitor.kill_requested().await {
                        return;
                    }
                    tokio::time::sleep(delay).await;
                    ProcessExit::Killed
                }
                FakeBehaviour::SpawnError => unreachable!("handled before spawning"),
            };

            if exit == ProcessExit::Killed {
                events.lock().unwrap().push(LaunchEvent::Killed(label));
            }
            monitor.finish(exit);
        });

        Ok(handle)
    }
}
