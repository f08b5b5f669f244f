// src/watch/watcher.rs

use std::path::PathBuf;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::info;

use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::watch::debounce::debounce_changes;
use crate::watch::filter::ChangeFilter;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and send a debounced `RuntimeEvent::Triggered`
/// whenever non-ignored files change.
///
/// Nothing is sent for files that already exist when watching starts.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    ignore: &[String],
    debounce: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so event paths share the prefix.
    let root = root.canonicalize().unwrap_or(root);

    let filter = ChangeFilter::new(root.clone(), ignore)?;

    // Channel from the blocking notify callback into the async world.
    let (raw_tx, raw_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            // Only fails once the debouncer is gone, i.e. during shutdown.
            let _ = raw_tx.send(res);
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!(root = %root.display(), debounce_ms = debounce.as_millis() as u64, "file watcher started");

    tokio::spawn(debounce_changes(raw_rx, filter, debounce, runtime_tx));

    Ok(WatcherHandle { _inner: watcher })
}
