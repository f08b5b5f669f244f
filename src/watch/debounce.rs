// src/watch/debounce.rs

use std::time::Duration;

use notify::Event;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::filter::ChangeFilter;

/// Turn raw notify results into debounced triggers.
///
/// After the first relevant change, further relevant changes keep pushing
/// the deadline out by `window`; one `Triggered` event is sent once the
/// window passes without relevant changes. Returns when either channel is
/// closed.
pub async fn debounce_changes(
    mut raw_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    filter: ChangeFilter,
    window: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    loop {
        // Wait for the first relevant change.
        loop {
            match raw_rx.recv().await {
                None => {
                    debug!("notify channel closed; debouncer finished");
                    return;
                }
                Some(res) if is_relevant(&filter, &res) => break,
                Some(_) => {}
            }
        }

        let mut deadline = Instant::now() + window;
        let mut closed = false;
        loop {
            match timeout_at(deadline, raw_rx.recv()).await {
                Err(_elapsed) => break,
                Ok(None) => {
                    closed = true;
                    break;
                }
                Ok(Some(res)) => {
                    if is_relevant(&filter, &res) {
                        deadline = Instant::now() + window;
                    }
                }
            }
        }

        debug!("source change settled; triggering run");
        if runtime_tx
            .send(RuntimeEvent::Triggered {
                reason: TriggerReason::FileChange,
            })
            .await
            .is_err()
        {
            debug!("runtime channel closed; debouncer finished");
            return;
        }

        if closed {
            return;
        }
    }
}

fn is_relevant(filter: &ChangeFilter, res: &notify::Result<Event>) -> bool {
    match res {
        Ok(event) => {
            let relevant = filter.is_relevant(event);
            if relevant {
                debug!(kind = ?event.kind, paths = ?event.paths, "source change");
            }
            relevant
        }
        Err(err) => {
            warn!(error = %err, "file watch error");
            false
        }
    }
}
