// tests/watch_debounce.rs

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use devloop::engine::{RuntimeEvent, TriggerReason};
use devloop::errors::DevloopError;
use devloop::watch::{ChangeFilter, debounce_changes, spawn_watcher};
use devloop_test_utils::init_tracing;
use notify::event::{CreateKind, DataChange, EventKind, ModifyKind};
use notify::Event;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn node_modules_filter(root: &str) -> ChangeFilter {
    ChangeFilter::new(PathBuf::from(root), &["**/node_modules/**".to_string()]).unwrap()
}

fn modify(path: &str) -> notify::Result<Event> {
    Ok(Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(path.into()))
}

fn is_file_change(event: &RuntimeEvent) -> bool {
    matches!(
        event,
        RuntimeEvent::Triggered {
            reason: TriggerReason::FileChange
        }
    )
}

#[tokio::test]
async fn burst_of_changes_produces_one_trigger() {
    init_tracing();

    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (rt_tx, mut rt_rx) = mpsc::channel(16);
    let window = Duration::from_millis(100);
    tokio::spawn(debounce_changes(raw_rx, node_modules_filter("/proj/src"), window, rt_tx));

    for i in 0..10 {
        raw_tx.send(modify(&format!("/proj/src/file{i}.js"))).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let event = timeout(Duration::from_secs(2), rt_rx.recv())
        .await
        .expect("debounced trigger expected")
        .expect("channel open");
    assert!(is_file_change(&event));

    // Nothing else follows once the burst settled.
    assert!(timeout(Duration::from_millis(300), rt_rx.recv()).await.is_err());
}

#[tokio::test]
async fn ignored_paths_never_trigger() {
    init_tracing();

    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (rt_tx, mut rt_rx) = mpsc::channel(16);
    tokio::spawn(debounce_changes(
        raw_rx,
        node_modules_filter("/proj/src"),
        Duration::from_millis(50),
        rt_tx,
    ));

    raw_tx
        .send(modify("/proj/src/node_modules/lib/index.js"))
        .unwrap();
    raw_tx
        .send(Ok(Event::new(EventKind::Create(CreateKind::File))
            .add_path("/proj/src/sub/node_modules/x.js".into())))
        .unwrap();

    assert!(timeout(Duration::from_millis(300), rt_rx.recv()).await.is_err());
}

#[tokio::test]
async fn real_watcher_triggers_on_write_but_not_on_startup() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("existing.js"), "1").unwrap();

    let (rt_tx, mut rt_rx) = mpsc::channel(16);
    let _watcher = spawn_watcher(
        dir.path(),
        &["**/node_modules/**".to_string()],
        Duration::from_millis(100),
        rt_tx,
    )
    .unwrap();

    assert!(
        timeout(Duration::from_millis(400), rt_rx.recv()).await.is_err(),
        "no trigger for files present at startup"
    );

    fs::write(dir.path().join("index.js"), "console.log('hi')").unwrap();

    let event = timeout(Duration::from_secs(5), rt_rx.recv())
        .await
        .expect("trigger after a write")
        .expect("channel open");
    assert!(is_file_change(&event));
}

#[tokio::test]
async fn watching_a_missing_directory_is_a_watch_error() {
    let dir = tempfile::tempdir().unwrap();
    let (rt_tx, _rt_rx) = mpsc::channel(1);

    let err = spawn_watcher(dir.path().join("missing"), &[], Duration::from_millis(100), rt_tx)
        .unwrap_err();
    assert!(matches!(err, DevloopError::WatchError(_)), "{err:?}");
}
