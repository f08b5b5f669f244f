// tests/process_launcher.rs
//
// Exercises real child processes; relies on `sh` and `sleep`.

#![cfg(unix)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use devloop::engine::{RerunController, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use devloop::errors::Result;
use devloop::exec::{
    Launcher, ProcessExit, ProcessHandle, ProcessLauncher, ProcessRegistry, StageCommand,
    StageRunner, StepOutcome,
};
use devloop::pipeline::{Pipeline, RunOutcome, StagePlan};
use devloop::types::{BusyBehaviour, StageKind};
use devloop_test_utils::builders::SettingsBuilder;
use devloop_test_utils::{init_tracing, with_timeout};
use tokio::sync::mpsc;

fn sh(label: &str, script: &str) -> StageCommand {
    StageCommand::new(label, "sh", vec!["-c".to_string(), script.to_string()])
}

#[tokio::test]
async fn exit_status_is_reported() {
    init_tracing();

    let launcher = ProcessLauncher::new(Duration::from_millis(500));
    let handle = launcher.launch(&sh("build", "exit 3")).unwrap();

    let exit = with_timeout(handle.wait()).await;
    assert_eq!(exit, ProcessExit::Exited { code: Some(3) });
    assert!(handle.has_exited());
}

#[tokio::test]
async fn run_as_step_maps_exit_codes() {
    init_tracing();

    let runner = StageRunner::new(
        ProcessLauncher::new(Duration::from_millis(500)),
        ProcessRegistry::new(),
    );

    let ok = with_timeout(runner.run_as_step(&sh("lint", "exit 0"))).await.unwrap();
    assert_eq!(ok, StepOutcome::Passed);

    let failed = with_timeout(runner.run_as_step(&sh("lint", "exit 1"))).await.unwrap();
    assert_eq!(failed, StepOutcome::Failed(ProcessExit::Exited { code: Some(1) }));

    let skipped = with_timeout(runner.run_step_if(false, &sh("lint", "exit 1")))
        .await
        .unwrap();
    assert_eq!(skipped, StepOutcome::Skipped);
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    init_tracing();

    let launcher = ProcessLauncher::new(Duration::from_millis(500));
    let cmd = StageCommand::new("lint", "devloop-no-such-tool", Vec::new());

    let err = launcher.launch(&cmd).unwrap_err();
    assert!(err.to_string().contains("failed to spawn 'lint'"), "{err}");
}

#[tokio::test]
async fn kill_all_stops_a_long_running_process() {
    init_tracing();

    let registry = ProcessRegistry::new();
    let launcher = ProcessLauncher::new(Duration::from_secs(5));
    let handle = launcher
        .launch(&StageCommand::new("app", "sleep", vec!["30".to_string()]))
        .unwrap();
    registry.track(handle.clone());

    let started = Instant::now();
    with_timeout(registry.kill_all()).await;

    assert_eq!(handle.exit(), Some(ProcessExit::Killed));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn process_ignoring_sigterm_is_force_killed_after_grace() {
    init_tracing();

    let registry = ProcessRegistry::new();
    let launcher = ProcessLauncher::new(Duration::from_millis(200));
    let handle = launcher
        .launch(&sh("app", "trap '' TERM; sleep 30"))
        .unwrap();
    registry.track(handle.clone());

    // Let the shell install its trap.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    with_timeout(registry.kill_all()).await;
    let elapsed = started.elapsed();

    assert_eq!(handle.exit(), Some(ProcessExit::Killed));
    assert!(elapsed >= Duration::from_millis(200), "escalated too early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "escalation too slow: {elapsed:?}");
}

#[tokio::test]
async fn end_to_end_pipeline_with_real_processes() {
    init_tracing();

    let settings = SettingsBuilder::new()
        .lint(true)
        .test(true)
        .kill_grace_ms(500)
        .tool("lint", "sh -c 'exit 0'")
        .tool("build", "sh -c 'echo building {src} into {build}'")
        .tool("app", "sleep 30")
        .tool("test", "sh -c 'exit 4'")
        .build();
    let plan = StagePlan::from_settings(&settings).unwrap();
    let registry = ProcessRegistry::new();
    let pipeline = Pipeline::new(
        plan,
        ProcessLauncher::new(settings.kill_grace()),
        registry.clone(),
    );

    let outcome = with_timeout(pipeline.run(1)).await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Aborted {
            stage: StageKind::Test,
            exit: ProcessExit::Exited { code: Some(4) },
        }
    );
    assert_eq!(registry.len(), 1, "the app keeps running after a failed test");

    // The next run replaces the app.
    let outcome = with_timeout(pipeline.run(2)).await.unwrap();
    assert!(!outcome.is_success());
    assert_eq!(registry.len(), 1);

    with_timeout(registry.kill_all()).await;
    assert!(registry.is_empty());
}

#[tokio::test]
async fn output_that_is_not_utf8_does_not_break_the_process() {
    init_tracing();

    let launcher = ProcessLauncher::new(Duration::from_millis(500));
    let script = r#"printf 'caf\351\n'; sleep 0.3; i=0; while [ $i -lt 500 ]; do echo "line $i"; i=$((i+1)); done; exit 0"#;
    let handle = launcher.launch(&sh("transpile", script)).unwrap();

    let exit = with_timeout(handle.wait()).await;
    assert_eq!(exit, ProcessExit::Exited { code: Some(0) });
}

/// Real launcher that counts app launches made while an earlier app was
/// still alive.
#[derive(Clone)]
struct OverlapCheck {
    inner: ProcessLauncher,
    apps: Arc<Mutex<Vec<ProcessHandle>>>,
    overlaps: Arc<AtomicUsize>,
}

impl Launcher for OverlapCheck {
    fn launch(&self, command: &StageCommand) -> Result<ProcessHandle> {
        if command.label != "app" {
            return self.inner.launch(command);
        }
        let mut apps = self.apps.lock().unwrap();
        if apps.iter().any(|h| !h.has_exited()) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let handle = self.inner.launch(command)?;
        apps.push(handle.clone());
        Ok(handle)
    }
}

#[tokio::test]
async fn restart_never_runs_two_apps_at_once() {
    init_tracing();

    let settings = SettingsBuilder::new()
        .test(true)
        .busy_behaviour(BusyBehaviour::Restart)
        .kill_grace_ms(3000)
        .tool("build", "sh -c 'exit 0'")
        // Takes a second to shut down after SIGTERM.
        .tool(
            "app",
            r#"sh -c "trap 'sleep 1; exit 0' TERM; while true; do sleep 0.05; done""#,
        )
        .tool("test", "sleep 30")
        .build();
    let launcher = OverlapCheck {
        inner: ProcessLauncher::new(settings.kill_grace()),
        apps: Arc::default(),
        overlaps: Arc::default(),
    };
    let pipeline = Pipeline::new(
        StagePlan::from_settings(&settings).unwrap(),
        launcher.clone(),
        ProcessRegistry::new(),
    );

    let (tx, rx) = mpsc::channel(16);
    let core = RerunController::new(
        settings.busy_behaviour(),
        RuntimeOptions {
            exit_when_idle: false,
            divider: false,
        },
    );
    let runtime = tokio::spawn(Runtime::new(core, rx, pipeline).run());
    let app_count = || launcher.apps.lock().unwrap().len();
    let trigger = || RuntimeEvent::Triggered {
        reason: TriggerReason::FileChange,
    };

    tx.send(trigger()).await.unwrap();
    with_timeout(async {
        while app_count() < 1 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    // Let the app install its trap.
    tokio::time::sleep(Duration::from_millis(300)).await;

    tx.send(trigger()).await.unwrap();
    with_timeout(async {
        while app_count() < 2 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    let first = launcher.apps.lock().unwrap()[0].clone();
    assert_eq!(first.exit(), Some(ProcessExit::Killed));
    assert_eq!(launcher.overlaps.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(300)).await;
    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();
    with_timeout(runtime).await.unwrap().unwrap();
}
