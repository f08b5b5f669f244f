// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod types;
pub mod watch;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::{CliArgs, Command, DevArgs};
use crate::config::{DevSettings, load_optional};
use crate::engine::{RerunController, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::exec::{ProcessLauncher, ProcessRegistry};
use crate::pipeline::{Pipeline, StagePlan};

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let config = load_optional(&args.config)?;

    match args.command {
        Command::Dev(ref dev) => run_dev(dev, config, args.dry_run).await,
    }
}

/// The `dev` subcommand.
///
/// This wires together:
/// - stage plan (from config + flags)
/// - process registry / launcher / pipeline
/// - exclusive re-run runtime
/// - (optional) file watcher
/// - Ctrl-C handling
async fn run_dev(args: &DevArgs, config: config::ConfigFile, dry_run: bool) -> Result<()> {
    let settings = DevSettings::from_args(args, config);
    let plan = StagePlan::from_settings(&settings)?;

    if dry_run {
        print_dry_run(&settings, &plan);
        return Ok(());
    }

    let registry = ProcessRegistry::new();
    let launcher = ProcessLauncher::new(settings.kill_grace());
    let pipeline = Pipeline::new(plan, launcher, registry.clone());

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Optional file watcher.
    let _watcher_handle = if settings.watch {
        Some(watch::spawn_watcher(
            &settings.src_dir,
            &settings.config.watch.ignore,
            settings.debounce(),
            rt_tx.clone(),
        )?)
    } else {
        None
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    rt_tx
        .send(RuntimeEvent::Triggered {
            reason: TriggerReason::Initial,
        })
        .await?;

    let options = RuntimeOptions {
        exit_when_idle: !settings.watch,
        divider: settings.config.config.divider,
    };
    let core = RerunController::new(settings.busy_behaviour(), options);
    let summary = Runtime::new(core, rt_rx, pipeline).run().await?;
    info!(?summary, "runtime finished");

    // Not watching: keep relaying the app's output until it exits, but let
    // Ctrl-C take it down.
    if !settings.watch {
        await_launched(&registry, tokio::signal::ctrl_c()).await;
    }

    Ok(())
}

/// Keep running until every live process in `registry` has exited, or kill
/// them all once `shutdown` resolves.
pub async fn await_launched<F: Future>(registry: &ProcessRegistry, shutdown: F) {
    if registry.is_empty() {
        return;
    }

    info!("waiting for launched processes to exit (Ctrl+C to stop)");
    tokio::select! {
        _ = registry.wait_all() => {}
        _ = shutdown => {
            info!("interrupted; killing launched processes");
            registry.kill_all().await;
        }
    }
}

/// Print the resolved stage commands without running anything.
fn print_dry_run(settings: &DevSettings, plan: &StagePlan) {
    println!("devloop dry-run");
    println!("  src:   {}", settings.src_dir.display());
    println!("  build: {}", settings.build_dir.display());
    println!("  watch: {}", settings.watch);
    println!(
        "  busy_behaviour: {:?}, kill_grace_ms: {}",
        settings.busy_behaviour(),
        settings.config.config.kill_grace_ms
    );
    println!();

    println!("stages:");
    for stage in plan.stages() {
        let state = if stage.enabled { "" } else { " (disabled)" };
        println!("  - {}{state}", stage.kind);
        println!("      cmd: {}", stage.command);
    }
}
