// src/exec/task_runner.rs

//! Supervision of a single child process: exit reporting, kill escalation
//! and stdout relaying.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::exec::handle::{ProcessExit, ProcessMonitor};

/// Own `child` until it exits or a kill is requested through `monitor`, then
/// publish the exit.
pub async fn supervise(
    mut child: Child,
    mut monitor: ProcessMonitor,
    label: String,
    kill_grace: Duration,
) {
    // Either the process exits on its own, or we receive a kill request.
    // A `false` from `kill_requested` (all handles dropped) disables that
    // branch and we keep waiting for the process.
    let exit = tokio::select! {
        status = child.wait() => {
            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(label = %label, error = %e, "failed waiting for process");
                    None
                }
            };
            debug!(label = %label, exit_code = ?code, "process exited");
            ProcessExit::Exited { code }
        }
        true = monitor.kill_requested() => {
            info!(label = %label, pid = ?child.id(), "killing process");
            terminate(&mut child, &label, kill_grace).await;
            ProcessExit::Killed
        }
    };

    monitor.finish(exit);
}

/// SIGTERM the process group, then force-kill once `grace` has passed.
async fn terminate(child: &mut Child, label: &str, grace: Duration) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        if !grace.is_zero() {
            signal_group(pid, libc::SIGTERM);
            if timeout(grace, child.wait()).await.is_ok() {
                return;
            }
            warn!(
                label = %label,
                pid,
                grace_ms = grace.as_millis() as u64,
                "process ignored SIGTERM; escalating to SIGKILL"
            );
        }
        signal_group(pid, libc::SIGKILL);
    }

    #[cfg(not(unix))]
    let _ = grace;

    if let Err(e) = child.kill().await {
        warn!(label = %label, error = %e, "failed to kill child process");
    }
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: libc::c_int) {
    let Ok(pid) = i32::try_from(pid) else {
        return;
    };
    // The child was spawned as leader of its own process group.
    unsafe {
        let _ = libc::kill(-pid, signal);
    }
}

/// Forward every stdout line of a process to `out`, prefixed with its label.
///
/// Lines are handled as raw bytes, so output that is not valid UTF-8 is
/// passed through unchanged. The pipe is drained until the child closes it,
/// even if writing to `out` fails, so the child never sees a broken pipe.
pub async fn relay_stdout<R, W>(label: String, stdout: R, mut out: W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(stdout);
    let mut line = Vec::new();
    let mut writable = true;

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                if !writable {
                    continue;
                }
                let framed = prefix_line(&label, &line);
                if let Err(e) = write_line(&mut out, &framed).await {
                    debug!(label = %label, error = %e, "cannot forward output; discarding the rest");
                    writable = false;
                }
            }
            Err(e) => {
                debug!(label = %label, error = %e, "stdout relay stopped");
                break;
            }
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, framed: &[u8]) -> std::io::Result<()> {
    out.write_all(framed).await?;
    out.flush().await
}

fn prefix_line(label: &str, line: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(label.len() + 3 + line.len() + 1);
    framed.extend_from_slice(label.as_bytes());
    framed.extend_from_slice(b" | ");
    framed.extend_from_slice(line);
    if !framed.ends_with(b"\n") {
        framed.push(b'\n');
    }
    framed
}
