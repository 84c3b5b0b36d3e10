//! Local process-pool gateway.
//!
//! Workers are plain OS processes recognized by a marker embedded in
//! their cmdline. Scaling up spawns the configured worker command;
//! scaling down delivers `SIGTERM` to peers first and the calling
//! process strictly last, so a worker that just finished the final job
//! can shut down its fleet and then itself without being interrupted
//! mid-job.
//!
//! This backend takes destructive action against the local machine, so
//! it is never inferred; only an explicit `environment = "local"`
//! selects it.

use std::path::PathBuf;
use std::process::Stdio;

use tracing::{debug, info};

use async_trait::async_trait;
use crewscale_core::{GatewayError, WorkerCommand};

use crate::gateway::WorkerGateway;

/// Scaling backend for worker processes on the local machine.
#[derive(Debug)]
pub struct LocalGateway {
    worker: WorkerCommand,
    /// procfs mount point. Overridable for tests.
    proc_root: PathBuf,
}

impl LocalGateway {
    pub fn new(worker: WorkerCommand) -> Self {
        Self {
            worker,
            proc_root: PathBuf::from("/proc"),
        }
    }

    /// Create a gateway scanning an alternate procfs root (for testing).
    pub fn with_proc_root(worker: WorkerCommand, proc_root: impl Into<PathBuf>) -> Self {
        Self {
            worker,
            proc_root: proc_root.into(),
        }
    }

    /// Pids of all processes whose cmdline carries the worker marker.
    fn worker_pids(&self) -> Result<Vec<i32>, GatewayError> {
        let entries =
            std::fs::read_dir(&self.proc_root).map_err(|e| GatewayError::Process(e.to_string()))?;

        let mut pids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GatewayError::Process(e.to_string()))?;
            let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<i32>().ok()) else {
                continue;
            };
            // Processes vanish mid-scan; a missing cmdline is not an error.
            let Ok(raw) = std::fs::read(entry.path().join("cmdline")) else {
                continue;
            };
            if self.worker.matches(&decode_cmdline(&raw)) {
                pids.push(pid);
            }
        }
        pids.sort_unstable();
        Ok(pids)
    }

    fn spawn_worker(&self) -> Result<(), GatewayError> {
        std::process::Command::new(&self.worker.program)
            .args(&self.worker.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|e| GatewayError::Process(e.to_string()))
    }

    fn signal(pid: i32) {
        // SAFETY: plain signal delivery; no memory is shared with the target.
        unsafe {
            libc::kill(pid, libc::SIGTERM);
        }
    }
}

#[async_trait]
impl WorkerGateway for LocalGateway {
    async fn current_workers(&self) -> Result<u32, GatewayError> {
        Ok(self.worker_pids()?.len() as u32)
    }

    async fn set_workers(&self, n: u32) -> Result<(), GatewayError> {
        let pids = self.worker_pids()?;
        let current = pids.len() as u32;

        if n > current {
            info!(from = current, to = n, "spawning local workers");
            for _ in 0..(n - current) {
                self.spawn_worker()?;
            }
            return Ok(());
        }

        let doomed = shutdown_order(&pids, std::process::id() as i32, n);
        if doomed.is_empty() {
            debug!(workers = current, "local pool already at target");
            return Ok(());
        }

        info!(from = current, to = n, "terminating local workers");
        for pid in doomed {
            Self::signal(pid);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// procfs cmdline is NUL-separated argv.
fn decode_cmdline(raw: &[u8]) -> String {
    raw.split(|b| *b == 0)
        .filter(|part| !part.is_empty())
        .map(|part| String::from_utf8_lossy(part))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Which pids to signal, in order, to shrink `pids` down to `target`.
///
/// Peers always come before the calling process: if the caller is one of
/// the workers it must be the last to receive a signal, after it has
/// already dispatched the others.
fn shutdown_order(pids: &[i32], self_pid: i32, target: u32) -> Vec<i32> {
    let excess = pids.len().saturating_sub(target as usize);
    let mut order: Vec<i32> = pids.iter().copied().filter(|&p| p != self_pid).collect();
    if pids.contains(&self_pid) {
        order.push(self_pid);
    }
    order.truncate(excess);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    fn worker_command() -> WorkerCommand {
        WorkerCommand {
            program: "acme-worker".into(),
            args: vec!["--tag".into(), "CREWSCALE".into()],
            marker: "CREWSCALE".into(),
        }
    }

    fn fake_proc(root: &Path, pid: i32, argv: &[&str]) {
        let dir = root.join(pid.to_string());
        std::fs::create_dir(&dir).unwrap();
        let mut cmdline = Vec::new();
        for arg in argv {
            cmdline.extend_from_slice(arg.as_bytes());
            cmdline.push(0);
        }
        std::fs::write(dir.join("cmdline"), cmdline).unwrap();
    }

    #[tokio::test]
    async fn counts_only_marked_processes() {
        let root = tempfile::tempdir().unwrap();
        fake_proc(root.path(), 100, &["acme-worker", "--tag", "CREWSCALE"]);
        fake_proc(root.path(), 200, &["acme-web", "--port", "3000"]);
        fake_proc(root.path(), 300, &["acme-worker", "--tag", "CREWSCALE"]);
        std::fs::create_dir(root.path().join("self")).unwrap(); // non-pid entry
        std::fs::create_dir(root.path().join("400")).unwrap(); // pid without cmdline

        let gateway = LocalGateway::with_proc_root(worker_command(), root.path());
        assert_eq!(gateway.current_workers().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn missing_proc_root_is_a_process_error() {
        let gateway = LocalGateway::with_proc_root(worker_command(), "/nonexistent/procfs");
        let err = gateway.current_workers().await.unwrap_err();
        assert!(matches!(err, GatewayError::Process(_)));
    }

    #[tokio::test]
    async fn unspawnable_worker_is_a_process_error() {
        let root = tempfile::tempdir().unwrap();
        let mut command = worker_command();
        command.program = "/nonexistent/acme-worker".into();

        let gateway = LocalGateway::with_proc_root(command, root.path());
        let err = gateway.set_workers(2).await.unwrap_err();
        assert!(matches!(err, GatewayError::Process(_)));
    }

    #[test]
    fn cmdline_decoding() {
        assert_eq!(
            decode_cmdline(b"acme-worker\0--tag\0CREWSCALE\0"),
            "acme-worker --tag CREWSCALE"
        );
        assert_eq!(decode_cmdline(b""), "");
    }

    #[test]
    fn shutdown_order_kills_peers_before_self() {
        let order = shutdown_order(&[100, 200, 300], 200, 0);
        assert_eq!(order, vec![100, 300, 200]);
    }

    #[test]
    fn shutdown_order_spares_self_when_draining_to_a_floor() {
        // Two must go; the caller survives as part of the floor.
        let order = shutdown_order(&[100, 200, 300], 200, 1);
        assert_eq!(order, vec![100, 300]);
    }

    #[test]
    fn shutdown_order_without_self_in_pool() {
        // A non-worker caller (e.g. a web process) just drains peers.
        let order = shutdown_order(&[100, 300], 999, 0);
        assert_eq!(order, vec![100, 300]);
    }

    #[test]
    fn shutdown_order_noop_at_target() {
        assert!(shutdown_order(&[100, 200], 200, 2).is_empty());
        assert!(shutdown_order(&[], 200, 0).is_empty());
    }
}
