use super::command::Invocation;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// How long to keep collecting output after a timed-out child was killed.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    /// `None` when the child was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Runs `invocation` inside `work_dir` and captures its output.
///
/// The child leads its own process group. With a `deadline` the whole group
/// is killed and the child reaped once it elapses, and the outcome is flagged
/// as timed out. The group is also killed when the child exits on its own and
/// when the returned future is dropped, so nothing it spawned outlives the run.
pub async fn run(
    invocation: &Invocation,
    work_dir: &Path,
    deadline: Option<Duration>,
) -> std::io::Result<ProcessOutcome> {
    let mut command = Command::new(invocation.program());
    command
        .args(invocation.arguments())
        .current_dir(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn()?;
    let mut group = ProcessGroup::new(child.id());

    debug!("Spawned {} (pid {:?})", invocation.program(), child.id());

    let stdout = child.stdout.take().map(|pipe| tokio::spawn(drain(pipe)));
    let stderr = child.stderr.take().map(|pipe| tokio::spawn(drain(pipe)));

    let (status, timed_out) = match deadline {
        None => (Some(child.wait().await?), false),
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => (Some(status?), false),
            Err(_) => {
                warn!(
                    "{} exceeded {}s deadline, killing it",
                    invocation.program(),
                    limit.as_secs()
                );
                group.kill();
                child.kill().await?;
                (None, true)
            }
        },
    };

    // Leftover group members would keep the pipes open.
    group.kill();

    let grace = timed_out.then_some(DRAIN_GRACE);
    Ok(ProcessOutcome {
        exit_code: status.and_then(|s| s.code()),
        stdout: collect(stdout, grace).await,
        stderr: collect(stderr, grace).await,
        timed_out,
    })
}

/// Process group led by a spawned child. Killed at most once, on demand or
/// on drop.
struct ProcessGroup {
    pgid: Option<u32>,
}

impl ProcessGroup {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_group(pgid);
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => debug!("Killed process group {}", pgid),
        // Every member already exited.
        Err(Errno::ESRCH) => {}
        Err(e) => warn!("Failed to kill process group {}: {}", pgid, e),
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}

async fn drain<R: AsyncRead + Unpin>(mut pipe: R) -> String {
    let mut buf = Vec::new();
    if let Err(e) = pipe.read_to_end(&mut buf).await {
        debug!("Error reading child output: {}", e);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn collect(reader: Option<JoinHandle<String>>, grace: Option<Duration>) -> String {
    let Some(handle) = reader else {
        return String::new();
    };

    match grace {
        None => handle.await.unwrap_or_default(),
        Some(grace) => {
            let abort = handle.abort_handle();
            match tokio::time::timeout(grace, handle).await {
                Ok(joined) => joined.unwrap_or_default(),
                Err(_) => {
                    abort.abort();
                    String::new()
                }
            }
        }
    }
}
