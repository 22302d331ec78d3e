use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time;
use tracing::warn;

/// Wall-clock bound applied to every adapter invocation
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the child was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("command not found: {program}")]
    NotFound { program: String },
    #[error("permission denied: {program}")]
    PermissionDenied { program: String },
    #[error("failed to launch {program}: {reason}")]
    Launch { program: String, reason: String },
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("i/o error while waiting for child: {0}")]
    Io(String),
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, ProcessError>;
}

pub struct TokioProcessRunner {
    timeout: Duration,
}

impl TokioProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_INVOCATION_TIMEOUT)
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, ProcessError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }
        // Own process group, so a timeout can take down anything the adapter spawned
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command
            .spawn()
            .map_err(|e| map_spawn_error(&spec.program, e))?;
        let pid = child.id();

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // The deadline covers both the exit and draining the pipes, so a
        // grandchild holding stdout open cannot stall us past the timeout.
        let collected = time::timeout(self.timeout, async {
            let (status, stdout, stderr) =
                tokio::join!(child.wait(), read_all(stdout), read_all(stderr));
            Ok::<_, io::Error>((status?, stdout?, stderr?))
        })
        .await;

        match collected {
            Ok(Ok((status, stdout, stderr))) => Ok(ProcessOutput {
                exit_code: status.code(),
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            }),
            Ok(Err(e)) => Err(ProcessError::Io(e.to_string())),
            Err(_) => {
                if let Some(pid) = pid {
                    kill_process_group(pid, &spec.program);
                }
                // kill() also reaps the child
                if let Err(error) = child.kill().await {
                    warn!(
                        program = %spec.program,
                        error = %error,
                        "Failed to kill timed out adapter"
                    );
                }
                Err(ProcessError::TimedOut(self.timeout))
            }
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32, program: &str) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: killpg only sends a signal; the group id comes from our own child
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        let error = io::Error::last_os_error();
        // ESRCH: the whole group already exited
        if error.raw_os_error() != Some(libc::ESRCH) {
            warn!(program, error = %error, "Failed to kill adapter process group");
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32, _program: &str) {}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

fn map_spawn_error(program: &str, error: io::Error) -> ProcessError {
    match error.kind() {
        io::ErrorKind::NotFound => ProcessError::NotFound {
            program: program.to_string(),
        },
        io::ErrorKind::PermissionDenied => ProcessError::PermissionDenied {
            program: program.to_string(),
        },
        _ => ProcessError::Launch {
            program: program.to_string(),
            reason: error.to_string(),
        },
    }
}
