//! Spawning of the external measurement process.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::config::ProcessConfig;
use crate::error::ServiceError;

/// A running probe with its stdout taken for ingestion.
#[derive(Debug)]
pub struct MeasurementProcess {
    child: Child,
    stdout: Option<ChildStdout>,
}

impl MeasurementProcess {
    /// Start the probe described by `config`.
    ///
    /// The probe is killed when this value is dropped. Its stderr is either
    /// discarded or forwarded to the log at debug level.
    pub fn spawn(config: &ProcessConfig) -> Result<Self, ServiceError> {
        let stderr = if config.forward_stderr {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ServiceError::Spawn {
                path: config.path.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or(ServiceError::MissingStdout)?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) => debug!(target: "tempd::probe", "{}", line),
                        Ok(None) => break,
                        Err(e) => {
                            warn!(error = %e, "failed to read probe stderr");
                            break;
                        }
                    }
                }
            });
        }

        info!(path = %config.path.display(), pid = child.id(), "measurement process started");

        Ok(Self {
            child,
            stdout: Some(stdout),
        })
    }

    /// Take the probe's stdout. Returns `None` after the first call.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Kill the probe (if still running) and reap it.
    pub async fn shutdown(mut self) {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                info!(%status, "measurement process exited");
                return;
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to query measurement process"),
        }

        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "failed to kill measurement process");
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tokio::io::AsyncReadExt;

    fn sh(script: &str) -> ProcessConfig {
        ProcessConfig {
            path: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), script.to_string()],
            forward_stderr: false,
        }
    }

    #[tokio::test]
    async fn stdout_is_captured() {
        let mut process = MeasurementProcess::spawn(&sh("echo 'A 21.5'")).unwrap();
        let mut stdout = process.take_stdout().unwrap();
        assert!(process.take_stdout().is_none());

        let mut out = String::new();
        stdout.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "A 21.5\n");

        process.shutdown().await;
    }

    #[tokio::test]
    async fn forwarded_stderr_does_not_block_stdout() {
        let mut config = sh("echo 'serial initialised' >&2; echo 'A 20.0'");
        config.forward_stderr = true;

        let mut process = MeasurementProcess::spawn(&config).unwrap();
        let mut out = String::new();
        process
            .take_stdout()
            .unwrap()
            .read_to_string(&mut out)
            .await
            .unwrap();
        assert_eq!(out, "A 20.0\n");
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let config = ProcessConfig {
            path: PathBuf::from("/nonexistent/onewire-probe"),
            args: vec![],
            forward_stderr: false,
        };

        let err = MeasurementProcess::spawn(&config).unwrap_err();
        assert!(matches!(err, ServiceError::Spawn { .. }));
    }

    #[tokio::test]
    async fn shutdown_kills_a_running_probe() {
        let process = MeasurementProcess::spawn(&sh("sleep 30")).unwrap();
        assert!(process.id().is_some());
        process.shutdown().await;
    }
}
