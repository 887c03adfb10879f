//! Rendering engine lifecycle: one headless Chrome per run.
//!
//! [`EngineHandle`] owns the browser process. It is acquired once before the
//! first category is processed and released after the last one, either
//! explicitly via [`EngineHandle::stop`] or implicitly when the handle is
//! dropped (the child is spawned with `kill_on_drop`). An early return, a
//! panic inside the batch, or a startup failure therefore never leaves a
//! browser running on the control port.

use crate::config::ConversionConfig;
use crate::error::Html2PdfError;
use crate::pipeline::cdp::CdpEngine;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A running headless browser bound to the configured control port.
pub struct EngineHandle {
    child: Child,
    executable: PathBuf,
    client: CdpEngine,
    // Throw-away profile; removed when the handle drops, after the child.
    _profile: TempDir,
}

impl EngineHandle {
    /// Locate and start the browser, then wait until its control port answers.
    ///
    /// # Errors
    /// - [`Html2PdfError::ChromeNotFound`] — no executable could be located
    /// - [`Html2PdfError::EngineLaunchFailed`] — spawn failed or the process
    ///   exited during startup
    /// - [`Html2PdfError::EngineNotReady`] — the port stayed closed past
    ///   `startup_timeout_secs`
    pub async fn launch(config: &ConversionConfig) -> Result<Self, Html2PdfError> {
        let executable = chrome_auto::locate_chrome(config.chrome_path.as_deref())
            .map_err(|e| Html2PdfError::ChromeNotFound(e.to_string()))?;

        let profile = tempfile::Builder::new()
            .prefix("html2pdf-profile-")
            .tempdir()
            .map_err(|e| Html2PdfError::Internal(format!("profile dir: {e}")))?;

        let args = chrome_auto::headless_args(config.port, profile.path(), &config.extra_flags);
        info!("Launching {} on port {}", executable.display(), config.port);
        debug!("Chrome args: {:?}", args);

        let child = Command::new(&executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Html2PdfError::EngineLaunchFailed {
                path: executable.clone(),
                reason: e.to_string(),
            })?;

        let mut handle = Self {
            child,
            executable,
            client: CdpEngine::new(config.port),
            _profile: profile,
        };
        handle
            .wait_until_ready(Duration::from_secs(config.startup_timeout_secs))
            .await?;
        Ok(handle)
    }

    /// Client for submitting documents to this browser.
    pub fn engine(&self) -> &CdpEngine {
        &self.client
    }

    pub fn port(&self) -> u16 {
        self.client.port()
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Terminate the browser and reap it.
    pub async fn stop(mut self) {
        match self.child.kill().await {
            Ok(()) => info!("Chrome on port {} stopped", self.port()),
            Err(e) => warn!("Failed to stop Chrome on port {}: {}", self.port(), e),
        }
    }

    async fn wait_until_ready(&mut self, timeout: Duration) -> Result<(), Html2PdfError> {
        let deadline = Instant::now() + timeout;
        loop {
            let exited = self
                .child
                .try_wait()
                .map_err(|e| Html2PdfError::Internal(format!("waiting on Chrome: {e}")))?;
            if let Some(status) = exited {
                return Err(Html2PdfError::EngineLaunchFailed {
                    path: self.executable.clone(),
                    reason: format!("exited during startup ({status})"),
                });
            }

            // A listener that accepts but never answers must not outlive the deadline.
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, self.client.version()).await {
                Ok(Ok(v)) => {
                    info!(
                        "{} ready on port {} (protocol {})",
                        v.browser,
                        self.port(),
                        v.protocol_version
                    );
                    return Ok(());
                }
                Ok(Err(e)) => debug!("Control port not ready yet: {}", e),
                Err(_) => debug!("Control port did not answer in time"),
            }

            if Instant::now() >= deadline {
                return Err(Html2PdfError::EngineNotReady {
                    port: self.port(),
                    secs: timeout.as_secs(),
                });
            }
            sleep(READY_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_port() -> u16 {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn missing_executable_is_chrome_not_found() {
        let config = ConversionConfig::builder()
            .docs_root("/docs")
            .chrome_path("/no/such/chrome")
            .port(free_port())
            .build()
            .unwrap();

        let err = EngineHandle::launch(&config).await.err().unwrap();
        assert!(matches!(err, Html2PdfError::ChromeNotFound(_)), "got: {err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_control_port_is_not_ready_after_deadline() {
        // Something holds the port and accepts, but never speaks HTTP.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let child = Command::new("sleep")
            .arg("300")
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let mut handle = EngineHandle {
            child,
            executable: PathBuf::from("sleep"),
            client: CdpEngine::new(port),
            _profile: tempfile::tempdir().unwrap(),
        };

        let waited = tokio::time::timeout(
            Duration::from_secs(5),
            handle.wait_until_ready(Duration::from_secs(1)),
        )
        .await
        .expect("readiness wait must honour its own deadline");
        assert!(
            matches!(waited, Err(Html2PdfError::EngineNotReady { port: p, secs: 1 }) if p == port),
            "got: {waited:?}"
        );
        handle.stop().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_exiting_during_startup_is_launch_failure() {
        // `sh` rejects Chrome's flags and exits straight away.
        let config = ConversionConfig::builder()
            .docs_root("/docs")
            .chrome_path("/bin/sh")
            .port(free_port())
            .startup_timeout_secs(10)
            .build()
            .unwrap();

        let err = EngineHandle::launch(&config).await.err().unwrap();
        assert!(
            matches!(err, Html2PdfError::EngineLaunchFailed { .. }),
            "got: {err}"
        );
    }
}
