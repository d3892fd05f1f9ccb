//! Continuous recording session management.
//!
//! A single long-running capture process writes fixed-length segments into
//! the recordings directory. [`RecordingSessionManager`] owns that process:
//! at most one session exists at a time, and start, stop and status all run
//! under one lock so concurrent requests observe a consistent state.
//!
//! Start and stop run on their own task. A caller that goes away midway
//! (an HTTP client disconnecting) cannot leave the recorder running
//! untracked or its segments unconverted.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::process::Child;
use tokio::sync::Mutex;

use crate::camera::convert::{convert_pending, ConversionReport, InFlightCaptures};
use crate::camera::error::CameraError;
use crate::camera::naming;
use crate::camera::runner::CameraRunner;
use crate::config::StartPolicy;

/// The running capture process and what it is writing
struct ActiveRecording {
    child: Child,
    started_at: DateTime<Local>,
    pattern: PathBuf,
}

impl ActiveRecording {
    /// Poll the child without blocking
    fn has_exited(&mut self) -> bool {
        let polled = self.child.try_wait();
        exited(polled, &self.pattern)
    }
}

/// A child that cannot be polled is still treated as running, so it stays
/// tracked and the next stop signals it.
fn exited(polled: io::Result<Option<ExitStatus>>, pattern: &Path) -> bool {
    match polled {
        Ok(None) => false,
        Ok(Some(status)) => {
            tracing::info!(
                %status,
                pattern = %pattern.display(),
                "Recording process exited on its own"
            );
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to poll recording process");
            false
        }
    }
}

/// Returned by a successful start
#[derive(Debug, Clone, Serialize)]
pub struct RecordingStarted {
    pub started_at: DateTime<Local>,
    /// Segment file name pattern (`%04d` is the segment number)
    pub pattern: String,
}

/// Returned by stop
#[derive(Debug, Clone, Serialize)]
pub struct StopOutcome {
    /// Whether a session was being tracked when stop was called
    pub was_recording: bool,
    #[serde(flatten)]
    pub conversion: ConversionReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordingStatus {
    pub recording: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Local>>,
}

impl RecordingStatus {
    fn idle() -> Self {
        Self {
            recording: false,
            started_at: None,
        }
    }
}

pub struct RecordingSessionManager {
    inner: Arc<SessionInner>,
}

/// State shared with the tasks that carry out start and stop
struct SessionInner {
    runner: Arc<dyn CameraRunner>,
    recordings_dir: PathBuf,
    policy: StartPolicy,
    stop_timeout: Duration,
    in_flight: InFlightCaptures,
    active: Mutex<Option<ActiveRecording>>,
}

impl RecordingSessionManager {
    pub fn new(
        runner: Arc<dyn CameraRunner>,
        recordings_dir: PathBuf,
        policy: StartPolicy,
        stop_timeout: Duration,
        in_flight: InFlightCaptures,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                runner,
                recordings_dir,
                policy,
                stop_timeout,
                in_flight,
                active: Mutex::new(None),
            }),
        }
    }

    /// Begin continuous segmented recording.
    ///
    /// With an active session, [`StartPolicy::Reject`] fails with
    /// [`CameraError::AlreadyRecording`] and [`StartPolicy::Restart`] stops
    /// (and converts) the current session first. A tracked process that has
    /// already exited does not count as active.
    pub async fn start(&self) -> Result<RecordingStarted, CameraError> {
        let inner = self.inner.clone();
        tokio::spawn(async move { inner.start().await }).await?
    }

    /// End the session (if any) and convert every pending raw segment.
    ///
    /// Never fails: with no session this is a no-op apart from converting
    /// leftovers, and per-file conversion failures are only counted.
    pub async fn stop(&self) -> StopOutcome {
        let inner = self.inner.clone();
        match tokio::spawn(async move { inner.stop().await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Stop task failed");
                StopOutcome {
                    was_recording: false,
                    conversion: ConversionReport::default(),
                }
            }
        }
    }

    /// Whether a capture process is running. Clears the session when the
    /// process has exited without stop being called.
    pub async fn status(&self) -> RecordingStatus {
        let mut active = self.inner.active.lock().await;

        let Some(current) = active.as_mut() else {
            return RecordingStatus::idle();
        };

        if current.has_exited() {
            *active = None;
            return RecordingStatus::idle();
        }

        RecordingStatus {
            recording: true,
            started_at: Some(current.started_at),
        }
    }

    /// PID of the tracked capture process, if any
    pub async fn active_pid(&self) -> Option<u32> {
        self.inner
            .active
            .lock()
            .await
            .as_ref()
            .and_then(|current| current.child.id())
    }

    /// Stop on server shutdown so the capture process is not orphaned
    pub async fn shutdown(&self) {
        let outcome = self.stop().await;
        if outcome.was_recording {
            tracing::info!(
                converted = outcome.conversion.converted.len(),
                failed = outcome.conversion.failed,
                "Stopped recording on shutdown"
            );
        }
    }
}

impl SessionInner {
    async fn start(&self) -> Result<RecordingStarted, CameraError> {
        let mut active = self.active.lock().await;

        if let Some(mut current) = active.take() {
            if !current.has_exited() {
                match self.policy {
                    StartPolicy::Reject => {
                        *active = Some(current);
                        return Err(CameraError::AlreadyRecording);
                    }
                    StartPolicy::Restart => {
                        tracing::info!("Restarting active recording");
                        self.terminate(current).await;
                        self.convert_segments().await;
                    }
                }
            }
        }

        let started_at = Local::now();
        let pattern = self
            .recordings_dir
            .join(naming::segment_pattern(&started_at));
        let child = self.runner.spawn_segmented(&pattern)?;

        tracing::info!(
            pid = ?child.id(),
            pattern = %pattern.display(),
            "Recording started"
        );

        let pattern_name = pattern
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        *active = Some(ActiveRecording {
            child,
            started_at,
            pattern,
        });

        Ok(RecordingStarted {
            started_at,
            pattern: pattern_name,
        })
    }

    async fn stop(&self) -> StopOutcome {
        let mut active = self.active.lock().await;

        let was_recording = match active.take() {
            Some(current) => {
                self.terminate(current).await;
                true
            }
            None => false,
        };

        let conversion = self.convert_segments().await;
        StopOutcome {
            was_recording,
            conversion,
        }
    }

    async fn convert_segments(&self) -> ConversionReport {
        convert_pending(self.runner.as_ref(), &self.recordings_dir, &self.in_flight).await
    }

    /// Ask the process to exit, then wait (bounded) so the last segment is
    /// finalized before conversion. Kills it after the timeout.
    async fn terminate(&self, mut current: ActiveRecording) {
        if let Err(e) = request_terminate(&mut current.child) {
            tracing::warn!(error = %e, "Failed to signal recording process");
        }

        match tokio::time::timeout(self.stop_timeout, current.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!(%status, "Recording process stopped");
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to wait for recording process");
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.stop_timeout.as_millis() as u64,
                    "Recording process ignored SIGTERM, killing"
                );
                if let Err(e) = current.child.kill().await {
                    tracing::warn!(error = %e, "Failed to kill recording process");
                }
            }
        }
    }
}

/// Graceful termination: SIGTERM on Unix, a hard kill elsewhere
fn request_terminate(child: &mut Child) -> std::io::Result<()> {
    let Some(pid) = child.id() else {
        // Already reaped
        return Ok(());
    };

    #[cfg(unix)]
    {
        let result = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
        if result == -1 {
            return Err(std::io::Error::last_os_error());
        }
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        child.start_kill()?;
    }

    Ok(())
}
