//! Mock camera runner for deterministic testing
//!
//! Implements [`CameraRunner`] without touching a camera: captures write
//! small placeholder files and conversion copies the raw file. Segmented
//! capture and preview still spawn a real (harmless) child process so the
//! lifecycle code paths that poll, signal and reap processes are exercised
//! for real.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use camweb::camera::mock::{MockCameraRunner, MockConfig};
//!
//! let runner = Arc::new(MockCameraRunner::new().with_config(MockConfig::default().failing_still()));
//! // Hand the runner to CaptureService / RecordingSessionManager...
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::process::{Child, Command};

use crate::camera::error::CameraError;
use crate::camera::runner::CameraRunner;

/// Placeholder JPEG (SOI + EOI)
pub const MOCK_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];
/// Placeholder raw video payload
pub const MOCK_RAW_VIDEO: &[u8] = b"\x00\x00\x00\x01mock-h264";

/// A call made against the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Still(PathBuf),
    Video(PathBuf, Duration),
    Segmented(PathBuf),
    Preview,
    Convert(PathBuf, PathBuf),
}

/// Configuration for mock runner behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub fail_still: bool,
    pub fail_video: bool,
    pub fail_convert: bool,
    /// Report conversion success without writing the output
    pub silent_convert: bool,
    /// File whose bytes the preview process writes to stdout
    pub preview_source: Option<PathBuf>,
    /// How long the segmented capture process lives (default: an hour)
    pub segment_lifetime: Option<Duration>,
    /// Segmented capture ignores SIGTERM and only dies to SIGKILL
    pub ignore_term: bool,
    /// Time each conversion takes
    pub convert_delay: Option<Duration>,
}

impl MockConfig {
    pub fn failing_still(mut self) -> Self {
        self.fail_still = true;
        self
    }

    pub fn failing_video(mut self) -> Self {
        self.fail_video = true;
        self
    }

    pub fn failing_convert(mut self) -> Self {
        self.fail_convert = true;
        self
    }

    pub fn silent_convert(mut self) -> Self {
        self.silent_convert = true;
        self
    }

    pub fn with_preview_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.preview_source = Some(path.into());
        self
    }

    pub fn with_segment_lifetime(mut self, lifetime: Duration) -> Self {
        self.segment_lifetime = Some(lifetime);
        self
    }

    pub fn ignoring_term(mut self) -> Self {
        self.ignore_term = true;
        self
    }

    pub fn with_convert_delay(mut self, delay: Duration) -> Self {
        self.convert_delay = Some(delay);
        self
    }
}

/// Mock runner for testing
#[derive(Default)]
pub struct MockCameraRunner {
    config: MockConfig,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockCameraRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: MockConfig) -> Self {
        self.config = config;
        self
    }

    /// Calls recorded so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Number of segmented captures started
    pub fn segmented_starts(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, MockCall::Segmented(_)))
            .count()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().push(call);
    }

    fn failure(tool: &'static str) -> CameraError {
        CameraError::ToolFailed {
            tool,
            status: "exit status: 1".to_string(),
        }
    }

    fn spawn_child(mut cmd: Command, tool: &'static str) -> Result<Child, CameraError> {
        cmd.stdin(Stdio::null());
        cmd.stderr(Stdio::null());
        cmd.kill_on_drop(true);
        cmd.spawn().map_err(|e| CameraError::spawn(tool, e))
    }
}

#[async_trait]
impl CameraRunner for MockCameraRunner {
    async fn capture_still(&self, output: &Path) -> Result<(), CameraError> {
        self.record(MockCall::Still(output.to_path_buf()));
        if self.config.fail_still {
            return Err(Self::failure("rpicam-still"));
        }
        tokio::fs::write(output, MOCK_JPEG).await?;
        Ok(())
    }

    async fn capture_video(&self, output: &Path, duration: Duration) -> Result<(), CameraError> {
        self.record(MockCall::Video(output.to_path_buf(), duration));
        if self.config.fail_video {
            return Err(Self::failure("rpicam-vid"));
        }
        tokio::fs::write(output, MOCK_RAW_VIDEO).await?;
        Ok(())
    }

    fn spawn_segmented(&self, pattern: &Path) -> Result<Child, CameraError> {
        self.record(MockCall::Segmented(pattern.to_path_buf()));

        // The real tool writes segment 0 as soon as it starts
        let first = pattern.to_string_lossy().replace("%04d", "0000");
        std::fs::write(&first, MOCK_RAW_VIDEO)?;

        let lifetime = self
            .config
            .segment_lifetime
            .unwrap_or(Duration::from_secs(3600));
        let seconds = format!("{:.3}", lifetime.as_secs_f64());
        let mut cmd = if self.config.ignore_term {
            // An ignored signal stays ignored across exec
            let mut cmd = Command::new("sh");
            cmd.arg("-c")
                .arg(format!("trap '' TERM; exec sleep {}", seconds));
            cmd
        } else {
            let mut cmd = Command::new("sleep");
            cmd.arg(seconds);
            cmd
        };
        cmd.stdout(Stdio::null());
        Self::spawn_child(cmd, "rpicam-vid")
    }

    fn spawn_preview(&self) -> Result<Child, CameraError> {
        self.record(MockCall::Preview);

        let mut cmd = match &self.config.preview_source {
            Some(source) => {
                let mut cmd = Command::new("cat");
                cmd.arg(source);
                cmd
            }
            None => {
                let mut cmd = Command::new("sleep");
                cmd.arg("3600");
                cmd
            }
        };
        cmd.stdout(Stdio::piped());
        Self::spawn_child(cmd, "rpicam-vid")
    }

    async fn convert(&self, raw: &Path, output: &Path) -> Result<(), CameraError> {
        self.record(MockCall::Convert(raw.to_path_buf(), output.to_path_buf()));
        if let Some(delay) = self.config.convert_delay {
            tokio::time::sleep(delay).await;
        }
        if self.config.fail_convert {
            return Err(Self::failure("ffmpeg"));
        }
        if !self.config.silent_convert {
            tokio::fs::copy(raw, output).await?;
        }
        Ok(())
    }
}
