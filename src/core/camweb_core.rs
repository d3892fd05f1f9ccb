//! Core infrastructure behind the web interface.

use std::sync::Arc;
use std::time::Duration;

use crate::camera::{
    CameraRunner, CaptureService, InFlightCaptures, RecordingSessionManager, RpicamRunner,
};
use crate::config::Config;
use crate::media::MediaLibrary;
use crate::util::{Tool, ToolAvailability};

/// Core infrastructure for camweb.
///
/// This struct owns all the foundational components:
/// - The camera runner that drives the external tools
/// - Capture service for photos and timed recordings
/// - The recording session manager (one continuous recording at a time)
/// - Media library for listing, serving and deleting files
/// - Tool availability
pub struct CamwebCore {
    /// Tool availability (rpicam-still, rpicam-vid, ffmpeg)
    tools: ToolAvailability,
    /// Camera runner shared by capture, recording and preview
    runner: Arc<dyn CameraRunner>,
    /// Recordings directory access
    media: MediaLibrary,
    /// Photo and timed recording capture
    capture: CaptureService,
    /// Continuous recording lifecycle
    recordings: Arc<RecordingSessionManager>,
}

impl CamwebCore {
    /// Create a new CamwebCore backed by the rpicam tools.
    pub fn new(config: Config, tools: ToolAvailability) -> Self {
        for tool in tools.missing_tools() {
            tracing::warn!(
                tool = tool.binary_name(),
                "{} not available: {}",
                tool.display_name(),
                tool.description()
            );
        }
        if let Some(path) = tools.get_path(Tool::RpicamVid) {
            tracing::debug!(path = %path.display(), "Using rpicam-vid");
        }

        let runner = Arc::new(RpicamRunner::new(config.camera.clone(), &tools));
        Self::with_runner(config, tools, runner)
    }

    /// Create a CamwebCore with an explicit runner (used by tests).
    pub fn with_runner(
        config: Config,
        tools: ToolAvailability,
        runner: Arc<dyn CameraRunner>,
    ) -> Self {
        let media = MediaLibrary::new(config.recordings_dir.clone());
        if let Err(e) = media.ensure_dir() {
            tracing::warn!(
                dir = %config.recordings_dir.display(),
                error = %e,
                "Failed to create recordings directory"
            );
        }

        let in_flight = InFlightCaptures::default();
        let capture = CaptureService::new(
            runner.clone(),
            config.recordings_dir.clone(),
            config.camera.max_record_secs,
            in_flight.clone(),
        );
        let recordings = Arc::new(RecordingSessionManager::new(
            runner.clone(),
            config.recordings_dir.clone(),
            config.start_policy,
            Duration::from_millis(config.camera.stop_timeout_ms),
            in_flight,
        ));

        Self {
            tools,
            runner,
            media,
            capture,
            recordings,
        }
    }

    /// Get the tool availability.
    pub fn tools(&self) -> &ToolAvailability {
        &self.tools
    }

    /// Get the camera runner.
    pub fn runner(&self) -> &Arc<dyn CameraRunner> {
        &self.runner
    }

    /// Get the media library.
    pub fn media(&self) -> &MediaLibrary {
        &self.media
    }

    /// Get the capture service.
    pub fn capture(&self) -> &CaptureService {
        &self.capture
    }

    /// Get the recording session manager.
    pub fn recordings(&self) -> &Arc<RecordingSessionManager> {
        &self.recordings
    }
}
