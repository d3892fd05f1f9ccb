use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;

use crate::camera::convert::{convert_to_playback, InFlightCaptures};
use crate::camera::error::CameraError;
use crate::camera::naming;
use crate::camera::runner::CameraRunner;

/// A file produced by a one-shot capture
#[derive(Debug, Clone, Serialize)]
pub struct CapturedMedia {
    /// File name inside the recordings directory
    pub file: String,
    #[serde(skip)]
    pub path: PathBuf,
}

impl CapturedMedia {
    fn at(path: PathBuf) -> Self {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { file, path }
    }

    pub fn message(&self) -> String {
        format!("Saved: {}", self.file)
    }
}

/// Photo capture and fixed-duration recording.
///
/// Each call is an independent run of the external tools; calls may
/// overlap with each other and with a continuous recording session.
pub struct CaptureService {
    runner: Arc<dyn CameraRunner>,
    recordings_dir: PathBuf,
    max_record_secs: u64,
    in_flight: InFlightCaptures,
}

impl CaptureService {
    pub fn new(
        runner: Arc<dyn CameraRunner>,
        recordings_dir: PathBuf,
        max_record_secs: u64,
        in_flight: InFlightCaptures,
    ) -> Self {
        Self {
            runner,
            recordings_dir,
            max_record_secs,
            in_flight,
        }
    }

    /// Take a photo
    pub async fn snap(&self) -> Result<CapturedMedia, CameraError> {
        let claim = self.in_flight.claim_unique(
            &self.recordings_dir,
            &naming::photo_stem(&Local::now()),
            &[naming::PHOTO_EXT],
        );
        let path = claim.path().to_path_buf();
        tracing::info!(path = %path.display(), "Capturing photo");

        self.runner.capture_still(&path).await?;

        if !path.exists() {
            return Err(CameraError::OutputMissing(path));
        }

        Ok(CapturedMedia::at(path))
    }

    /// Record `duration_secs` of video and convert it for playback
    pub async fn record(&self, duration_secs: u64) -> Result<CapturedMedia, CameraError> {
        if duration_secs == 0 || duration_secs > self.max_record_secs {
            return Err(CameraError::InvalidDuration {
                requested: duration_secs,
                max: self.max_record_secs,
            });
        }

        let claim = self.in_flight.claim_unique(
            &self.recordings_dir,
            &naming::video_stem(&Local::now()),
            &[naming::RAW_VIDEO_EXT, naming::PLAYBACK_VIDEO_EXT],
        );
        let raw = claim.path().to_path_buf();
        tracing::info!(path = %raw.display(), duration_secs, "Recording video");

        let output = {
            let _claim = claim;
            self.runner
                .capture_video(&raw, Duration::from_secs(duration_secs))
                .await?;
            if !raw.exists() {
                return Err(CameraError::OutputMissing(raw));
            }
            convert_to_playback(self.runner.as_ref(), &raw).await?
        };

        Ok(CapturedMedia::at(output))
    }
}
