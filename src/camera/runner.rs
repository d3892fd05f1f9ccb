use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::camera::error::CameraError;
use crate::config::CameraSettings;
use crate::util::{Tool, ToolAvailability};

/// Trait for runners that drive the external capture and conversion tools
#[async_trait]
pub trait CameraRunner: Send + Sync {
    /// Take a single photo, returning once `output` has been written
    async fn capture_still(&self, output: &Path) -> Result<(), CameraError>;

    /// Record `duration` of raw video into `output`, returning when done
    async fn capture_video(&self, output: &Path, duration: Duration) -> Result<(), CameraError>;

    /// Start open-ended capture that writes one file per segment.
    ///
    /// `pattern` contains a `%04d` placeholder for the segment number.
    /// The returned child keeps running until it is signalled.
    fn spawn_segmented(&self, pattern: &Path) -> Result<Child, CameraError>;

    /// Start a preview process writing an MJPEG stream to its stdout
    fn spawn_preview(&self) -> Result<Child, CameraError>;

    /// Remux a raw recording into the playback container
    async fn convert(&self, raw: &Path, output: &Path) -> Result<(), CameraError>;
}

/// Runner backed by `rpicam-still`, `rpicam-vid` and `ffmpeg`
pub struct RpicamRunner {
    settings: CameraSettings,
    still_path: PathBuf,
    vid_path: PathBuf,
    ffmpeg_path: PathBuf,
}

impl RpicamRunner {
    pub fn new(settings: CameraSettings, tools: &ToolAvailability) -> Self {
        Self {
            settings,
            still_path: tools.command_path(Tool::RpicamStill),
            vid_path: tools.command_path(Tool::RpicamVid),
            ffmpeg_path: tools.command_path(Tool::Ffmpeg),
        }
    }

    fn still_args(&self, output: &Path) -> Vec<String> {
        let s = &self.settings;
        vec![
            "-t".into(),
            s.still_timeout_ms.to_string(),
            "--width".into(),
            s.still_width.to_string(),
            "--height".into(),
            s.still_height.to_string(),
            "-o".into(),
            output.to_string_lossy().into_owned(),
            "-v".into(),
            "0".into(),
        ]
    }

    /// `timeout_ms == 0` records until the process is stopped
    fn video_args(&self, timeout_ms: u64, output: &Path) -> Vec<String> {
        let s = &self.settings;
        vec![
            "-t".into(),
            timeout_ms.to_string(),
            "--width".into(),
            s.video_width.to_string(),
            "--height".into(),
            s.video_height.to_string(),
            "--framerate".into(),
            s.video_framerate.to_string(),
            "-o".into(),
            output.to_string_lossy().into_owned(),
            "-v".into(),
            "0".into(),
        ]
    }

    fn segmented_args(&self, pattern: &Path) -> Vec<String> {
        let mut args = self.video_args(0, pattern);
        // --segment must precede the output so rpicam-vid applies it to -o
        let output_at = args.len() - 4;
        args.splice(
            output_at..output_at,
            ["--segment".to_string(), self.settings.segment_ms.to_string()],
        );
        args
    }

    fn preview_args(&self) -> Vec<String> {
        let s = &self.settings;
        vec![
            "-t".into(),
            "0".into(),
            "--width".into(),
            s.preview_width.to_string(),
            "--height".into(),
            s.preview_height.to_string(),
            "--framerate".into(),
            s.preview_framerate.to_string(),
            "--codec".into(),
            "mjpeg".into(),
            "-o".into(),
            "-".into(),
            "-v".into(),
            "0".into(),
        ]
    }

    fn convert_args(&self, raw: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".into(),
            "-framerate".into(),
            self.settings.video_framerate.to_string(),
            "-i".into(),
            raw.to_string_lossy().into_owned(),
            "-c".into(),
            "copy".into(),
            output.to_string_lossy().into_owned(),
            "-v".into(),
            "quiet".into(),
        ]
    }
}

/// Run a tool to completion, treating a non-zero exit as failure
async fn run_tool(tool: Tool, program: &Path, args: Vec<String>) -> Result<(), CameraError> {
    let name = tool.binary_name();
    tracing::debug!(tool = name, ?args, "Running camera tool");

    let mut cmd = Command::new(program);
    cmd.args(&args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::piped());

    let output = cmd.output().await.map_err(|e| CameraError::spawn(name, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(
            tool = name,
            status = %output.status,
            stderr = %stderr.trim(),
            "Camera tool failed"
        );
        return Err(CameraError::ToolFailed {
            tool: name,
            status: output.status.to_string(),
        });
    }

    Ok(())
}

#[async_trait]
impl CameraRunner for RpicamRunner {
    async fn capture_still(&self, output: &Path) -> Result<(), CameraError> {
        run_tool(Tool::RpicamStill, &self.still_path, self.still_args(output)).await
    }

    async fn capture_video(&self, output: &Path, duration: Duration) -> Result<(), CameraError> {
        let timeout_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        run_tool(
            Tool::RpicamVid,
            &self.vid_path,
            self.video_args(timeout_ms, output),
        )
        .await
    }

    fn spawn_segmented(&self, pattern: &Path) -> Result<Child, CameraError> {
        let mut cmd = Command::new(&self.vid_path);
        cmd.args(self.segmented_args(pattern));
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());
        cmd.kill_on_drop(true);

        cmd.spawn()
            .map_err(|e| CameraError::spawn(Tool::RpicamVid.binary_name(), e))
    }

    fn spawn_preview(&self) -> Result<Child, CameraError> {
        let mut cmd = Command::new(&self.vid_path);
        cmd.args(self.preview_args());
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::null());
        cmd.kill_on_drop(true);

        cmd.spawn()
            .map_err(|e| CameraError::spawn(Tool::RpicamVid.binary_name(), e))
    }

    async fn convert(&self, raw: &Path, output: &Path) -> Result<(), CameraError> {
        run_tool(Tool::Ffmpeg, &self.ffmpeg_path, self.convert_args(raw, output)).await
    }
}
