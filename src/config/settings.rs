use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml_edit::{DocumentMut, Item, Table};

use crate::util::paths::{config_path, default_recordings_dir};
use crate::util::tools::{Tool, ToolPaths};

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerSettings,
    /// Directory holding captured photos and videos
    pub recordings_dir: PathBuf,
    /// Capture tool parameters
    pub camera: CameraSettings,
    /// What a start request does while a recording is already running
    pub start_policy: StartPolicy,
    /// Configured paths for external tools (rpicam-still, rpicam-vid, ffmpeg)
    pub tool_paths: ToolPaths,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Parameters passed to the capture and conversion tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraSettings {
    pub still_width: u32,
    pub still_height: u32,
    /// Preview time before rpicam-still takes the picture
    pub still_timeout_ms: u64,
    pub video_width: u32,
    pub video_height: u32,
    pub video_framerate: u32,
    /// Length of each file written by continuous recording
    pub segment_ms: u64,
    pub preview_width: u32,
    pub preview_height: u32,
    pub preview_framerate: u32,
    /// Upper bound for fixed-duration recordings
    pub max_record_secs: u64,
    /// Grace period after SIGTERM before the recorder is killed
    pub stop_timeout_ms: u64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            still_width: 1920,
            still_height: 1080,
            still_timeout_ms: 500,
            video_width: 1920,
            video_height: 1080,
            video_framerate: 30,
            segment_ms: 600_000,
            preview_width: 640,
            preview_height: 480,
            preview_framerate: 15,
            max_record_secs: 3600,
            stop_timeout_ms: 5000,
        }
    }
}

/// Behaviour of a start request while a recording session is active.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StartPolicy {
    /// Refuse the request; the running session keeps going
    #[default]
    Reject,
    /// Stop (and convert) the running session, then start a new one
    Restart,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            recordings_dir: default_recordings_dir(),
            camera: CameraSettings::default(),
            start_policy: StartPolicy::default(),
            tool_paths: ToolPaths::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlStorageConfig {
    pub recordings_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlCameraConfig {
    pub still_width: Option<u32>,
    pub still_height: Option<u32>,
    pub still_timeout_ms: Option<u64>,
    pub video_width: Option<u32>,
    pub video_height: Option<u32>,
    pub video_framerate: Option<u32>,
    pub segment_ms: Option<u64>,
    pub preview_width: Option<u32>,
    pub preview_height: Option<u32>,
    pub preview_framerate: Option<u32>,
    pub max_record_secs: Option<u64>,
    pub stop_timeout_ms: Option<u64>,
}

impl TomlCameraConfig {
    /// Overlay the values present in the file onto `settings`
    fn apply(self, settings: &mut CameraSettings) {
        if let Some(v) = self.still_width {
            settings.still_width = v;
        }
        if let Some(v) = self.still_height {
            settings.still_height = v;
        }
        if let Some(v) = self.still_timeout_ms {
            settings.still_timeout_ms = v;
        }
        if let Some(v) = self.video_width {
            settings.video_width = v;
        }
        if let Some(v) = self.video_height {
            settings.video_height = v;
        }
        if let Some(v) = self.video_framerate {
            settings.video_framerate = v;
        }
        if let Some(v) = self.segment_ms {
            settings.segment_ms = v;
        }
        if let Some(v) = self.preview_width {
            settings.preview_width = v;
        }
        if let Some(v) = self.preview_height {
            settings.preview_height = v;
        }
        if let Some(v) = self.preview_framerate {
            settings.preview_framerate = v;
        }
        if let Some(v) = self.max_record_secs {
            settings.max_record_secs = v;
        }
        if let Some(v) = self.stop_timeout_ms {
            settings.stop_timeout_ms = v;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlRecordingConfig {
    pub start_policy: Option<StartPolicy>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub server: Option<TomlServerConfig>,
    pub storage: Option<TomlStorageConfig>,
    pub camera: Option<TomlCameraConfig>,
    pub recording: Option<TomlRecordingConfig>,
    /// Tool path configuration
    pub tools: Option<ToolPaths>,
}

impl Config {
    /// Load configuration from file, merging with defaults
    pub fn load() -> Self {
        let config_file = config_path();

        // Create example config on first run
        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        Self::load_from(&config_file)
    }

    /// Load configuration from a specific file. Missing or unparsable files
    /// yield the defaults.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Config::default();

        if !path.exists() {
            return config;
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file");
                return config;
            }
        };

        match toml::from_str::<TomlConfig>(&contents) {
            Ok(toml_config) => config.merge(toml_config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid config file");
            }
        }

        config
    }

    fn merge(&mut self, toml_config: TomlConfig) {
        if let Some(server) = toml_config.server {
            if let Some(host) = server.host {
                self.server.host = host;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(dir) = toml_config.storage.and_then(|s| s.recordings_dir) {
            self.recordings_dir = expand_home(dir);
        }

        if let Some(camera) = toml_config.camera {
            camera.apply(&mut self.camera);
        }

        if let Some(policy) = toml_config.recording.and_then(|r| r.start_policy) {
            self.start_policy = policy;
        }

        if let Some(tools) = toml_config.tools {
            self.tool_paths = tools;
        }
    }

    /// Create the default config file from the bundled example
    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::warn!(error = %e, "Failed to create config directory");
                    return;
                }
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }

    pub fn with_recordings_dir(mut self, dir: PathBuf) -> Self {
        self.recordings_dir = dir;
        self
    }

    pub fn with_start_policy(mut self, policy: StartPolicy) -> Self {
        self.start_policy = policy;
        self
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: PathBuf) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or(path),
        Err(_) => path,
    }
}

/// Save a tool path to the config file
///
/// This function reads the existing config.toml, adds or updates the tool path
/// in the [tools] section, and writes it back while preserving all other content.
pub fn save_tool_path(tool: Tool, path: &Path) -> std::io::Result<()> {
    save_tool_path_to(&config_path(), tool, path)
}

pub(crate) fn save_tool_path_to(config_file: &Path, tool: Tool, path: &Path) -> std::io::Result<()> {
    let contents = if config_file.exists() {
        fs::read_to_string(config_file)?
    } else {
        String::new()
    };

    let mut doc: DocumentMut = contents
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    if !doc.contains_key("tools") {
        doc["tools"] = Item::Table(Table::new());
    }

    let path_str = path.to_string_lossy().to_string();
    doc["tools"][tool.binary_name()] = toml_edit::value(path_str);

    if let Some(parent) = config_file.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(config_file, doc.to_string())?;

    Ok(())
}
