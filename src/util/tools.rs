//! Tool availability detection and management
//!
//! This module provides functionality to detect and track the availability
//! of the external imaging tools camweb shells out to (rpicam-still,
//! rpicam-vid, ffmpeg).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// External tools that camweb depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Still image capture
    RpicamStill,
    /// Video capture (timed, segmented and MJPEG preview)
    RpicamVid,
    /// Transcoder used to remux raw H.264 into MP4
    Ffmpeg,
}

impl Tool {
    /// Get the binary name for this tool
    pub fn binary_name(&self) -> &'static str {
        match self {
            Tool::RpicamStill => "rpicam-still",
            Tool::RpicamVid => "rpicam-vid",
            Tool::Ffmpeg => "ffmpeg",
        }
    }

    /// Get the display name for this tool
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::RpicamStill => "rpicam-still",
            Tool::RpicamVid => "rpicam-vid",
            Tool::Ffmpeg => "FFmpeg",
        }
    }

    /// Get a description of what this tool is used for
    pub fn description(&self) -> &'static str {
        match self {
            Tool::RpicamStill => "Captures photos from the camera.",
            Tool::RpicamVid => "Records video and feeds the live preview.",
            Tool::Ffmpeg => "Converts recorded H.264 streams into playable MP4 files.",
        }
    }

    /// Parse a tool from its binary name (as used in config.toml)
    pub fn from_binary_name(name: &str) -> Option<Self> {
        Tool::all()
            .iter()
            .copied()
            .find(|tool| tool.binary_name() == name)
    }

    /// Get all tools
    pub fn all() -> &'static [Tool] {
        &[Tool::RpicamStill, Tool::RpicamVid, Tool::Ffmpeg]
    }
}

/// Status of a tool's availability
#[derive(Debug, Clone, Default)]
pub enum ToolStatus {
    /// Tool is available at the given path
    Available(PathBuf),
    /// Tool was not found in PATH or configured location
    #[default]
    NotFound,
    /// A path was configured in config.toml but it's invalid
    ConfiguredPathInvalid(PathBuf),
}

impl ToolStatus {
    /// Check if the tool is available
    pub fn is_available(&self) -> bool {
        matches!(self, ToolStatus::Available(_))
    }

    /// Get the path if available
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ToolStatus::Available(p) => Some(p),
            _ => None,
        }
    }
}

/// Configuration for tool paths from config.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolPaths {
    #[serde(rename = "rpicam-still")]
    pub rpicam_still: Option<PathBuf>,
    #[serde(rename = "rpicam-vid")]
    pub rpicam_vid: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
}

impl ToolPaths {
    /// Get the configured path for a tool
    pub fn get(&self, tool: Tool) -> Option<&PathBuf> {
        match tool {
            Tool::RpicamStill => self.rpicam_still.as_ref(),
            Tool::RpicamVid => self.rpicam_vid.as_ref(),
            Tool::Ffmpeg => self.ffmpeg.as_ref(),
        }
    }

    /// Set the path for a tool
    pub fn set(&mut self, tool: Tool, path: PathBuf) {
        match tool {
            Tool::RpicamStill => self.rpicam_still = Some(path),
            Tool::RpicamVid => self.rpicam_vid = Some(path),
            Tool::Ffmpeg => self.ffmpeg = Some(path),
        }
    }
}

/// Tracks the availability of all tools
#[derive(Debug, Clone, Default)]
pub struct ToolAvailability {
    rpicam_still: ToolStatus,
    rpicam_vid: ToolStatus,
    ffmpeg: ToolStatus,
}

impl ToolAvailability {
    /// Detect availability of all tools
    ///
    /// For each tool:
    /// 1. Check if a path is configured in config.toml
    /// 2. If configured, validate that path exists and is executable
    /// 3. If not configured, use `which` to find it in PATH
    pub fn detect(configured_paths: &ToolPaths) -> Self {
        Self {
            rpicam_still: Self::detect_tool(
                Tool::RpicamStill,
                configured_paths.rpicam_still.as_ref(),
            ),
            rpicam_vid: Self::detect_tool(Tool::RpicamVid, configured_paths.rpicam_vid.as_ref()),
            ffmpeg: Self::detect_tool(Tool::Ffmpeg, configured_paths.ffmpeg.as_ref()),
        }
    }

    fn detect_tool(tool: Tool, configured_path: Option<&PathBuf>) -> ToolStatus {
        if let Some(path) = configured_path {
            if Self::is_valid_executable(path) {
                return ToolStatus::Available(path.clone());
            } else {
                return ToolStatus::ConfiguredPathInvalid(path.clone());
            }
        }

        match which::which(tool.binary_name()) {
            Ok(path) => ToolStatus::Available(path),
            Err(_) => ToolStatus::NotFound,
        }
    }

    /// Check if a path points to a valid executable
    fn is_valid_executable(path: &Path) -> bool {
        if !path.exists() {
            return false;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(metadata) = path.metadata() {
                let permissions = metadata.permissions();
                return permissions.mode() & 0o111 != 0;
            }
            false
        }

        #[cfg(not(unix))]
        {
            path.is_file()
        }
    }

    /// Get the status for a specific tool
    pub fn status(&self, tool: Tool) -> &ToolStatus {
        match tool {
            Tool::RpicamStill => &self.rpicam_still,
            Tool::RpicamVid => &self.rpicam_vid,
            Tool::Ffmpeg => &self.ffmpeg,
        }
    }

    /// Check if a tool is available
    pub fn is_available(&self, tool: Tool) -> bool {
        self.status(tool).is_available()
    }

    /// Get the path to a tool if available
    pub fn get_path(&self, tool: Tool) -> Option<&PathBuf> {
        self.status(tool).path()
    }

    /// Path to invoke for a tool: the resolved path, or the bare binary name
    /// so a late install on PATH still works.
    pub fn command_path(&self, tool: Tool) -> PathBuf {
        self.get_path(tool)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(tool.binary_name()))
    }

    /// Get list of missing tools
    pub fn missing_tools(&self) -> Vec<Tool> {
        Tool::all()
            .iter()
            .filter(|&&tool| !self.is_available(tool))
            .copied()
            .collect()
    }

    /// Validate a path for a tool without updating state
    ///
    /// Returns Ok(canonical_path) if valid, Err(message) if invalid
    pub fn validate_path(path: &str) -> Result<PathBuf, String> {
        let path = PathBuf::from(path);

        if path.as_os_str().is_empty() {
            return Err("Path cannot be empty".to_string());
        }

        if !path.exists() {
            return Err(format!("File not found: {}", path.display()));
        }

        if !path.is_file() {
            return Err(format!("Not a file: {}", path.display()));
        }

        if !Self::is_valid_executable(&path) {
            return Err(format!("File is not executable: {}", path.display()));
        }

        path.canonicalize()
            .map_err(|e| format!("Failed to resolve path: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_binary_names() {
        assert_eq!(Tool::RpicamStill.binary_name(), "rpicam-still");
        assert_eq!(Tool::RpicamVid.binary_name(), "rpicam-vid");
        assert_eq!(Tool::Ffmpeg.binary_name(), "ffmpeg");
    }

    #[test]
    fn test_from_binary_name() {
        assert_eq!(Tool::from_binary_name("rpicam-vid"), Some(Tool::RpicamVid));
        assert_eq!(Tool::from_binary_name("ffmpeg"), Some(Tool::Ffmpeg));
        assert_eq!(Tool::from_binary_name("raspistill"), None);
    }

    #[test]
    fn test_tool_status_is_available() {
        assert!(ToolStatus::Available(PathBuf::from("/bin/test")).is_available());
        assert!(!ToolStatus::NotFound.is_available());
        assert!(!ToolStatus::ConfiguredPathInvalid(PathBuf::from("/bad")).is_available());
    }

    #[test]
    fn test_configured_invalid_path_is_reported() {
        let mut paths = ToolPaths::default();
        paths.set(Tool::Ffmpeg, PathBuf::from("/definitely/not/here/ffmpeg"));
        let tools = ToolAvailability::detect(&paths);

        assert!(matches!(
            tools.status(Tool::Ffmpeg),
            ToolStatus::ConfiguredPathInvalid(_)
        ));
        assert!(tools.missing_tools().contains(&Tool::Ffmpeg));
    }

    #[test]
    fn test_command_path_falls_back_to_binary_name() {
        let tools = ToolAvailability::default();
        assert_eq!(
            tools.command_path(Tool::RpicamStill),
            PathBuf::from("rpicam-still")
        );
    }

    #[test]
    fn test_validate_path_rejects_empty_and_missing() {
        assert!(ToolAvailability::validate_path("").is_err());
        assert!(ToolAvailability::validate_path("/definitely/not/here").is_err());
    }

    #[test]
    fn test_tool_paths_toml_keys() {
        let paths: ToolPaths = toml::from_str(
            r#"
"rpicam-still" = "/opt/cam/rpicam-still"
ffmpeg = "/usr/local/bin/ffmpeg"
"#,
        )
        .unwrap();
        assert_eq!(
            paths.get(Tool::RpicamStill),
            Some(&PathBuf::from("/opt/cam/rpicam-still"))
        );
        assert_eq!(paths.get(Tool::RpicamVid), None);
        assert_eq!(
            paths.get(Tool::Ffmpeg),
            Some(&PathBuf::from("/usr/local/bin/ffmpeg"))
        );
    }
}
