use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use crate::camera::naming::{PHOTO_EXT, PLAYBACK_VIDEO_EXT};

#[derive(Debug, Error)]
pub enum MediaError {
    /// Missing, not a plain file, or outside the recordings directory.
    /// Traversal attempts deliberately look the same as missing files.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Kind for a listed file, None for extensions the gallery ignores
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(PHOTO_EXT) => Some(MediaKind::Photo),
            Some(PLAYBACK_VIDEO_EXT) => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// One gallery entry
#[derive(Debug, Clone, Serialize)]
pub struct MediaEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Human readable size, e.g. `"3.2MB"` or `"640KB"`
    pub size: String,
    /// Local modification time, `YYYY-MM-DD HH:MM`
    pub date: String,
}

/// The recordings directory. The directory listing is the only record of
/// what has been captured.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    dir: PathBuf,
}

impl MediaLibrary {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Create the recordings directory if needed
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Photos and videos, newest first
    pub fn list(&self) -> Result<Vec<MediaEntry>, MediaError> {
        let mut found: Vec<(SystemTime, MediaEntry)> = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            let Some(kind) = MediaKind::from_path(&path) else {
                continue;
            };
            // Files can vanish between read_dir and stat (concurrent delete)
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

            found.push((
                modified,
                MediaEntry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    kind,
                    size: format_size(metadata.len()),
                    date: format_date(modified),
                },
            ));
        }

        found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.name.cmp(&a.1.name)));
        Ok(found.into_iter().map(|(_, entry)| entry).collect())
    }

    /// Map a client supplied name to a file directly inside the recordings
    /// directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, MediaError> {
        let not_found = || MediaError::NotFound(name.to_string());

        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(not_found());
        }
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(not_found()),
        }

        let dir = self.dir.canonicalize().map_err(|_| not_found())?;
        let path = dir.join(name).canonicalize().map_err(|_| not_found())?;

        // canonicalize follows symlinks, so a link pointing elsewhere fails here
        if path.parent() != Some(dir.as_path()) || !path.is_file() {
            return Err(not_found());
        }

        Ok(path)
    }

    /// Remove a file from the recordings directory
    pub fn delete(&self, name: &str) -> Result<(), MediaError> {
        let path = self.resolve(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Deleted media file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MediaError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// `"{:.1}MB"` above one MiB, `"{:.0}KB"` otherwise
pub fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes > MIB {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else {
        format!("{:.0}KB", bytes as f64 / 1024.0)
    }
}

pub fn format_date(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
