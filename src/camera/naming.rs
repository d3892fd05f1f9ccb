//! File names for captured media.
//!
//! Every name embeds the local capture time so that the recordings
//! directory listing alone tells photos, clips and segments apart.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Still images
pub const PHOTO_EXT: &str = "jpg";
/// H.264 elementary stream written by the capture tool
pub const RAW_VIDEO_EXT: &str = "h264";
/// Container produced by conversion
pub const PLAYBACK_VIDEO_EXT: &str = "mp4";

pub fn timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// `photo_<ts>`; the capture adds the extension and any collision suffix.
pub fn photo_stem(at: &DateTime<Local>) -> String {
    format!("photo_{}", timestamp(at))
}

/// `video_<ts>`
pub fn video_stem(at: &DateTime<Local>) -> String {
    format!("video_{}", timestamp(at))
}

/// `video_<ts>_%04d.h264`; the capture tool substitutes the segment number.
pub fn segment_pattern(at: &DateTime<Local>) -> String {
    format!("video_{}_%04d.{}", timestamp(at), RAW_VIDEO_EXT)
}

/// Playback file that a raw recording converts into.
pub fn playback_path_for(raw: &Path) -> PathBuf {
    raw.with_extension(PLAYBACK_VIDEO_EXT)
}

pub fn is_raw_video(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(RAW_VIDEO_EXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap()
    }

    #[test]
    fn test_names_embed_timestamp() {
        assert_eq!(photo_stem(&at()), "photo_20240309_070502");
        assert_eq!(video_stem(&at()), "video_20240309_070502");
        assert_eq!(segment_pattern(&at()), "video_20240309_070502_%04d.h264");
    }

    #[test]
    fn test_playback_path_swaps_extension() {
        let raw = Path::new("/rec/video_20240309_070502_0003.h264");
        assert_eq!(
            playback_path_for(raw),
            PathBuf::from("/rec/video_20240309_070502_0003.mp4")
        );
        assert!(is_raw_video(raw));
        assert!(!is_raw_video(&playback_path_for(raw)));
    }
}
