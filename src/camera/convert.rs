//! Conversion of raw recordings into playable files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::camera::error::CameraError;
use crate::camera::naming;
use crate::camera::runner::CameraRunner;

/// Files a one-shot capture is still writing.
///
/// Holding a [`CaptureClaim`] keeps the file out of [`convert_pending`] and
/// its name out of [`InFlightCaptures::claim_unique`]. Claims on the same
/// path are counted; the path stays claimed until the last one drops.
#[derive(Debug, Clone, Default)]
pub struct InFlightCaptures {
    paths: Arc<Mutex<HashMap<PathBuf, usize>>>,
}

impl InFlightCaptures {
    #[cfg(test)]
    fn claim(&self, path: PathBuf) -> CaptureClaim {
        let mut paths = self.paths.lock();
        self.claim_locked(&mut paths, path)
    }

    fn claim_locked(&self, paths: &mut HashMap<PathBuf, usize>, path: PathBuf) -> CaptureClaim {
        *paths.entry(path.clone()).or_default() += 1;
        CaptureClaim {
            registry: self.clone(),
            path,
        }
    }

    /// Claim `<dir>/<stem>.<exts[0]>`, or `<stem>_1`, `<stem>_2`... when
    /// that name is taken.
    ///
    /// A candidate is taken if any of its `exts` variants exists on disk or
    /// is claimed. Checking and claiming happen under one lock, so
    /// concurrent captures never pick the same name.
    pub fn claim_unique(&self, dir: &Path, stem: &str, exts: &[&str]) -> CaptureClaim {
        let primary = exts.first().copied().unwrap_or_default();
        let mut paths = self.paths.lock();

        let mut n = 0usize;
        let path = loop {
            let candidate = if n == 0 {
                stem.to_string()
            } else {
                format!("{stem}_{n}")
            };
            let taken = exts.iter().any(|ext| {
                let variant = dir.join(format!("{candidate}.{ext}"));
                paths.contains_key(&variant) || variant.exists()
            });
            if !taken {
                break dir.join(format!("{candidate}.{primary}"));
            }
            n += 1;
        };

        self.claim_locked(&mut paths, path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.lock().contains_key(path)
    }
}

/// Released on drop
#[derive(Debug)]
pub struct CaptureClaim {
    registry: InFlightCaptures,
    path: PathBuf,
}

impl CaptureClaim {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CaptureClaim {
    fn drop(&mut self) {
        let mut paths = self.registry.paths.lock();
        if let Some(count) = paths.get_mut(&self.path) {
            *count -= 1;
            if *count == 0 {
                paths.remove(&self.path);
            }
        }
    }
}

/// Outcome of converting every pending raw file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// Names of the playback files produced
    pub converted: Vec<String>,
    /// Raw files that could not be converted (left in place)
    pub failed: usize,
}

/// Raw video files directly inside `dir`, sorted by name.
pub fn pending_raw_segments(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut raws: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| naming::is_raw_video(path))
        .collect();
    raws.sort();
    Ok(raws)
}

/// Convert one raw file, deleting it once the playback file exists.
///
/// Returns the playback path. On failure the raw file is kept and any
/// partial output is removed.
pub async fn convert_to_playback(
    runner: &dyn CameraRunner,
    raw: &Path,
) -> Result<PathBuf, CameraError> {
    let output = naming::playback_path_for(raw);

    if let Err(e) = runner.convert(raw, &output).await {
        if output.exists() {
            let _ = tokio::fs::remove_file(&output).await;
        }
        return Err(e);
    }

    if !output.exists() {
        return Err(CameraError::OutputMissing(output));
    }

    if let Err(e) = tokio::fs::remove_file(raw).await {
        tracing::warn!(path = %raw.display(), error = %e, "Failed to remove converted raw file");
    }

    Ok(output)
}

/// Convert every raw file in `dir` that no timed recording is still writing.
///
/// Per-file failures are logged and counted, never returned.
pub async fn convert_pending(
    runner: &dyn CameraRunner,
    dir: &Path,
    in_flight: &InFlightCaptures,
) -> ConversionReport {
    let mut report = ConversionReport::default();

    let raws = match pending_raw_segments(dir) {
        Ok(raws) => raws,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Failed to scan for raw recordings");
            return report;
        }
    };

    for raw in raws.into_iter().filter(|raw| !in_flight.contains(raw)) {
        match convert_to_playback(runner, &raw).await {
            Ok(output) => {
                tracing::info!(raw = %raw.display(), output = %output.display(), "Converted recording");
                if let Some(name) = output.file_name() {
                    report.converted.push(name.to_string_lossy().into_owned());
                }
            }
            Err(e) => {
                tracing::warn!(raw = %raw.display(), error = %e, "Failed to convert recording");
                report.failed += 1;
            }
        }
    }

    report
}
