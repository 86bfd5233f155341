use std::path::{Path, PathBuf};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::pose::source::{JsonLandmarkStore, document_path};

const MODERN_EXTENSIONS: [&str; 3] = ["mov", "MOV", "mp4"];
const LEGACY_EXTENSIONS: [&str; 4] = ["mov", "MOV", "mp4", "avi"];

/// First eight characters of an analysis id, used in file names.
pub fn id8(analysis_id: &str) -> &str {
    match analysis_id.char_indices().nth(8) {
        Some((end, _)) => &analysis_id[..end],
        None => analysis_id,
    }
}

/// Reject ids that could escape the storage directories.
pub fn validate_analysis_id(analysis_id: &str) -> OverlayResult<()> {
    if analysis_id.is_empty()
        || analysis_id.contains(['/', '\\'])
        || analysis_id.contains("..")
        || analysis_id.chars().any(char::is_control)
    {
        return Err(OverlayError::validation(format!(
            "invalid analysis id '{analysis_id}'"
        )));
    }
    Ok(())
}

/// Upload and output directories of an installation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisPaths {
    /// Where uploaded source videos live.
    pub uploads_dir: PathBuf,
    /// Where landmark documents, overlays and previews live.
    pub outputs_dir: PathBuf,
}

impl AnalysisPaths {
    /// Paths rooted at the given directories.
    pub fn new(uploads_dir: impl Into<PathBuf>, outputs_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            outputs_dir: outputs_dir.into(),
        }
    }

    /// Locate the uploaded video for `analysis_id`.
    ///
    /// Tries `{name}_{id8}.{ext}` (or the full id in place of `id8`) first, then the legacy
    /// `{analysis_id}.{ext}`.
    pub fn find_source_video(&self, analysis_id: &str) -> OverlayResult<PathBuf> {
        validate_analysis_id(analysis_id)?;

        let mut suffixes = Vec::new();
        for key in [id8(analysis_id), analysis_id] {
            for ext in MODERN_EXTENSIONS {
                let suffix = format!("_{key}.{ext}");
                if !suffixes.contains(&suffix) {
                    suffixes.push(suffix);
                }
            }
        }

        let mut names: Vec<PathBuf> = match std::fs::read_dir(&self.uploads_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect(),
            Err(e) => {
                tracing::debug!(
                    "cannot list uploads directory '{}': {e}",
                    self.uploads_dir.display()
                );
                Vec::new()
            }
        };
        names.sort();

        for path in &names {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if suffixes.iter().any(|s| name.ends_with(s.as_str())) {
                tracing::info!("found video file: {}", path.display());
                return Ok(path.clone());
            }
        }

        for ext in LEGACY_EXTENSIONS {
            let path = self.uploads_dir.join(format!("{analysis_id}.{ext}"));
            if path.is_file() {
                tracing::info!("found video file (legacy name): {}", path.display());
                return Ok(path);
            }
        }

        Err(OverlayError::not_found(format!(
            "no video file for analysis {analysis_id} in '{}'",
            self.uploads_dir.display()
        )))
    }

    /// `overlay_{source_stem}_{id8}.mp4` in the outputs directory.
    pub fn output_path(&self, analysis_id: &str, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_owned());
        self.outputs_dir
            .join(format!("overlay_{stem}_{}.mp4", id8(analysis_id)))
    }

    /// `overlay_preview_{frame}_{id8}.png` in the outputs directory.
    pub fn preview_path(&self, analysis_id: &str, frame: FrameIndex) -> PathBuf {
        self.outputs_dir
            .join(format!("overlay_preview_{}_{}.png", frame.0, id8(analysis_id)))
    }

    /// Landmark document path for `analysis_id`.
    pub fn document_path(&self, analysis_id: &str) -> PathBuf {
        document_path(&self.outputs_dir, analysis_id)
    }

    /// JSON landmark store over the outputs directory.
    pub fn landmark_store(&self) -> JsonLandmarkStore {
        JsonLandmarkStore::new(&self.outputs_dir)
    }
}

impl Default for AnalysisPaths {
    fn default() -> Self {
        Self::new("static/uploads", "static/outputs")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/locate.rs"]
mod tests;
