use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::foundation::error::{OverlayError, OverlayResult};
use crate::pose::document::PoseDocument;

/// Handle that supplies landmark documents to the pipeline.
///
/// Implementations are constructed by the caller and passed in explicitly; the pipeline never
/// reaches for a process-wide detector or store.
pub trait LandmarkSource: Send + Sync {
    /// Load the document for `analysis_id`.
    fn load(&self, analysis_id: &str) -> OverlayResult<PoseDocument>;
}

/// Reads `pose_data_{analysis_id}.json` documents from a directory.
#[derive(Clone, Debug)]
pub struct JsonLandmarkStore {
    dir: PathBuf,
}

impl JsonLandmarkStore {
    /// Store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Document path for `analysis_id`.
    pub fn document_path(&self, analysis_id: &str) -> PathBuf {
        document_path(&self.dir, analysis_id)
    }
}

/// `pose_data_{analysis_id}.json` under `dir`.
pub fn document_path(dir: &Path, analysis_id: &str) -> PathBuf {
    dir.join(format!("pose_data_{analysis_id}.json"))
}

impl LandmarkSource for JsonLandmarkStore {
    fn load(&self, analysis_id: &str) -> OverlayResult<PoseDocument> {
        let path = self.document_path(analysis_id);
        let doc = PoseDocument::from_path(&path)?;
        tracing::info!(
            analysis_id,
            frames = doc.frames.len(),
            "loaded pose data from {}",
            path.display()
        );
        Ok(doc)
    }
}

/// Documents held in memory, keyed by analysis id.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLandmarkSource {
    docs: HashMap<String, PoseDocument>,
}

impl InMemoryLandmarkSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document.
    pub fn insert(&mut self, analysis_id: impl Into<String>, doc: PoseDocument) {
        self.docs.insert(analysis_id.into(), doc);
    }
}

impl LandmarkSource for InMemoryLandmarkSource {
    fn load(&self, analysis_id: &str) -> OverlayResult<PoseDocument> {
        self.docs.get(analysis_id).cloned().ok_or_else(|| {
            OverlayError::not_found(format!("no pose data for analysis {analysis_id}"))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/source.rs"]
mod tests;
