use std::sync::Arc;
use std::thread::JoinHandle;

use crate::foundation::error::{OverlayError, OverlayResult};
use crate::pose::source::LandmarkSource;
use crate::session::compositor::{OverlayReport, render_overlay_video};
use crate::session::config::OverlayOpts;
use crate::session::locate::AnalysisPaths;

/// An overlay run executing on its own thread.
///
/// There is no way to cancel a job once started; dropping the handle detaches it.
#[derive(Debug)]
pub struct OverlayJob {
    analysis_id: String,
    handle: JoinHandle<OverlayResult<OverlayReport>>,
}

impl OverlayJob {
    /// Start [`render_overlay_video`] for `analysis_id` on a thread named
    /// `overlay-{id8}`.
    pub fn spawn(
        analysis_id: impl Into<String>,
        paths: AnalysisPaths,
        landmarks: Arc<dyn LandmarkSource>,
        opts: OverlayOpts,
    ) -> OverlayResult<Self> {
        let analysis_id = analysis_id.into();
        let id = analysis_id.clone();
        let name = format!("overlay-{}", crate::session::locate::id8(&analysis_id));
        let handle = std::thread::Builder::new()
            .name(name)
            .spawn(move || render_overlay_video(&id, &paths, landmarks.as_ref(), &opts))
            .map_err(|e| OverlayError::resource(format!("failed to spawn overlay thread: {e}")))?;
        tracing::debug!(analysis_id = %analysis_id, "overlay job started");
        Ok(Self {
            analysis_id,
            handle,
        })
    }

    /// Analysis this job renders.
    pub fn analysis_id(&self) -> &str {
        &self.analysis_id
    }

    /// Return `true` once the run has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the run finishes.
    pub fn join(self) -> OverlayResult<OverlayReport> {
        self.handle.join().map_err(|_| {
            OverlayError::render(format!("overlay job for {} panicked", self.analysis_id))
        })?
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/job.rs"]
mod tests;
