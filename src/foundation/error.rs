/// Convenience result type used across the crate.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Error type for overlay runs.
///
/// Degraded per-frame detections (rotation heuristics, hip anchors) are not errors: they fall
/// back to a safe default and are logged instead.
#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    /// A required input (landmark document, source video) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An input exists but could not be parsed.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// The decoder or encoder could not be opened or failed mid-stream.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Invalid configuration or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// A frame could not be rasterized.
    #[error("render error: {0}")]
    Render(String),

    /// Any other error, usually IO with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayError {
    /// Build a [`OverlayError::NotFound`].
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`OverlayError::Malformed`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Build a [`OverlayError::ResourceUnavailable`].
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    /// Build a [`OverlayError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`OverlayError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
