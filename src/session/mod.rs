//! Overlay runs: configuration, file conventions, the compositor pass, previews and
//! background jobs.

/// The frame-sync compositor.
pub mod compositor;
/// Run options.
pub mod config;
/// Background overlay jobs.
pub mod job;
/// Analysis file naming.
pub mod locate;
/// Sample-frame previews.
pub mod preview;
