//! Orchestration of a narrated-video run.
//!
//! `generate` walks [`Stage`]s in order: load text, prepare audio, render one segment per image,
//! merge, mux, clean up. `merge_videos` exposes the concat step on its own.

/// Single-run orchestrator.
pub mod generate;
/// Standalone lossless concatenation.
pub mod merge;
/// Stage enum and progress tracking.
pub mod stage;
/// Workspace layout and artifact ownership.
pub mod workspace;

pub use generate::{GenerateReport, GenerateRequest, Pipeline, per_image_duration};
pub use merge::merge_videos;
pub use stage::Stage;
pub use workspace::{AudioArtifact, AudioOrigin, Ownership, Workspace};
