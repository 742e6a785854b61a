//! Caller-facing session over a runtime and its render pipeline.

pub mod player;
pub mod preview;

pub use player::Player;
pub use preview::{BatchSummary, PreviewOpts, PreviewOutput, preview_batch};
