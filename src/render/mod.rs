//! Frame assembly: rasterization, compositing and post-processing of a draw pass.

pub mod composite;
pub mod config;
pub(crate) mod cpu;
pub mod frame;
pub mod pipeline;

pub use config::{Config, RenderLevel};
pub use frame::{FrameRGBA, RenderFrame, RenderStats};
pub use pipeline::{RENDER_FAIL_RESOURCE, RenderPipeline};
