//! Zepp Player emulates a ZeppOS-style wearable app environment on a host.
//!
//! A packaged app bundle is loaded into a sandboxed [`Runtime`] that exposes the device's
//! drawing, storage, timer and input APIs to the app's script pages. Each render pass replays the
//! app's draw hook into an ordered op log that the [`RenderPipeline`] composites into a frame
//! matching the selected [`DeviceProfile`] (resolution, shape mask, rotation).
//!
//! - Load a [`Project`] (directory or in-memory [`ProjectBundle`])
//! - Drive it through a [`Player`], or wire a [`Runtime`] and [`RenderPipeline`] yourself
//! - Read premultiplied pixels from each [`RenderFrame`]
#![forbid(unsafe_code)]

mod foundation;
mod script;

/// Resource decoding and the shared decode cache.
pub mod assets;
/// Static device profiles.
pub mod device;
/// App bundles and manifests.
pub mod project;
/// Frame assembly.
pub mod render;
/// Sandboxed app runtime and device API.
pub mod runtime;
/// Caller-facing player session and batch previews.
pub mod session;
/// Emulated on-device storage.
pub mod storage;

pub use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Rotation, ScreenSize, Vec2};
pub use crate::foundation::error::{PlayerError, PlayerResult};

pub use crate::assets::AssetResolver;
pub use crate::device::{DeviceProfile, ScreenShape};
pub use crate::project::{Manifest, Project, ProjectBundle};
pub use crate::render::{
    Config, FrameRGBA, RenderFrame, RenderLevel, RenderPipeline, RenderStats,
};
pub use crate::runtime::{DrawOp, EventZone, PointerPhase, Runtime};
pub use crate::script::{SandboxLimits, Value};
pub use crate::session::{Player, PreviewOpts, PreviewOutput, preview_batch};
pub use crate::storage::PersistentStorage;
