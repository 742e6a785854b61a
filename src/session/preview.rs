use std::path::Path;

use crate::device::DeviceProfile;
use crate::foundation::error::PlayerResult;
use crate::render::{FrameRGBA, RenderLevel};
use crate::session::Player;

/// Frame rate of the animated preview.
pub const PREVIEW_FPS: u32 = 15;
/// Length of each half (normal, then AOD) of the animated preview.
pub const PREVIEW_SECONDS: u32 = 4;

/// Options for [`Player::preview`] and [`preview_batch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewOpts {
    /// Device profile name for [`preview_batch`].
    pub profile: String,
    /// Capture one cumulative snapshot per draw op of the still preview.
    pub stages: bool,
    /// Animated frames to render after the still; the second half runs at the AOD level.
    pub frames: usize,
}

impl Default for PreviewOpts {
    fn default() -> Self {
        Self {
            profile: DeviceProfile::DEFAULT_NAME.to_owned(),
            stages: false,
            frames: 0,
        }
    }
}

impl PreviewOpts {
    /// Frame count of the full animated preview: both halves at [`PREVIEW_FPS`].
    pub const ANIMATED_FRAMES: usize = (PREVIEW_FPS * PREVIEW_SECONDS * 2) as usize;

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn with_stages(mut self, on: bool) -> Self {
        self.stages = on;
        self
    }

    pub fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }
}

/// Pixels produced for one project.
#[derive(Clone, Debug)]
pub struct PreviewOutput {
    pub preview: FrameRGBA,
    /// Per-op snapshots of the still, when requested.
    pub stages: Vec<FrameRGBA>,
    pub frames: Vec<FrameRGBA>,
}

/// Outcome counters of [`preview_batch`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

impl Player {
    /// Render the still preview and, if requested, the animated frames.
    ///
    /// Every animated frame is followed by a shift. The caller's [`Config`](crate::Config) is
    /// restored afterwards.
    #[tracing::instrument(skip_all, fields(stages = opts.stages, frames = opts.frames))]
    pub fn preview(&mut self, opts: &PreviewOpts) -> PlayerResult<PreviewOutput> {
        let saved = self.config().clone();
        let out = self.preview_inner(opts, &saved);
        self.set_config(saved);
        out
    }

    fn preview_inner(
        &mut self,
        opts: &PreviewOpts,
        base: &crate::render::Config,
    ) -> PlayerResult<PreviewOutput> {
        let still_level = if opts.stages {
            RenderLevel::Staged
        } else {
            base.render_level
        };
        self.config_mut().render_level = still_level;
        let still = self.render()?;

        let mut frames = Vec::with_capacity(opts.frames);
        self.config_mut().render_level = base.render_level;
        for i in 0..opts.frames {
            if i == opts.frames / 2 && opts.frames > 1 {
                self.config_mut().render_level = RenderLevel::Aod;
            }
            frames.push(self.render()?.image);
            self.shift()?;
        }

        Ok(PreviewOutput {
            preview: still.image,
            stages: still.stages,
            frames,
        })
    }
}

/// Preview every project directory in turn, handing results to `sink`.
///
/// A project that fails to load, init, render or sink is counted and skipped.
pub fn preview_batch<P: AsRef<Path>>(
    projects: &[P],
    opts: &PreviewOpts,
    mut sink: impl FnMut(&Path, &PreviewOutput) -> PlayerResult<()>,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for root in projects {
        let root = root.as_ref();
        tracing::info!(project = %root.display(), "processing");
        match preview_one(root, opts, &mut sink) {
            Ok(()) => summary.processed += 1,
            Err(e) => {
                tracing::error!(project = %root.display(), error = %e, "preview failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

fn preview_one(
    root: &Path,
    opts: &PreviewOpts,
    sink: &mut impl FnMut(&Path, &PreviewOutput) -> PlayerResult<()>,
) -> PlayerResult<()> {
    let mut player = Player::new(&opts.profile)?;
    player.load_dir(root)?;
    player.init()?;
    let out = player.preview(opts)?;
    player.dispose();
    sink(root, &out)
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
