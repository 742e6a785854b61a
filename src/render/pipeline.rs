use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::core::ScreenSize;
use crate::foundation::error::{PlayerError, PlayerResult};
use crate::render::composite::{
    PremulRgba8, apply_shape_mask, over_in_place, rotate, scroll_rows,
};
use crate::render::config::{Config, RenderLevel};
use crate::render::cpu::{CpuRasterizer, ResolvedAssets, pixmap_dims};
use crate::render::frame::{FrameRGBA, RenderFrame, RenderStats};
use crate::runtime::Runtime;

/// System resource substituted for a frame whose render failed.
pub const RENDER_FAIL_RESOURCE: &str = "render_fail.png";

/// Turns one draw pass of a [`Runtime`] into pixels.
///
/// Pipeline:
/// 1. optional auto-increment `shift`, then `tick`
/// 2. draw hook (ops and zones rebuilt from scratch)
/// 3. parallel asset resolution; failures degrade the op to a placeholder
/// 4. per-op compositing, with a cumulative snapshot per op at [`RenderLevel::Staged`]
/// 5. shape mask, zone outlines, device overlay
/// 6. scroll then rotation, applied to the frame and every snapshot
///
/// Returned frames hold **premultiplied** RGBA8 pixels.
pub struct RenderPipeline {
    raster: CpuRasterizer,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("threads", &self.pool.as_ref().map(|p| p.current_num_threads()))
            .finish_non_exhaustive()
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPipeline {
    /// Pipeline resolving assets on rayon's global pool.
    pub fn new() -> Self {
        Self {
            raster: CpuRasterizer::new(),
            pool: None,
        }
    }

    /// Pipeline resolving assets on a dedicated pool of `threads` workers.
    pub fn with_threads(threads: usize) -> PlayerResult<Self> {
        Ok(Self {
            raster: CpuRasterizer::new(),
            pool: Some(build_thread_pool(threads)?),
        })
    }

    #[tracing::instrument(skip_all, fields(level = config.render_level.as_u8()))]
    pub fn render(&mut self, runtime: &mut Runtime, config: &Config) -> PlayerResult<RenderFrame> {
        if config.with_auto_increment {
            runtime.shift().map_err(draw_failed)?;
        }
        let timers_fired = runtime.tick(runtime.now()).map_err(draw_failed)?;
        runtime
            .draw_pass(config.render_level, config.rotation)
            .map_err(draw_failed)?;

        let profile = *runtime.profile();
        let size = profile.screen;

        let mut refs: BTreeSet<String> = runtime
            .draw_ops()
            .iter()
            .flat_map(|op| op.asset_refs())
            .map(str::to_owned)
            .collect();
        let skin = profile.skin_overlay.filter(|_| config.render_device_overlay);
        if let Some(skin) = skin {
            refs.insert(skin.to_owned());
        }
        let assets = self.resolve_assets(runtime, &refs, profile.asset_variant);
        let assets_failed = assets.values().filter(|r| r.is_err()).count();

        let clear = config.clear_rgba.to_premul();
        let (w, h) = pixmap_dims(size)?;
        let mut scratch = vello_cpu::Pixmap::new(w, h);
        let mut acc = FrameRGBA::filled(size, clear);
        let staged = config.render_level == RenderLevel::Staged;
        let mut stages = Vec::new();

        self.raster.begin_pass();
        for op in runtime.draw_ops() {
            if !self.raster.draw_op(op, &assets, size, &mut scratch)? {
                tracing::debug!(op = op.kind(), "op degraded to placeholder");
            }
            over_in_place(&mut acc.data, scratch.data_as_u8_slice())?;
            if staged {
                stages.push(acc.clone());
            }
        }

        apply_shape_mask(&mut acc, profile.shape, clear);
        for stage in &mut stages {
            apply_shape_mask(stage, profile.shape, clear);
        }

        if config.show_event_zones && !runtime.zones().is_empty() {
            self.raster
                .draw_zone_outlines(runtime.zones().iter(), size, &mut scratch)?;
            over_in_place(&mut acc.data, scratch.data_as_u8_slice())?;
        }
        if let Some(skin) = skin
            && let Some(Ok(asset)) = assets.get(skin)
            && let Ok(img) = asset.as_image(skin)
        {
            self.raster.draw_cover_image(skin, img, size, &mut scratch)?;
            over_in_place(&mut acc.data, scratch.data_as_u8_slice())?;
        }

        let image = finish(acc, config, clear);
        let stages = stages
            .into_iter()
            .map(|s| finish(s, config, clear))
            .collect();

        let stats = RenderStats {
            ops: runtime.draw_ops().len(),
            zones: runtime.zones().len(),
            timers_fired,
            assets_resolved: assets.len() - assets_failed,
            assets_failed,
        };
        tracing::debug!(?stats, "frame rendered");
        Ok(RenderFrame {
            image,
            stages,
            stats,
        })
    }

    /// Like [`render`](Self::render), but a failed pass yields a placeholder frame plus the error.
    pub fn render_or_placeholder(
        &mut self,
        runtime: &mut Runtime,
        config: &Config,
    ) -> (RenderFrame, Option<PlayerError>) {
        match self.render(runtime, config) {
            Ok(frame) => (frame, None),
            Err(e) => {
                tracing::warn!(error = %e, "render failed, substituting placeholder");
                let image = self.placeholder(runtime, config);
                let frame = RenderFrame {
                    image,
                    stages: Vec::new(),
                    stats: RenderStats::default(),
                };
                (frame, Some(e))
            }
        }
    }

    fn resolve_assets(
        &self,
        runtime: &Runtime,
        refs: &BTreeSet<String>,
        variant: &str,
    ) -> ResolvedAssets {
        let resolver = Arc::clone(runtime.resolver());
        let resolve_all = || {
            refs.par_iter()
                .map(|path| {
                    let res = resolver.resolve(path, variant).map_err(|e| {
                        tracing::warn!(path = %path, error = %e, "asset unavailable");
                        e.to_string()
                    });
                    (path.clone(), res)
                })
                .collect::<HashMap<_, _>>()
        };
        match &self.pool {
            Some(pool) => pool.install(resolve_all),
            None => resolve_all(),
        }
    }

    fn placeholder(&mut self, runtime: &Runtime, config: &Config) -> FrameRGBA {
        let profile = runtime.profile();
        let size = profile.rotated_size(config.rotation);
        let from_resource = runtime
            .resolver()
            .resolve_image(RENDER_FAIL_RESOURCE, profile.asset_variant)
            .and_then(|img| {
                let (w, h) = pixmap_dims(size)?;
                let mut pm = vello_cpu::Pixmap::new(w, h);
                self.raster.begin_pass();
                self.raster
                    .draw_cover_image(RENDER_FAIL_RESOURCE, &img, size, &mut pm)?;
                Ok(FrameRGBA {
                    width: size.width,
                    height: size.height,
                    data: pm.data_as_u8_slice().to_vec(),
                    premultiplied: true,
                })
            });
        from_resource.unwrap_or_else(|_| placeholder_pattern(size))
    }
}

fn draw_failed(e: PlayerError) -> PlayerError {
    PlayerError::render(format!("draw pass failed: {e}"))
}

fn finish(mut frame: FrameRGBA, config: &Config, fill: PremulRgba8) -> FrameRGBA {
    scroll_rows(&mut frame, config.render_scroll, fill);
    rotate(&frame, config.rotation)
}

/// 8px magenta/black checkerboard.
fn placeholder_pattern(size: ScreenSize) -> FrameRGBA {
    let mut frame = FrameRGBA::filled(size, [0, 0, 0, 255]);
    let stride = size.width as usize * 4;
    for (y, row) in frame.data.chunks_exact_mut(stride).enumerate() {
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            if (x / 8 + y / 8) % 2 == 0 {
                px.copy_from_slice(&[255, 0, 255, 255]);
            }
        }
    }
    frame
}

fn build_thread_pool(threads: usize) -> PlayerResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(PlayerError::render("render threads must be >= 1"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| PlayerError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
