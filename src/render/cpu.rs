use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape;

use crate::assets::text::{TextBrush, TextLayoutEngine};
use crate::assets::{DecodedAsset, DecodedImage};
use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, ScreenSize};
use crate::foundation::error::{PlayerError, PlayerResult};
use crate::runtime::api::MAX_ARC_SWEEP_DEG;
use crate::runtime::zones::{EventZone, ZoneShape};
use crate::runtime::DrawOp;

/// Flattening tolerance for curves, in pixels.
const TOLERANCE: f64 = 0.1;

/// Color of missing-asset placeholders.
pub(crate) const PLACEHOLDER_RGBA: Rgba8 = Rgba8::rgb(255, 0, 255);

/// Color of event-zone outlines.
pub(crate) const ZONE_OUTLINE_RGBA: Rgba8 = Rgba8 {
    r: 255,
    g: 0,
    b: 0,
    a: 170,
};

/// Resolution results for every asset path referenced by a pass.
pub(crate) type ResolvedAssets = HashMap<String, Result<Arc<DecodedAsset>, String>>;

/// `vello_cpu` rasterizer for draw ops, one op at a time onto a scratch pixmap.
pub(crate) struct CpuRasterizer {
    ctx: Option<vello_cpu::RenderContext>,
    text: TextLayoutEngine,
    image_paints: HashMap<String, vello_cpu::Image>,
    fonts: HashMap<String, vello_cpu::peniko::FontData>,
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuRasterizer {
    pub(crate) fn new() -> Self {
        Self {
            ctx: None,
            text: TextLayoutEngine::new(),
            image_paints: HashMap::new(),
            fonts: HashMap::new(),
        }
    }

    /// Forget per-pass paint caches.
    pub(crate) fn begin_pass(&mut self) {
        self.image_paints.clear();
        self.fonts.clear();
    }

    fn with_ctx<R>(
        &mut self,
        size: ScreenSize,
        dst: &mut vello_cpu::Pixmap,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> PlayerResult<R>,
    ) -> PlayerResult<R> {
        let (w, h) = pixmap_dims(size)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_transform(affine_to_cpu(Affine::IDENTITY));
        let out = f(self, &mut ctx);
        if out.is_ok() {
            ctx.flush();
            dst.data_as_u8_slice_mut().fill(0);
            ctx.render_to_pixmap(dst);
        }
        self.ctx = Some(ctx);
        out
    }

    /// Rasterize one op into `dst`, replacing its contents.
    ///
    /// Returns `false` when the op degraded to a placeholder.
    pub(crate) fn draw_op(
        &mut self,
        op: &DrawOp,
        assets: &ResolvedAssets,
        size: ScreenSize,
        dst: &mut vello_cpu::Pixmap,
    ) -> PlayerResult<bool> {
        self.with_ctx(size, dst, |this, ctx| this.encode_op(ctx, op, assets))
    }

    /// Rasterize outlines of `zones` into `dst`.
    pub(crate) fn draw_zone_outlines<'a>(
        &mut self,
        zones: impl Iterator<Item = &'a EventZone>,
        size: ScreenSize,
        dst: &mut vello_cpu::Pixmap,
    ) -> PlayerResult<()> {
        self.with_ctx(size, dst, |_, ctx| {
            set_color(ctx, ZONE_OUTLINE_RGBA);
            for z in zones {
                let outline = match z.shape {
                    ZoneShape::Rect(r) => r.to_path(TOLERANCE),
                    ZoneShape::Circle { center, radius } => {
                        kurbo::Circle::new(center, radius).to_path(TOLERANCE)
                    }
                };
                fill(ctx, &stroke_outline(&outline, 2.0, kurbo::Cap::Butt));
            }
            Ok(())
        })
    }

    /// Rasterize `img` stretched over the whole surface.
    pub(crate) fn draw_cover_image(
        &mut self,
        key: &str,
        img: &DecodedImage,
        size: ScreenSize,
        dst: &mut vello_cpu::Pixmap,
    ) -> PlayerResult<()> {
        let paint = self.image_paint(key, img)?;
        self.with_ctx(size, dst, |_, ctx| {
            let sx = f64::from(size.width) / f64::from(img.width);
            let sy = f64::from(size.height) / f64::from(img.height);
            ctx.set_transform(affine_to_cpu(Affine::scale_non_uniform(sx, sy)));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(img.width),
                f64::from(img.height),
            ));
            Ok(())
        })
    }

    fn image_paint(&mut self, key: &str, img: &DecodedImage) -> PlayerResult<vello_cpu::Image> {
        if let Some(p) = self.image_paints.get(key) {
            return Ok(p.clone());
        }
        let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_paints.insert(key.to_owned(), paint.clone());
        Ok(paint)
    }

    fn encode_op(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        op: &DrawOp,
        assets: &ResolvedAssets,
    ) -> PlayerResult<bool> {
        match op {
            DrawOp::FillRect {
                rect,
                radius,
                color,
            } => {
                set_color(ctx, *color);
                if *radius > 0.0 {
                    fill(ctx, &rounded(*rect, *radius));
                } else {
                    ctx.fill_rect(&rect_to_cpu(*rect));
                }
            }
            DrawOp::StrokeRect {
                rect,
                radius,
                line_width,
                color,
            } => {
                set_color(ctx, *color);
                let outline = if *radius > 0.0 {
                    rounded(*rect, *radius)
                } else {
                    rect.to_path(TOLERANCE)
                };
                fill(ctx, &stroke_outline(&outline, *line_width, kurbo::Cap::Butt));
            }
            DrawOp::FillCircle {
                center,
                radius,
                color,
            } => {
                set_color(ctx, *color);
                fill(ctx, &kurbo::Circle::new(*center, *radius).to_path(TOLERANCE));
            }
            DrawOp::StrokeArc {
                center,
                radius,
                start_deg,
                end_deg,
                line_width,
                color,
            } => {
                set_color(ctx, *color);
                let arc = kurbo::Arc::new(
                    *center,
                    (*radius, *radius),
                    (start_deg - 90.0).to_radians(),
                    (end_deg - start_deg)
                        .clamp(-MAX_ARC_SWEEP_DEG, MAX_ARC_SWEEP_DEG)
                        .to_radians(),
                    0.0,
                );
                let path: BezPath = arc.path_elements(TOLERANCE).collect();
                fill(ctx, &stroke_outline(&path, *line_width, kurbo::Cap::Round));
            }
            DrawOp::Line {
                from,
                to,
                line_width,
                color,
            } => {
                set_color(ctx, *color);
                let path = kurbo::Line::new(*from, *to).to_path(TOLERANCE);
                fill(ctx, &stroke_outline(&path, *line_width, kurbo::Cap::Butt));
            }
            DrawOp::Image {
                path,
                origin,
                size,
                alpha,
            } => {
                let img = match lookup(assets, path).and_then(|a| a.as_image(path)) {
                    Ok(img) => img.clone(),
                    Err(_) => {
                        let (w, h) = size.unwrap_or((24.0, 24.0));
                        draw_placeholder(ctx, Rect::from_origin_size(*origin, (w, h)));
                        return Ok(false);
                    }
                };
                let paint = self.image_paint(path, &img)?;
                let (iw, ih) = (f64::from(img.width), f64::from(img.height));
                let (sx, sy) = size.map_or((1.0, 1.0), |(w, h)| (w / iw, h / ih));
                let tr = Affine::translate(origin.to_vec2()) * Affine::scale_non_uniform(sx, sy);
                ctx.set_transform(affine_to_cpu(tr));
                ctx.set_paint(paint);
                with_opacity(ctx, *alpha, |ctx| {
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
                });
            }
            DrawOp::Text {
                text,
                rect,
                size_px,
                color,
                font,
                align,
            } => {
                let Some(font_path) = font else {
                    draw_placeholder(ctx, *rect);
                    return Ok(false);
                };
                let font_bytes = match lookup(assets, font_path).and_then(|a| a.as_font(font_path)) {
                    Ok(f) => Arc::clone(&f.bytes),
                    Err(_) => {
                        draw_placeholder(ctx, *rect);
                        return Ok(false);
                    }
                };
                let layout = match self.text.layout_plain(
                    text,
                    font_path,
                    &font_bytes,
                    *size_px,
                    TextBrush::from(*color),
                    Some(rect.width() as f32),
                    *align,
                ) {
                    Ok(layout) => layout,
                    Err(e) => {
                        tracing::warn!(font = %font_path, error = %e, "text layout failed");
                        draw_placeholder(ctx, *rect);
                        return Ok(false);
                    }
                };
                let font = self
                    .fonts
                    .entry(font_path.clone())
                    .or_insert_with(|| {
                        vello_cpu::peniko::FontData::new(
                            vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
                            0,
                        )
                    })
                    .clone();
                ctx.set_transform(affine_to_cpu(Affine::translate(rect.origin().to_vec2())));
                for line in layout.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let brush = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, brush.a,
                        ));
                        let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(&font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
            }
        }
        Ok(true)
    }
}

fn lookup<'a>(assets: &'a ResolvedAssets, path: &str) -> PlayerResult<&'a DecodedAsset> {
    match assets.get(path) {
        Some(Ok(asset)) => Ok(asset.as_ref()),
        Some(Err(e)) => Err(PlayerError::asset(e.clone())),
        None => Err(PlayerError::asset(format!("'{path}' was not resolved"))),
    }
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

fn fill(ctx: &mut vello_cpu::RenderContext, path: &BezPath) {
    ctx.fill_path(&bezpath_to_cpu(path));
}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    alpha: u8,
    f: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    if alpha == 255 {
        f(ctx);
        return;
    }
    ctx.push_opacity_layer(f32::from(alpha) / 255.0);
    f(ctx);
    ctx.pop_layer();
}

fn draw_placeholder(ctx: &mut vello_cpu::RenderContext, rect: Rect) {
    ctx.set_transform(affine_to_cpu(Affine::IDENTITY));
    set_color(ctx, PLACEHOLDER_RGBA.with_alpha_scaled(96));
    ctx.fill_rect(&rect_to_cpu(rect));
    set_color(ctx, PLACEHOLDER_RGBA);
    fill(ctx, &stroke_outline(&rect.to_path(TOLERANCE), 1.0, kurbo::Cap::Butt));
}

fn rounded(rect: Rect, radius: f64) -> BezPath {
    let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0);
    kurbo::RoundedRect::from_rect(rect, r).to_path(TOLERANCE)
}

fn stroke_outline(path: &BezPath, width: f64, cap: kurbo::Cap) -> BezPath {
    let style = kurbo::Stroke::new(width.max(0.0)).with_caps(cap);
    kurbo::stroke(
        path.iter(),
        &style,
        &kurbo::StrokeOpts::default(),
        TOLERANCE,
    )
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn pixmap_dims(size: ScreenSize) -> PlayerResult<(u16, u16)> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| PlayerError::render("pixmap width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| PlayerError::render("pixmap height exceeds u16"))?;
    Ok((w, h))
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PlayerResult<vello_cpu::Pixmap> {
    let (w, h) = pixmap_dims(ScreenSize { width, height })?;
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(PlayerError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
