use crate::assets::TextAlign;
use crate::foundation::core::{Point, Rect, Rgba8};

/// One primitive recorded by app logic during a pass, in device coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Filled rectangle, optionally with rounded corners.
    FillRect {
        rect: Rect,
        radius: f64,
        color: Rgba8,
    },
    /// Rectangle outline centered on the edge.
    StrokeRect {
        rect: Rect,
        radius: f64,
        line_width: f64,
        color: Rgba8,
    },
    /// Filled circle.
    FillCircle {
        center: Point,
        radius: f64,
        color: Rgba8,
    },
    /// Circular arc stroke; angles in degrees, clockwise from 12 o'clock.
    StrokeArc {
        center: Point,
        radius: f64,
        start_deg: f64,
        end_deg: f64,
        line_width: f64,
        color: Rgba8,
    },
    /// Straight line with butt caps.
    Line {
        from: Point,
        to: Point,
        line_width: f64,
        color: Rgba8,
    },
    /// Image blit at `origin`; natural size unless `size` is given.
    Image {
        path: String,
        origin: Point,
        size: Option<(f64, f64)>,
        alpha: u8,
    },
    /// Text laid out inside `rect`.
    Text {
        text: String,
        rect: Rect,
        size_px: f32,
        color: Rgba8,
        font: Option<String>,
        align: TextAlign,
    },
}

impl DrawOp {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FillRect { .. } => "fill_rect",
            Self::StrokeRect { .. } => "stroke_rect",
            Self::FillCircle { .. } => "fill_circle",
            Self::StrokeArc { .. } => "stroke_arc",
            Self::Line { .. } => "line",
            Self::Image { .. } => "image",
            Self::Text { .. } => "text",
        }
    }

    /// Logical asset paths this op needs resolved before compositing.
    pub fn asset_refs(&self) -> impl Iterator<Item = &str> {
        let refs: [Option<&str>; 1] = match self {
            Self::Image { path, .. } => [Some(path.as_str())],
            Self::Text { font, .. } => [font.as_deref()],
            _ => [None],
        };
        refs.into_iter().flatten()
    }
}
