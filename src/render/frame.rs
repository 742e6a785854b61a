use crate::foundation::core::ScreenSize;
use crate::foundation::error::{PlayerError, PlayerResult};

/// A raster surface as RGBA8 pixels.
///
/// Frames produced by the pipeline are **premultiplied alpha**; the flag makes that explicit at
/// API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Premultiplied frame filled with one pixel value.
    pub fn filled(size: ScreenSize, px: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(size.rgba8_len());
        for _ in 0..(size.width as usize) * (size.height as usize) {
            data.extend_from_slice(&px);
        }
        Self {
            width: size.width,
            height: size.height,
            data,
            premultiplied: true,
        }
    }

    pub fn size(&self) -> ScreenSize {
        ScreenSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = self.data.get(i..i + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Straight-alpha copy for encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    pub(crate) fn check_len(&self) -> PlayerResult<()> {
        if self.data.len() != self.size().rgba8_len() {
            return Err(PlayerError::render("frame byte length mismatch"));
        }
        Ok(())
    }
}

/// Counters describing one render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub ops: usize,
    pub zones: usize,
    pub timers_fired: usize,
    pub assets_resolved: usize,
    pub assets_failed: usize,
}

/// Output of one render pass.
#[derive(Clone, Debug)]
pub struct RenderFrame {
    /// Final frame after mask, overlays, scroll and rotation.
    pub image: FrameRGBA,
    /// Render level 4 only: one cumulative snapshot per draw op, in emission order.
    pub stages: Vec<FrameRGBA>,
    pub stats: RenderStats,
}

impl RenderFrame {
    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }

    /// Straight-alpha bytes of the final frame.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        self.image.to_straight_rgba8()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
