use crate::device::ScreenShape;
use crate::foundation::core::{Rotation, ScreenSize};
use crate::foundation::error::{PlayerError, PlayerResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

pub type PremulRgba8 = [u8; 4];

fn add_sat_u8(a: u16, b: u16) -> u8 {
    (a + b).min(255) as u8
}

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = add_sat_u8(u16::from(src[i]), mul_div255_u16(u16::from(dst[i]), inv));
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> PlayerResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PlayerError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Replace every pixel outside `shape` with `outside`.
pub fn apply_shape_mask(frame: &mut FrameRGBA, shape: ScreenShape, outside: PremulRgba8) {
    if shape == ScreenShape::Rect {
        return;
    }
    let size = frame.size();
    let w = frame.width as usize;
    for (i, px) in frame.data.chunks_exact_mut(4).enumerate() {
        let (x, y) = ((i % w) as u32, (i / w) as u32);
        if !shape.covers(size, x, y) {
            px.copy_from_slice(&outside);
        }
    }
}

/// Move content up by `rows` (down when negative); vacated rows take `fill`.
pub fn scroll_rows(frame: &mut FrameRGBA, rows: i32, fill: PremulRgba8) {
    if rows == 0 {
        return;
    }
    let stride = frame.width as usize * 4;
    let h = frame.height as usize;
    let shift = (rows.unsigned_abs() as usize).min(h);
    let keep = (h - shift) * stride;
    if rows > 0 {
        frame.data.copy_within(shift * stride.., 0);
        for px in frame.data[keep..].chunks_exact_mut(4) {
            px.copy_from_slice(&fill);
        }
    } else {
        frame.data.copy_within(..keep, shift * stride);
        for px in frame.data[..shift * stride].chunks_exact_mut(4) {
            px.copy_from_slice(&fill);
        }
    }
}

/// Rotate clockwise by `rotation`.
pub fn rotate(frame: &FrameRGBA, rotation: Rotation) -> FrameRGBA {
    if rotation == Rotation::Deg0 {
        return frame.clone();
    }
    let (w, h) = (frame.width as usize, frame.height as usize);
    let out_size = if rotation.swaps_axes() {
        ScreenSize {
            width: frame.height,
            height: frame.width,
        }
    } else {
        frame.size()
    };
    let ow = out_size.width as usize;
    let mut data = vec![0u8; frame.data.len()];
    for (i, px) in data.chunks_exact_mut(4).enumerate() {
        let (dx, dy) = (i % ow, i / ow);
        let (sx, sy) = match rotation {
            Rotation::Deg0 => (dx, dy),
            Rotation::Deg90 => (dy, h - 1 - dx),
            Rotation::Deg180 => (w - 1 - dx, h - 1 - dy),
            Rotation::Deg270 => (w - 1 - dy, dx),
        };
        let si = (sy * w + sx) * 4;
        px.copy_from_slice(&frame.data[si..si + 4]);
    }
    FrameRGBA {
        width: out_size.width,
        height: out_size.height,
        data,
        premultiplied: frame.premultiplied,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
