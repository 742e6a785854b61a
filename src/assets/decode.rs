use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{PlayerError, PlayerResult};
use crate::foundation::math::mul_div255_u8;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Validated font file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFont {
    /// Raw sfnt bytes.
    pub bytes: Arc<Vec<u8>>,
}

/// Result of decoding one resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedAsset {
    /// Raster image.
    Image(DecodedImage),
    /// Font.
    Font(DecodedFont),
}

impl DecodedAsset {
    /// Image payload, or an asset error naming `path`.
    pub fn as_image(&self, path: &str) -> PlayerResult<&DecodedImage> {
        match self {
            Self::Image(img) => Ok(img),
            Self::Font(_) => Err(PlayerError::asset(format!("'{path}' is a font, not an image"))),
        }
    }

    /// Font payload, or an asset error naming `path`.
    pub fn as_font(&self, path: &str) -> PlayerResult<&DecodedFont> {
        match self {
            Self::Font(f) => Ok(f),
            Self::Image(_) => Err(PlayerError::asset(format!("'{path}' is an image, not a font"))),
        }
    }
}

/// Decode by file extension: fonts are validated, everything else goes through `image`.
pub fn decode_asset(path: &str, bytes: &[u8]) -> PlayerResult<DecodedAsset> {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "ttf" | "otf" | "ttc" => Ok(DecodedAsset::Font(validate_font(bytes)?)),
        _ => Ok(DecodedAsset::Image(decode_image(bytes)?)),
    }
}

pub fn decode_image(bytes: &[u8]) -> PlayerResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(PlayerError::asset("image has zero size"));
    }
    if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
        return Err(PlayerError::asset(format!(
            "image {width}x{height} exceeds u16 dimensions"
        )));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub fn validate_font(bytes: &[u8]) -> PlayerResult<DecodedFont> {
    let magic = bytes
        .get(..4)
        .ok_or_else(|| PlayerError::asset("font file is truncated"))?;
    match magic {
        b"\x00\x01\x00\x00" | b"OTTO" | b"true" | b"ttcf" => Ok(DecodedFont {
            bytes: Arc::new(bytes.to_vec()),
        }),
        _ => Err(PlayerError::asset("unrecognized font format")),
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
