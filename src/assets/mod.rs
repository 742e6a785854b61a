//! Image and font decoding behind a deduplicating cache.

pub mod decode;
pub mod resolver;
pub(crate) mod text;

pub use decode::{DecodedAsset, DecodedFont, DecodedImage};
pub use resolver::{AssetKey, AssetResolver};
pub use text::TextAlign;
