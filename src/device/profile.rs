use crate::foundation::core::{Rotation, ScreenSize};
use crate::foundation::error::{PlayerError, PlayerResult};

/// Outline of the physical screen; pixels outside it are masked off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenShape {
    /// Circular screen inscribed in the surface.
    Round,
    /// Plain rectangle.
    Rect,
    /// Rectangle with rounded corners of the given radius in pixels.
    RoundedRect {
        /// Corner radius.
        radius: u32,
    },
}

impl ScreenShape {
    /// Name exposed to app logic through `screen_shape()`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Round => "round",
            Self::Rect => "rect",
            Self::RoundedRect { .. } => "rounded_rect",
        }
    }

    /// `true` when the center of pixel `(x, y)` lies on the screen.
    pub fn covers(self, size: ScreenSize, x: u32, y: u32) -> bool {
        let (w, h) = (f64::from(size.width), f64::from(size.height));
        let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
        match self {
            Self::Rect => true,
            Self::Round => {
                let r = w.min(h) / 2.0;
                let (dx, dy) = (px - w / 2.0, py - h / 2.0);
                dx * dx + dy * dy <= r * r
            }
            Self::RoundedRect { radius } => {
                let r = f64::from(radius).min(w / 2.0).min(h / 2.0);
                let cx = px.clamp(r, w - r);
                let cy = py.clamp(r, h - r);
                let (dx, dy) = (px - cx, py - cy);
                dx * dx + dy * dy <= r * r
            }
        }
    }
}

/// Static descriptor of one emulated device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Registry key.
    pub name: &'static str,
    /// Human readable name.
    pub display_name: &'static str,
    /// Native screen size before rotation.
    pub screen: ScreenSize,
    /// Screen outline.
    pub shape: ScreenShape,
    /// Rotation the device ships with.
    pub default_rotation: Rotation,
    /// Logical path of the skin drawn over the frame, if any.
    pub skin_overlay: Option<&'static str>,
    /// Directory searched first for profile specific assets.
    pub asset_variant: &'static str,
}

const fn size(width: u32, height: u32) -> ScreenSize {
    ScreenSize { width, height }
}

static PROFILES: [DeviceProfile; 5] = [
    DeviceProfile {
        name: "mi_band7",
        display_name: "Xiaomi Smart Band 7",
        screen: size(192, 490),
        shape: ScreenShape::RoundedRect { radius: 48 },
        default_rotation: Rotation::Deg0,
        skin_overlay: Some("skins/mi_band7.png"),
        asset_variant: "mi_band7",
    },
    DeviceProfile {
        name: "round_192",
        display_name: "Round 192",
        screen: size(192, 192),
        shape: ScreenShape::Round,
        default_rotation: Rotation::Deg0,
        skin_overlay: None,
        asset_variant: "round_192",
    },
    DeviceProfile {
        name: "square_240",
        display_name: "Square 240",
        screen: size(240, 240),
        shape: ScreenShape::Rect,
        default_rotation: Rotation::Deg0,
        skin_overlay: None,
        asset_variant: "square_240",
    },
    DeviceProfile {
        name: "gtr_round_454",
        display_name: "GTR round 454",
        screen: size(454, 454),
        shape: ScreenShape::Round,
        default_rotation: Rotation::Deg0,
        skin_overlay: Some("skins/gtr_round_454.png"),
        asset_variant: "gtr_round_454",
    },
    DeviceProfile {
        name: "band_rect_126",
        display_name: "Band 126x294",
        screen: size(126, 294),
        shape: ScreenShape::RoundedRect { radius: 20 },
        default_rotation: Rotation::Deg0,
        skin_overlay: None,
        asset_variant: "band_rect_126",
    },
];

impl DeviceProfile {
    /// Name of the profile selected when none is given.
    pub const DEFAULT_NAME: &'static str = "mi_band7";

    /// Every registered profile, default first.
    pub fn all() -> &'static [DeviceProfile] {
        &PROFILES
    }

    /// Look up a profile by registry name.
    pub fn by_name(name: &str) -> PlayerResult<&'static DeviceProfile> {
        PROFILES.iter().find(|p| p.name == name).ok_or_else(|| {
            let known: Vec<&str> = PROFILES.iter().map(|p| p.name).collect();
            PlayerError::project_load(format!(
                "unknown device profile '{name}' (known: {})",
                known.join(", ")
            ))
        })
    }

    /// Output size after applying `rotation`.
    pub fn rotated_size(&self, rotation: Rotation) -> ScreenSize {
        if rotation.swaps_axes() {
            size(self.screen.height, self.screen.width)
        } else {
            self.screen
        }
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        PROFILES[0]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/device/profile.rs"]
mod tests;
