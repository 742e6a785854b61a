use serde::{Deserialize, Serialize};

use crate::foundation::core::{Rgba8, Rotation};
use crate::foundation::error::PlayerError;

/// Compositing granularity of a pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RenderLevel {
    /// Final frame only.
    #[default]
    Normal,
    /// Always-on-display variant; composited like [`RenderLevel::Normal`], visible to app logic.
    Aod,
    /// Final frame plus one cumulative snapshot per draw op.
    Staged,
}

impl RenderLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::Aod => 2,
            Self::Staged => 4,
        }
    }
}

impl TryFrom<u8> for RenderLevel {
    type Error = PlayerError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Self::Normal),
            2 => Ok(Self::Aod),
            4 => Ok(Self::Staged),
            other => Err(PlayerError::render(format!(
                "render level must be 1, 2 or 4 (got {other})"
            ))),
        }
    }
}

impl From<RenderLevel> for u8 {
    fn from(l: RenderLevel) -> Self {
        l.as_u8()
    }
}

/// Caller-owned settings read at the start of every render pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub render_level: RenderLevel,
    /// Outline every registered event zone on top of the frame.
    pub show_event_zones: bool,
    /// Call `shift()` at the start of every pass.
    pub with_auto_increment: bool,
    /// Pixels the finished frame is scrolled up by.
    pub render_scroll: i32,
    pub rotation: Rotation,
    /// Draw the profile's skin overlay when it has one.
    pub render_device_overlay: bool,
    /// Screen background.
    pub clear_rgba: Rgba8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render_level: RenderLevel::Normal,
            show_event_zones: false,
            with_auto_increment: false,
            render_scroll: 0,
            rotation: Rotation::Deg0,
            render_device_overlay: false,
            clear_rgba: Rgba8::BLACK,
        }
    }
}

impl Config {
    pub fn with_render_level(mut self, level: RenderLevel) -> Self {
        self.render_level = level;
        self
    }

    pub fn with_event_zones(mut self, show: bool) -> Self {
        self.show_event_zones = show;
        self
    }

    pub fn with_auto_increment(mut self, on: bool) -> Self {
        self.with_auto_increment = on;
        self
    }

    pub fn with_scroll(mut self, render_scroll: i32) -> Self {
        self.render_scroll = render_scroll;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_device_overlay(mut self, on: bool) -> Self {
        self.render_device_overlay = on;
        self
    }

    pub fn with_clear_rgba(mut self, clear: Rgba8) -> Self {
        self.clear_rgba = clear;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
