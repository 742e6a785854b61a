use serde::{Deserialize, Serialize};

use crate::foundation::core::ScreenSize;

/// Name of the manifest file at the bundle root.
pub const MANIFEST_FILE: &str = "app.json";

pub(crate) const DEFAULT_SHIFT_STEP_MS: u64 = 1000;

/// Parsed `app.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Manifest {
    /// App identity.
    pub app: AppInfo,
    /// Screen size the app was designed for.
    pub screen: ScreenSize,
    /// Pages of app logic, linked in this order.
    pub pages: Vec<String>,
    /// Names of the lifecycle hook functions; conventional names are probed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Hooks>,
    /// Simulated time advanced by one `shift()`.
    #[serde(default = "default_shift_step_ms")]
    pub shift_step_ms: u64,
    /// Font used by `text` until the app calls `set_font`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_font: Option<String>,
    /// Resources the bundle must contain.
    #[serde(default)]
    pub resources: Vec<String>,
}

fn default_shift_step_ms() -> u64 {
    DEFAULT_SHIFT_STEP_MS
}

/// App identity block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AppInfo {
    /// Numeric app id; also the storage namespace.
    pub app_id: u64,
    /// Display name.
    pub app_name: String,
    /// Kind of app.
    #[serde(default)]
    pub app_type: AppType,
}

/// Kind of packaged app.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    /// Watch face.
    #[default]
    Watchface,
    /// Mini app.
    App,
}

/// Hook function names declared by the manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hooks {
    /// Called once after top-level statements on every `init`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<String>,
    /// Called once per render pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw: Option<String>,
    /// Called after every `shift()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<String>,
    /// Called on `back()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
}

impl Hooks {
    /// Hooks named by convention: `init`, `draw`, `shift`, `back`.
    pub fn conventional() -> Self {
        Self {
            init: Some("init".to_owned()),
            draw: Some("draw".to_owned()),
            shift: Some("shift".to_owned()),
            back: Some("back".to_owned()),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> {
        [
            ("init", self.init.as_deref()),
            ("draw", self.draw.as_deref()),
            ("shift", self.shift.as_deref()),
            ("back", self.back.as_deref()),
        ]
        .into_iter()
    }
}
