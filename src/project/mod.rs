//! App bundles: manifest parsing, page compilation and the resource table.

pub mod bundle;
pub mod manifest;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::foundation::core::ScreenSize;
use crate::foundation::error::{PlayerError, PlayerResult};
use crate::foundation::math::Fnv1a64;
use crate::script::{Page, Program, link_pages, parse_page};

pub use bundle::ProjectBundle;
pub use manifest::{AppInfo, AppType, Hooks, MANIFEST_FILE, Manifest};

/// Read-only map from logical path to resource bytes.
pub type ResourceTable = BTreeMap<String, Arc<[u8]>>;

/// A loaded, compiled app. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Project {
    manifest: Arc<Manifest>,
    screen: ScreenSize,
    hooks: Hooks,
    program: Arc<Program>,
    resources: Arc<ResourceTable>,
    fingerprint: u64,
}

impl Project {
    /// Parse the manifest, compile every page and check declared resources.
    #[tracing::instrument(skip_all, fields(files = bundle.len()))]
    pub fn from_bundle(bundle: ProjectBundle) -> PlayerResult<Self> {
        let files = bundle.into_files();
        let manifest_bytes = files
            .get(MANIFEST_FILE)
            .ok_or_else(|| PlayerError::project_load(format!("missing {MANIFEST_FILE}")))?;
        let manifest: Manifest = serde_json::from_slice(manifest_bytes)
            .map_err(|e| PlayerError::project_load(format!("malformed {MANIFEST_FILE}: {e}")))?;
        let screen = ScreenSize::new(manifest.screen.width, manifest.screen.height)?;

        if manifest.pages.is_empty() {
            return Err(PlayerError::project_load("manifest declares no pages"));
        }
        if manifest.shift_step_ms == 0 {
            return Err(PlayerError::project_load("shiftStepMs must be positive"));
        }

        let mut pages: Vec<(String, Page)> = Vec::with_capacity(manifest.pages.len());
        for page_path in &manifest.pages {
            let key = bundle::normalize_rel_path(page_path).map_err(PlayerError::project_load)?;
            let bytes = files
                .get(&key)
                .ok_or_else(|| PlayerError::project_load(format!("missing page '{key}'")))?;
            let src = std::str::from_utf8(bytes).map_err(|_| {
                PlayerError::project_load(format!("page '{key}' is not valid UTF-8"))
            })?;
            let page = parse_page(src).map_err(|e| {
                let (line, col) = e.line_col(src);
                PlayerError::project_load(format!("{key}:{line}:{col}: {}", e.message))
            })?;
            pages.push((key, page));
        }
        let program = link_pages(pages).map_err(PlayerError::project_load)?;
        let hooks = resolve_hooks(manifest.hooks.as_ref(), &program)?;

        let mut required: Vec<&str> = manifest.resources.iter().map(String::as_str).collect();
        required.extend(manifest.default_font.as_deref());
        for path in required {
            let key = bundle::normalize_rel_path(path).map_err(PlayerError::project_load)?;
            if !files.contains_key(&key) {
                return Err(PlayerError::project_load(format!(
                    "missing resource '{key}'"
                )));
            }
        }

        let mut h = Fnv1a64::new_default();
        let mut resources = ResourceTable::new();
        for (path, bytes) in files {
            h.write_str(&path);
            h.write_u64(bytes.len() as u64);
            h.write_bytes(&bytes);
            resources.insert(path, Arc::from(bytes));
        }

        tracing::debug!(
            app_id = manifest.app.app_id,
            pages = manifest.pages.len(),
            functions = program.functions.len(),
            resources = resources.len(),
            "project compiled"
        );

        Ok(Self {
            manifest: Arc::new(manifest),
            screen,
            hooks,
            program: Arc::new(program),
            resources: Arc::new(resources),
            fingerprint: h.finish(),
        })
    }

    /// Read a bundle directory and compile it.
    pub fn from_dir(root: impl AsRef<std::path::Path>) -> PlayerResult<Self> {
        Self::from_bundle(ProjectBundle::from_dir(root)?)
    }

    /// Parsed manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Storage namespace of this app.
    pub fn identity(&self) -> String {
        self.manifest.app.app_id.to_string()
    }

    /// Screen size the app requested.
    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    /// Hook names that resolve to defined functions.
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Simulated time advanced by one shift.
    pub fn shift_step_ms(&self) -> u64 {
        self.manifest.shift_step_ms
    }

    /// Normalized path of the default font, if declared.
    pub fn default_font(&self) -> Option<String> {
        self.manifest
            .default_font
            .as_deref()
            .and_then(|p| bundle::normalize_rel_path(p).ok())
    }

    /// Every file of the bundle, manifest and pages included.
    pub fn resources(&self) -> &Arc<ResourceTable> {
        &self.resources
    }

    /// Hash over paths and bytes of every file.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub(crate) fn program(&self) -> &Arc<Program> {
        &self.program
    }
}

fn resolve_hooks(declared: Option<&Hooks>, program: &Program) -> PlayerResult<Hooks> {
    let Some(declared) = declared else {
        let conventional = Hooks::conventional();
        let keep = |name: Option<String>| name.filter(|n| program.functions.contains_key(n));
        return Ok(Hooks {
            init: keep(conventional.init),
            draw: keep(conventional.draw),
            shift: keep(conventional.shift),
            back: keep(conventional.back),
        });
    };
    for (hook, name) in declared.iter() {
        if let Some(name) = name
            && !program.functions.contains_key(name)
        {
            return Err(PlayerError::project_load(format!(
                "{hook} hook names undefined function '{name}'"
            )));
        }
    }
    Ok(declared.clone())
}

#[cfg(test)]
#[path = "../../tests/unit/project/mod.rs"]
mod tests;
