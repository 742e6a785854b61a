use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::assets::decode::{DecodedAsset, DecodedFont, DecodedImage, decode_asset};
use crate::foundation::error::{PlayerError, PlayerResult};
use crate::project::ResourceTable;
use crate::project::bundle::normalize_rel_path;

/// Cache key: normalized logical path plus the profile's asset variant directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetKey {
    /// Normalized logical path.
    pub path: String,
    /// Variant directory searched first.
    pub variant: String,
}

impl AssetKey {
    /// Build a key, normalizing `path`.
    pub fn new(path: &str, variant: &str) -> PlayerResult<Self> {
        Ok(Self {
            path: normalize_rel_path(path).map_err(PlayerError::asset)?,
            variant: variant.to_owned(),
        })
    }
}

type Slot = Arc<OnceLock<Result<Arc<DecodedAsset>, String>>>;

#[derive(Default)]
struct ResolverState {
    slots: HashMap<AssetKey, Slot>,
    project: Arc<ResourceTable>,
    project_fingerprint: Option<u64>,
    system: Arc<ResourceTable>,
}

/// Shared decoder and cache for images and fonts.
///
/// Every key owns a once-cell; concurrent callers of the same key block on the same cell, so a
/// key is decoded at most once until the cache is cleared. Failures are cached as well.
#[derive(Default)]
pub struct AssetResolver {
    state: Mutex<ResolverState>,
    decodes: AtomicU64,
}

impl std::fmt::Debug for AssetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetResolver")
            .field("cached", &self.cached_len())
            .field("decodes", &self.decode_count())
            .finish()
    }
}

impl AssetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Install the resource table of a newly loaded project.
    ///
    /// The cache survives when the same resources are loaded again (restart) and is dropped
    /// otherwise.
    pub fn set_project_resources(&self, resources: Arc<ResourceTable>, fingerprint: u64) {
        let mut st = self.lock();
        if st.project_fingerprint != Some(fingerprint) {
            if !st.slots.is_empty() {
                tracing::debug!(dropped = st.slots.len(), "asset cache cleared for new resources");
            }
            st.slots.clear();
        }
        st.project = resources;
        st.project_fingerprint = Some(fingerprint);
    }

    /// Register a host-provided resource (default font, device skin) looked up after the project.
    pub fn register_system_resource(
        &self,
        path: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> PlayerResult<()> {
        let key = normalize_rel_path(path).map_err(PlayerError::asset)?;
        let mut st = self.lock();
        Arc::make_mut(&mut st.system).insert(key.clone(), Arc::from(bytes.into()));
        st.slots.retain(|k, _| k.path != key);
        Ok(())
    }

    /// Drop every cached decode.
    pub fn clear(&self) {
        let mut st = self.lock();
        tracing::debug!(dropped = st.slots.len(), "asset cache cleared");
        st.slots.clear();
    }

    /// Number of decodes performed since construction.
    pub fn decode_count(&self) -> u64 {
        self.decodes.load(Ordering::Relaxed)
    }

    /// Number of cache slots, including failed and in-flight ones.
    pub fn cached_len(&self) -> usize {
        self.lock().slots.len()
    }

    /// `true` if `path` can be found for `variant` without decoding it.
    pub fn exists(&self, path: &str, variant: &str) -> bool {
        let Ok(key) = AssetKey::new(path, variant) else {
            return false;
        };
        let st = self.lock();
        lookup_bytes(&key, &st.project, &st.system).is_some()
    }

    /// Resolve and decode `path`, joining an in-flight decode of the same key.
    pub fn resolve(&self, path: &str, variant: &str) -> PlayerResult<Arc<DecodedAsset>> {
        self.resolve_key(&AssetKey::new(path, variant)?)
    }

    pub fn resolve_key(&self, key: &AssetKey) -> PlayerResult<Arc<DecodedAsset>> {
        let (slot, project, system) = {
            let mut st = self.lock();
            let slot = Arc::clone(st.slots.entry(key.clone()).or_default());
            (slot, Arc::clone(&st.project), Arc::clone(&st.system))
        };

        let out = slot.get_or_init(|| {
            self.decodes.fetch_add(1, Ordering::Relaxed);
            let (found_at, bytes) = lookup_bytes(key, &project, &system)
                .ok_or_else(|| format!("asset '{}' not found", key.path))?;
            let asset = decode_asset(&found_at, &bytes)
                .map_err(|e| format!("asset '{found_at}': {e}"))?;
            tracing::trace!(path = %found_at, "asset decoded");
            Ok(Arc::new(asset))
        });
        out.clone().map_err(PlayerError::asset)
    }

    pub fn resolve_image(&self, path: &str, variant: &str) -> PlayerResult<DecodedImage> {
        let asset = self.resolve(path, variant)?;
        Ok(asset.as_image(path)?.clone())
    }

    pub fn resolve_font(&self, path: &str, variant: &str) -> PlayerResult<DecodedFont> {
        let asset = self.resolve(path, variant)?;
        Ok(asset.as_font(path)?.clone())
    }
}

/// Lookup order: `<variant>/<path>`, then `<path>`; project table before system table.
fn lookup_bytes(
    key: &AssetKey,
    project: &ResourceTable,
    system: &ResourceTable,
) -> Option<(String, Arc<[u8]>)> {
    let mut candidates = Vec::with_capacity(2);
    if !key.variant.is_empty() {
        candidates.push(format!("{}/{}", key.variant, key.path));
    }
    candidates.push(key.path.clone());

    for table in [project, system] {
        for c in &candidates {
            if let Some(bytes) = table.get(c) {
                return Some((c.clone(), Arc::clone(bytes)));
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;
