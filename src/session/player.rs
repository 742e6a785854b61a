use std::path::Path;
use std::sync::Arc;

use crate::assets::AssetResolver;
use crate::device::DeviceProfile;
use crate::foundation::error::{PlayerError, PlayerResult};
use crate::project::Project;
use crate::render::{Config, RenderFrame, RenderPipeline};
use crate::runtime::{EventZone, PointerPhase, Runtime};
use crate::script::SandboxLimits;

/// Caller-facing facade over one [`Runtime`], its [`RenderPipeline`] and the shared
/// [`AssetResolver`].
///
/// ```no_run
/// # fn main() -> zepp_player::PlayerResult<()> {
/// let mut player = zepp_player::Player::new("round_192")?;
/// player.load_dir("my_watchface")?;
/// player.init()?;
/// let frame = player.render()?;
/// assert_eq!(frame.width(), 192);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Player {
    resolver: Arc<AssetResolver>,
    runtime: Runtime,
    pipeline: RenderPipeline,
    config: Config,
}

impl Player {
    /// Player on the registry profile `profile_name`.
    pub fn new(profile_name: &str) -> PlayerResult<Self> {
        Ok(Self::with_profile(*DeviceProfile::by_name(profile_name)?))
    }

    pub fn with_profile(profile: DeviceProfile) -> Self {
        let resolver = Arc::new(AssetResolver::new());
        Self {
            runtime: Runtime::new(profile, Arc::clone(&resolver)),
            resolver,
            pipeline: RenderPipeline::new(),
            config: Config::default().with_rotation(profile.default_rotation),
        }
    }

    /// Replace the sandbox limits applied to app logic.
    pub fn with_limits(mut self, limits: SandboxLimits) -> Self {
        self.runtime = self.runtime.with_limits(limits);
        self
    }

    /// Use a dedicated pool of `threads` workers for asset resolution.
    pub fn with_render_threads(mut self, threads: usize) -> PlayerResult<Self> {
        self.pipeline = RenderPipeline::with_threads(threads)?;
        Ok(self)
    }

    /// Make a host resource (default font, skin, failure image) resolvable by every project.
    pub fn register_system_resource(
        &self,
        path: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> PlayerResult<()> {
        self.resolver.register_system_resource(path, bytes)
    }

    /// Load a project bundle directory on the current profile.
    #[tracing::instrument(skip(self, root), fields(root = %root.as_ref().display()))]
    pub fn load_dir(&mut self, root: impl AsRef<Path>) -> PlayerResult<()> {
        let project = Project::from_dir(root)?;
        self.load(project)
    }

    pub fn load(&mut self, project: Project) -> PlayerResult<()> {
        let profile = *self.runtime.profile();
        self.runtime.load(project, profile)
    }

    pub fn init(&mut self) -> PlayerResult<()> {
        self.runtime.init()
    }

    /// Render one pass with the current [`Config`].
    pub fn render(&mut self) -> PlayerResult<RenderFrame> {
        self.pipeline.render(&mut self.runtime, &self.config)
    }

    /// Render one pass; a failed pass yields a placeholder frame and the error.
    pub fn render_or_placeholder(&mut self) -> (RenderFrame, Option<PlayerError>) {
        self.pipeline
            .render_or_placeholder(&mut self.runtime, &self.config)
    }

    /// Advance the simulated clock to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> PlayerResult<usize> {
        self.runtime.tick(now_ms)
    }

    /// Advance the simulated clock by `delta_ms`.
    pub fn advance(&mut self, delta_ms: u64) -> PlayerResult<usize> {
        let now = self.runtime.now().saturating_add(delta_ms);
        self.runtime.tick(now)
    }

    pub fn shift(&mut self) -> PlayerResult<()> {
        self.runtime.shift()
    }

    pub fn back(&mut self) -> PlayerResult<bool> {
        self.runtime.back()
    }

    pub fn set_pause(&mut self, paused: bool) {
        self.runtime.set_pause(paused);
    }

    pub fn is_paused(&self) -> bool {
        self.runtime.is_paused()
    }

    /// Deliver a pointer event in device coordinates.
    pub fn dispatch_pointer(
        &mut self,
        x: f64,
        y: f64,
        phase: PointerPhase,
    ) -> PlayerResult<Option<EventZone>> {
        self.runtime.dispatch_pointer(x, y, phase)
    }

    /// Reload and re-init the current project, keeping storage.
    pub fn restart(&mut self) -> PlayerResult<()> {
        self.runtime.restart()
    }

    /// Wipe the project's storage, then re-init it.
    pub fn reload(&mut self) -> PlayerResult<()> {
        self.runtime.wipe_storage()?;
        self.runtime.init()
    }

    pub fn dispose(&mut self) {
        self.runtime.dispose();
    }

    /// Switch to the registry profile `name`, re-initializing a loaded project on it.
    ///
    /// The output rotation resets to the new profile's default.
    pub fn set_profile(&mut self, name: &str) -> PlayerResult<()> {
        let profile = *DeviceProfile::by_name(name)?;
        self.runtime.set_profile(profile)?;
        self.config.rotation = profile.default_rotation;
        Ok(())
    }

    pub fn profile(&self) -> &DeviceProfile {
        self.runtime.profile()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }

    pub fn resolver(&self) -> &Arc<AssetResolver> {
        &self.resolver
    }

    /// Lines logged by app logic since the last drain.
    pub fn drain_console(&mut self) -> Vec<String> {
        self.runtime.drain_console()
    }

    /// Snapshot of every storage namespace.
    pub fn export_storage(&self) -> serde_json::Value {
        self.runtime.storage().export()
    }

    /// Replace all storage with a snapshot from [`export_storage`](Self::export_storage).
    pub fn import_storage(&mut self, snapshot: serde_json::Value) -> PlayerResult<()> {
        self.runtime.storage_mut().import(snapshot)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/player.rs"]
mod tests;
