use std::sync::Arc;

use crate::assets::AssetResolver;
use crate::device::DeviceProfile;
use crate::foundation::core::{Point, Rotation};
use crate::foundation::error::{PlayerError, PlayerResult};
use crate::project::Project;
use crate::render::config::RenderLevel;
use crate::runtime::api::DeviceState;
use crate::runtime::drawop::DrawOp;
use crate::runtime::timers::MAX_FIRINGS_PER_TICK;
use crate::runtime::zones::{EventZone, EventZoneRegistry, PointerPhase};
use crate::script::{ExecError, Sandbox, SandboxLimits, Value};
use crate::storage::PersistentStorage;

/// Sandboxed execution context for one project's app logic.
///
/// Lifecycle: [`Runtime::load`] a project, [`Runtime::init`] it, then drive it with
/// [`Runtime::tick`], [`Runtime::shift`], [`Runtime::dispatch_pointer`] and render passes. App
/// faults surface as [`PlayerError::Runtime`] and never leave the runtime unusable; only
/// [`Runtime::dispose`] does.
#[derive(Debug)]
pub struct Runtime {
    project: Option<Project>,
    device: DeviceState,
    sandbox: Option<Sandbox>,
    limits: SandboxLimits,
    paused: bool,
    disposed: bool,
}

impl Runtime {
    /// Runtime bound to `profile`, sharing `resolver` with the render pipeline.
    pub fn new(profile: DeviceProfile, resolver: Arc<AssetResolver>) -> Self {
        Self {
            project: None,
            device: DeviceState::new(profile, resolver),
            sandbox: None,
            limits: SandboxLimits::default(),
            paused: false,
            disposed: false,
        }
    }

    /// Replace the execution limits used from the next entry into app logic.
    pub fn with_limits(mut self, limits: SandboxLimits) -> Self {
        self.limits = limits;
        self
    }

    fn ensure_live(&self) -> PlayerResult<()> {
        if self.disposed {
            return Err(PlayerError::runtime("runtime has been disposed"));
        }
        Ok(())
    }

    fn loaded(&self) -> PlayerResult<&Project> {
        self.ensure_live()?;
        self.project
            .as_ref()
            .ok_or_else(|| PlayerError::runtime("no project loaded"))
    }

    /// Make `project` the active project on `profile`.
    ///
    /// Storage switches to the project's namespace without wiping it; ops, zones, timers and the
    /// sandbox are discarded. A profile change drops the asset cache.
    #[tracing::instrument(skip_all, fields(app_id = project.manifest().app.app_id, profile = profile.name))]
    pub fn load(&mut self, project: Project, profile: DeviceProfile) -> PlayerResult<()> {
        self.ensure_live()?;
        if profile != self.device.profile {
            self.device.resolver.clear();
            self.device.rotation = profile.default_rotation;
        }
        if project.screen() != profile.screen {
            tracing::warn!(
                requested = ?project.screen(),
                device = ?profile.screen,
                "project screen size differs from device profile"
            );
        }
        self.device.profile = profile;
        self.device
            .resolver
            .set_project_resources(Arc::clone(project.resources()), project.fingerprint());
        self.device.storage.set_namespace(project.identity());
        self.device.default_font = project.default_font();
        self.device.reset_transient();
        self.sandbox = None;
        self.project = Some(project);
        Ok(())
    }

    /// Start the loaded project from scratch: fresh globals, no timers, ops or zones, then the
    /// init hook.
    #[tracing::instrument(skip_all)]
    pub fn init(&mut self) -> PlayerResult<()> {
        let project = self.loaded()?.clone();
        self.device.reset_transient();
        self.sandbox = None;

        let sandbox = Sandbox::instantiate(
            Arc::clone(project.program()),
            self.limits,
            &mut self.device,
        )
        .map_err(|e| app_fault("top-level", e))?;
        self.sandbox = Some(sandbox);

        if let Some(hook) = project.hooks().init.as_deref()
            && let Err(e) = self.call_script(hook, Vec::new())
        {
            self.sandbox = None;
            self.device.reset_transient();
            return Err(e);
        }
        tracing::debug!(timers = self.device.timers.len(), "init complete");
        Ok(())
    }

    fn call_script(&mut self, name: &str, args: Vec<Value>) -> PlayerResult<Value> {
        let Some(sandbox) = self.sandbox.as_mut() else {
            return Err(PlayerError::runtime("project is not initialized"));
        };
        sandbox
            .call(name, args, &mut self.device)
            .map_err(|e| app_fault(name, e))
    }

    /// Advance the simulated clock to `now_ms`, firing due timers in order.
    ///
    /// Returns the number of timers fired. While paused the clock still moves but nothing fires;
    /// timers that came due meanwhile fire on the first tick after resuming. The clock never moves
    /// backwards.
    pub fn tick(&mut self, now_ms: u64) -> PlayerResult<usize> {
        self.ensure_live()?;
        let now_ms = now_ms.max(self.device.clock_ms);
        if self.paused || self.sandbox.is_none() {
            self.device.clock_ms = now_ms;
            return Ok(0);
        }

        let mut fired = 0usize;
        loop {
            if fired == MAX_FIRINGS_PER_TICK {
                tracing::warn!(
                    limit = MAX_FIRINGS_PER_TICK,
                    "timer firing cap reached; remaining timers deferred"
                );
                break;
            }
            let Some(timer) = self.device.timers.pop_due(now_ms) else {
                break;
            };
            self.device.clock_ms = self.device.clock_ms.max(timer.due_ms);
            let args = timer.arg.into_iter().collect();
            fired += 1;
            if let Err(e) = self.call_script(&timer.handler, args) {
                self.device.clock_ms = now_ms;
                return Err(e);
            }
        }
        self.device.clock_ms = now_ms;
        Ok(fired)
    }

    /// Advance time by the project's shift step, then run its shift hook.
    pub fn shift(&mut self) -> PlayerResult<()> {
        let project = self.loaded()?;
        let step = project.shift_step_ms();
        let hook = project.hooks().shift.clone();
        self.tick(self.device.clock_ms.saturating_add(step))?;
        if let Some(hook) = hook
            && self.sandbox.is_some()
        {
            self.call_script(&hook, Vec::new())?;
        }
        Ok(())
    }

    /// Run the project's back hook. Returns `false` when it declares none.
    pub fn back(&mut self) -> PlayerResult<bool> {
        let Some(hook) = self.loaded()?.hooks().back.clone() else {
            return Ok(false);
        };
        self.call_script(&hook, Vec::new())?;
        Ok(true)
    }

    pub fn set_pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Deliver a pointer event to the topmost zone under `(x, y)`.
    ///
    /// The zone's handler runs as `handler(phase, x, y)` only if it listens for `phase`; the
    /// matched zone is returned either way.
    pub fn dispatch_pointer(
        &mut self,
        x: f64,
        y: f64,
        phase: PointerPhase,
    ) -> PlayerResult<Option<EventZone>> {
        self.ensure_live()?;
        let Some(zone) = self.device.zones.hit_test(Point::new(x, y)).cloned() else {
            return Ok(None);
        };
        if zone.listens(phase) {
            tracing::debug!(zone = %zone.id, phase = phase.as_str(), "pointer dispatched");
            let args = vec![Value::from(phase.as_str()), Value::Num(x), Value::Num(y)];
            self.call_script(&zone.handler, args)?;
        }
        Ok(Some(zone))
    }

    /// Load the same project again and init it. Storage is left untouched.
    pub fn restart(&mut self) -> PlayerResult<()> {
        let project = self.loaded()?.clone();
        let profile = self.device.profile;
        self.load(project, profile)?;
        self.init()
    }

    /// Wipe the active storage namespace.
    pub fn wipe_storage(&mut self) -> PlayerResult<()> {
        self.ensure_live()?;
        self.device.storage.wipe();
        Ok(())
    }

    /// Swap the device profile; a loaded project is reloaded and re-initialized on it.
    pub fn set_profile(&mut self, profile: DeviceProfile) -> PlayerResult<()> {
        self.ensure_live()?;
        self.device.resolver.clear();
        self.device.rotation = profile.default_rotation;
        let Some(project) = self.project.clone() else {
            self.device.profile = profile;
            return Ok(());
        };
        self.load(project, profile)?;
        self.init()
    }

    /// Release the sandbox. Every later lifecycle call fails.
    pub fn dispose(&mut self) {
        self.sandbox = None;
        self.project = None;
        self.device.reset_transient();
        self.device.console.clear();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// `true` once `init` has succeeded for the loaded project.
    pub fn is_initialized(&self) -> bool {
        self.sandbox.is_some()
    }

    /// Clear ops and zones and run the draw hook.
    pub(crate) fn draw_pass(&mut self, level: RenderLevel, rotation: Rotation) -> PlayerResult<()> {
        let hook = self.loaded()?.hooks().draw.clone();
        if self.sandbox.is_none() {
            return Err(PlayerError::runtime("project is not initialized"));
        }
        self.device.render_level = level;
        self.device.rotation = rotation;
        self.device.ops.clear();
        self.device.zones.clear();
        if let Some(hook) = hook {
            self.call_script(&hook, Vec::new())?;
        }
        Ok(())
    }

    /// Lines logged by app logic since the last drain.
    pub fn drain_console(&mut self) -> Vec<String> {
        std::mem::take(&mut self.device.console)
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.device.profile
    }

    /// Simulated time in milliseconds.
    pub fn now(&self) -> u64 {
        self.device.clock_ms
    }

    /// Ops recorded by the most recent draw.
    pub fn draw_ops(&self) -> &[DrawOp] {
        &self.device.ops
    }

    /// Zones registered by the most recent draw or handler.
    pub fn zones(&self) -> &EventZoneRegistry {
        &self.device.zones
    }

    pub fn pending_timers(&self) -> usize {
        self.device.timers.len()
    }

    pub fn storage(&self) -> &PersistentStorage {
        &self.device.storage
    }

    pub fn storage_mut(&mut self) -> &mut PersistentStorage {
        &mut self.device.storage
    }

    pub fn resolver(&self) -> &Arc<AssetResolver> {
        &self.device.resolver
    }

    /// Read a global of the running program.
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.sandbox.as_ref().and_then(|s| s.global(name))
    }
}

fn app_fault(context: &str, e: ExecError) -> PlayerError {
    tracing::warn!(context, error = %e.message, "app fault");
    PlayerError::runtime(format!("{context}: {}", e.message))
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/runtime.rs"]
mod tests;
