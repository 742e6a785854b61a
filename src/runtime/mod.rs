//! Sandboxed app execution and the emulated device API.

pub(crate) mod api;
pub mod drawop;
#[allow(clippy::module_inception)]
pub mod runtime;
pub mod timers;
pub mod zones;

pub use drawop::DrawOp;
pub use runtime::Runtime;
pub use timers::Timer;
pub use zones::{EventZone, EventZoneRegistry, PointerPhase, ZoneShape};
