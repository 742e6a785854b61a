pub mod profile;

pub use profile::{DeviceProfile, ScreenShape};
