pub mod persistent;

pub use persistent::PersistentStorage;
