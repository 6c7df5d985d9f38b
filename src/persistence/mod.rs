//! Saving and loading nations

pub mod debounce;
pub mod record;
pub mod store;

pub use debounce::SaveDebouncer;
pub use record::NationRecord;
pub use store::{JsonFileStore, MemoryStore, NationStore};
