pub mod config;
pub mod error;
pub mod seed;
pub mod types;

pub use config::EngineConfig;
pub use error::{NationError, Result};
pub use types::{Era, GameMode, GovernmentType, MapPoint, Slot};
