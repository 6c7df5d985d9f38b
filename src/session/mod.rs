//! Active nations: the engine, per-nation scheduler state and the background tick

pub mod engine;
pub mod scheduler;

pub use engine::{GenerationJob, GenerationOutcome, NationEngine, NationSession};
pub use scheduler::{SchedulerState, TickReport};
