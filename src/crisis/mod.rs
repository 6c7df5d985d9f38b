//! Background crisis system
//!
//! Pressure from factions, institutions and policies turns into staged arcs
//! pinned to regions. Arcs escalate over time, can be targeted by issues, and
//! break down when ignored.

pub mod arc;
pub mod engine;
pub mod pressure;

pub use arc::{crisis_repeat_key, CrisisArc, CrisisSource, CrisisType, Severity};
pub use engine::{
    advance_and_merge, build_map_crises, merge_arcs, refresh, resolve_after_decision,
    CrisisReport, CrisisTarget,
};
pub use pressure::{detect_pressure, generate_candidates, PressureCandidate};
