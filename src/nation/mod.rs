//! Nation model
//!
//! The aggregate root and the value types hanging off it: bounded stats,
//! institutions and factions, regions with their map geometry, policy cards
//! and delayed consequences.

pub mod institutions;
pub mod policy;
pub mod region;
pub mod state;
pub mod stats;

pub use institutions::{derive_deltas, FactionKind, Factions, InstitutionKind, Institutions};
pub use policy::{Consequence, ConsequenceKind, DecisionRecord, PendingConsequence, PolicyCard};
pub use region::{Region, Specialization, Terrain};
pub use state::{Nation, NewNation};
pub use stats::{Effects, NationStats, StatKey};
