//! Applying the player's choices: decision resolution and delayed consequences

pub mod consequence;
pub mod resolve;

pub use consequence::{roll_consequence, ConsequenceRoll};
pub use resolve::{resolve_decision, DecisionReport, Resolution};
