//! Engine configuration with documented constants
//!
//! All tuning numbers are collected here. Defaults reproduce the reference
//! pacing; a TOML file may override any subset of them.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{NationError, Result};

/// Configuration for the nation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === EXTERNAL GENERATION ===
    /// Upper bound on a single call to the text generator (seconds)
    ///
    /// A call that runs past this is cancelled and the pipeline drops to the
    /// local sample tables. There is no second attempt in the same cycle.
    pub generation_timeout_secs: u64,

    /// How many of the most recent used titles are sent as `forbidden`
    pub forbidden_titles_in_request: usize,

    /// How many decision history entries are sent as context
    pub history_in_request: usize,

    // === BOUNDED MEMORY ===
    /// Ring buffer size for repeat keys (short-term issue memory)
    pub recent_key_capacity: usize,
    pub active_policy_cap: usize,
    pub decision_history_cap: usize,
    pub history_log_cap: usize,
    /// Long-term title memory; oldest titles fall out first
    pub used_title_cap: usize,

    // === CRISIS ARCS ===
    /// Hard cap on simultaneously active arcs
    pub max_crisis_arcs: usize,

    /// Arcs surfaced on the map
    pub max_map_crises: usize,

    /// New arcs admitted per engine pass (highest pressure first)
    ///
    /// Institutions start at 50 and therefore already sit above the
    /// institution threshold; this keeps a fresh nation from opening with
    /// five simultaneous arcs.
    pub max_new_arcs_per_pass: usize,

    /// Minimum |faction - 50| before a faction seeds an arc
    pub faction_pressure_threshold: i64,

    /// Minimum (100 - institution) before an institution seeds an arc
    pub institution_pressure_threshold: i64,

    /// Minimum policy pressure before the latest policy seeds an arc
    pub policy_pressure_floor: i64,

    /// Pressure at or above which a new arc starts at high severity
    pub high_severity_pressure: i64,

    /// Pressure at or above which a new arc starts at medium severity
    pub medium_severity_pressure: i64,

    /// Ticks an arc sits on a stage before escalating
    pub escalation_ticks: u32,

    /// Ticks an arc may sit on its final stage before breaking down
    pub overdue_ticks: u32,

    /// Net stability pressure (Δhappiness − Δcrime) that calms every arc
    pub de_escalation_threshold: i64,

    pub breakdown_stability_loss: i64,
    pub breakdown_development_loss: i64,

    // === ISSUE CADENCE ===
    /// Regional specialization project every N resolved issues
    pub specialization_cadence: u32,

    /// Era knowledge project every N resolved issues (Eras mode)
    pub era_project_cadence: u32,

    /// Region geometry tick every N resolved issues
    pub geometry_cadence_eras: u32,
    pub geometry_cadence_eternal: u32,

    // === BACKGROUND TIMER ===
    /// Real-time length of one scheduler tick (seconds)
    pub tick_interval_secs: u64,

    /// Pending consequences are rolled every N ticks
    pub consequence_every_ticks: u64,

    /// Crisis arcs are refreshed every N ticks
    pub crisis_refresh_every_ticks: u64,

    // === PERSISTENCE ===
    /// Coalescing window for saves (milliseconds)
    pub save_debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generation_timeout_secs: 15,
            forbidden_titles_in_request: 40,
            history_in_request: 8,

            recent_key_capacity: 18,
            active_policy_cap: 12,
            decision_history_cap: 100,
            history_log_cap: 30,
            used_title_cap: 250,

            max_crisis_arcs: 8,
            max_map_crises: 5,
            max_new_arcs_per_pass: 2,
            faction_pressure_threshold: 18,
            institution_pressure_threshold: 22,
            policy_pressure_floor: 45,
            high_severity_pressure: 80,
            medium_severity_pressure: 60,
            escalation_ticks: 2,
            overdue_ticks: 2,
            de_escalation_threshold: 8,
            breakdown_stability_loss: 10,
            breakdown_development_loss: 5,

            specialization_cadence: 6,
            era_project_cadence: 4,
            geometry_cadence_eras: 3,
            geometry_cadence_eternal: 6,

            tick_interval_secs: 60,
            consequence_every_ticks: 2,
            crisis_refresh_every_ticks: 5,

            save_debounce_ms: 2_000,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// Load a config from a TOML file; missing keys keep their defaults
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| NationError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let capacities = [
            ("recent_key_capacity", self.recent_key_capacity),
            ("active_policy_cap", self.active_policy_cap),
            ("decision_history_cap", self.decision_history_cap),
            ("history_log_cap", self.history_log_cap),
            ("used_title_cap", self.used_title_cap),
            ("max_crisis_arcs", self.max_crisis_arcs),
        ];
        for (name, value) in capacities {
            if value == 0 {
                return Err(NationError::ConfigError(format!("{} must be positive", name)));
            }
        }

        if self.max_map_crises > self.max_crisis_arcs {
            return Err(NationError::ConfigError(format!(
                "max_map_crises ({}) should be <= max_crisis_arcs ({})",
                self.max_map_crises, self.max_crisis_arcs
            )));
        }

        if self.medium_severity_pressure >= self.high_severity_pressure {
            return Err(NationError::ConfigError(format!(
                "medium_severity_pressure ({}) should be < high_severity_pressure ({})",
                self.medium_severity_pressure, self.high_severity_pressure
            )));
        }

        let cadences = [
            self.specialization_cadence,
            self.era_project_cadence,
            self.geometry_cadence_eras,
            self.geometry_cadence_eternal,
        ];
        if cadences.contains(&0)
            || self.consequence_every_ticks == 0
            || self.crisis_refresh_every_ticks == 0
        {
            return Err(NationError::ConfigError("Cadences must be positive".into()));
        }

        if self.generation_timeout_secs == 0 {
            return Err(NationError::ConfigError(
                "generation_timeout_secs must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert_eq!(EngineConfig::default().generation_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::parse_toml("max_new_arcs_per_pass = 3\n").unwrap();
        assert_eq!(config.max_new_arcs_per_pass, 3);
        assert_eq!(config.recent_key_capacity, 18);
    }

    #[test]
    fn test_invalid_severity_order_rejected() {
        let result = EngineConfig::parse_toml(
            "high_severity_pressure = 50\nmedium_severity_pressure = 70\n",
        );
        assert!(matches!(result, Err(NationError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(EngineConfig::parse_toml("recent_key_capacity = \"many\"").is_err());
    }
}
