//! Nation - the aggregate root of the simulation

use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::types::{nation_id, Era, GameMode, GovernmentType, MapPoint, Slot};
use crate::crisis::arc::CrisisArc;
use crate::nation::institutions::{Factions, Institutions};
use crate::nation::policy::{push_capped, trim_front, DecisionRecord, PendingConsequence, PolicyCard};
use crate::nation::region::{compute_borders, normalize_regions, Region};
use crate::nation::stats::NationStats;

/// A player's nation in one save slot
///
/// Every field carries a serde default so that partially written records
/// load and are then repaired by [`Nation::normalize`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Nation {
    pub id: String,
    pub user_id: String,
    pub slot: u8,

    // Identity
    pub name: String,
    pub motto: String,
    pub flag: String,
    pub government_type: GovernmentType,
    pub currency: String,
    pub capital: String,
    pub leader: String,

    // Progression
    pub era: Era,
    pub game_mode: GameMode,
    pub issues_resolved: u32,
    pub founded: u64,

    // Simulation state
    pub stats: NationStats,
    pub institutions: Institutions,
    pub factions: Factions,
    pub regions: Vec<Region>,
    pub borders: Vec<MapPoint>,
    pub crisis_arcs: Vec<CrisisArc>,
    pub active_policies: Vec<PolicyCard>,
    pub pending_consequences: Vec<PendingConsequence>,

    // Bounded logs and dedup memory
    pub decision_history: Vec<DecisionRecord>,
    pub history_log: Vec<String>,
    pub used_issue_titles: Vec<String>,
    pub recent_issue_keys: Vec<String>,
}

impl Default for Nation {
    fn default() -> Self {
        Self {
            id: String::new(),
            user_id: String::new(),
            slot: 1,
            name: "Unnamed Nation".into(),
            motto: String::new(),
            flag: String::new(),
            government_type: GovernmentType::default(),
            currency: "Crown".into(),
            capital: "Capital".into(),
            leader: "The Council".into(),
            era: Era::StoneAge,
            game_mode: GameMode::Eternal,
            issues_resolved: 0,
            founded: 0,
            stats: NationStats::default(),
            institutions: Institutions::default(),
            factions: Factions::default(),
            regions: Vec::new(),
            borders: Vec::new(),
            crisis_arcs: Vec::new(),
            active_policies: Vec::new(),
            pending_consequences: Vec::new(),
            decision_history: Vec::new(),
            history_log: Vec::new(),
            used_issue_titles: Vec::new(),
            recent_issue_keys: Vec::new(),
        }
    }
}

/// Player-supplied identity for a new nation
#[derive(Clone, Debug)]
pub struct NewNation {
    pub user_id: String,
    pub slot: Slot,
    pub name: String,
    pub motto: String,
    pub flag: String,
    pub government_type: GovernmentType,
    pub currency: String,
    pub capital: String,
    pub leader: String,
    pub game_mode: GameMode,
}

impl NewNation {
    pub fn new(user_id: impl Into<String>, slot: Slot, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            slot,
            name: name.into(),
            motto: String::new(),
            flag: "🏳️".into(),
            government_type: GovernmentType::default(),
            currency: "Crown".into(),
            capital: "Capital".into(),
            leader: "The Council".into(),
            game_mode: GameMode::Eternal,
        }
    }

    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.game_mode = mode;
        self
    }

    pub fn with_government(mut self, government: GovernmentType) -> Self {
        self.government_type = government;
        self
    }
}

impl Nation {
    pub fn create(new: NewNation, founded: u64, config: &EngineConfig) -> Self {
        let mut nation = Nation {
            id: nation_id(&new.user_id, new.slot),
            user_id: new.user_id,
            slot: new.slot.get(),
            name: new.name,
            motto: new.motto,
            flag: new.flag,
            government_type: new.government_type,
            currency: new.currency,
            capital: new.capital,
            leader: new.leader,
            game_mode: new.game_mode,
            founded,
            ..Nation::default()
        };
        nation.normalize(config);
        nation.log(format!("{} was founded in the {}.", nation.name, nation.era), config);
        nation
    }

    /// Repair every invariant after loading or constructing a nation
    pub fn normalize(&mut self, config: &EngineConfig) {
        self.slot = self.slot.clamp(1, 3);
        if self.id.is_empty() && !self.user_id.is_empty() {
            self.id = format!("{}-slot-{}", self.user_id, self.slot);
        }
        if self.name.trim().is_empty() {
            self.name = "Unnamed Nation".into();
        }

        self.stats.normalize();
        self.institutions.normalize();
        self.factions.normalize();

        normalize_regions(&mut self.regions);
        if self.borders.len() < 3 {
            self.borders = compute_borders(&self.regions);
        }

        for arc in &mut self.crisis_arcs {
            arc.normalize();
        }
        trim_front(&mut self.crisis_arcs, config.max_crisis_arcs);

        for pending in &mut self.pending_consequences {
            pending.consequence.clamp_chance();
        }

        let mut seen = std::collections::HashSet::new();
        self.used_issue_titles
            .retain(|title| seen.insert(title.to_lowercase()));

        trim_front(&mut self.active_policies, config.active_policy_cap);
        trim_front(&mut self.decision_history, config.decision_history_cap);
        trim_front(&mut self.history_log, config.history_log_cap);
        trim_front(&mut self.used_issue_titles, config.used_title_cap);
        trim_front(&mut self.recent_issue_keys, config.recent_key_capacity);
    }

    pub fn log(&mut self, line: impl Into<String>, config: &EngineConfig) {
        push_capped(&mut self.history_log, line.into(), config.history_log_cap);
    }

    pub fn is_title_used(&self, title: &str) -> bool {
        self.used_issue_titles
            .iter()
            .any(|used| used.eq_ignore_ascii_case(title))
    }

    /// Record a title in long-term memory (no duplicates)
    pub fn remember_title(&mut self, title: &str, config: &EngineConfig) {
        if !self.is_title_used(title) {
            push_capped(&mut self.used_issue_titles, title.to_string(), config.used_title_cap);
        }
    }

    pub fn is_key_recent(&self, key: &str) -> bool {
        self.recent_issue_keys.iter().any(|k| k == key)
    }

    /// Push a repeat key into the short-term ring buffer
    pub fn remember_key(&mut self, key: String, config: &EngineConfig) {
        push_capped(&mut self.recent_issue_keys, key, config.recent_key_capacity);
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn region_mut(&mut self, id: &str) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.id == id)
    }

    /// One-line status for logs and the CLI
    pub fn summary(&self) -> String {
        format!(
            "{} ({}, {}) - economy {}, happiness {}, crime {}, technology {}, population {}",
            self.name,
            self.government_type,
            self.era,
            self.stats.economy,
            self.stats.happiness,
            self.stats.crime,
            self.stats.technology,
            self.stats.population
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_nation() -> Nation {
        let config = EngineConfig::default();
        Nation::create(
            NewNation::new("ada", Slot::new(2).unwrap(), "Avalon"),
            1_700_000_000,
            &config,
        )
    }

    #[test]
    fn test_create_seeds_defaults() {
        let nation = new_nation();
        assert_eq!(nation.id, "ada-slot-2");
        assert_eq!(nation.regions.len(), 4);
        assert!(nation.borders.len() >= 3);
        assert_eq!(nation.institutions, Institutions::default());
        assert_eq!(nation.history_log.len(), 1);
    }

    #[test]
    fn test_missing_fields_default() {
        let config = EngineConfig::default();
        let mut nation: Nation =
            serde_json::from_str(r#"{"userId":"bo","slot":1,"name":"Brin","stats":{"happiness":120}}"#)
                .unwrap();
        nation.normalize(&config);
        assert_eq!(nation.id, "bo-slot-1");
        assert_eq!(nation.stats.happiness, 100);
        assert_eq!(nation.stats.economy, 50);
        assert_eq!(nation.regions.len(), 4);
        assert_eq!(nation.factions, Factions::default());
    }

    #[test]
    fn test_recent_keys_ring() {
        let config = EngineConfig::default();
        let mut nation = new_nation();
        for i in 0..30 {
            nation.remember_key(format!("issue:test:{}", i), &config);
        }
        assert_eq!(nation.recent_issue_keys.len(), 18);
        assert!(nation.is_key_recent("issue:test:29"));
        assert!(!nation.is_key_recent("issue:test:11"));
    }

    #[test]
    fn test_remember_title_dedups_case_insensitive() {
        let config = EngineConfig::default();
        let mut nation = new_nation();
        nation.remember_title("Harvest Tithe", &config);
        nation.remember_title("harvest tithe", &config);
        assert_eq!(nation.used_issue_titles.len(), 1);
        assert!(nation.is_title_used("HARVEST TITHE"));
    }

    #[test]
    fn test_history_log_cap() {
        let config = EngineConfig::default();
        let mut nation = new_nation();
        for i in 0..50 {
            nation.log(format!("entry {}", i), &config);
        }
        assert_eq!(nation.history_log.len(), 30);
        assert_eq!(nation.history_log.last().map(String::as_str), Some("entry 49"));
    }
}
