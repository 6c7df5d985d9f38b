//! Storage record for one nation
//!
//! Identity and progression are plain columns. Everything structured is kept
//! as an opaque JSON blob so the record layout does not change when the
//! nation model grows. Loading is lenient: a blob that does not parse falls
//! back to its default and the nation is normalized afterwards.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::core::types::{Era, GameMode, GovernmentType};
use crate::nation::Nation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationRecord {
    pub id: String,
    pub user_id: String,
    pub slot: u8,
    pub name: String,
    #[serde(default)]
    pub motto: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub government_type: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub capital: String,
    #[serde(default)]
    pub leader: String,
    #[serde(default)]
    pub era: String,
    #[serde(default)]
    pub game_mode: String,
    #[serde(default)]
    pub issues_resolved: u32,
    #[serde(default)]
    pub founded: u64,

    // JSON blobs
    #[serde(default)]
    pub stats: String,
    #[serde(default)]
    pub institutions: String,
    #[serde(default)]
    pub factions: String,
    #[serde(default)]
    pub regions: String,
    #[serde(default)]
    pub crisis_arcs: String,
    #[serde(default)]
    pub active_policies: String,
    #[serde(default)]
    pub history_log: String,
    #[serde(default)]
    pub decision_history: String,
    #[serde(default)]
    pub used_issue_titles: String,
    #[serde(default)]
    pub recent_issue_keys: String,
    #[serde(default)]
    pub pending_consequences: String,
    #[serde(default)]
    pub borders: String,
}

fn parse_blob<T: DeserializeOwned + Default>(nation_id: &str, field: &str, blob: &str) -> T {
    if blob.trim().is_empty() {
        return T::default();
    }
    match serde_json::from_str(blob) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Nation {}: unreadable {} blob, using default: {}", nation_id, field, e);
            T::default()
        }
    }
}

impl NationRecord {
    pub fn from_nation(nation: &Nation) -> Result<Self> {
        Ok(Self {
            id: nation.id.clone(),
            user_id: nation.user_id.clone(),
            slot: nation.slot,
            name: nation.name.clone(),
            motto: nation.motto.clone(),
            flag: nation.flag.clone(),
            government_type: nation.government_type.name().to_string(),
            currency: nation.currency.clone(),
            capital: nation.capital.clone(),
            leader: nation.leader.clone(),
            era: nation.era.name().to_string(),
            game_mode: nation.game_mode.as_str().to_string(),
            issues_resolved: nation.issues_resolved,
            founded: nation.founded,
            stats: serde_json::to_string(&nation.stats)?,
            institutions: serde_json::to_string(&nation.institutions)?,
            factions: serde_json::to_string(&nation.factions)?,
            regions: serde_json::to_string(&nation.regions)?,
            crisis_arcs: serde_json::to_string(&nation.crisis_arcs)?,
            active_policies: serde_json::to_string(&nation.active_policies)?,
            history_log: serde_json::to_string(&nation.history_log)?,
            decision_history: serde_json::to_string(&nation.decision_history)?,
            used_issue_titles: serde_json::to_string(&nation.used_issue_titles)?,
            recent_issue_keys: serde_json::to_string(&nation.recent_issue_keys)?,
            pending_consequences: serde_json::to_string(&nation.pending_consequences)?,
            borders: serde_json::to_string(&nation.borders)?,
        })
    }

    /// Rebuild the nation, repairing anything that did not survive storage
    pub fn into_nation(self, config: &EngineConfig) -> Nation {
        let id = self.id.as_str();
        let era = Era::from_name(&self.era).unwrap_or_else(|| {
            if !self.era.is_empty() {
                tracing::warn!("Nation {}: unknown era '{}', starting over", id, self.era);
            }
            Era::default()
        });
        let game_mode = match self.game_mode.as_str() {
            "Eras" => GameMode::Eras,
            _ => GameMode::Eternal,
        };

        let mut nation = Nation {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            slot: self.slot,
            name: self.name.clone(),
            motto: self.motto.clone(),
            flag: self.flag.clone(),
            government_type: GovernmentType::from(self.government_type.clone()),
            currency: self.currency.clone(),
            capital: self.capital.clone(),
            leader: self.leader.clone(),
            era,
            game_mode,
            issues_resolved: self.issues_resolved,
            founded: self.founded,
            stats: parse_blob(id, "stats", &self.stats),
            institutions: parse_blob(id, "institutions", &self.institutions),
            factions: parse_blob(id, "factions", &self.factions),
            regions: parse_blob(id, "regions", &self.regions),
            borders: parse_blob(id, "borders", &self.borders),
            crisis_arcs: parse_blob(id, "crisisArcs", &self.crisis_arcs),
            active_policies: parse_blob(id, "activePolicies", &self.active_policies),
            pending_consequences: parse_blob(id, "pendingConsequences", &self.pending_consequences),
            decision_history: parse_blob(id, "decisionHistory", &self.decision_history),
            history_log: parse_blob(id, "historyLog", &self.history_log),
            used_issue_titles: parse_blob(id, "usedIssueTitles", &self.used_issue_titles),
            recent_issue_keys: parse_blob(id, "recentIssueKeys", &self.recent_issue_keys),
        };
        nation.normalize(config);
        nation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Slot;
    use crate::nation::NewNation;

    fn nation() -> Nation {
        Nation::create(
            NewNation::new("rec", Slot::new(3).unwrap(), "Recordia")
                .with_mode(GameMode::Eras)
                .with_government(GovernmentType::Theocracy),
            1_700_000_000,
            &EngineConfig::default(),
        )
    }

    #[test]
    fn test_round_trip() {
        let config = EngineConfig::default();
        let n = nation();
        let record = NationRecord::from_nation(&n).unwrap();
        assert_eq!(record.era, "Stone Age");
        assert_eq!(record.game_mode, "Eras");
        assert_eq!(record.into_nation(&config), n);
    }

    #[test]
    fn test_corrupt_blob_falls_back() {
        let config = EngineConfig::default();
        let n = nation();
        let mut record = NationRecord::from_nation(&n).unwrap();
        record.stats = "{\"economy\": \"lots\"".into();
        record.regions = "not json".into();

        let loaded = record.into_nation(&config);
        assert_eq!(loaded.stats, Default::default());
        assert_eq!(loaded.regions.len(), n.regions.len());
        assert_eq!(loaded.name, "Recordia");
    }

    #[test]
    fn test_unknown_government_kept() {
        let config = EngineConfig::default();
        let mut record = NationRecord::from_nation(&nation()).unwrap();
        record.government_type = "Merchant Guild".into();
        let loaded = record.into_nation(&config);
        assert_eq!(loaded.government_type, GovernmentType::Other("Merchant Guild".into()));
    }
}
