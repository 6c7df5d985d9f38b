//! Policy cards, delayed consequences and decision records

use serde::{Deserialize, Serialize};

use crate::core::types::Era;
use crate::nation::stats::Effects;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsequenceKind {
    Benefit,
    #[default]
    Downside,
}

/// Delayed, probabilistic secondary effect attached to an option
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consequence {
    pub text: String,
    /// Probability in `[0, 1]` that the consequence fires when rolled
    pub chance: f64,
    #[serde(rename = "type", default)]
    pub kind: ConsequenceKind,
    #[serde(default)]
    pub stat_effects: Effects,
}

impl Consequence {
    pub fn clamp_chance(&mut self) {
        self.chance = if self.chance.is_finite() {
            self.chance.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingConsequence {
    pub issue_title: String,
    pub option_text: String,
    pub consequence: Consequence,
}

/// A decision as it stays visible in the nation's active policy strip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCard {
    pub issue_title: String,
    pub option_text: String,
    #[serde(default)]
    pub supporter: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub effects: Effects,
    #[serde(default)]
    pub era: Era,
    #[serde(default)]
    pub issue_number: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub issue_number: u32,
    pub era: Era,
    pub issue_title: String,
    pub option_text: String,
    #[serde(default)]
    pub effects: Effects,
}

impl DecisionRecord {
    pub fn summary(&self) -> String {
        format!(
            "#{} [{}] {}: {}",
            self.issue_number, self.era, self.issue_title, self.option_text
        )
    }
}

/// Append and drop the oldest entries beyond `cap`
pub fn push_capped<T>(items: &mut Vec<T>, item: T, cap: usize) {
    items.push(item);
    trim_front(items, cap);
}

pub fn trim_front<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        let excess = items.len() - cap;
        items.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_capped_is_fifo() {
        let mut items = Vec::new();
        for i in 0..20 {
            push_capped(&mut items, i, 12);
        }
        assert_eq!(items.len(), 12);
        assert_eq!(items.first(), Some(&8));
        assert_eq!(items.last(), Some(&19));
    }

    #[test]
    fn test_consequence_json_shape() {
        let json = r#"{"text":"Floods recede","chance":0.4,"type":"benefit","statEffects":{"economy":3}}"#;
        let consequence: Consequence = serde_json::from_str(json).unwrap();
        assert_eq!(consequence.kind, ConsequenceKind::Benefit);
        assert_eq!(consequence.stat_effects.get("economy"), Some(&3));
    }

    #[test]
    fn test_clamp_chance() {
        let mut consequence = Consequence {
            text: "x".into(),
            chance: 1.7,
            kind: ConsequenceKind::Downside,
            stat_effects: Effects::new(),
        };
        consequence.clamp_chance();
        assert_eq!(consequence.chance, 1.0);
        consequence.chance = f64::NAN;
        consequence.clamp_chance();
        assert_eq!(consequence.chance, 0.0);
    }

    #[test]
    fn test_record_summary() {
        let record = DecisionRecord {
            issue_number: 4,
            era: Era::BronzeAge,
            issue_title: "Granary Rights".into(),
            option_text: "Share the harvest".into(),
            effects: Effects::new(),
        };
        assert_eq!(record.summary(), "#4 [Bronze Age] Granary Rights: Share the harvest");
    }
}
