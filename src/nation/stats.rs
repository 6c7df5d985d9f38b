//! Nation statistics and the delta application rule

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stat key → delta. Keys are free-form strings because they arrive from
/// generated content; unknown keys are ignored when applied.
pub type Effects = BTreeMap<String, i64>;

pub const POPULATION_FLOOR: i64 = 1_000;
pub const GDP_FLOOR: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatKey {
    Economy,
    CivilRights,
    PoliticalFreedom,
    Environment,
    Happiness,
    Crime,
    Education,
    Healthcare,
    Technology,
    Population,
    Gdp,
}

impl StatKey {
    pub const ALL: [StatKey; 11] = [
        StatKey::Economy,
        StatKey::CivilRights,
        StatKey::PoliticalFreedom,
        StatKey::Environment,
        StatKey::Happiness,
        StatKey::Crime,
        StatKey::Education,
        StatKey::Healthcare,
        StatKey::Technology,
        StatKey::Population,
        StatKey::Gdp,
    ];

    pub const BOUNDED: [StatKey; 9] = [
        StatKey::Economy,
        StatKey::CivilRights,
        StatKey::PoliticalFreedom,
        StatKey::Environment,
        StatKey::Happiness,
        StatKey::Crime,
        StatKey::Education,
        StatKey::Healthcare,
        StatKey::Technology,
    ];

    /// Canonical (camelCase) key as used in effect maps
    pub fn key(&self) -> &'static str {
        match self {
            StatKey::Economy => "economy",
            StatKey::CivilRights => "civilRights",
            StatKey::PoliticalFreedom => "politicalFreedom",
            StatKey::Environment => "environment",
            StatKey::Happiness => "happiness",
            StatKey::Crime => "crime",
            StatKey::Education => "education",
            StatKey::Healthcare => "healthcare",
            StatKey::Technology => "technology",
            StatKey::Population => "population",
            StatKey::Gdp => "gdp",
        }
    }

    /// Parse a key leniently: case, `_` and `-` are ignored
    pub fn parse(key: &str) -> Option<StatKey> {
        let folded: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(|c| c.to_lowercase())
            .collect();
        StatKey::ALL
            .iter()
            .copied()
            .find(|stat| stat.key().to_lowercase() == folded)
    }

    pub fn is_bounded(&self) -> bool {
        self.floor().is_none()
    }

    /// Floor for multiplicative stats, `None` for bounded ones
    pub fn floor(&self) -> Option<i64> {
        match self {
            StatKey::Population => Some(POPULATION_FLOOR),
            StatKey::Gdp => Some(GDP_FLOOR),
            _ => None,
        }
    }

    /// Apply a delta to a current value.
    ///
    /// Bounded stats add and clamp to `[0, 100]`. Population and GDP treat the
    /// delta as a percentage change and never drop below their floor.
    pub fn apply_delta(&self, current: i64, delta: i64) -> i64 {
        match self.floor() {
            None => (current + delta).clamp(0, 100),
            Some(floor) => {
                let scaled = (current as f64) * (1.0 + delta as f64 / 100.0);
                (scaled.round() as i64).max(floor)
            }
        }
    }
}

/// Sum of all entries in `effects` that name `stat`
pub fn effect(effects: &Effects, stat: StatKey) -> i64 {
    effects
        .iter()
        .filter(|(key, _)| StatKey::parse(key) == Some(stat))
        .map(|(_, delta)| *delta)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NationStats {
    pub economy: i64,
    pub civil_rights: i64,
    pub political_freedom: i64,
    pub environment: i64,
    pub happiness: i64,
    pub crime: i64,
    pub education: i64,
    pub healthcare: i64,
    pub technology: i64,
    pub population: i64,
    pub gdp: i64,
}

impl Default for NationStats {
    fn default() -> Self {
        Self {
            economy: 50,
            civil_rights: 50,
            political_freedom: 50,
            environment: 60,
            happiness: 55,
            crime: 30,
            education: 40,
            healthcare: 40,
            technology: 10,
            population: 1_000_000,
            gdp: 25_000,
        }
    }
}

impl NationStats {
    pub fn get(&self, stat: StatKey) -> i64 {
        match stat {
            StatKey::Economy => self.economy,
            StatKey::CivilRights => self.civil_rights,
            StatKey::PoliticalFreedom => self.political_freedom,
            StatKey::Environment => self.environment,
            StatKey::Happiness => self.happiness,
            StatKey::Crime => self.crime,
            StatKey::Education => self.education,
            StatKey::Healthcare => self.healthcare,
            StatKey::Technology => self.technology,
            StatKey::Population => self.population,
            StatKey::Gdp => self.gdp,
        }
    }

    fn slot_mut(&mut self, stat: StatKey) -> &mut i64 {
        match stat {
            StatKey::Economy => &mut self.economy,
            StatKey::CivilRights => &mut self.civil_rights,
            StatKey::PoliticalFreedom => &mut self.political_freedom,
            StatKey::Environment => &mut self.environment,
            StatKey::Happiness => &mut self.happiness,
            StatKey::Crime => &mut self.crime,
            StatKey::Education => &mut self.education,
            StatKey::Healthcare => &mut self.healthcare,
            StatKey::Technology => &mut self.technology,
            StatKey::Population => &mut self.population,
            StatKey::Gdp => &mut self.gdp,
        }
    }

    /// Set a stat, enforcing its bounds
    pub fn set(&mut self, stat: StatKey, value: i64) {
        let value = match stat.floor() {
            None => value.clamp(0, 100),
            Some(floor) => value.max(floor),
        };
        *self.slot_mut(stat) = value;
    }

    pub fn apply(&mut self, stat: StatKey, delta: i64) {
        let slot = self.slot_mut(stat);
        *slot = stat.apply_delta(*slot, delta);
    }

    /// Apply one effect entry. Returns false (and changes nothing) for an unknown key.
    pub fn apply_effect(&mut self, key: &str, delta: i64) -> bool {
        match StatKey::parse(key) {
            Some(stat) => {
                self.apply(stat, delta);
                true
            }
            None => false,
        }
    }

    pub fn apply_effects(&mut self, effects: &Effects) {
        for (key, delta) in effects {
            if !self.apply_effect(key, *delta) {
                tracing::debug!("Ignoring unknown stat key '{}'", key);
            }
        }
    }

    /// Force every field back inside its bounds
    pub fn normalize(&mut self) {
        for stat in StatKey::ALL {
            let value = self.get(stat);
            self.set(stat, value);
        }
    }
}
