//! Institutions and factions
//!
//! Both are secondary 0-100 scalars the player never sets directly. Every
//! resolved decision derives integer deltas for them from the option's stat
//! effects through fixed linear combinations.

use serde::{Deserialize, Serialize};

use crate::core::types::GovernmentType;
use crate::nation::stats::{effect, Effects, StatKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstitutionKind {
    Governance,
    Economy,
    Welfare,
    Security,
    Knowledge,
}

impl InstitutionKind {
    pub const ALL: [InstitutionKind; 5] = [
        InstitutionKind::Governance,
        InstitutionKind::Economy,
        InstitutionKind::Welfare,
        InstitutionKind::Security,
        InstitutionKind::Knowledge,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InstitutionKind::Governance => "governance",
            InstitutionKind::Economy => "economy",
            InstitutionKind::Welfare => "welfare",
            InstitutionKind::Security => "security",
            InstitutionKind::Knowledge => "knowledge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FactionKind {
    Citizens,
    Elites,
    Innovators,
    Traditionalists,
    SecurityCouncil,
}

impl FactionKind {
    pub const ALL: [FactionKind; 5] = [
        FactionKind::Citizens,
        FactionKind::Elites,
        FactionKind::Innovators,
        FactionKind::Traditionalists,
        FactionKind::SecurityCouncil,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FactionKind::Citizens => "citizens",
            FactionKind::Elites => "elites",
            FactionKind::Innovators => "innovators",
            FactionKind::Traditionalists => "traditionalists",
            FactionKind::SecurityCouncil => "securityCouncil",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Institutions {
    pub governance: i64,
    pub economy: i64,
    pub welfare: i64,
    pub security: i64,
    pub knowledge: i64,
}

impl Default for Institutions {
    fn default() -> Self {
        Self {
            governance: 50,
            economy: 50,
            welfare: 50,
            security: 50,
            knowledge: 50,
        }
    }
}

impl Institutions {
    pub fn get(&self, kind: InstitutionKind) -> i64 {
        match kind {
            InstitutionKind::Governance => self.governance,
            InstitutionKind::Economy => self.economy,
            InstitutionKind::Welfare => self.welfare,
            InstitutionKind::Security => self.security,
            InstitutionKind::Knowledge => self.knowledge,
        }
    }

    pub fn set(&mut self, kind: InstitutionKind, value: i64) {
        let value = value.clamp(0, 100);
        match kind {
            InstitutionKind::Governance => self.governance = value,
            InstitutionKind::Economy => self.economy = value,
            InstitutionKind::Welfare => self.welfare = value,
            InstitutionKind::Security => self.security = value,
            InstitutionKind::Knowledge => self.knowledge = value,
        }
    }

    pub fn normalize(&mut self) {
        for kind in InstitutionKind::ALL {
            self.set(kind, self.get(kind));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Factions {
    pub citizens: i64,
    pub elites: i64,
    pub innovators: i64,
    pub traditionalists: i64,
    pub security_council: i64,
}

impl Default for Factions {
    fn default() -> Self {
        Self {
            citizens: 50,
            elites: 50,
            innovators: 50,
            traditionalists: 50,
            security_council: 50,
        }
    }
}

impl Factions {
    pub fn get(&self, kind: FactionKind) -> i64 {
        match kind {
            FactionKind::Citizens => self.citizens,
            FactionKind::Elites => self.elites,
            FactionKind::Innovators => self.innovators,
            FactionKind::Traditionalists => self.traditionalists,
            FactionKind::SecurityCouncil => self.security_council,
        }
    }

    pub fn set(&mut self, kind: FactionKind, value: i64) {
        let value = value.clamp(0, 100);
        match kind {
            FactionKind::Citizens => self.citizens = value,
            FactionKind::Elites => self.elites = value,
            FactionKind::Innovators => self.innovators = value,
            FactionKind::Traditionalists => self.traditionalists = value,
            FactionKind::SecurityCouncil => self.security_council = value,
        }
    }

    pub fn normalize(&mut self) {
        for kind in FactionKind::ALL {
            self.set(kind, self.get(kind));
        }
    }
}

/// Per-institution and per-faction integer deltas for one decision
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedDeltas {
    pub institutions: Vec<(InstitutionKind, i64)>,
    pub factions: Vec<(FactionKind, i64)>,
}

impl DerivedDeltas {
    pub fn institution(&self, kind: InstitutionKind) -> i64 {
        self.institutions
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, d)| *d)
            .unwrap_or(0)
    }

    pub fn faction(&self, kind: FactionKind) -> i64 {
        self.factions
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, d)| *d)
            .unwrap_or(0)
    }
}

fn r(value: f64) -> i64 {
    value.round() as i64
}

/// Derive institution and faction deltas from an option's effects
pub fn derive_deltas(effects: &Effects, government: &GovernmentType) -> DerivedDeltas {
    let d = |stat: StatKey| effect(effects, stat) as f64;

    let economy = d(StatKey::Economy);
    let civil_rights = d(StatKey::CivilRights);
    let freedom = d(StatKey::PoliticalFreedom);
    let environment = d(StatKey::Environment);
    let happiness = d(StatKey::Happiness);
    let crime = d(StatKey::Crime);
    let education = d(StatKey::Education);
    let healthcare = d(StatKey::Healthcare);
    let technology = d(StatKey::Technology);
    let gdp = d(StatKey::Gdp);

    let institutions = vec![
        (
            InstitutionKind::Governance,
            r(0.5 * freedom + 0.3 * civil_rights - 0.2 * crime),
        ),
        (InstitutionKind::Economy, r(0.6 * economy + 0.2 * gdp)),
        (
            InstitutionKind::Welfare,
            r(0.4 * happiness + 0.4 * healthcare + 0.2 * education),
        ),
        (InstitutionKind::Security, r(-0.6 * crime + 0.1 * civil_rights)),
        (InstitutionKind::Knowledge, r(0.5 * education + 0.5 * technology)),
    ];

    let mut citizens = r(0.4 * (happiness + freedom) + 0.2 * civil_rights);
    let mut security_council = r(-0.4 * crime - 0.2 * freedom);
    if government.is_autocratic() {
        citizens -= 2;
        security_council += 3;
    }

    let factions = vec![
        (FactionKind::Citizens, citizens),
        (FactionKind::Elites, r(0.35 * (economy - freedom) + 0.1 * gdp)),
        (
            FactionKind::Innovators,
            r(0.4 * technology + 0.3 * education + 0.1 * freedom),
        ),
        (
            FactionKind::Traditionalists,
            r(-0.25 * (technology + civil_rights) + 0.2 * environment),
        ),
        (FactionKind::SecurityCouncil, security_council),
    ];

    DerivedDeltas {
        institutions,
        factions,
    }
}

/// Add derived deltas to the current scalars, clamping each to `[0, 100]`
pub fn apply_deltas(institutions: &mut Institutions, factions: &mut Factions, deltas: &DerivedDeltas) {
    for (kind, delta) in &deltas.institutions {
        institutions.set(*kind, institutions.get(*kind) + delta);
    }
    for (kind, delta) in &deltas.factions {
        factions.set(*kind, factions.get(*kind) + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effects(pairs: &[(&str, i64)]) -> Effects {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_happiness_and_crime_feed_welfare_and_citizens() {
        let deltas = derive_deltas(
            &effects(&[("happiness", 10), ("crime", -5)]),
            &GovernmentType::Democracy,
        );
        assert_eq!(deltas.institution(InstitutionKind::Welfare), 4);
        assert_eq!(deltas.institution(InstitutionKind::Security), 3);
        assert_eq!(deltas.faction(FactionKind::Citizens), 4);
        assert_eq!(deltas.faction(FactionKind::SecurityCouncil), 2);
    }

    #[test]
    fn test_autocracy_bias_applies_without_effects() {
        let deltas = derive_deltas(&Effects::new(), &GovernmentType::Authoritarian);
        assert_eq!(deltas.faction(FactionKind::SecurityCouncil), 3);
        assert_eq!(deltas.faction(FactionKind::Citizens), -2);

        let neutral = derive_deltas(&Effects::new(), &GovernmentType::Republic);
        assert!(neutral.factions.iter().all(|(_, d)| *d == 0));
        assert!(neutral.institutions.iter().all(|(_, d)| *d == 0));
    }

    #[test]
    fn test_elites_like_economy_over_freedom() {
        let deltas = derive_deltas(
            &effects(&[("economy", 10), ("politicalFreedom", -10)]),
            &GovernmentType::Monarchy,
        );
        assert_eq!(deltas.faction(FactionKind::Elites), 7);
        assert!(deltas.faction(FactionKind::Citizens) < 0);
    }

    #[test]
    fn test_apply_clamps() {
        let mut institutions = Institutions {
            knowledge: 98,
            ..Institutions::default()
        };
        let mut factions = Factions {
            citizens: 1,
            ..Factions::default()
        };
        let deltas = derive_deltas(
            &effects(&[("technology", 20), ("happiness", -20)]),
            &GovernmentType::Democracy,
        );
        apply_deltas(&mut institutions, &mut factions, &deltas);
        assert_eq!(institutions.knowledge, 100);
        assert_eq!(factions.citizens, 0);
    }

    #[test]
    fn test_faction_serialization_uses_camel_case() {
        let json = serde_json::to_value(Factions::default()).unwrap();
        assert!(json.get("securityCouncil").is_some());
    }
}
