//! Pressure detection - turns strained factions, weak institutions and
//! disruptive policies into new crisis arc candidates

use crate::core::config::EngineConfig;
use crate::core::seed;
use crate::core::types::MapPoint;
use crate::crisis::arc::{crisis_repeat_key, CrisisArc, CrisisSource, CrisisType, Severity};
use crate::nation::institutions::{FactionKind, InstitutionKind};
use crate::nation::region::{MAP_MAX, MAP_MIN};
use crate::nation::stats::{effect, StatKey};
use crate::nation::Nation;

const MARKER_SPREAD: f64 = 6.0;

/// A source of pressure before it is placed on the map
#[derive(Debug, Clone, PartialEq)]
pub struct PressureCandidate {
    pub source: CrisisSource,
    pub crisis_type: CrisisType,
    pub pressure: i64,
    pub reason: String,
}

pub fn faction_crisis_type(kind: FactionKind) -> CrisisType {
    match kind {
        FactionKind::Citizens => CrisisType::Unrest,
        FactionKind::Elites => CrisisType::Corruption,
        FactionKind::Innovators => CrisisType::Innovation,
        FactionKind::Traditionalists => CrisisType::Unrest,
        FactionKind::SecurityCouncil => CrisisType::Security,
    }
}

pub fn institution_crisis_type(kind: InstitutionKind) -> CrisisType {
    match kind {
        InstitutionKind::Governance => CrisisType::Corruption,
        InstitutionKind::Economy => CrisisType::Infrastructure,
        InstitutionKind::Welfare => CrisisType::Health,
        InstitutionKind::Security => CrisisType::Security,
        InstitutionKind::Knowledge => CrisisType::Innovation,
    }
}

/// Scan factions, institutions and the latest policy for pressure
pub fn detect_pressure(nation: &Nation, config: &EngineConfig) -> Vec<PressureCandidate> {
    let mut candidates = Vec::new();

    for kind in FactionKind::ALL {
        let value = nation.factions.get(kind);
        let distance = (value - 50).abs();
        if distance >= config.faction_pressure_threshold {
            let mood = if value < 50 { "resentment" } else { "overreach" };
            candidates.push(PressureCandidate {
                source: CrisisSource::Faction(kind),
                crisis_type: faction_crisis_type(kind),
                pressure: (2 * distance).min(100),
                reason: format!("{} {} at {}", kind.name(), mood, value),
            });
        }
    }

    for kind in InstitutionKind::ALL {
        let value = nation.institutions.get(kind);
        let deficit = 100 - value;
        if deficit >= config.institution_pressure_threshold {
            candidates.push(PressureCandidate {
                source: CrisisSource::Institution(kind),
                crisis_type: institution_crisis_type(kind),
                pressure: deficit,
                reason: format!("{} institution weakened to {}", kind.name(), value),
            });
        }
    }

    if let Some(policy) = nation.active_policies.last() {
        let freedom = effect(&policy.effects, StatKey::PoliticalFreedom).abs();
        let economy = effect(&policy.effects, StatKey::Economy).abs();
        let pressure = (30 + freedom + economy).min(95);
        if pressure >= config.policy_pressure_floor {
            let crisis_type = if freedom >= economy {
                CrisisType::Unrest
            } else {
                CrisisType::Corruption
            };
            candidates.push(PressureCandidate {
                source: CrisisSource::Policy,
                crisis_type,
                pressure,
                reason: format!("backlash against \"{}\"", policy.issue_title),
            });
        }
    }

    candidates
}

/// Place a candidate in a region and give it a stage ladder
pub fn place_candidate(
    nation: &Nation,
    candidate: &PressureCandidate,
    config: &EngineConfig,
) -> Option<CrisisArc> {
    if nation.regions.is_empty() {
        return None;
    }
    let seed_key = format!(
        "{}:{}:{}",
        nation.id,
        candidate.source.key(),
        candidate.crisis_type.name()
    );
    let region = &nation.regions[seed::pick(&seed_key, nation.regions.len())];

    let center = region.centroid();
    let position = MapPoint::new(
        center.x + MARKER_SPREAD * seed::unit(&seed_key, "ox"),
        center.y + MARKER_SPREAD * seed::unit(&seed_key, "oy"),
    )
    .clamped(MAP_MIN, MAP_MAX);

    let severity = Severity::from_pressure(candidate.pressure, config);

    Some(CrisisArc {
        id: format!(
            "arc-{}-{}-{}",
            candidate.crisis_type.name(),
            region.id,
            candidate.source.key()
        ),
        x: position.x,
        y: position.y,
        region_id: region.id.clone(),
        region_name: region.name.clone(),
        region_terrain: region.terrain,
        crisis_type: candidate.crisis_type,
        severity,
        label: format!("{} in {}", candidate.crisis_type.title(), region.name),
        source: candidate.source,
        reason: format!("{} (pressure {})", candidate.reason, candidate.pressure),
        stage: severity.start_stage(),
        max_stage: severity.max_stage(),
        tick: 0,
    })
}

/// New arcs for this pass, strongest pressure first, minus recently handled ones
pub fn generate_candidates(nation: &Nation, config: &EngineConfig) -> Vec<CrisisArc> {
    let mut candidates = detect_pressure(nation, config);
    candidates.sort_by(|a, b| b.pressure.cmp(&a.pressure));

    candidates
        .iter()
        .filter_map(|candidate| place_candidate(nation, candidate, config))
        .filter(|arc| {
            let suppressed = nation.is_key_recent(&crisis_repeat_key(arc.crisis_type, &arc.region_id));
            if suppressed {
                tracing::debug!("Suppressing recently handled crisis {}", arc.id);
            }
            !suppressed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Slot;
    use crate::nation::policy::PolicyCard;
    use crate::nation::{Effects, NewNation};

    fn calm_nation() -> Nation {
        let config = EngineConfig::default();
        let mut nation = Nation::create(
            NewNation::new("cy", Slot::new(1).unwrap(), "Calmland"),
            0,
            &config,
        );
        for kind in InstitutionKind::ALL {
            nation.institutions.set(kind, 90);
        }
        nation
    }

    #[test]
    fn test_calm_nation_has_no_pressure() {
        let nation = calm_nation();
        assert!(detect_pressure(&nation, &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_weak_economy_institution_yields_infrastructure() {
        let mut nation = calm_nation();
        nation.institutions.economy = 15;
        let candidates = detect_pressure(&nation, &EngineConfig::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].crisis_type, CrisisType::Infrastructure);
        assert_eq!(candidates[0].pressure, 85);
    }

    #[test]
    fn test_faction_pressure_is_doubled_distance() {
        let mut nation = calm_nation();
        nation.factions.elites = 22;
        let candidates = detect_pressure(&nation, &EngineConfig::default());
        assert_eq!(candidates[0].crisis_type, CrisisType::Corruption);
        assert_eq!(candidates[0].pressure, 56);
    }

    #[test]
    fn test_policy_pressure_capped() {
        let mut nation = calm_nation();
        let mut effects = Effects::new();
        effects.insert("politicalFreedom".into(), -60);
        effects.insert("economy".into(), 30);
        nation.active_policies.push(PolicyCard {
            issue_title: "Martial Law".into(),
            option_text: "Declare it".into(),
            supporter: String::new(),
            category: "security".into(),
            effects,
            era: nation.era,
            issue_number: 1,
        });
        let candidates = detect_pressure(&nation, &EngineConfig::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].pressure, 95);
        assert_eq!(candidates[0].crisis_type, CrisisType::Unrest);
    }

    #[test]
    fn test_placement_is_deterministic_and_on_map() {
        let mut nation = calm_nation();
        nation.institutions.economy = 15;
        let config = EngineConfig::default();
        let a = generate_candidates(&nation, &config);
        let b = generate_candidates(&nation, &config);
        assert_eq!(a, b);
        let arc = &a[0];
        assert!(nation.region(&arc.region_id).is_some());
        assert!((MAP_MIN..=MAP_MAX).contains(&arc.x));
        assert_eq!(arc.severity, Severity::High);
        assert_eq!(arc.stage, arc.max_stage);
    }

    #[test]
    fn test_recent_key_suppresses_candidate() {
        let mut nation = calm_nation();
        nation.institutions.economy = 15;
        let config = EngineConfig::default();
        let arc = generate_candidates(&nation, &config).remove(0);
        nation.remember_key(arc.repeat_key(), &config);
        assert!(generate_candidates(&nation, &config).is_empty());
    }
}
