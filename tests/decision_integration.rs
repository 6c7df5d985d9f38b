//! Decision resolution integration tests
//!
//! End-to-end checks of a single decision: stat effects, era transitions and
//! crisis breakdowns.

use nation_forge::core::config::EngineConfig;
use nation_forge::core::types::{Era, GameMode, Slot};
use nation_forge::crisis::{refresh, CrisisArc, CrisisSource, CrisisType, Severity};
use nation_forge::decision::resolve_decision;
use nation_forge::issue::types::effects_of;
use nation_forge::issue::{Issue, IssueOption};
use nation_forge::nation::{InstitutionKind, FactionKind, Nation, NewNation};

fn nation(mode: GameMode) -> Nation {
    Nation::create(
        NewNation::new("tester", Slot::new(1).unwrap(), "Testoria").with_mode(mode),
        0,
        &EngineConfig::default(),
    )
}

fn issue(effects: &[(&str, i64)]) -> Issue {
    Issue::new(
        "Town Watch Funding",
        "The watch asks for more coin.",
        "security",
        vec![
            IssueOption::new("Fund the watch", "Wardens", effects_of(effects)).with_id("fund"),
            IssueOption::new("Refuse", "Treasury", effects_of(&[("economy", 1)])).with_id("refuse"),
        ],
    )
}

/// Happiness up and crime down moves stats, welfare and citizens
#[test]
fn test_happiness_and_crime_decision() {
    let config = EngineConfig::default();
    let mut n = nation(GameMode::Eternal);
    n.stats.happiness = 50;
    n.stats.crime = 50;
    let welfare = n.institutions.get(InstitutionKind::Welfare);
    let citizens = n.factions.get(FactionKind::Citizens);

    let resolution =
        resolve_decision(&n, &issue(&[("happiness", 10), ("crime", -5)]), "fund", &config).unwrap();
    let next = resolution.nation;

    assert_eq!(next.stats.happiness, 60);
    assert_eq!(next.stats.crime, 45);
    assert!(next.institutions.get(InstitutionKind::Welfare) > welfare);
    assert!(next.factions.get(FactionKind::Citizens) > citizens);
}

/// Technology is clamped to 100 first, then the era advances and resets it
#[test]
fn test_research_advances_era() {
    let config = EngineConfig::default();
    let mut n = nation(GameMode::Eras);
    n.stats.technology = 92;

    let resolution = resolve_decision(&n, &issue(&[("technology", 10)]), "fund", &config).unwrap();

    assert_eq!(resolution.nation.era, Era::BronzeAge);
    assert_eq!(resolution.nation.stats.technology, 0);
    assert_eq!(resolution.report.new_era, Some(Era::BronzeAge));
    assert!(resolution
        .nation
        .history_log
        .iter()
        .any(|line| line.contains("Bronze Age")));
}

/// An arc left at its top stage breaks down on the next decision
#[test]
fn test_overdue_arc_breaks_down() {
    let config = EngineConfig::default();
    let mut n = nation(GameMode::Eternal);
    let region = n.regions[0].clone();
    n.region_mut(&region.id).unwrap().stability = 60;
    n.crisis_arcs.push(CrisisArc {
        id: format!("arc-security-{}-faction:securityCouncil", region.id),
        x: 40.0,
        y: 40.0,
        region_id: region.id.clone(),
        region_name: region.name.clone(),
        region_terrain: region.terrain,
        crisis_type: CrisisType::Security,
        severity: Severity::High,
        label: format!("Security in {}", region.name),
        source: CrisisSource::Faction(FactionKind::SecurityCouncil),
        reason: "security council unease".into(),
        stage: 3,
        max_stage: 3,
        tick: 2,
    });
    let arc_id = n.crisis_arcs[0].id.clone();

    // education alone leaves region stability untouched
    let resolution = resolve_decision(&n, &issue(&[("education", 1)]), "fund", &config).unwrap();
    let next = resolution.nation;

    assert!(!next.crisis_arcs.iter().any(|arc| arc.id == arc_id));
    assert!(resolution.report.crisis.breakdowns.contains(&arc_id));
    assert!(next
        .history_log
        .iter()
        .any(|line| line.starts_with("[CRISIS BREAKDOWN]")));
    assert_eq!(next.region(&region.id).unwrap().stability, 50);
    assert_eq!(next.stats.crime, n.stats.crime + 6);
}

/// Resolving a crisis issue closes the arc it was raised for
#[test]
fn test_targeted_arc_is_resolved() {
    let config = EngineConfig::default();
    let mut n = nation(GameMode::Eternal);
    let region = n.regions[1].clone();
    let arc = CrisisArc {
        id: format!("arc-unrest-{}-policy", region.id),
        x: 50.0,
        y: 50.0,
        region_id: region.id.clone(),
        region_name: region.name.clone(),
        region_terrain: region.terrain,
        crisis_type: CrisisType::Unrest,
        severity: Severity::Medium,
        label: format!("Unrest in {}", region.name),
        source: CrisisSource::Policy,
        reason: "policy pressure".into(),
        stage: 2,
        max_stage: 3,
        tick: 0,
    };
    n.crisis_arcs.push(arc.clone());

    let crisis_issue = nation_forge::issue::projects::crisis_issue(&arc);
    let option_id = crisis_issue.options[0].id.clone();
    let resolution = resolve_decision(&n, &crisis_issue, &option_id, &config).unwrap();

    assert_eq!(resolution.report.crisis.resolved, vec![arc.id.clone()]);
    assert!(!resolution.nation.crisis_arcs.iter().any(|a| a.id == arc.id));
    // map events stay out of long-term title memory
    assert!(!resolution.nation.is_title_used(&crisis_issue.title));
    assert!(resolution.nation.is_key_recent(&arc.repeat_key()));
}

/// An arc with real pressure behind it stays closed once its issue is resolved
#[test]
fn test_resolved_pressure_arc_stays_closed() {
    let config = EngineConfig::default();
    let mut n = nation(GameMode::Eternal);
    n.institutions.set(InstitutionKind::Economy, 15);
    refresh(&mut n, &config);
    let arc = n
        .crisis_arcs
        .iter()
        .find(|a| a.crisis_type == CrisisType::Infrastructure)
        .cloned()
        .unwrap();

    let crisis_issue = nation_forge::issue::projects::crisis_issue(&arc);
    let option_id = crisis_issue.options[0].id.clone();
    let resolution = resolve_decision(&n, &crisis_issue, &option_id, &config).unwrap();
    assert!(resolution.report.crisis.resolved.contains(&arc.id));
    assert!(!resolution.report.crisis.added.contains(&arc.id));
    assert_eq!(
        resolution
            .nation
            .recent_issue_keys
            .iter()
            .filter(|k| **k == arc.repeat_key())
            .count(),
        1
    );

    let mut next = resolution.nation;
    for i in 0..4 {
        let mut neutral = issue(&[("education", 1)]);
        neutral.title = format!("Quiet Council {}", i);
        let resolution = resolve_decision(&next, &neutral, "fund", &config).unwrap();
        assert!(!resolution.report.crisis.breakdowns.contains(&arc.id));
        next = resolution.nation;
    }
    assert!(next.crisis_arcs.iter().all(|a| a.id != arc.id));
}

/// Bounded collections never exceed their caps over a long game
#[test]
fn test_collection_caps_hold() {
    let config = EngineConfig::default();
    let mut n = nation(GameMode::Eternal);
    for i in 0..140 {
        let mut decision = issue(&[("economy", 1)]);
        decision.title = format!("Ledger Entry {}", i);
        n = resolve_decision(&n, &decision, "fund", &config).unwrap().nation;
    }

    assert_eq!(n.issues_resolved, 140);
    assert_eq!(n.decision_history.len(), 100);
    assert_eq!(n.history_log.len(), 30);
    assert_eq!(n.active_policies.len(), 12);
    assert_eq!(n.recent_issue_keys.len(), 18);
    assert!(n.crisis_arcs.len() <= 8);
}
