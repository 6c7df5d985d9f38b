//! Property tests for the simulation laws

use proptest::prelude::*;

use nation_forge::core::config::EngineConfig;
use nation_forge::core::types::{Era, GameMode, Slot};
use nation_forge::crisis::{CrisisArc, CrisisSource, CrisisType, Severity};
use nation_forge::decision::resolve_decision;
use nation_forge::issue::normalize::normalize_options;
use nation_forge::issue::types::effects_of;
use nation_forge::issue::{Issue, IssueOption};
use nation_forge::nation::region::{evolve_shape, ShapeContext, MAP_MAX, MAP_MIN};
use nation_forge::nation::stats::{GDP_FLOOR, POPULATION_FLOOR};
use nation_forge::nation::{Effects, Nation, NewNation, Region, StatKey, Terrain};

const STAT_NAMES: [&str; 11] = [
    "economy",
    "civilRights",
    "politicalFreedom",
    "environment",
    "happiness",
    "crime",
    "education",
    "healthcare",
    "technology",
    "population",
    "gdp",
];

fn effects_strategy() -> impl Strategy<Value = Effects> {
    proptest::collection::btree_map(
        proptest::sample::select(STAT_NAMES.to_vec()).prop_map(String::from),
        -15i64..15,
        0..5,
    )
}

fn nation() -> Nation {
    Nation::create(
        NewNation::new("prop", Slot::new(1).unwrap(), "Propertia").with_mode(GameMode::Eras),
        0,
        &EngineConfig::default(),
    )
}

fn arc(stage: u32, max_stage: u32, tick: u32) -> CrisisArc {
    CrisisArc {
        id: "arc-health-south-institution:welfare".into(),
        x: 50.0,
        y: 50.0,
        region_id: "south".into(),
        region_name: "South".into(),
        region_terrain: Terrain::Plains,
        crisis_type: CrisisType::Health,
        severity: Severity::for_stage(stage, max_stage),
        label: "Health in South".into(),
        source: CrisisSource::Policy,
        reason: String::new(),
        stage,
        max_stage,
        tick,
    }
}

proptest! {
    #[test]
    fn prop_bounded_stats_stay_in_range(current in 0i64..=100, delta in -500i64..500) {
        for stat in StatKey::BOUNDED {
            let next = stat.apply_delta(current, delta);
            prop_assert!((0..=100).contains(&next));
        }
    }

    #[test]
    fn prop_population_and_gdp_respect_floor(current in 0i64..1_000_000_000, delta in -100i64..100) {
        prop_assert!(StatKey::Population.apply_delta(current, delta) >= POPULATION_FLOOR);
        prop_assert!(StatKey::Gdp.apply_delta(current, delta) >= GDP_FLOOR);
    }

    #[test]
    fn prop_zero_delta_is_identity(current in POPULATION_FLOOR..1_000_000_000_000i64) {
        prop_assert_eq!(StatKey::Population.apply_delta(current, 0), current);
        prop_assert_eq!(StatKey::Gdp.apply_delta(current, 0), current);
    }

    #[test]
    fn prop_geometry_is_deterministic(
        issues in 0u32..500,
        era_index in 0usize..11,
        effects in effects_strategy(),
        option in "[a-z]{1,8}",
    ) {
        let n = nation();
        let ctx = ShapeContext {
            nation_id: &n.id,
            issues_resolved: issues,
            era: Era::ALL[era_index],
            option_id: &option,
            effects: &effects,
            target_region: Some(n.regions[0].id.as_str()),
        };
        for region in &n.regions {
            let first = evolve_shape(region, &ctx);
            let second = evolve_shape(region, &ctx);
            prop_assert_eq!(&first, &second);
            prop_assert!(first.iter().all(|p| (MAP_MIN..=MAP_MAX).contains(&p.x)
                && (MAP_MIN..=MAP_MAX).contains(&p.y)));
        }
    }

    #[test]
    fn prop_arc_stage_never_exceeds_ladder(
        stage in 1u32..=3,
        long in any::<bool>(),
        steps in proptest::collection::vec(any::<bool>(), 0..30),
    ) {
        let config = EngineConfig::default();
        let max_stage = if long { 3 } else { 2 };
        let mut a = arc(stage.min(max_stage), max_stage, 0);
        for advance in steps {
            if advance { a.advance(&config) } else { a.de_escalate() }
            prop_assert!(a.stage >= 1 && a.stage <= a.max_stage);
            prop_assert_eq!(a.severity, Severity::for_stage(a.stage, a.max_stage));
        }
    }

    #[test]
    fn prop_normalized_options_are_unique(
        texts in proptest::collection::vec("[A-Za-z ]{0,12}", 0..9),
        desired in 1usize..8,
    ) {
        let options: Vec<IssueOption> = texts
            .iter()
            .map(|t| IssueOption::new(t.as_str(), "", Effects::new()))
            .collect();
        let mut issue = Issue::new("Some Matter", "", "", options);
        normalize_options(&mut issue, desired, Era::Modern);

        let count = issue.options.len();
        prop_assert_eq!(count, desired.clamp(3, 5));
        let mut lowered: Vec<String> = issue.options.iter().map(|o| o.text.trim().to_lowercase()).collect();
        lowered.sort();
        lowered.dedup();
        prop_assert_eq!(lowered.len(), count);
        let mut ids: Vec<&str> = issue.options.iter().map(|o| o.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), count);
    }

    #[test]
    fn prop_decisions_keep_nation_in_bounds(choices in proptest::collection::vec(effects_strategy(), 1..25)) {
        let config = EngineConfig::default();
        let mut n = nation();
        for (i, effects) in choices.into_iter().enumerate() {
            let issue = Issue::new(
                format!("Assembly {}", i),
                "",
                "governance",
                vec![IssueOption::new("Agree", "", effects).with_id("agree")],
            );
            n = resolve_decision(&n, &issue, "agree", &config).unwrap().nation;

            for stat in StatKey::BOUNDED {
                prop_assert!((0..=100).contains(&n.stats.get(stat)));
            }
            prop_assert!(n.stats.population >= POPULATION_FLOOR);
            prop_assert!(n.crisis_arcs.len() <= config.max_crisis_arcs);
            prop_assert!(n.crisis_arcs.iter().all(|a| a.stage <= a.max_stage));
            prop_assert!(n.regions.iter().all(|r: &Region| (0..=100).contains(&r.stability)));
        }
    }
}

#[test]
fn test_unknown_stat_keys_are_ignored() {
    let config = EngineConfig::default();
    let n = nation();
    let issue = Issue::new(
        "Odd Request",
        "",
        "governance",
        vec![IssueOption::new("Allow it", "", effects_of(&[("morale", 40), ("economy", 1)])).with_id("allow")],
    );
    let next = resolve_decision(&n, &issue, "allow", &config).unwrap().nation;
    assert_eq!(next.stats.economy, n.stats.economy + 1);
}
