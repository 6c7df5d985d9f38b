//! Headless autoplay
//!
//! Plays a nation for a number of turns with random choices and reports how
//! the run went: issue sources, era transitions, crises and final stats.

use std::collections::BTreeMap;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use nation_forge::core::config::EngineConfig;
use nation_forge::core::error::Result;
use nation_forge::core::types::{GameMode, Slot};
use nation_forge::llm::client::GeneratorClient;
use nation_forge::nation::{NationStats, NewNation};
use nation_forge::persistence::store::MemoryStore;
use nation_forge::session::engine::NationEngine;

/// Headless autoplay - random decisions for balance checks
#[derive(Parser, Debug)]
#[command(name = "autoplay")]
struct Args {
    /// Number of issues to resolve
    #[arg(long, default_value_t = 60)]
    turns: u32,

    /// Background ticks between decisions
    #[arg(long, default_value_t = 1)]
    ticks_per_turn: u32,

    /// Play in Eras mode
    #[arg(long)]
    eras: bool,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Use the external generator configured in the environment
    #[arg(long)]
    external: bool,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Serialize)]
struct RunReport {
    seed: u64,
    turns: u32,
    final_era: String,
    era_transitions: Vec<String>,
    issue_titles: usize,
    breakdowns: usize,
    arcs_resolved: usize,
    consequences_fired: usize,
    active_arcs: usize,
    stats: NationStats,
    by_category: BTreeMap<String, u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("nation_forge=warn")
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    let generator = if args.external {
        Some(GeneratorClient::from_env()?)
    } else {
        None
    };
    let rt = tokio::runtime::Runtime::new()?;
    let mut engine = NationEngine::new(MemoryStore::new(), generator, EngineConfig::default(), seed);

    let user = "autoplay";
    let slot = Slot::new(1)?;
    let mode = if args.eras { GameMode::Eras } else { GameMode::Eternal };
    engine.create_nation(NewNation::new(user, slot, "Autoplay").with_mode(mode))?;

    let mut era_transitions = Vec::new();
    let mut by_category: BTreeMap<String, u32> = BTreeMap::new();
    let mut breakdowns = 0;
    let mut arcs_resolved = 0;
    let mut consequences_fired = 0;

    for turn in 1..=args.turns {
        let issue = rt.block_on(engine.next_issue(user, slot))?;
        *by_category.entry(issue.category.clone()).or_insert(0) += 1;
        let choice = rng.gen_range(0..issue.options.len().max(1));
        let option_id = match issue.options.get(choice) {
            Some(option) => option.id.clone(),
            None => continue,
        };

        let report = engine.resolve(user, slot, &option_id)?;
        if let Some(era) = report.new_era {
            era_transitions.push(format!("turn {}: {}", turn, era));
        }
        breakdowns += report.crisis.breakdowns.len();
        arcs_resolved += report.crisis.resolved.len();

        for _ in 0..args.ticks_per_turn {
            let tick = engine.tick(user, slot)?;
            if tick.consequence.as_ref().is_some_and(|roll| roll.fired) {
                consequences_fired += 1;
            }
        }
    }

    let nation = engine.nation(user, slot)?;
    let report = RunReport {
        seed,
        turns: args.turns,
        final_era: nation.era.to_string(),
        era_transitions,
        issue_titles: nation.used_issue_titles.len(),
        breakdowns,
        arcs_resolved,
        consequences_fired,
        active_arcs: nation.crisis_arcs.len(),
        stats: nation.stats.clone(),
        by_category,
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("=== Autoplay (seed {}) ===", report.seed);
        println!("{}", nation.summary());
        println!("Final era: {}", report.final_era);
        for line in &report.era_transitions {
            println!("  {}", line);
        }
        println!("Distinct titles used: {}", report.issue_titles);
        println!(
            "Crises: {} resolved, {} broke down, {} still active",
            report.arcs_resolved, report.breakdowns, report.active_arcs
        );
        println!("Consequences fired: {}", report.consequences_fired);
        for (category, count) in &report.by_category {
            println!("  {:<16} {}", category, count);
        }
    }
    Ok(())
}
