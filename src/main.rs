//! Nation Forge - Entry Point
//!
//! Interactive play in the terminal. Loads (or founds) a nation in a save
//! slot, presents issues, and resolves the player's choices. Background
//! ticks catch up with wall-clock time between commands.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tokio::runtime::Runtime;
use tokio::time::Instant;

use nation_forge::core::config::EngineConfig;
use nation_forge::core::error::{NationError, Result};
use nation_forge::core::types::{GameMode, Slot};
use nation_forge::llm::client::GeneratorClient;
use nation_forge::nation::NewNation;
use nation_forge::persistence::store::JsonFileStore;
use nation_forge::session::engine::NationEngine;

/// Nation Forge - govern a nation one decision at a time
#[derive(Parser, Debug)]
#[command(name = "nation-forge")]
struct Args {
    /// Player id
    #[arg(long, default_value = "player")]
    user: String,

    /// Save slot (1-3)
    #[arg(long, default_value_t = 1)]
    slot: u8,

    /// Directory holding saved nations
    #[arg(long, default_value = "saves")]
    data_dir: PathBuf,

    /// Optional TOML file overriding engine tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Found a new nation with this name (replaces the slot)
    #[arg(long)]
    found: Option<String>,

    /// Play through the eras instead of the eternal mode
    #[arg(long)]
    eras: bool,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("nation_forge=info")
        .init();

    let args = Args::parse();
    let slot = Slot::new(args.slot)?;
    let config = match &args.config {
        Some(path) => EngineConfig::load_from_toml(path)?,
        None => EngineConfig::default(),
    };

    let rt = Runtime::new()?;

    // External generator is optional; the local tables always work
    let generator = match GeneratorClient::from_env() {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!("{} - using local issues only", e);
            None
        }
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let store = JsonFileStore::new(&args.data_dir);
    let mut engine = NationEngine::new(store, generator, config, seed);

    let user = args.user.as_str();
    match &args.found {
        Some(name) => {
            let mode = if args.eras { GameMode::Eras } else { GameMode::Eternal };
            engine.create_nation(NewNation::new(user, slot, name.as_str()).with_mode(mode))?;
        }
        None => match engine.load_nation(user, slot) {
            Ok(_) => {}
            Err(NationError::NoNation { .. }) => {
                println!("Slot {} is empty. Start with --found <name>.", slot);
                let occupied = engine.list_slots(user)?;
                if !occupied.is_empty() {
                    let list: Vec<String> = occupied.iter().map(|s| s.to_string()).collect();
                    println!("Occupied slots: {}", list.join(", "));
                }
                return Ok(());
            }
            Err(e) => return Err(e),
        },
    }

    println!("\n=== NATION FORGE ===");
    println!();
    println!("Commands:");
    println!("  issue / i       - Present the next issue");
    println!("  <number>        - Choose an option of the current issue");
    println!("  say <text>      - Answer the issue in your own words");
    println!("  more            - Ask for more options");
    println!("  status / s      - Show the nation");
    println!("  map / m         - Show regions and crises");
    println!("  log             - Show recent history");
    println!("  tick / t        - Advance the background clock one tick");
    println!("  quit / q        - Save and exit");
    println!();

    loop {
        engine.catch_up(user, slot, Instant::now())?;
        engine.flush_due(Instant::now());

        println!("{}", engine.nation(user, slot)?.summary());
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "issue" || input == "i" {
            let issue = rt.block_on(engine.next_issue(user, slot))?;
            display_issue(issue);
            continue;
        }

        if input == "status" || input == "s" {
            display_status(engine.nation(user, slot)?);
            continue;
        }

        if input == "map" || input == "m" {
            display_map(engine.nation(user, slot)?, &engine.map_crises(user, slot)?);
            continue;
        }

        if input == "log" {
            for line in &engine.nation(user, slot)?.history_log {
                println!("  {}", line);
            }
            continue;
        }

        if input == "tick" || input == "t" {
            let report = engine.tick(user, slot)?;
            println!("Tick {} complete.", report.tick);
            if let Some(roll) = &report.consequence {
                if roll.fired {
                    println!("  {}", roll.pending.consequence.text);
                }
            }
            continue;
        }

        if input == "more" {
            match rt.block_on(engine.expand_current_issue(user, slot)) {
                Ok(issue) => display_issue(issue),
                Err(e) => println!("{}", e),
            }
            continue;
        }

        if let Some(text) = input.strip_prefix("say ") {
            match rt.block_on(engine.interpret_response(user, slot, text)) {
                Ok(option) => println!("Added option [{}]: {}", option.id, option.text),
                Err(e) => println!("{}", e),
            }
            continue;
        }

        if let Ok(n) = input.parse::<usize>() {
            let option_id = engine
                .current_issue(user, slot)?
                .and_then(|issue| issue.options.get(n.wrapping_sub(1)))
                .map(|option| option.id.clone());
            match option_id {
                Some(option_id) => match engine.resolve(user, slot, &option_id) {
                    Ok(report) => {
                        println!("Decree #{}: {}", report.issue_number, report.option_text);
                        if let Some(era) = report.new_era {
                            println!("*** {} enters the {} ***", engine.nation(user, slot)?.name, era);
                        }
                        for id in &report.crisis.breakdowns {
                            println!("  Crisis {} broke down!", id);
                        }
                    }
                    Err(e) => println!("{}", e),
                },
                None => println!("No such option. Use 'issue' to see the current issue."),
            }
            continue;
        }

        println!("Unknown command. Available: issue, <number>, say <text>, more, status, map, log, tick, quit");
    }

    let saved = engine.flush_all()?;
    println!("\nGoodbye! {} save(s) written.", saved);
    Ok(())
}

fn display_issue(issue: &nation_forge::issue::Issue) {
    println!();
    println!("=== {} ===", issue.title);
    println!("{}", issue.description);
    for (i, option) in issue.options.iter().enumerate() {
        if option.supporter.is_empty() {
            println!("  {}. {}", i + 1, option.text);
        } else {
            println!("  {}. {} ({})", i + 1, option.text, option.supporter);
        }
    }
    println!();
}

fn display_status(nation: &nation_forge::nation::Nation) {
    let s = &nation.stats;
    println!();
    println!("=== {} ===", nation.name);
    println!("{} | {} | {} mode", nation.government_type, nation.era, nation.game_mode.as_str());
    println!("Issues resolved: {}", nation.issues_resolved);
    println!(
        "Economy {}  Civil rights {}  Freedom {}  Environment {}",
        s.economy, s.civil_rights, s.political_freedom, s.environment
    );
    println!(
        "Happiness {}  Crime {}  Education {}  Healthcare {}  Technology {}",
        s.happiness, s.crime, s.education, s.healthcare, s.technology
    );
    println!("Population {}  GDP {}", s.population, s.gdp);
    println!("Active policies:");
    for policy in nation.active_policies.iter().rev().take(5) {
        println!("  - {}: {}", policy.issue_title, policy.option_text);
    }
    println!();
}

fn display_map(nation: &nation_forge::nation::Nation, crises: &[nation_forge::crisis::CrisisArc]) {
    println!();
    for region in &nation.regions {
        println!(
            "  {:<16} {:<10} {:<10} dev {:>3} stab {:>3}",
            region.name,
            region.terrain.name(),
            region.specialization.name(),
            region.development,
            region.stability
        );
    }
    if crises.is_empty() {
        println!("  No active crises.");
    }
    for arc in crises {
        println!(
            "  [{}] {} (stage {}/{}) - {}",
            arc.severity.name(),
            arc.label,
            arc.stage,
            arc.max_stage,
            arc.reason
        );
    }
    println!();
}
