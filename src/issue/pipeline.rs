//! Issue generation pipeline
//!
//! An ordered list of strategies is tried in turn and the first one that
//! produces an issue wins. Fixed content (the branching ending, escalated
//! crises, regional charters, era projects) takes priority over the external
//! generator, and the local sample tables always produce something.
//!
//! The pipeline only reads a snapshot of the nation. Bookkeeping (used
//! titles, forced-crisis memory) is committed by the caller afterwards.

use ahash::AHashSet;
use rand::Rng;

use crate::core::config::EngineConfig;
use crate::core::error::{NationError, Result};
use crate::core::types::{Era, GameMode};
use crate::crisis::arc::{CrisisArc, Severity};
use crate::crisis::engine::build_map_crises;
use crate::issue::flavor::{find_anachronism, flavor_issue, issue_anachronism};
use crate::issue::keys::repeat_key;
use crate::issue::normalize::normalize_options;
use crate::issue::projects::{
    branching_ending, crisis_issue, crisis_title, era_project, specialization_project,
};
use crate::issue::samples::samples_for;
use crate::issue::types::{Complexity, Issue, IssueOption};
use crate::llm::client::TextGenerator;
use crate::llm::context::{GenerationRequest, GeneratorRequest, InterpretRequest};
use crate::llm::parser::{parse_generated_issue, parse_interpretation, parse_option_list};
use crate::nation::stats::Effects;
use crate::nation::Nation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    BranchingEnding,
    ForcedCrisis,
    SpecializationProject,
    EraProject,
    External,
    LocalFallback,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::BranchingEnding => "branching-ending",
            Strategy::ForcedCrisis => "forced-crisis",
            Strategy::SpecializationProject => "specialization-project",
            Strategy::EraProject => "era-project",
            Strategy::External => "external",
            Strategy::LocalFallback => "local-fallback",
        }
    }
}

/// Strategies in priority order
pub const STRATEGY_ORDER: [Strategy; 6] = [
    Strategy::BranchingEnding,
    Strategy::ForcedCrisis,
    Strategy::SpecializationProject,
    Strategy::EraProject,
    Strategy::External,
    Strategy::LocalFallback,
];

/// Everything one generation cycle reads
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub nation: Nation,
    pub map_crises: Vec<CrisisArc>,
    /// `arcId@stage` keys of crises already forced as issues
    pub seen_forced: AHashSet<String>,
}

impl PipelineInput {
    pub fn snapshot(nation: &Nation, seen_forced: &AHashSet<String>, config: &EngineConfig) -> Self {
        Self {
            nation: nation.clone(),
            map_crises: build_map_crises(&nation.crisis_arcs, config),
            seen_forced: seen_forced.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedIssue {
    pub issue: Issue,
    pub strategy: Strategy,
    /// Set when the issue was forced from a map crisis
    pub forced_key: Option<String>,
}

impl GeneratedIssue {
    fn new(issue: Issue, strategy: Strategy) -> Self {
        Self {
            issue,
            strategy,
            forced_key: None,
        }
    }
}

pub fn forced_key(arc: &CrisisArc) -> String {
    format!("{}@{}", arc.id, arc.stage)
}

/// Title already used, or repeat key still in short-term memory
pub fn is_blocked(nation: &Nation, issue: &Issue) -> bool {
    nation.is_title_used(&issue.title) || nation.is_key_recent(&repeat_key(issue))
}

/// `is_blocked` for the raw issue or its era-flavored form, which is the
/// title that ends up remembered
pub fn is_blocked_in_era(nation: &Nation, issue: &Issue) -> bool {
    if is_blocked(nation, issue) {
        return true;
    }
    if !nation.era.is_pre_industrial() {
        return false;
    }
    let mut flavored = issue.clone();
    flavor_issue(&mut flavored, nation.era);
    is_blocked(nation, &flavored)
}

fn desired_options(era: Era) -> usize {
    Complexity::for_era(era).desired_option_count()
}

fn cadence_hit(issues_resolved: u32, cadence: u32) -> bool {
    issues_resolved > 0 && cadence > 0 && issues_resolved % cadence == 0
}

/// Run one of the fixed-content strategies
pub fn try_fixed(strategy: Strategy, input: &PipelineInput, config: &EngineConfig) -> Option<GeneratedIssue> {
    let nation = &input.nation;
    match strategy {
        Strategy::BranchingEnding => {
            let ready = nation.game_mode == GameMode::Eras
                && nation.era == Era::Information
                && nation.stats.technology >= 100;
            ready.then(|| GeneratedIssue::new(branching_ending(), strategy))
        }
        Strategy::ForcedCrisis => input
            .map_crises
            .iter()
            .filter(|arc| arc.severity == Severity::High)
            .find(|arc| {
                !nation.is_title_used(&crisis_title(arc))
                    && !nation.is_key_recent(&arc.repeat_key())
                    && !input.seen_forced.contains(&forced_key(arc))
            })
            .map(|arc| GeneratedIssue {
                issue: crisis_issue(arc),
                strategy,
                forced_key: Some(forced_key(arc)),
            }),
        Strategy::SpecializationProject => {
            if !cadence_hit(nation.issues_resolved, config.specialization_cadence) {
                return None;
            }
            let decree = nation.issues_resolved / config.specialization_cadence;
            specialization_project(nation, decree)
                .filter(|issue| !is_blocked(nation, issue))
                .map(|issue| GeneratedIssue::new(issue, strategy))
        }
        Strategy::EraProject => {
            let eligible = nation.game_mode == GameMode::Eras
                && nation.era < Era::Information
                && nation.stats.technology < 100
                && cadence_hit(nation.issues_resolved, config.era_project_cadence);
            if !eligible {
                return None;
            }
            let phase = nation.issues_resolved / config.era_project_cadence;
            era_project(nation.era, phase)
                .filter(|issue| !is_blocked(nation, issue))
                .map(|issue| GeneratedIssue::new(issue, strategy))
        }
        Strategy::External | Strategy::LocalFallback => None,
    }
}

async fn call_generator<G: TextGenerator>(
    generator: &G,
    request: &GeneratorRequest,
    config: &EngineConfig,
) -> Result<String> {
    let budget = config.generation_timeout();
    tokio::time::timeout(budget, generator.complete(request))
        .await
        .map_err(|_| NationError::GenerationTimeout(budget))?
}

/// One call to the external generator, validated against the nation
pub async fn try_external<G: TextGenerator>(
    generator: &G,
    nation: &Nation,
    config: &EngineConfig,
) -> Result<Issue> {
    let request = GeneratorRequest::Generate(GenerationRequest::for_nation(nation, config));
    let response = call_generator(generator, &request, config).await?;
    let mut issue = parse_generated_issue(&response)?;

    if let Some(term) = issue_anachronism(&issue, nation.era) {
        return Err(NationError::LlmError(format!(
            "\"{}\" is out of place in the {}",
            term, nation.era
        )));
    }
    if is_blocked_in_era(nation, &issue) {
        return Err(NationError::LlmError(format!(
            "\"{}\" repeats a recent issue",
            issue.title
        )));
    }

    normalize_options(&mut issue, desired_options(nation.era), nation.era);
    flavor_issue(&mut issue, nation.era);
    Ok(issue)
}

/// Pick a sample for the nation's era, preferring fresh ones
pub fn local_fallback<R: Rng>(nation: &Nation, rng: &mut R) -> Issue {
    let samples = samples_for(nation.era);
    let fresh: Vec<&Issue> = samples
        .iter()
        .filter(|s| !is_blocked_in_era(nation, s))
        .collect();
    let pool: Vec<&Issue> = if fresh.is_empty() {
        samples.iter().collect()
    } else {
        fresh
    };

    let mut issue = match pool.len() {
        0 => Issue::new("A Quiet Season", "Nothing presses on the council.", "governance", Vec::new()),
        n => pool[rng.gen_range(0..n)].clone(),
    };
    normalize_options(&mut issue, desired_options(nation.era), nation.era);
    flavor_issue(&mut issue, nation.era);
    issue
}

/// Run the strategy chain
pub async fn generate_issue<G: TextGenerator, R: Rng>(
    input: &PipelineInput,
    generator: Option<&G>,
    rng: &mut R,
    config: &EngineConfig,
) -> GeneratedIssue {
    for strategy in STRATEGY_ORDER {
        let produced = match strategy {
            Strategy::External => match generator {
                Some(generator) => match try_external(generator, &input.nation, config).await {
                    Ok(issue) => Some(GeneratedIssue::new(issue, strategy)),
                    Err(e) => {
                        tracing::warn!("External generation failed, falling back: {}", e);
                        None
                    }
                },
                None => None,
            },
            Strategy::LocalFallback => Some(GeneratedIssue::new(
                local_fallback(&input.nation, rng),
                strategy,
            )),
            _ => try_fixed(strategy, input, config),
        };

        if let Some(generated) = produced {
            tracing::debug!(
                "Issue \"{}\" from {} strategy",
                generated.issue.title,
                strategy.name()
            );
            return generated;
        }
    }

    GeneratedIssue::new(local_fallback(&input.nation, rng), Strategy::LocalFallback)
}

const INTERPRET_RULES: &[(&[&str], &[(&str, i64)])] = &[
    (&["tax", "tithe", "levy"], &[("economy", 2), ("happiness", -1)]),
    (&["peace", "negotiat", "talk", "parley"], &[("happiness", 2), ("crime", -1)]),
    (&["force", "army", "guard", "arrest", "soldier"], &[("crime", -3), ("politicalFreedom", -2)]),
    (&["school", "teach", "learn"], &[("education", 2)]),
    (&["heal", "medic", "doctor", "clinic"], &[("healthcare", 2)]),
    (&["trade", "market", "merchant"], &[("economy", 2)]),
    (&["free", "rights", "vote"], &[("politicalFreedom", 2), ("civilRights", 1)]),
    (&["build", "repair", "road", "bridge"], &[("economy", 1), ("happiness", 1)]),
    (&["forest", "river", "nature", "clean"], &[("environment", 2)]),
    (&["invent", "research", "craft"], &[("technology", 2)]),
];

/// Keyword reading of a free-text response when the generator is unavailable
pub fn local_interpretation(user_response: &str) -> IssueOption {
    let lower = user_response.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let mut effects = Effects::new();
    for (keywords, deltas) in INTERPRET_RULES {
        if tokens.iter().any(|t| keywords.iter().any(|k| t.starts_with(k))) {
            for (stat, delta) in *deltas {
                *effects.entry(stat.to_string()).or_insert(0) += delta;
            }
        }
    }
    for value in effects.values_mut() {
        *value = (*value).clamp(-5, 5);
    }
    if effects.is_empty() {
        effects.insert("happiness".into(), 1);
    }

    let text: String = user_response.trim().chars().take(160).collect();
    IssueOption::new(text, "Your Decree", effects)
}

/// Turn a free-text response into an option, externally if possible
pub async fn interpret<G: TextGenerator>(
    generator: Option<&G>,
    nation: &Nation,
    issue: &Issue,
    user_response: &str,
    config: &EngineConfig,
) -> IssueOption {
    if let Some(generator) = generator {
        let request = GeneratorRequest::Interpret(InterpretRequest::new(nation, issue, user_response));
        match call_generator(generator, &request, config)
            .await
            .and_then(|response| parse_interpretation(&response))
        {
            Ok(option) => return option,
            Err(e) => tracing::warn!("Interpretation failed, using keyword reading: {}", e),
        }
    }
    local_interpretation(user_response)
}

/// Add generated options to an issue, then normalize
///
/// `custom-*` options written by the player sit outside the normalized set
/// and always survive.
pub async fn expand<G: TextGenerator>(
    generator: Option<&G>,
    nation: &Nation,
    issue: &Issue,
    config: &EngineConfig,
) -> Issue {
    let (custom, base): (Vec<IssueOption>, Vec<IssueOption>) = issue
        .options
        .iter()
        .cloned()
        .partition(|o| o.id.starts_with("custom-"));
    let known: AHashSet<String> = issue
        .options
        .iter()
        .map(|o| o.text.trim().to_lowercase())
        .collect();

    let mut expanded = issue.clone();
    expanded.options = base;
    let mut offered: AHashSet<String> = AHashSet::new();
    if let Some(generator) = generator {
        let request = GeneratorRequest::Generate(GenerationRequest::expand_options(nation, issue, config));
        match call_generator(generator, &request, config)
            .await
            .and_then(|response| parse_option_list(&response))
        {
            Ok(options) => {
                let fitting: Vec<IssueOption> = options
                    .into_iter()
                    .filter(|o| {
                        !nation.era.forbids_modern_terms()
                            || find_anachronism(&o.text).is_none()
                    })
                    .filter(|o| !known.contains(&o.text.trim().to_lowercase()))
                    .collect();
                offered.extend(fitting.iter().map(|o| o.text.trim().to_lowercase()));
                expanded.options.extend(fitting);
            }
            Err(e) => tracing::warn!("Option expansion failed, normalizing locally: {}", e),
        }
    }

    let wanted = desired_options(nation.era).max(expanded.options.len());
    normalize_options(&mut expanded, wanted, nation.era);

    let kept = expanded
        .options
        .iter()
        .filter(|o| offered.contains(&o.text.trim().to_lowercase()))
        .count();
    if kept == 0 {
        tracing::info!("Expansion added nothing to \"{}\"", issue.title);
    } else if kept < offered.len() {
        tracing::info!(
            "Expansion of \"{}\" kept {} of {} new options",
            issue.title,
            kept,
            offered.len()
        );
    }

    flavor_issue(&mut expanded, nation.era);
    expanded.options.extend(custom);
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Slot;
    use crate::crisis::arc::{CrisisSource, CrisisType};
    use crate::issue::types::effects_of;
    use crate::nation::institutions::FactionKind;
    use crate::nation::region::Terrain;
    use crate::nation::NewNation;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn nation(mode: GameMode) -> Nation {
        let config = EngineConfig::default();
        Nation::create(
            NewNation::new("pl", Slot::new(1).unwrap(), "Pipeland").with_mode(mode),
            0,
            &config,
        )
    }

    struct Canned(&'static str);

    impl TextGenerator for Canned {
        async fn complete(&self, _request: &GeneratorRequest) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    const LEVY_ISSUE: &str = r#"{"title": "Infrastructure Levy", "description": "Paths need work.",
    "category": "economy", "options": [
      {"text": "Levy every hearth", "effects": {"economy": 2}},
      {"text": "Levy the chiefs only", "effects": {"happiness": 1}},
      {"text": "Let the paths crumble", "effects": {"economy": -1}}
    ]}"#;

    const MORE_OPTIONS: &str = r#"{"options": [
      {"text": "Put it to a referendum", "effects": {"politicalFreedom": 2}},
      {"text": "Hand it to a commission", "effects": {"economy": 1}}
    ]}"#;

    fn high_arc() -> CrisisArc {
        CrisisArc {
            id: "arc-unrest-north-faction:citizens".into(),
            x: 30.0,
            y: 20.0,
            region_id: "north".into(),
            region_name: "Northreach".into(),
            region_terrain: Terrain::Highlands,
            crisis_type: CrisisType::Unrest,
            severity: Severity::High,
            label: "Unrest in Northreach".into(),
            source: CrisisSource::Faction(FactionKind::Citizens),
            reason: "citizens resentment at 20".into(),
            stage: 3,
            max_stage: 3,
            tick: 0,
        }
    }

    #[test]
    fn test_branching_ending_only_in_eras_mode() {
        let config = EngineConfig::default();
        let mut eras = nation(GameMode::Eras);
        eras.era = Era::Information;
        eras.stats.technology = 100;
        let input = PipelineInput::snapshot(&eras, &AHashSet::new(), &config);
        assert!(try_fixed(Strategy::BranchingEnding, &input, &config).is_some());

        let mut eternal = eras.clone();
        eternal.game_mode = GameMode::Eternal;
        let input = PipelineInput::snapshot(&eternal, &AHashSet::new(), &config);
        assert!(try_fixed(Strategy::BranchingEnding, &input, &config).is_none());
    }

    #[test]
    fn test_forced_crisis_respects_seen_set() {
        let config = EngineConfig::default();
        let mut n = nation(GameMode::Eternal);
        n.crisis_arcs.push(high_arc());
        let mut seen = AHashSet::new();

        let input = PipelineInput::snapshot(&n, &seen, &config);
        let forced = try_fixed(Strategy::ForcedCrisis, &input, &config).unwrap();
        assert!(forced.issue.is_map_event);
        assert_eq!(forced.forced_key.as_deref(), Some("arc-unrest-north-faction:citizens@3"));

        seen.insert(forced.forced_key.unwrap());
        let input = PipelineInput::snapshot(&n, &seen, &config);
        assert!(try_fixed(Strategy::ForcedCrisis, &input, &config).is_none());
    }

    #[test]
    fn test_projects_wait_for_first_decision() {
        let config = EngineConfig::default();
        let mut n = nation(GameMode::Eras);
        let input = PipelineInput::snapshot(&n, &AHashSet::new(), &config);
        assert!(try_fixed(Strategy::SpecializationProject, &input, &config).is_none());
        assert!(try_fixed(Strategy::EraProject, &input, &config).is_none());

        n.issues_resolved = 4;
        let input = PipelineInput::snapshot(&n, &AHashSet::new(), &config);
        assert!(try_fixed(Strategy::EraProject, &input, &config).is_some());

        n.issues_resolved = 6;
        let input = PipelineInput::snapshot(&n, &AHashSet::new(), &config);
        assert!(try_fixed(Strategy::SpecializationProject, &input, &config).is_some());
    }

    #[test]
    fn test_local_fallback_prefers_fresh_samples() {
        let config = EngineConfig::default();
        let mut n = nation(GameMode::Eternal);
        let samples = samples_for(n.era);
        for sample in &samples[1..] {
            n.remember_title(&sample.title, &config);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..5 {
            let issue = local_fallback(&n, &mut rng);
            assert_eq!(issue.title, samples[0].title);
            assert_eq!(issue.options.len(), 3);
        }
    }

    #[test]
    fn test_local_interpretation_keywords() {
        let option = local_interpretation("Send the army and arrest the ringleaders");
        assert_eq!(option.effects.get("crime"), Some(&-3));
        assert_eq!(option.effects.get("politicalFreedom"), Some(&-2));

        let neutral = local_interpretation("Hmm");
        assert_eq!(neutral.effects.get("happiness"), Some(&1));
    }

    #[tokio::test]
    async fn test_flavored_title_counts_as_used() {
        let config = EngineConfig::default();
        let mut n = nation(GameMode::Eras);
        let first = try_external(&Canned(LEVY_ISSUE), &n, &config).await.unwrap();
        assert_eq!(first.title, "Roads and granaries Levy");

        n.remember_title(&first.title, &config);
        assert!(try_external(&Canned(LEVY_ISSUE), &n, &config).await.is_err());
    }

    #[tokio::test]
    async fn test_expand_keeps_custom_options() {
        let config = EngineConfig::default();
        let mut n = nation(GameMode::Eternal);
        n.era = Era::Modern;
        let texts = ["Tax it", "Ban it", "Subsidize it", "Study it", "Ignore it"];
        let mut options: Vec<IssueOption> = texts
            .iter()
            .map(|t| IssueOption::new(*t, "", effects_of(&[("economy", 1)])))
            .collect();
        options.push(IssueOption::new("My own plan", "Your Decree", effects_of(&[("happiness", 1)])).with_id("custom-1"));
        let mut issue = Issue::new("Ride Sharing Rules", "", "economy", options);
        issue.ensure_option_ids();

        let expanded = expand(Some(&Canned(MORE_OPTIONS)), &n, &issue, &config).await;
        assert!(expanded.options.iter().any(|o| o.id == "custom-1" && o.text == "My own plan"));
        assert_eq!(expanded.options.iter().filter(|o| !o.id.starts_with("custom-")).count(), 5);

        let local = expand(None::<&Canned>, &n, &issue, &config).await;
        assert!(local.options.iter().any(|o| o.id == "custom-1"));
    }
}
