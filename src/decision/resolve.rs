//! Decision resolution
//!
//! Resolving an option runs on a clone of the nation and hands back the new
//! nation with a report. Nothing is written to the caller's nation, so a
//! rejected option leaves it exactly as it was.

use crate::core::config::EngineConfig;
use crate::core::error::{NationError, Result};
use crate::core::types::{Era, GameMode};
use crate::crisis::engine::{resolve_after_decision, CrisisReport};
use crate::issue::keys::repeat_key;
use crate::issue::projects::{PATH_CYBERPUNK, PATH_SPACE};
use crate::issue::types::{Issue, IssueOption};
use crate::nation::institutions::{apply_deltas, derive_deltas};
use crate::nation::policy::{push_capped, DecisionRecord, PendingConsequence, PolicyCard};
use crate::nation::region::{
    apply_decision_to_regions, compute_borders, evolve_regions, geometry_tick_due, ShapeContext,
    Specialization,
};
use crate::nation::stats::StatKey;
use crate::nation::Nation;

/// What a single decision did
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionReport {
    pub issue_number: u32,
    pub issue_title: String,
    pub option_id: String,
    pub option_text: String,
    /// Set when the decision moved the nation into a new era
    pub new_era: Option<Era>,
    pub consequence_queued: bool,
    pub geometry_ticked: bool,
    pub crisis: CrisisReport,
}

/// A resolved decision, ready to be committed
#[derive(Debug, Clone)]
pub struct Resolution {
    pub nation: Nation,
    pub report: DecisionReport,
}

/// Era the decision leads to, if any
fn era_transition(nation: &Nation, option_id: &str) -> Option<Era> {
    match option_id {
        PATH_CYBERPUNK => return Some(Era::Cyberpunk),
        PATH_SPACE => return Some(Era::Intergalactic),
        _ => {}
    }
    let researched = nation.game_mode == GameMode::Eras
        && nation.era < Era::Information
        && nation.stats.technology >= 100;
    if researched {
        nation.era.next()
    } else {
        None
    }
}

/// Resolve `option_id` of `issue` against a copy of `nation`
pub fn resolve_decision(
    nation: &Nation,
    issue: &Issue,
    option_id: &str,
    config: &EngineConfig,
) -> Result<Resolution> {
    let option: &IssueOption = issue
        .option(option_id)
        .ok_or_else(|| NationError::UnknownOption(option_id.to_string()))?;

    let mut next = nation.clone();
    let issue_number = next.issues_resolved + 1;
    let target_region = issue.region_id();

    // Step 1: stat effects
    next.stats.apply_effects(&option.effects);

    // Step 2: era transition
    let new_era = era_transition(&next, option_id);
    if let Some(era) = new_era {
        let previous = next.era;
        next.era = era;
        if option_id != PATH_CYBERPUNK && option_id != PATH_SPACE {
            next.stats.set(StatKey::Technology, 0);
        }
        tracing::info!("{} advanced from the {} to the {}", next.name, previous, era);
        next.log(format!("[ERA] {} entered the {}.", next.name, era), config);
    }

    // Step 3: history and title memory
    push_capped(
        &mut next.decision_history,
        DecisionRecord {
            issue_number,
            era: next.era,
            issue_title: issue.title.clone(),
            option_text: option.text.clone(),
            effects: option.effects.clone(),
        },
        config.decision_history_cap,
    );
    next.log(format!("#{} {}: {}", issue_number, issue.title, option.text), config);
    if !issue.is_map_event {
        next.remember_title(&issue.title, config);
    }

    // Step 4: delayed consequence
    let consequence_queued = match &option.consequence {
        Some(consequence) => {
            let mut consequence = consequence.clone();
            consequence.clamp_chance();
            next.pending_consequences.push(PendingConsequence {
                issue_title: issue.title.clone(),
                option_text: option.text.clone(),
                consequence,
            });
            true
        }
        None => false,
    };

    // Step 5: institutions and factions
    let deltas = derive_deltas(&option.effects, &next.government_type);
    apply_deltas(&mut next.institutions, &mut next.factions, &deltas);

    // Step 6: policy card
    push_capped(
        &mut next.active_policies,
        PolicyCard {
            issue_title: issue.title.clone(),
            option_text: option.text.clone(),
            supporter: option.supporter.clone(),
            category: issue.category.clone(),
            effects: option.effects.clone(),
            era: next.era,
            issue_number,
        },
        config.active_policy_cap,
    );

    // Step 7: region scalars and specialization
    apply_decision_to_regions(&mut next.regions, &option.effects, target_region);
    if let (Some(spec), Some(region_id)) = (Specialization::from_option_id(option_id), target_region) {
        if let Some(region) = next.region_mut(region_id) {
            region.specialization = spec;
            tracing::debug!("{} chartered as {}", region.name, spec.name());
        }
    }

    // Step 8: geometry
    let geometry_ticked = geometry_tick_due(next.issues_resolved, next.game_mode, option_id, config);
    if geometry_ticked {
        let nation_id = next.id.clone();
        let ctx = ShapeContext {
            nation_id: &nation_id,
            issues_resolved: next.issues_resolved,
            era: next.era,
            option_id,
            effects: &option.effects,
            target_region,
        };
        evolve_regions(&mut next.regions, &ctx);
        next.borders = compute_borders(&next.regions);
    }

    // Step 9: crisis arcs
    let target = issue.crisis_target();
    let crisis = resolve_after_decision(&mut next, target.as_ref(), &option.effects, config);

    // Step 10: short-term memory and counter
    let key = repeat_key(issue);
    if !next.is_key_recent(&key) {
        next.remember_key(key, config);
    }
    next.issues_resolved += 1;

    Ok(Resolution {
        nation: next,
        report: DecisionReport {
            issue_number,
            issue_title: issue.title.clone(),
            option_id: option_id.to_string(),
            option_text: option.text.clone(),
            new_era,
            consequence_queued,
            geometry_ticked,
            crisis,
        },
    })
}
