//! Crisis arc engine
//!
//! Arcs age on every decision and on the periodic refresh. A decision can
//! close the arc it targeted, calm the rest, and any arc left at the top of
//! its ladder for too long breaks down and hits the nation.

use crate::core::config::EngineConfig;
use crate::crisis::arc::{CrisisArc, CrisisType};
use crate::crisis::pressure::generate_candidates;
use crate::nation::stats::{effect, Effects, StatKey};
use crate::nation::Nation;

/// Which arc a resolved issue was about
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrisisTarget {
    pub crisis_id: Option<String>,
    pub crisis_type: Option<CrisisType>,
    pub region_id: Option<String>,
}

impl CrisisTarget {
    pub fn matches(&self, arc: &CrisisArc) -> bool {
        if let Some(id) = &self.crisis_id {
            if *id == arc.id {
                return true;
            }
        }
        match (&self.crisis_type, &self.region_id) {
            (Some(crisis_type), Some(region_id)) => {
                *crisis_type == arc.crisis_type && *region_id == arc.region_id
            }
            _ => false,
        }
    }
}

/// What a resolution pass did to the arcs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrisisReport {
    pub resolved: Vec<String>,
    pub de_escalated: bool,
    pub breakdowns: Vec<String>,
    pub added: Vec<String>,
}

/// Stat penalties applied when an arc of this type breaks down
pub fn breakdown_penalty(crisis_type: CrisisType) -> &'static [(StatKey, i64)] {
    match crisis_type {
        CrisisType::Security => &[(StatKey::Crime, 6), (StatKey::PoliticalFreedom, -4)],
        CrisisType::Health => &[(StatKey::Healthcare, -6), (StatKey::Population, -3)],
        CrisisType::Infrastructure => &[(StatKey::Economy, -5), (StatKey::Gdp, -3)],
        CrisisType::Innovation => &[(StatKey::Technology, -5), (StatKey::Education, -4)],
        CrisisType::Unrest | CrisisType::Corruption => &[
            (StatKey::Economy, -4),
            (StatKey::Happiness, -5),
            (StatKey::Crime, 4),
        ],
    }
}

/// Combine surviving arcs with new candidates
///
/// Existing arcs win over candidates with the same source, type and region.
/// The result is ordered by severity (stable) and capped.
pub fn merge_arcs(
    existing: Vec<CrisisArc>,
    candidates: Vec<CrisisArc>,
    config: &EngineConfig,
) -> Vec<CrisisArc> {
    let mut merged: Vec<CrisisArc> = Vec::with_capacity(existing.len() + candidates.len());
    for arc in existing.into_iter().chain(candidates) {
        let key = arc.merge_key();
        if !merged.iter().any(|a| a.merge_key() == key) {
            merged.push(arc);
        }
    }
    merged.sort_by(|a, b| b.severity.cmp(&a.severity));
    merged.truncate(config.max_crisis_arcs);
    merged
}

/// Advance every arc one step, then admit the strongest new pressures
pub fn advance_and_merge(nation: &mut Nation, config: &EngineConfig) -> Vec<String> {
    for arc in &mut nation.crisis_arcs {
        arc.advance(config);
    }

    let existing: Vec<_> = nation.crisis_arcs.iter().map(CrisisArc::merge_key).collect();
    let fresh: Vec<CrisisArc> = generate_candidates(nation, config)
        .into_iter()
        .filter(|arc| !existing.contains(&arc.merge_key()))
        .take(config.max_new_arcs_per_pass)
        .collect();
    let added: Vec<String> = fresh.iter().map(|arc| arc.id.clone()).collect();
    for arc in &fresh {
        tracing::debug!("New crisis arc {} ({})", arc.id, arc.reason);
    }

    let existing = std::mem::take(&mut nation.crisis_arcs);
    nation.crisis_arcs = merge_arcs(existing, fresh, config);

    added
        .into_iter()
        .filter(|id| nation.crisis_arcs.iter().any(|arc| arc.id == *id))
        .collect()
}

fn apply_breakdown(nation: &mut Nation, arc: &CrisisArc, config: &EngineConfig) {
    for &(stat, delta) in breakdown_penalty(arc.crisis_type) {
        nation.stats.apply(stat, delta);
    }
    if let Some(region) = nation.region_mut(&arc.region_id) {
        region.stability = (region.stability - config.breakdown_stability_loss).clamp(0, 100);
        region.development = (region.development - config.breakdown_development_loss).clamp(0, 100);
    }
    tracing::info!("Crisis arc {} broke down in {}", arc.id, arc.region_name);
    nation.log(
        format!(
            "[CRISIS BREAKDOWN] {} in {} spiralled out of control.",
            arc.crisis_type.title(),
            arc.region_name
        ),
        config,
    );
    nation.remember_key(arc.repeat_key(), config);
}

/// Run the arc engine after a decision has been applied to the nation
pub fn resolve_after_decision(
    nation: &mut Nation,
    target: Option<&CrisisTarget>,
    effects: &Effects,
    config: &EngineConfig,
) -> CrisisReport {
    let mut report = CrisisReport::default();

    if let Some(target) = target {
        let (closed, open): (Vec<_>, Vec<_>) = std::mem::take(&mut nation.crisis_arcs)
            .into_iter()
            .partition(|arc| target.matches(arc));
        nation.crisis_arcs = open;
        // cool the key down before the pressure pass can raise the arc again
        for arc in &closed {
            if !nation.is_key_recent(&arc.repeat_key()) {
                nation.remember_key(arc.repeat_key(), config);
            }
        }
        report.resolved = closed.into_iter().map(|arc| arc.id).collect();
    }

    let relief = effect(effects, StatKey::Happiness) - effect(effects, StatKey::Crime);
    if relief >= config.de_escalation_threshold && !nation.crisis_arcs.is_empty() {
        for arc in &mut nation.crisis_arcs {
            arc.de_escalate();
        }
        report.de_escalated = true;
    }

    let (overdue, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut nation.crisis_arcs)
        .into_iter()
        .partition(|arc| arc.is_overdue(config));
    nation.crisis_arcs = remaining;
    for arc in &overdue {
        apply_breakdown(nation, arc, config);
    }
    report.breakdowns = overdue.into_iter().map(|arc| arc.id).collect();

    report.added = advance_and_merge(nation, config);
    report
}

/// Timer-driven refresh; never triggers breakdowns
pub fn refresh(nation: &mut Nation, config: &EngineConfig) -> Vec<String> {
    advance_and_merge(nation, config)
}

/// The arcs shown on the map, most severe first
pub fn build_map_crises(arcs: &[CrisisArc], config: &EngineConfig) -> Vec<CrisisArc> {
    let mut visible: Vec<CrisisArc> = arcs
        .iter()
        .filter(|arc| arc.stage <= arc.max_stage)
        .cloned()
        .collect();
    visible.sort_by(|a, b| b.severity.cmp(&a.severity));
    visible.truncate(config.max_map_crises);
    visible
}
