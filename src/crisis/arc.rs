//! Crisis arc - staged background pressure tied to a region

use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::types::MapPoint;
use crate::nation::institutions::{FactionKind, InstitutionKind};
use crate::nation::region::Terrain;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrisisType {
    Unrest,
    Corruption,
    Infrastructure,
    Health,
    Security,
    Innovation,
}

impl CrisisType {
    pub fn name(&self) -> &'static str {
        match self {
            CrisisType::Unrest => "unrest",
            CrisisType::Corruption => "corruption",
            CrisisType::Infrastructure => "infrastructure",
            CrisisType::Health => "health",
            CrisisType::Security => "security",
            CrisisType::Innovation => "innovation",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CrisisType::Unrest => "Unrest",
            CrisisType::Corruption => "Corruption",
            CrisisType::Infrastructure => "Infrastructure Decay",
            CrisisType::Health => "Health Emergency",
            CrisisType::Security => "Security Breakdown",
            CrisisType::Innovation => "Innovation Stall",
        }
    }

    pub fn from_name(name: &str) -> Option<CrisisType> {
        [
            CrisisType::Unrest,
            CrisisType::Corruption,
            CrisisType::Infrastructure,
            CrisisType::Health,
            CrisisType::Security,
            CrisisType::Innovation,
        ]
        .into_iter()
        .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Severity is a function of how far along its ladder an arc is.
    /// Three-stage arcs run low → medium → high, two-stage arcs low → medium.
    pub fn for_stage(stage: u32, max_stage: u32) -> Severity {
        match (max_stage, stage) {
            (3, s) if s >= 3 => Severity::High,
            (3, 2) => Severity::Medium,
            (2, s) if s >= 2 => Severity::Medium,
            _ => Severity::Low,
        }
    }

    pub fn from_pressure(pressure: i64, config: &EngineConfig) -> Severity {
        if pressure >= config.high_severity_pressure {
            Severity::High
        } else if pressure >= config.medium_severity_pressure {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Low-pressure arcs get a short ladder
    pub fn max_stage(&self) -> u32 {
        match self {
            Severity::Low => 2,
            Severity::Medium | Severity::High => 3,
        }
    }

    /// Stage at which a new arc of this severity enters its ladder
    pub fn start_stage(&self) -> u32 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }
}

/// What produced the pressure behind an arc
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum CrisisSource {
    Faction(FactionKind),
    Institution(InstitutionKind),
    Policy,
}

impl CrisisSource {
    pub fn key(&self) -> String {
        match self {
            CrisisSource::Faction(f) => format!("faction:{}", f.name()),
            CrisisSource::Institution(i) => format!("institution:{}", i.name()),
            CrisisSource::Policy => "policy".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisArc {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub region_id: String,
    pub region_name: String,
    pub region_terrain: Terrain,
    #[serde(rename = "type")]
    pub crisis_type: CrisisType,
    pub severity: Severity,
    pub label: String,
    pub source: CrisisSource,
    pub reason: String,
    pub stage: u32,
    pub max_stage: u32,
    #[serde(default)]
    pub tick: u32,
}

impl CrisisArc {
    pub fn position(&self) -> MapPoint {
        MapPoint::new(self.x, self.y)
    }

    /// Short-term memory key shared with crisis-sourced issues
    pub fn repeat_key(&self) -> String {
        crisis_repeat_key(self.crisis_type, &self.region_id)
    }

    /// Identity used when merging arcs from successive passes
    pub fn merge_key(&self) -> (String, CrisisType, String) {
        (self.source.key(), self.crisis_type, self.region_id.clone())
    }

    pub fn refresh_severity(&mut self) {
        self.severity = Severity::for_stage(self.stage, self.max_stage);
    }

    /// One engine pass: age the arc and escalate once it has sat long enough
    pub fn advance(&mut self, config: &EngineConfig) {
        self.tick += 1;
        if self.tick >= config.escalation_ticks && self.stage < self.max_stage {
            self.stage += 1;
            self.tick = 0;
        }
        self.refresh_severity();
    }

    pub fn de_escalate(&mut self) {
        self.stage = self.stage.saturating_sub(1).max(1);
        self.tick = 0;
        self.refresh_severity();
    }

    pub fn is_overdue(&self, config: &EngineConfig) -> bool {
        self.stage == self.max_stage && self.tick >= config.overdue_ticks
    }

    /// Repair a persisted arc so stage and severity agree
    pub fn normalize(&mut self) {
        self.max_stage = self.max_stage.clamp(2, 3);
        self.stage = self.stage.clamp(1, self.max_stage);
        self.refresh_severity();
    }
}

pub fn crisis_repeat_key(crisis_type: CrisisType, region_id: &str) -> String {
    format!("crisis:{}:{}", crisis_type.name(), region_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_arc(stage: u32, max_stage: u32) -> CrisisArc {
        CrisisArc {
            id: "arc-unrest-river-faction:citizens".into(),
            x: 30.0,
            y: 70.0,
            region_id: "river".into(),
            region_name: "Riverlands".into(),
            region_terrain: Terrain::Riverland,
            crisis_type: CrisisType::Unrest,
            severity: Severity::for_stage(stage, max_stage),
            label: "Unrest in Riverlands".into(),
            source: CrisisSource::Faction(FactionKind::Citizens),
            reason: "test".into(),
            stage,
            max_stage,
            tick: 0,
        }
    }

    #[test]
    fn test_severity_ladders() {
        assert_eq!(Severity::for_stage(1, 3), Severity::Low);
        assert_eq!(Severity::for_stage(2, 3), Severity::Medium);
        assert_eq!(Severity::for_stage(3, 3), Severity::High);
        assert_eq!(Severity::for_stage(1, 2), Severity::Low);
        assert_eq!(Severity::for_stage(2, 2), Severity::Medium);
    }

    #[test]
    fn test_start_stage_matches_ladder() {
        for severity in [Severity::Low, Severity::Medium, Severity::High] {
            assert_eq!(
                Severity::for_stage(severity.start_stage(), severity.max_stage()),
                severity
            );
        }
    }

    #[test]
    fn test_advance_escalates_every_two_ticks() {
        let config = EngineConfig::default();
        let mut arc = sample_arc(1, 3);
        arc.advance(&config);
        assert_eq!((arc.stage, arc.tick), (1, 1));
        arc.advance(&config);
        assert_eq!((arc.stage, arc.tick), (2, 0));
        assert_eq!(arc.severity, Severity::Medium);
    }

    #[test]
    fn test_stage_never_exceeds_max() {
        let config = EngineConfig::default();
        let mut arc = sample_arc(1, 2);
        for _ in 0..20 {
            arc.advance(&config);
            assert!(arc.stage <= arc.max_stage);
        }
        assert!(arc.is_overdue(&config));
    }

    #[test]
    fn test_de_escalate_floors_at_one() {
        let mut arc = sample_arc(1, 3);
        arc.tick = 1;
        arc.de_escalate();
        assert_eq!((arc.stage, arc.tick), (1, 0));
    }

    #[test]
    fn test_source_serialization() {
        let json = serde_json::to_string(&CrisisSource::Institution(InstitutionKind::Economy)).unwrap();
        assert_eq!(json, r#"{"kind":"institution","name":"economy"}"#);
        let back: CrisisSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CrisisSource::Institution(InstitutionKind::Economy));
    }

    #[test]
    fn test_repeat_key() {
        assert_eq!(sample_arc(1, 3).repeat_key(), "crisis:unrest:river");
    }
}
