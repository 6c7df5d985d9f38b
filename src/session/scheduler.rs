//! Per-nation scheduler state and the background tick
//!
//! Each active nation owns one `SchedulerState`. The engine calls [`tick`]
//! explicitly; there is no hidden timer or shared state between nations.

use ahash::AHashSet;
use rand::Rng;

use crate::core::config::EngineConfig;
use crate::crisis::engine::refresh;
use crate::decision::consequence::{roll_consequence, ConsequenceRoll};
use crate::nation::Nation;

#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// Background ticks run so far
    pub ticks: u64,
    /// An issue generation is in flight
    pub generating: bool,
    /// `arcId@stage` keys of crises already forced as issues
    pub seen_forced: AHashSet<String>,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub consequence: Option<ConsequenceRoll>,
    /// Ids of arcs admitted by a crisis refresh on this tick
    pub crisis_added: Vec<String>,
    pub crisis_refreshed: bool,
}

impl TickReport {
    /// Whether the nation changed and needs saving
    pub fn changed_nation(&self) -> bool {
        self.crisis_refreshed || self.consequence.as_ref().is_some_and(|roll| roll.fired)
    }
}

/// One background tick: consequence roll and crisis refresh on their cadences
pub fn tick<R: Rng>(
    state: &mut SchedulerState,
    nation: &mut Nation,
    rng: &mut R,
    config: &EngineConfig,
) -> TickReport {
    state.ticks += 1;
    let mut report = TickReport {
        tick: state.ticks,
        ..TickReport::default()
    };

    if state.ticks % config.consequence_every_ticks == 0 {
        report.consequence = roll_consequence(nation, rng, config);
    }

    if state.ticks % config.crisis_refresh_every_ticks == 0 {
        report.crisis_added = refresh(nation, config);
        report.crisis_refreshed = true;
        tracing::debug!(
            "Tick {} refreshed crises for {} ({} arcs)",
            state.ticks,
            nation.id,
            nation.crisis_arcs.len()
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Slot;
    use crate::issue::types::effects_of;
    use crate::nation::policy::{Consequence, ConsequenceKind, PendingConsequence};
    use crate::nation::NewNation;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn nation() -> Nation {
        Nation::create(
            NewNation::new("sch", Slot::new(1).unwrap(), "Tickland"),
            0,
            &EngineConfig::default(),
        )
    }

    #[test]
    fn test_cadences() {
        let config = EngineConfig::default();
        let mut state = SchedulerState::new();
        let mut n = nation();
        n.pending_consequences.push(PendingConsequence {
            issue_title: "Dam".into(),
            option_text: "Build it".into(),
            consequence: Consequence {
                text: "The valley floods".into(),
                chance: 1.0,
                kind: ConsequenceKind::Downside,
                stat_effects: effects_of(&[("environment", -5)]),
            },
        });
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let first = tick(&mut state, &mut n, &mut rng, &config);
        assert!(first.consequence.is_none());
        assert!(!first.crisis_refreshed);

        let second = tick(&mut state, &mut n, &mut rng, &config);
        assert!(second.consequence.as_ref().is_some_and(|roll| roll.fired));
        assert!(second.changed_nation());

        for _ in 0..2 {
            tick(&mut state, &mut n, &mut rng, &config);
        }
        let fifth = tick(&mut state, &mut n, &mut rng, &config);
        assert_eq!(fifth.tick, 5);
        assert!(fifth.crisis_refreshed);
    }

    #[test]
    fn test_refresh_never_breaks_down() {
        let config = EngineConfig::default();
        let mut state = SchedulerState::new();
        let mut n = nation();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            tick(&mut state, &mut n, &mut rng, &config);
        }
        assert!(!n.history_log.iter().any(|l| l.starts_with("[CRISIS BREAKDOWN]")));
        assert!(n.crisis_arcs.len() <= config.max_crisis_arcs);
    }
}
