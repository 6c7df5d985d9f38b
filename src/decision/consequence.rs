//! Delayed consequences
//!
//! One pending consequence is rolled per consequence tick. A hit applies its
//! stat effects and leaves the queue; a miss keeps the queue as it was.

use rand::Rng;

use crate::core::config::EngineConfig;
use crate::nation::policy::{ConsequenceKind, PendingConsequence};
use crate::nation::Nation;

/// Outcome of one roll
#[derive(Debug, Clone, PartialEq)]
pub struct ConsequenceRoll {
    pub pending: PendingConsequence,
    pub fired: bool,
}

pub fn log_line(pending: &PendingConsequence) -> String {
    let tag = match pending.consequence.kind {
        ConsequenceKind::Benefit => "[CONSEQUENCE]",
        ConsequenceKind::Downside => "[FALLOUT]",
    };
    format!("{} {} (after \"{}\")", tag, pending.consequence.text, pending.issue_title)
}

/// Pick one pending consequence at random and roll it
///
/// Returns `None` when nothing is pending.
pub fn roll_consequence<R: Rng>(
    nation: &mut Nation,
    rng: &mut R,
    config: &EngineConfig,
) -> Option<ConsequenceRoll> {
    if nation.pending_consequences.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..nation.pending_consequences.len());
    let chance = nation.pending_consequences[index].consequence.chance;
    let fired = rng.gen::<f64>() < chance;

    if !fired {
        return Some(ConsequenceRoll {
            pending: nation.pending_consequences[index].clone(),
            fired,
        });
    }

    let pending = nation.pending_consequences.remove(index);
    nation.stats.apply_effects(&pending.consequence.stat_effects);
    tracing::info!("Consequence fired for {}: {}", nation.name, pending.consequence.text);
    nation.log(log_line(&pending), config);
    Some(ConsequenceRoll { pending, fired })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Slot;
    use crate::issue::types::effects_of;
    use crate::nation::policy::Consequence;
    use crate::nation::NewNation;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pending(text: &str, chance: f64, kind: ConsequenceKind) -> PendingConsequence {
        PendingConsequence {
            issue_title: "Grain Tithe".into(),
            option_text: "Raise it".into(),
            consequence: Consequence {
                text: text.into(),
                chance,
                kind,
                stat_effects: effects_of(&[("happiness", -4)]),
            },
        }
    }

    fn nation() -> Nation {
        Nation::create(
            NewNation::new("c", Slot::new(1).unwrap(), "Rollia"),
            0,
            &EngineConfig::default(),
        )
    }

    #[test]
    fn test_empty_queue() {
        let mut n = nation();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(roll_consequence(&mut n, &mut rng, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_certain_consequence_fires() {
        let config = EngineConfig::default();
        let mut n = nation();
        let happiness = n.stats.happiness;
        n.pending_consequences.push(pending("Riots in the market", 1.0, ConsequenceKind::Downside));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let roll = roll_consequence(&mut n, &mut rng, &config).unwrap();
        assert!(roll.fired);
        assert!(n.pending_consequences.is_empty());
        assert_eq!(n.stats.happiness, happiness - 4);
        assert!(n.history_log.last().unwrap().starts_with("[FALLOUT] Riots in the market"));
    }

    #[test]
    fn test_impossible_consequence_stays_queued() {
        let config = EngineConfig::default();
        let mut n = nation();
        n.pending_consequences.push(pending("Good harvest", 0.0, ConsequenceKind::Benefit));
        let before = n.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        for _ in 0..10 {
            let roll = roll_consequence(&mut n, &mut rng, &config).unwrap();
            assert!(!roll.fired);
        }
        assert_eq!(n, before);
    }

    #[test]
    fn test_benefit_log_tag() {
        let line = log_line(&pending("Good harvest", 0.5, ConsequenceKind::Benefit));
        assert_eq!(line, "[CONSEQUENCE] Good harvest (after \"Grain Tithe\")");
    }
}
