//! Modifier pipeline: per-die reroll and advantage rules.
//!
//! Each die of a roll is matched to a configuration by its position inside
//! that roll (see [`config_for_die`]). The reroll rule runs first and the
//! advantage adjustment second. The pipeline never validates configurations
//! and never clamps the adjusted value to the die's natural range.
use serde::Serialize;

use crate::die::DieConfig;
use crate::outcome::{PerDieOutcome, RollOutcome};
use crate::rng::UnitSource;

/// Upper bound on redraws per die. A die can leave the loop with its reroll
/// condition still holding.
pub const MAX_REROLL_ATTEMPTS: u32 = 3;

/// Configuration whose rules apply to the die at `die_index` within a roll.
///
/// Maps to `configs[min(die_index, configs.len() - 1)]`: once a roll has more
/// dice than there are configurations, every extra die reuses the last
/// configuration. Note the index is the die's position inside its own roll,
/// not the roll's position in the action, so the first die of every roll
/// follows the first configuration. Returns `None` only for an empty slice.
#[must_use]
pub fn config_for_die(configs: &[DieConfig], die_index: usize) -> Option<&DieConfig> {
    let last = configs.len().checked_sub(1)?;
    configs.get(die_index.min(last))
}

/// What the pipeline did to a single die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DieTrace {
    /// Final value before the pipeline ran.
    pub before: i32,
    /// Value after the reroll rule, before the advantage adjustment.
    pub after_reroll: i32,
    /// Final value after both rules.
    pub after: i32,
    pub reroll_attempts: u32,
    pub advantage_delta: i32,
}

impl DieTrace {
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// What the pipeline did to one roll.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RollTrace {
    pub dice: Vec<DieTrace>,
    /// Any die's final value differs from its pipeline input.
    pub changed: bool,
}

/// Apply the reroll and advantage rules of `config` to one die.
pub fn apply_to_die<U: UnitSource + ?Sized>(
    die: &mut PerDieOutcome,
    config: &DieConfig,
    units: &mut U,
) -> DieTrace {
    let before = die.final_value;

    let mut reroll_attempts = 0;
    if config.reroll.enabled {
        while config.reroll.matches(die.final_value) && reroll_attempts < MAX_REROLL_ATTEMPTS {
            die.final_value = units.draw_face(config.sides);
            reroll_attempts += 1;
        }
    }
    let after_reroll = die.final_value;

    let advantage_delta = config.advantage_delta();
    die.final_value = die.final_value.saturating_add(advantage_delta);

    DieTrace {
        before,
        after_reroll,
        after: die.final_value,
        reroll_attempts,
        advantage_delta,
    }
}

/// Apply the per-die rules to every die of one roll.
pub fn apply_to_roll<U: UnitSource + ?Sized>(
    roll: &mut RollOutcome,
    configs: &[DieConfig],
    units: &mut U,
) -> RollTrace {
    let mut trace = RollTrace::default();
    for (idx, die) in roll.per_die.iter_mut().enumerate() {
        let Some(config) = config_for_die(configs, idx) else {
            break;
        };
        let die_trace = apply_to_die(die, config, units);
        if die_trace.reroll_attempts > 0 {
            log::debug!(
                "die {idx} ({}) rerolled {} time(s): {} -> {}",
                config.label(),
                die_trace.reroll_attempts,
                die_trace.before,
                die_trace.after_reroll
            );
        }
        trace.changed |= die_trace.changed();
        trace.dice.push(die_trace);
    }
    trace
}

/// Apply the per-die rules to every roll of an action, in place.
///
/// Returns one trace per roll, index-aligned with `rolls`.
pub fn apply_modifiers<U: UnitSource + ?Sized>(
    rolls: &mut [RollOutcome],
    configs: &[DieConfig],
    units: &mut U,
) -> Vec<RollTrace> {
    rolls
        .iter_mut()
        .map(|roll| apply_to_roll(roll, configs, units))
        .collect()
}
