//! Roll outcomes exchanged with roll services and shown to the display layer.
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::aggregate::RollStats;
use crate::die::{DieConfig, DieType};

/// Raw face chain for one die; a single entry unless the service rerolled.
pub type FaceChain = SmallVec<[i32; 2]>;

/// One die of a roll: the faces the service produced and the value in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerDieOutcome {
    pub original: FaceChain,
    #[serde(rename = "final")]
    pub final_value: i32,
}

impl PerDieOutcome {
    /// Die rolled once with face `face`.
    #[must_use]
    pub fn single(face: i32) -> Self {
        Self {
            original: smallvec![face],
            final_value: face,
        }
    }
}

/// Result of rolling every die of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOutcome {
    pub per_die: Vec<PerDieOutcome>,
    pub used: Vec<i32>,
    pub sum: i64,
    pub average: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<i32>,
}

impl RollOutcome {
    /// Outcome with statistics derived from `per_die`.
    #[must_use]
    pub fn from_dice(per_die: Vec<PerDieOutcome>) -> Self {
        let used: Vec<i32> = per_die.iter().map(|die| die.final_value).collect();
        let stats = RollStats::from_faces(&used);
        Self {
            per_die,
            used,
            sum: stats.sum,
            average: stats.average,
            median: Some(stats.median),
            spread: Some(stats.spread),
        }
    }

    /// Outcome of dice each rolled once.
    #[must_use]
    pub fn from_faces(faces: &[i32]) -> Self {
        Self::from_dice(faces.iter().copied().map(PerDieOutcome::single).collect())
    }

    /// Current final value of every die, in order.
    #[must_use]
    pub fn finals(&self) -> Vec<i32> {
        self.per_die.iter().map(|die| die.final_value).collect()
    }

    /// Whether `sum`, `used` and `average` agree with the per-die values.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let finals = self.finals();
        let sum: i64 = self.used.iter().copied().map(i64::from).sum();
        let expected_average = crate::numbers::mean(sum, self.used.len());
        self.used == finals
            && self.sum == sum
            && (self.average - expected_average).abs() < 1e-9
    }
}

/// Die requested from a roll service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieSpec {
    #[serde(rename = "type")]
    pub die_type: DieType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sides: Option<u32>,
}

/// One roll request: `count` dice of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRequest {
    pub die: DieSpec,
    pub count: u32,
}

impl RollRequest {
    /// Request matching a configuration; `sides` is only sent for custom dice.
    #[must_use]
    pub fn for_config(config: &DieConfig) -> Self {
        let sides = match config.die_type {
            DieType::Custom => Some(config.sides),
            _ => None,
        };
        Self {
            die: DieSpec {
                die_type: config.die_type,
                sides,
            },
            count: config.count,
        }
    }
}

/// Bookkeeping attached to a roll response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollSummary {
    pub total_rolls_requested: usize,
}

/// Response of a roll service, or the merged response of a whole action.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RollResponse {
    pub rolls: Vec<RollOutcome>,
    #[serde(default)]
    pub summary: RollSummary,
}

impl RollResponse {
    /// Sum of every roll's `sum`.
    #[must_use]
    pub fn grand_total(&self) -> i64 {
        self.rolls.iter().map(|roll| roll.sum).sum()
    }
}
