//! Dice Roll Engine
//!
//! Platform-agnostic dice roll aggregation and modifier pipeline.
//! This crate turns independently rolled dice, produced by any [`RollService`],
//! into final results by applying per-configuration reroll and advantage rules,
//! then records each completed action in a session history. It carries no UI
//! or transport dependencies.

pub mod aggregate;
pub mod die;
pub mod error;
pub mod history;
pub mod numbers;
pub mod outcome;
pub mod pipeline;
pub mod requestor;
pub mod rng;
pub mod service;
pub mod session;
pub mod tray;

// Re-export commonly used types
pub use aggregate::{RollStats, aggregate, aggregate_all};
pub use die::{Advantage, ConfigId, DieConfig, DieType, RerollOperator, RerollRule};
pub use error::{ConfigError, RollError, ServiceError};
pub use history::{History, HistoryEntry, HistorySummary, local_time_label};
pub use outcome::{DieSpec, PerDieOutcome, RollOutcome, RollRequest, RollResponse, RollSummary};
pub use pipeline::{
    DieTrace, MAX_REROLL_ATTEMPTS, RollTrace, apply_modifiers, apply_to_die, apply_to_roll,
    config_for_die,
};
pub use requestor::{CombinedRolls, RollService, request_rolls};
pub use rng::{CountingRng, ScriptedUnits, UnitSource, entropy_seed};
pub use service::{LocalRollService, ServiceLimits};
pub use session::{Clock, LoadingHandle, RollSession};
pub use tray::{DiceTray, TraySnapshot};
