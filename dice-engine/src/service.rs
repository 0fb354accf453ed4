//! In-process roll service honouring the remote service's request limits.
use async_trait::async_trait;
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::die::DieType;
use crate::error::ServiceError;
use crate::outcome::{RollOutcome, RollRequest, RollResponse, RollSummary};
use crate::requestor::RollService;
use crate::rng::service_rng;

/// Request limits enforced before any die is rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLimits {
    /// Exclusive upper bound on dice per request.
    #[serde(default = "ServiceLimits::default_max_dice")]
    pub max_dice: u32,
    /// Inclusive upper bound on faces per die.
    #[serde(default = "ServiceLimits::default_max_sides")]
    pub max_sides: u32,
}

impl ServiceLimits {
    const fn default_max_dice() -> u32 {
        1000
    }

    const fn default_max_sides() -> u32 {
        10_000
    }
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            max_dice: Self::default_max_dice(),
            max_sides: Self::default_max_sides(),
        }
    }
}

/// Roll service backed by a seeded ChaCha stream.
#[derive(Debug)]
pub struct LocalRollService {
    limits: ServiceLimits,
    rng: Mutex<ChaCha20Rng>,
}

impl LocalRollService {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::with_limits(seed, ServiceLimits::default())
    }

    #[must_use]
    pub fn with_limits(seed: u64, limits: ServiceLimits) -> Self {
        Self {
            limits,
            rng: Mutex::new(service_rng(seed)),
        }
    }

    #[must_use]
    pub const fn limits(&self) -> ServiceLimits {
        self.limits
    }

    /// Sides a request resolves to, after validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request breaks a limit.
    pub fn resolve_sides(&self, request: &RollRequest) -> Result<u32, ServiceError> {
        if request.count == 0 {
            return Err(ServiceError::rejected("count must be > 0"));
        }
        if request.count >= self.limits.max_dice {
            return Err(ServiceError::rejected("count exceeds max allowed"));
        }
        let sides = match request.die.die_type {
            DieType::Custom => request.die.sides.unwrap_or(DieType::DEFAULT_CUSTOM_SIDES),
            standard => standard.default_sides(),
        };
        if sides > self.limits.max_sides {
            return Err(ServiceError::rejected("sides exceeds max allowed"));
        }
        if sides < 2 {
            return Err(ServiceError::rejected("sides must be at least 2"));
        }
        Ok(sides)
    }

    /// Roll a request synchronously.
    ///
    /// # Errors
    ///
    /// Returns an error if the request breaks a limit, or
    /// [`ServiceError::Unavailable`] once a panic has poisoned the stream.
    pub fn roll_now(&self, request: &RollRequest) -> Result<RollResponse, ServiceError> {
        let sides = self.resolve_sides(request)?;
        let max_face = i32::try_from(sides)
            .map_err(|_| ServiceError::rejected("sides exceeds max allowed"))?;
        let faces: Vec<i32> = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| ServiceError::Unavailable("local roll stream poisoned".to_string()))?;
            (0..request.count)
                .map(|_| rng.gen_range(1..=max_face))
                .collect()
        };
        log::debug!(
            "local service rolled {}d{sides}: {faces:?}",
            request.count
        );
        Ok(RollResponse {
            rolls: vec![RollOutcome::from_faces(&faces)],
            summary: RollSummary {
                total_rolls_requested: 1,
            },
        })
    }
}

#[async_trait]
impl RollService for LocalRollService {
    async fn roll(&self, request: RollRequest) -> Result<RollResponse, ServiceError> {
        self.roll_now(&request)
    }
}
