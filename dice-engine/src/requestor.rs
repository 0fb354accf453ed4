//! Roll requestor: one service request per configuration, all in flight at once.
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;

use crate::die::DieConfig;
use crate::error::{RollError, ServiceError};
use crate::outcome::{RollRequest, RollResponse, RollSummary};

/// External source of rolled dice.
#[async_trait]
pub trait RollService: Send + Sync {
    /// Roll `request.count` dice of the requested kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the request or cannot be reached.
    async fn roll(&self, request: RollRequest) -> Result<RollResponse, ServiceError>;
}

#[async_trait]
impl<S: RollService + ?Sized> RollService for Arc<S> {
    async fn roll(&self, request: RollRequest) -> Result<RollResponse, ServiceError> {
        (**self).roll(request).await
    }
}

/// Every configuration's rolls merged into one response.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRolls {
    pub response: RollResponse,
    /// Index of the configuration that produced each entry of `response.rolls`.
    pub origins: Vec<usize>,
}

/// Issue one request per configuration concurrently and merge the results.
///
/// Rolls are concatenated in configuration order regardless of which request
/// resolves first, and `summary.total_rolls_requested` counts configurations.
/// A service may answer one request with several rolls; `origins` keeps each
/// roll tied to its configuration. The first failing request aborts the
/// whole action.
///
/// # Errors
///
/// Returns [`RollError::EmptyTray`] for an empty slice and
/// [`RollError::Request`] when any request fails.
pub async fn request_rolls<S>(service: &S, configs: &[DieConfig]) -> Result<CombinedRolls, RollError>
where
    S: RollService + ?Sized,
{
    if configs.is_empty() {
        return Err(RollError::EmptyTray);
    }

    let pending = configs
        .iter()
        .map(|config| service.roll(RollRequest::for_config(config)));
    let responses = try_join_all(pending).await?;

    let mut rolls = Vec::with_capacity(configs.len());
    let mut origins = Vec::with_capacity(configs.len());
    for (config_index, response) in responses.into_iter().enumerate() {
        origins.extend(std::iter::repeat_n(config_index, response.rolls.len()));
        rolls.extend(response.rolls);
    }
    Ok(CombinedRolls {
        response: RollResponse {
            rolls,
            summary: RollSummary {
                total_rolls_requested: configs.len(),
            },
        },
        origins,
    })
}
