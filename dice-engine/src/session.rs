//! Roll session: the single action boundary tying the pipeline together.
use rand::rngs::SmallRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::aggregate::aggregate_all;
use crate::error::RollError;
use crate::history::{History, local_time_label};
use crate::outcome::RollResponse;
use crate::pipeline::{RollTrace, apply_modifiers};
use crate::requestor::{CombinedRolls, RollService, request_rolls};
use crate::rng::{CountingRng, REROLL_STREAM, UnitSource};
use crate::tray::{DiceTray, TraySnapshot};

/// Produces the display timestamp stored with each history entry.
pub type Clock = fn() -> String;

/// Shared view of a session's loading flag, readable while a roll action
/// holds the session.
#[derive(Debug, Clone, Default)]
pub struct LoadingHandle(Arc<AtomicBool>);

impl LoadingHandle {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, loading: bool) {
        self.0.store(loading, Ordering::Release);
    }
}

/// Clears the loading flag when the action ends, even if its future is
/// dropped mid-flight.
struct LoadingGuard(LoadingHandle);

impl LoadingGuard {
    fn raise(handle: &LoadingHandle) -> Self {
        handle.set(true);
        Self(handle.clone())
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// One user's dice tray, latest result and history.
#[derive(Debug)]
pub struct RollSession<U = CountingRng<SmallRng>> {
    tray: DiceTray,
    history: History,
    last_result: Option<RollResponse>,
    last_traces: Vec<RollTrace>,
    last_origins: Vec<usize>,
    loading: LoadingHandle,
    units: U,
    clock: Clock,
}

impl RollSession {
    /// Session with the default tray whose redraws come from `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::with_units(CountingRng::from_stream(seed, REROLL_STREAM))
    }
}

impl<U: UnitSource> RollSession<U> {
    /// Session with the default tray and an explicit redraw source.
    #[must_use]
    pub fn with_units(units: U) -> Self {
        Self {
            tray: DiceTray::default(),
            history: History::new(),
            last_result: None,
            last_traces: Vec::new(),
            last_origins: Vec::new(),
            loading: LoadingHandle::default(),
            units,
            clock: local_time_label,
        }
    }

    /// Replace the tray.
    #[must_use]
    pub fn with_tray(mut self, tray: DiceTray) -> Self {
        self.tray = tray;
        self
    }

    /// Replace the timestamp source used for history entries.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn tray(&self) -> &DiceTray {
        &self.tray
    }

    pub fn tray_mut(&mut self) -> &mut DiceTray {
        &mut self.tray
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Latest combined, pipeline-applied response.
    #[must_use]
    pub const fn last_result(&self) -> Option<&RollResponse> {
        self.last_result.as_ref()
    }

    /// Per-roll pipeline traces of the latest successful action.
    #[must_use]
    pub fn last_traces(&self) -> &[RollTrace] {
        &self.last_traces
    }

    /// Configuration index that produced each roll of the latest result.
    #[must_use]
    pub fn last_origins(&self) -> &[usize] {
        &self.last_origins
    }

    /// Whether a roll action is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Handle that keeps reporting the loading flag while `roll` borrows
    /// the session.
    #[must_use]
    pub fn loading_handle(&self) -> LoadingHandle {
        self.loading.clone()
    }

    /// Roll every configuration of the tray once.
    ///
    /// The tray is snapshotted before any request is issued. On success the
    /// modified rolls replace the last result and a history entry is
    /// prepended; on failure neither changes.
    ///
    /// # Errors
    ///
    /// Returns an error if any roll request fails.
    pub async fn roll<S>(&mut self, service: &S) -> Result<&RollResponse, RollError>
    where
        S: RollService + ?Sized,
    {
        let snapshot = self.tray.snapshot();
        let outcome = {
            let _loading = LoadingGuard::raise(&self.loading);
            run_action(service, &snapshot, &mut self.units).await
        };

        match outcome {
            Ok((CombinedRolls { response, origins }, traces)) => {
                let entry = self
                    .history
                    .record((self.clock)(), response.rolls.clone());
                log::info!(
                    "rolled {} configuration(s) at {}: total {}",
                    snapshot.len(),
                    entry.time,
                    entry.summary.sum
                );
                self.last_traces = traces;
                self.last_origins = origins;
                Ok(self.last_result.insert(response))
            }
            Err(err) => {
                log::error!("roll error: {err}");
                Err(err)
            }
        }
    }
}

async fn run_action<S, U>(
    service: &S,
    snapshot: &TraySnapshot,
    units: &mut U,
) -> Result<(CombinedRolls, Vec<RollTrace>), RollError>
where
    S: RollService + ?Sized,
    U: UnitSource,
{
    let mut combined = request_rolls(service, snapshot).await?;
    let rolls = &mut combined.response.rolls;
    let traces = apply_modifiers(rolls, snapshot, units);
    let recomputed = aggregate_all(rolls, &traces);
    log::debug!("pipeline changed {recomputed} of {} roll(s)", rolls.len());
    Ok((combined, traces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::{Advantage, DieType};
    use crate::error::ServiceError;
    use crate::outcome::{RollOutcome, RollRequest};
    use crate::rng::ScriptedUnits;
    use crate::service::LocalRollService;
    use async_trait::async_trait;

    fn fixed_clock() -> String {
        "12:00:00".to_string()
    }

    struct Fixed(Vec<i32>);

    #[async_trait]
    impl RollService for Fixed {
        async fn roll(&self, _request: RollRequest) -> Result<RollResponse, ServiceError> {
            Ok(RollResponse {
                rolls: vec![RollOutcome::from_faces(&self.0)],
                summary: Default::default(),
            })
        }
    }

    /// Records the loading flag it sees while answering, then succeeds or
    /// fails as configured.
    struct Watching {
        handle: LoadingHandle,
        seen: AtomicBool,
        fail: bool,
    }

    impl Watching {
        fn new(handle: LoadingHandle, fail: bool) -> Self {
            Self {
                handle,
                seen: AtomicBool::new(false),
                fail,
            }
        }
    }

    #[async_trait]
    impl RollService for Watching {
        async fn roll(&self, _request: RollRequest) -> Result<RollResponse, ServiceError> {
            self.seen.store(self.handle.is_loading(), Ordering::SeqCst);
            if self.fail {
                return Err(ServiceError::Unavailable("connection reset".to_string()));
            }
            Ok(RollResponse {
                rolls: vec![RollOutcome::from_faces(&[4])],
                summary: Default::default(),
            })
        }
    }

    /// Never answers.
    struct Stalled;

    #[async_trait]
    impl RollService for Stalled {
        async fn roll(&self, _request: RollRequest) -> Result<RollResponse, ServiceError> {
            futures::future::pending().await
        }
    }

    struct Down;

    #[async_trait]
    impl RollService for Down {
        async fn roll(&self, _request: RollRequest) -> Result<RollResponse, ServiceError> {
            Err(ServiceError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn advantage_result_is_recorded() {
        let mut session = RollSession::with_units(ScriptedUnits::default()).with_clock(fixed_clock);
        let id = session.tray().configs()[0].id.clone();
        session
            .tray_mut()
            .update(&id, |cfg| {
                cfg.advantage = Advantage::Adv;
                cfg.numeric_modifier = 2;
            })
            .unwrap();

        let result = session.roll(&Fixed(vec![3])).await.unwrap();
        assert_eq!(result.rolls[0].finals(), vec![5]);
        assert_eq!(result.rolls[0].sum, 5);
        assert_eq!(result.summary.total_rolls_requested, 1);

        let entry = session.history().latest().unwrap();
        assert_eq!(entry.time, "12:00:00");
        assert_eq!(entry.summary.sum, 5);
        assert!(!session.is_loading());
        assert!(session.last_traces()[0].changed);
    }

    #[tokio::test]
    async fn failure_keeps_previous_state() {
        let mut session = RollSession::from_seed(5).with_clock(fixed_clock);
        session.roll(&LocalRollService::from_seed(5)).await.unwrap();
        let previous = session.last_result().cloned();

        let err = session.roll(&Down).await.unwrap_err();

        assert_eq!(
            err.alert_message(),
            "Roll failed: roll service unavailable: connection refused"
        );
        assert_eq!(session.last_result().cloned(), previous);
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn every_configuration_is_requested() {
        let mut session = RollSession::from_seed(8).with_clock(fixed_clock);
        session.tray_mut().add(DieType::D20);
        session.tray_mut().add(DieType::Custom);
        let result = session
            .roll(&LocalRollService::from_seed(8))
            .await
            .unwrap();
        assert_eq!(result.rolls.len(), 3);
        assert_eq!(result.summary.total_rolls_requested, 3);
        assert!(result.rolls.iter().all(RollOutcome::is_consistent));
        assert_eq!(session.last_origins(), &[0, 1, 2]);
    }

    #[tokio::test]
    async fn loading_is_visible_while_the_service_answers() {
        let mut session = RollSession::with_units(ScriptedUnits::default()).with_clock(fixed_clock);
        let handle = session.loading_handle();
        assert!(!handle.is_loading());

        let service = Watching::new(handle.clone(), false);
        session.roll(&service).await.unwrap();
        assert!(service.seen.load(Ordering::SeqCst));
        assert!(!handle.is_loading());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn loading_clears_after_a_failed_action() {
        let mut session = RollSession::with_units(ScriptedUnits::default()).with_clock(fixed_clock);
        let handle = session.loading_handle();

        let service = Watching::new(handle.clone(), true);
        let err = session.roll(&service).await.unwrap_err();
        assert_eq!(
            err.alert_message(),
            "Roll failed: roll service unavailable: connection reset"
        );
        assert!(service.seen.load(Ordering::SeqCst));
        assert!(!handle.is_loading());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn loading_clears_when_the_action_is_abandoned() {
        let mut session = RollSession::with_units(ScriptedUnits::default()).with_clock(fixed_clock);
        let handle = session.loading_handle();

        let abandoned =
            tokio::time::timeout(std::time::Duration::from_millis(20), session.roll(&Stalled))
                .await;
        assert!(abandoned.is_err());
        assert!(!handle.is_loading());
        assert!(session.last_result().is_none());
    }
}
