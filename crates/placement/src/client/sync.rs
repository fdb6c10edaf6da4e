use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::api::{ApiClient, ClientError};
use crate::allocation::RosterSnapshot;
use crate::roster::{SaveRequest, SaveResponse};

/// Latest view of the remote roster as seen by the client.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    pub snapshot: Option<Arc<RosterSnapshot>>,
    pub last_updated: Option<DateTime<Local>>,
    pub syncing: bool,
    pub last_error: Option<String>,
}

/// Polls `/api/data` and publishes each snapshot on a watch channel.
///
/// A failed fetch is recorded in [`SyncState::last_error`] and retried on the
/// next tick; there is no other retry.
pub struct RosterSync {
    api: ApiClient,
    poll_interval: Duration,
    state: watch::Sender<SyncState>,
}

impl RosterSync {
    pub fn new(api: ApiClient, poll_interval: Duration) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Self {
            api,
            poll_interval,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> SyncState {
        self.state.borrow().clone()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn refresh(&self) -> Result<Arc<RosterSnapshot>, ClientError> {
        self.state.send_modify(|state| state.syncing = true);

        match self.api.fetch_data().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                debug!(applicants = snapshot.applicants.len(), "roster refreshed");
                self.state.send_modify(|state| {
                    state.snapshot = Some(snapshot.clone());
                    state.last_updated = Some(Local::now());
                    state.syncing = false;
                    state.last_error = None;
                });
                Ok(snapshot)
            }
            Err(err) => {
                warn!(error = %err, "roster refresh failed");
                self.state.send_modify(|state| {
                    state.syncing = false;
                    state.last_error = Some(err.to_string());
                });
                Err(err)
            }
        }
    }

    /// Polls until `shutdown` resolves. The first tick fires immediately.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let _ = self.refresh().await;
                }
            }
        }
    }

    /// Submits a preference list and re-fetches whatever the outcome.
    ///
    /// The local snapshot is updated optimistically before the request is sent.
    /// Nothing is rolled back on failure; the forced refresh restores the
    /// store's state.
    pub async fn save(&self, request: &SaveRequest) -> Result<SaveResponse, ClientError> {
        if let Some(name) = request.name.as_deref() {
            self.state.send_modify(|state| {
                if let Some(snapshot) = state.snapshot.as_mut() {
                    Arc::make_mut(snapshot).replace_preferences(name, request.preferences.clone());
                }
            });
        }

        let outcome = self.api.save(request).await;
        if let Err(err) = &outcome {
            warn!(error = %err, "preference save failed");
        }

        let _ = self.refresh().await;
        outcome
    }
}
