//! Drives a [`ViewState`] against real (or fake) providers.

use std::{collections::HashMap, sync::Arc};

use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, error};

use crate::{
    error::{FetchError, LocationError},
    location::LocationSource,
    provider::WeatherProvider,
    state::{Action, Effect, ViewState},
};

/// Owns the view state and runs the effects the reducer asks for.
///
/// Effects run as tasks in a [`JoinSet`], so several lookups may be in
/// flight at once. Superseded lookups are not cancelled; the reducer drops
/// their results. A task that dies is reported as a failure of its effect.
pub struct Session {
    state: ViewState,
    provider: Arc<dyn WeatherProvider>,
    location: Arc<dyn LocationSource>,
    tasks: JoinSet<Action>,
    pending: HashMap<task::Id, Effect>,
}

impl Session {
    pub fn new(
        state: ViewState,
        provider: Arc<dyn WeatherProvider>,
        location: Arc<dyn LocationSource>,
    ) -> Self {
        Self {
            state,
            provider,
            location,
            tasks: JoinSet::new(),
            pending: HashMap::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Number of spawned effects that have not reported back yet.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Apply `action` and start whatever work it requires.
    pub fn dispatch(&mut self, action: Action) {
        if let Some(effect) = self.state.update(action) {
            self.spawn(effect);
        }
    }

    fn spawn(&mut self, effect: Effect) {
        let handle = match effect.clone() {
            Effect::Fetch { token, query } => {
                let provider = Arc::clone(&self.provider);
                self.tasks.spawn(async move {
                    match provider.fetch(&query).await {
                        Ok(snapshot) => Action::FetchSucceeded {
                            token,
                            query,
                            snapshot,
                        },
                        Err(error) => Action::FetchFailed {
                            token,
                            query,
                            error,
                        },
                    }
                })
            }
            Effect::AcquireLocation { token } => {
                let location = Arc::clone(&self.location);
                self.tasks.spawn(async move {
                    match location.current_location().await {
                        Ok(coords) => Action::LocationAcquired { token, coords },
                        Err(error) => Action::LocationFailed { token, error },
                    }
                })
            }
        };
        self.pending.insert(handle.id(), effect);
    }

    /// Turn a dead task back into a failure for the effect it was running.
    fn failed(&mut self, err: JoinError) -> Option<Action> {
        let Some(effect) = self.pending.remove(&err.id()) else {
            error!(error = %err, "effect task failed with no pending effect");
            return None;
        };
        error!(error = %err, ?effect, "effect task failed");

        Some(match effect {
            Effect::Fetch { token, query } => Action::FetchFailed {
                token,
                query,
                error: FetchError::TaskFailed(err),
            },
            Effect::AcquireLocation { token } => Action::LocationFailed {
                token,
                error: LocationError::Unsupported,
            },
        })
    }

    /// Wait for one effect to report back and apply it.
    ///
    /// Returns `false` once nothing is in flight.
    pub async fn next(&mut self) -> bool {
        let Some(joined) = self.tasks.join_next_with_id().await else {
            return false;
        };

        let action = match joined {
            Ok((id, action)) => {
                self.pending.remove(&id);
                Some(action)
            }
            Err(err) => self.failed(err),
        };

        match action {
            Some(action) => self.dispatch(action),
            None => debug!("dropped result of unknown task"),
        }
        true
    }

    /// Run until every started effect, including follow-ups, has finished.
    pub async fn settle(&mut self) -> &ViewState {
        while self.next().await {}
        &self.state
    }
}
