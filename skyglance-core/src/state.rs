//! View state for the weather widget.
//!
//! All UI state lives in [`ViewState`] and changes only through
//! [`ViewState::update`]. Work that has to happen outside the reducer
//! (network lookups, asking for the device location) is returned as an
//! [`Effect`]; its outcome comes back in as another [`Action`].
//!
//! Every effect carries a [`RequestToken`]. Outcomes whose token is not the
//! most recently issued one are dropped, so a slow lookup can never
//! overwrite the result of a newer one.

use tracing::{debug, warn};

use crate::{
    error::{FetchError, LocationError},
    model::{Coordinates, LocationQuery, TemperatureUnit, Theme, WeatherSnapshot},
};

/// Maximum number of entries in the recent-searches list.
pub const MAX_RECENT: usize = 5;

pub const CITY_FETCH_FAILED: &str = "Failed to fetch weather. Try another city.";
pub const LOCATION_FETCH_FAILED: &str = "Failed to fetch weather for your location.";
pub const LOCATION_UNSUPPORTED: &str = "Geolocation not supported on this device";
pub const LOCATION_DENIED: &str =
    "Unable to get your location. Please enable location permissions.";

/// Identity of one unit of work, strictly increasing per [`ViewState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Unique city names, most recent first, at most [`MAX_RECENT`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentSearches(Vec<String>);

impl RecentSearches {
    pub fn record(&mut self, city: &str) {
        self.0.retain(|c| c != city);
        self.0.insert(0, city.to_string());
        self.0.truncate(MAX_RECENT);
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Fixed user-facing message; the cause is only logged.
    Error(String),
}

/// Inputs to the reducer: user intents and the outcomes of effects.
#[derive(Debug)]
pub enum Action {
    SubmitSearch(String),
    SelectRecent(String),
    RequestLocation,
    LocationAcquired {
        token: RequestToken,
        coords: Coordinates,
    },
    LocationFailed {
        token: RequestToken,
        error: LocationError,
    },
    FetchSucceeded {
        token: RequestToken,
        query: LocationQuery,
        snapshot: WeatherSnapshot,
    },
    FetchFailed {
        token: RequestToken,
        query: LocationQuery,
        error: FetchError,
    },
    ToggleUnit,
    ToggleTheme,
}

/// Work requested by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch {
        token: RequestToken,
        query: LocationQuery,
    },
    AcquireLocation {
        token: RequestToken,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    phase: Phase,
    snapshot: Option<WeatherSnapshot>,
    unit: TemperatureUnit,
    theme: Theme,
    recent: RecentSearches,
    latest: u64,
}

impl ViewState {
    pub fn new(unit: TemperatureUnit, theme: Theme) -> Self {
        Self {
            unit,
            theme,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Most recent successful snapshot, kept across later failures.
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    /// The snapshot, only while the phase is `Ready`.
    pub fn ready_snapshot(&self) -> Option<&WeatherSnapshot> {
        match self.phase {
            Phase::Ready => self.snapshot.as_ref(),
            _ => None,
        }
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn recent(&self) -> &RecentSearches {
        &self.recent
    }

    fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    fn start_city_search(&mut self, text: &str) -> Option<Effect> {
        let city = text.trim();
        if city.is_empty() {
            return None;
        }

        let token = self.issue();
        self.phase = Phase::Loading;
        debug!(token = token.0, city, "search started");

        Some(Effect::Fetch {
            token,
            query: LocationQuery::City(city.to_string()),
        })
    }

    /// Apply one action and return the work it requires, if any.
    pub fn update(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::SubmitSearch(text) | Action::SelectRecent(text) => {
                self.start_city_search(&text)
            }
            Action::RequestLocation => {
                let token = self.issue();
                self.phase = Phase::Loading;
                debug!(token = token.0, "location requested");
                Some(Effect::AcquireLocation { token })
            }
            Action::LocationAcquired { token, coords } => {
                if !self.is_current(token) {
                    debug!(token = token.0, "discarding stale location");
                    return None;
                }
                Some(Effect::Fetch {
                    token,
                    query: LocationQuery::Coordinates(coords),
                })
            }
            Action::LocationFailed { token, error } => {
                if !self.is_current(token) {
                    debug!(token = token.0, "discarding stale location failure");
                    return None;
                }
                warn!(%error, "could not determine location");
                let message = match error {
                    LocationError::Unsupported => LOCATION_UNSUPPORTED,
                    LocationError::PermissionDenied => LOCATION_DENIED,
                };
                self.phase = Phase::Error(message.to_string());
                None
            }
            Action::FetchSucceeded {
                token,
                query,
                snapshot,
            } => {
                if !self.is_current(token) {
                    debug!(token = token.0, %query, "discarding stale result");
                    return None;
                }
                if let LocationQuery::City(city) = &query {
                    self.recent.record(city);
                }
                debug!(token = token.0, city = %snapshot.city, "weather ready");
                self.snapshot = Some(snapshot);
                self.phase = Phase::Ready;
                None
            }
            Action::FetchFailed {
                token,
                query,
                error,
            } => {
                if !self.is_current(token) {
                    debug!(token = token.0, %query, "discarding stale failure");
                    return None;
                }
                warn!(%error, %query, "weather lookup failed");
                let message = match query {
                    LocationQuery::City(_) => CITY_FETCH_FAILED,
                    LocationQuery::Coordinates(_) => LOCATION_FETCH_FAILED,
                };
                self.phase = Phase::Error(message.to_string());
                None
            }
            Action::ToggleUnit => {
                self.unit = self.unit.toggled();
                None
            }
            Action::ToggleTheme => {
                self.theme = self.theme.toggled();
                None
            }
        }
    }
}
