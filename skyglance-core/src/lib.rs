//! Core library for the `skyglance` weather widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather fetch client behind the `WeatherProvider` trait
//! - The normalized `WeatherSnapshot` and display preferences
//! - The view-state reducer and the session that runs its effects
//!
//! It is used by `skyglance-cli`, but any other front end can drive a `Session` the same way.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod session;
pub mod state;

pub use config::{Config, LocationConfig};
pub use error::{FetchError, LocationError};
pub use location::{LocationSource, location_from_config};
pub use model::{Coordinates, LocationQuery, TemperatureUnit, Theme, WeatherSnapshot};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient, provider_from_config};
pub use session::Session;
pub use state::{Action, Phase, ViewState};
