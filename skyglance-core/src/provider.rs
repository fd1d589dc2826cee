use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, LocationQuery, WeatherSnapshot},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of weather snapshots. Every call is a fresh lookup.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_by_city(&self, name: &str) -> Result<WeatherSnapshot, FetchError>;

    async fn fetch_by_coordinates(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherSnapshot, FetchError>;

    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherSnapshot, FetchError> {
        match query {
            LocationQuery::City(name) => self.fetch_by_city(name).await,
            LocationQuery::Coordinates(coords) => self.fetch_by_coordinates(*coords).await,
        }
    }
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: run `skyglance configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    let client = OpenWeatherClient::new(api_key.to_owned()).with_base_url(config.base_url());
    Ok(Arc::new(client))
}
