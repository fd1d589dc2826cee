use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    error::FetchError,
    model::{Coordinates, LocationQuery, WeatherSnapshot, round_half_up},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Meters per second to miles per hour.
const MPS_TO_MPH: f64 = 2.237;

/// Client for the OpenWeather "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_current(&self, query: &LocationQuery) -> Result<WeatherSnapshot, FetchError> {
        // reqwest percent-encodes every pair.
        let mut params: Vec<(&str, String)> = match query {
            LocationQuery::City(name) => vec![("q", name.clone())],
            LocationQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        };
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));

        debug!(%query, "requesting current weather");

        let res = self.http.get(&self.base_url).query(&params).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Provider { status });
        }

        let body = res.text().await?;
        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;

        WeatherSnapshot::try_from(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl TryFrom<OwCurrentResponse> for WeatherSnapshot {
    type Error = FetchError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self, Self::Error> {
        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::malformed("response contained no weather conditions"))?;

        Ok(WeatherSnapshot {
            city: parsed.name,
            temperature_c: rounded("main.temp", parsed.main.temp)?,
            description: condition.main,
            humidity_pct: rounded("main.humidity", parsed.main.humidity)?,
            wind_speed_mph: rounded("wind.speed", parsed.wind.speed * MPS_TO_MPH)?,
            pressure_hpa: rounded("main.pressure", parsed.main.pressure)?,
            feels_like_c: rounded("main.feels_like", parsed.main.feels_like)?,
            icon_code: condition.icon,
        })
    }
}

fn rounded(field: &str, value: f64) -> Result<i32, FetchError> {
    let value = round_half_up(value);
    if !value.is_finite() || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(FetchError::malformed(format!(
            "field {field} is out of range: {value}"
        )));
    }
    Ok(value as i32)
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_by_city(&self, name: &str) -> Result<WeatherSnapshot, FetchError> {
        let query = LocationQuery::City(name.to_string());
        self.fetch_current(&query)
            .await
            .inspect_err(|e| error!(error = %e, city = name, "Error fetching weather"))
    }

    async fn fetch_by_coordinates(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherSnapshot, FetchError> {
        let query = LocationQuery::Coordinates(coords);
        self.fetch_current(&query).await.inspect_err(|e| {
            error!(
                error = %e,
                lat = coords.latitude,
                lon = coords.longitude,
                "Error fetching weather"
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn london() -> serde_json::Value {
        serde_json::json!({
            "name": "London",
            "main": { "temp": 15.4, "humidity": 80, "pressure": 1012, "feels_like": 14.1 },
            "weather": [{ "main": "Clouds", "icon": "04d", "description": "overcast clouds" }],
            "wind": { "speed": 3.1, "deg": 240 },
            "dt": 1700000000
        })
    }

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::new("TEST_KEY".to_string())
            .with_base_url(format!("{}/data/2.5/weather", server.uri()))
    }

    #[tokio::test]
    async fn fetch_by_city_maps_london() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "TEST_KEY"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let snapshot = client_for(&mock_server).fetch_by_city("London").await.unwrap();

        assert_eq!(
            snapshot,
            WeatherSnapshot {
                city: "London".to_string(),
                temperature_c: 15,
                description: "Clouds".to_string(),
                humidity_pct: 80,
                wind_speed_mph: 7,
                pressure_hpa: 1012,
                feels_like_c: 14,
                icon_code: "04d".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn fetch_by_coordinates_sends_lat_lon() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.12"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let snapshot = client_for(&mock_server)
            .fetch_by_coordinates(Coordinates::new(51.5, -0.12))
            .await
            .unwrap();

        assert_eq!(snapshot.city, "London");
    }

    #[tokio::test]
    async fn city_names_with_reserved_characters_arrive_intact() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "Saint-Jean & Co?#1"))
            .and(query_param("appid", "TEST_KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .fetch_by_city("Saint-Jean & Co?#1")
            .await;

        assert!(result.is_ok(), "query was mangled: {result:?}");
    }

    #[tokio::test]
    async fn not_found_is_provider_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .fetch_by_city("Atlantis")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.to_string().contains("404"), "unexpected message: {err}");
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .fetch_by_city("London")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn missing_field_is_malformed() {
        let mock_server = MockServer::start().await;

        let mut body = london();
        body["main"]
            .as_object_mut()
            .unwrap()
            .remove("feels_like");

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .fetch_by_city("London")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn empty_weather_array_is_malformed() {
        let mock_server = MockServer::start().await;

        let mut body = london();
        body["weather"] = serde_json::json!([]);

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .fetch_by_city("London")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no weather conditions"));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // Grab a free port, then close it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = OpenWeatherClient::new("TEST_KEY".to_string())
            .with_base_url(format!("http://127.0.0.1:{port}/data/2.5/weather"));

        let err = client.fetch_by_city("London").await.unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
    }

    #[test]
    fn wind_speed_is_converted_then_rounded() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "name": "Windy",
            "main": { "temp": -2.5, "humidity": 55.5, "pressure": 990, "feels_like": -7.49 },
            "weather": [{ "main": "Snow", "icon": "13n" }],
            "wind": { "speed": 10.0 }
        }))
        .unwrap();

        let snapshot = WeatherSnapshot::try_from(parsed).unwrap();

        // 10 * 2.237 = 22.37
        assert_eq!(snapshot.wind_speed_mph, 22);
        assert_eq!(snapshot.temperature_c, -2);
        assert_eq!(snapshot.feels_like_c, -7);
        assert_eq!(snapshot.humidity_pct, 56);
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "name": "Nowhere",
            "main": { "temp": 1e300, "humidity": 1, "pressure": 1, "feels_like": 1 },
            "weather": [{ "main": "Clear", "icon": "01d" }],
            "wind": { "speed": 1 }
        }))
        .unwrap();

        let err = WeatherSnapshot::try_from(parsed).unwrap_err();
        assert!(err.to_string().contains("main.temp"));
    }

    #[test]
    fn default_base_url_is_openweather() {
        let client = OpenWeatherClient::new("k".into());
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }
}
