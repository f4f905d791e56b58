//! Mock provider endpoints shared by service and handler tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::Config;
use crate::routes::AppState;
use crate::secrets::{SecretError, SecretStore};
use crate::store::MemoryStore;
use crate::weather::openweather::OpenWeatherClient;
use crate::weather::WeatherService;

pub const TEST_API_KEY: &str = "test_key";

/// Secret store with a fixed value; `None` behaves like an unset parameter.
pub struct StaticSecretStore(pub Option<String>);

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_parameter(&self, name: &str) -> Result<String, SecretError> {
        self.0
            .clone()
            .ok_or_else(|| SecretError::NotFound(name.to_string()))
    }
}

/// App state wired to `server` with an in-memory store, which is returned for inspection.
pub fn test_state(server: &MockServer, api_key: Option<&str>) -> (AppState, Arc<MemoryStore>) {
    let config = Config::for_base_url(&server.uri());
    let client = OpenWeatherClient::new(config.clone()).unwrap();
    let store = Arc::new(MemoryStore::new());
    let weather = WeatherService::new(Arc::new(client), store.clone(), config.app_timezone);

    let state = AppState {
        config: Arc::new(config),
        weather: Arc::new(weather),
        secrets: Arc::new(StaticSecretStore(api_key.map(str::to_string))),
    };
    (state, store)
}

pub fn current_body() -> Value {
    json!({
        "coord": {"lon": -74.006, "lat": 40.7127},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": 21.5, "feels_like": 21.0, "pressure": 1012, "humidity": 55},
        "wind": {"speed": 4.1, "deg": 250},
        "dt": 1709280000,
        "name": "New York"
    })
}

pub fn sample_body(temp: f64, humidity: Option<f64>) -> Value {
    let mut point = json!({
        "dt": 1709251200,
        "temp": temp,
        "pressure": 1016,
        "wind_speed": 3.0
    });
    if let Some(h) = humidity {
        point["humidity"] = json!(h);
    }
    json!({"lat": 40.7127, "lon": -74.006, "timezone": "America/New_York", "data": [point]})
}

pub async fn mount_geocode(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "New_York_City"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "New York", "lat": 40.7127281, "lon": -74.0060152, "country": "US", "state": "New York"}
        ])))
        .mount(server)
        .await;
}

pub async fn mount_current(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(server)
        .await;
}

/// Every timemachine request answers with the same sample.
pub async fn mount_timemachine(server: &MockServer, temp: f64, humidity: Option<f64>) {
    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall/timemachine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body(temp, humidity)))
        .mount(server)
        .await;
}

/// Overrides the timemachine answer for a single timestamp.
pub async fn mount_timemachine_at(server: &MockServer, dt: i64, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall/timemachine"))
        .and(query_param("dt", dt.to_string()))
        .respond_with(response)
        .with_priority(1)
        .mount(server)
        .await;
}

pub async fn count_requests(server: &MockServer, endpoint: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == endpoint)
        .count()
}
