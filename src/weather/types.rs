use serde::{Deserialize, Serialize};
use serde_json::Number;

// Direct geocoding: /geo/1.0/direct. Only the position of a match is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

// Current weather: /data/2.5/weather. Every field is optional because snapshots are
// built from whatever the provider returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentWeatherResponse {
    pub name: Option<String>,
    pub main: Option<CurrentMain>,
    pub wind: Option<CurrentWind>,
    pub weather: Option<Vec<CurrentCondition>>,
    pub dt: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentMain {
    pub temp: Option<f64>,
    // Kept as the provider's number so stored values read "55", not "55.0".
    pub humidity: Option<Number>,
    pub pressure: Option<Number>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentWind {
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentCondition {
    pub description: Option<String>,
}

// One Call timemachine: /data/3.0/onecall/timemachine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeMachineResponse {
    pub data: Option<Vec<HistoricalSample>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSample {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dt: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
}

/// Mean of each metric over the historical window. Metrics without samples are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageRecord {
    #[serde(
        rename = "Temperature_Average(Celsius)",
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature_c: Option<f64>,
    #[serde(rename = "Pressure_Average(hPa)", skip_serializing_if = "Option::is_none")]
    pub pressure_hpa: Option<f64>,
    #[serde(
        rename = "Humidity_Average(Percentage)",
        skip_serializing_if = "Option::is_none"
    )]
    pub humidity_pct: Option<f64>,
    #[serde(
        rename = "Wind_Speed_Average(m/sec)",
        skip_serializing_if = "Option::is_none"
    )]
    pub wind_speed_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoricalWeather {
    #[serde(rename = "Average")]
    pub average: AverageRecord,
    /// Raw samples behind the average. Empty when the average came from the store.
    pub data: Vec<HistoricalSample>,
    #[serde(skip)]
    pub from_cache: bool,
}

/// The response document for one current-weather request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Temperature(Celsius)", skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(rename = "Humidity(Percentage)", skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<Number>,
    #[serde(rename = "Pressure(hPa)", skip_serializing_if = "Option::is_none")]
    pub pressure_hpa: Option<Number>,
    #[serde(rename = "Wind_Speed(m/sec)", skip_serializing_if = "Option::is_none")]
    pub wind_speed_ms: Option<f64>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_time: Option<String>,
    pub ingestion_time: String,
    #[serde(rename = "Average", skip_serializing_if = "Option::is_none")]
    pub average: Option<AverageRecord>,
}
