use super::aggregate::SampleAccumulator;
use super::openweather::{OpenWeatherClient, OpenWeatherError};
use super::types::*;
use crate::secrets::SecretError;
use crate::store::{
    average_time_id, current_time_id, to_attributes, Item, KeyValueStore, StoreError, TIME_ID,
};
use crate::window::{self, WindowError, WINDOW_DAYS};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use thiserror::Error;

/// The one location this service reports on.
pub const LOCATION_QUERY: &str = "New_York_City";
const LOCATION_LABEL: &str = "New York City";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const AVERAGE_ATTRIBUTE: &str = "Average";

#[derive(Error, Debug)]
pub enum ServiceError {
    /// The weather provider answered with a non-200 status.
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("Weather provider request failed: {0}")]
    Provider(OpenWeatherError),
    #[error("No geocoding result for {0}")]
    LocationNotFound(String),
    #[error("Historical window is empty")]
    EmptyWindow,
    #[error("Invalid historical window: {0}")]
    Window(#[from] WindowError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),
    #[error("Encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ServiceError {
    fn from_provider(what: &str, err: OpenWeatherError) -> Self {
        match err {
            OpenWeatherError::Status { status, body } => {
                tracing::error!(
                    upstream_body = %body,
                    "Unable to fetch {}, Error Code: {}",
                    what,
                    status
                );
                ServiceError::Upstream {
                    status,
                    message: format!("Unable to fetch {}, Error Code: {}", what, status),
                }
            }
            other => ServiceError::Provider(other),
        }
    }
}

pub struct WeatherService {
    client: Arc<OpenWeatherClient>,
    store: Arc<dyn KeyValueStore>,
    timezone: Tz,
}

impl WeatherService {
    pub fn new(client: Arc<OpenWeatherClient>, store: Arc<dyn KeyValueStore>, timezone: Tz) -> Self {
        Self {
            client,
            store,
            timezone,
        }
    }

    pub async fn resolve_location(&self, api_key: &str) -> Result<Coordinates, ServiceError> {
        let results = self
            .client
            .geocode_direct(api_key, LOCATION_QUERY)
            .await
            .map_err(|e| {
                ServiceError::from_provider(
                    &format!("latitude and longitude for {}", LOCATION_LABEL),
                    e,
                )
            })?;

        let first = results
            .first()
            .ok_or_else(|| ServiceError::LocationNotFound(LOCATION_QUERY.to_string()))?;
        let coords = Coordinates {
            lat: first.lat,
            lon: first.lon,
        };

        tracing::info!("{} latitude and longitude: {:?}", LOCATION_LABEL, coords);
        Ok(coords)
    }

    /// Fetch the current snapshot, persist it, and attach the 7-day average.
    ///
    /// The snapshot is written before the average is computed. An upstream failure while
    /// computing the average leaves `Average` off the snapshot; store failures propagate.
    pub async fn current_weather(&self, api_key: &str) -> Result<WeatherSnapshot, ServiceError> {
        let coords = self.resolve_location(api_key).await?;

        tracing::info!("Getting current weather for {}", LOCATION_LABEL);
        let response = self
            .client
            .get_current(api_key, &coords)
            .await
            .map_err(|e| {
                ServiceError::from_provider(&format!("current weather for {}", LOCATION_LABEL), e)
            })?;

        let now = Utc::now();
        let mut snapshot = self.build_snapshot(&response, now);

        let mut item = to_attributes(&snapshot)?;
        item.insert(TIME_ID.to_string(), current_time_id(now.timestamp()));
        self.store.put(item).await?;
        tracing::info!("Current weather for {}: {:?}", LOCATION_LABEL, snapshot);

        tracing::info!("Getting data for the past {} days", WINDOW_DAYS);
        match self.historical_weather_at(api_key, &coords).await {
            Ok(historical) => {
                tracing::info!(
                    from_cache = historical.from_cache,
                    samples = historical.data.len(),
                    "Merged historical average"
                );
                snapshot.average = Some(historical.average);
            }
            Err(ServiceError::Upstream { status, message }) => {
                tracing::warn!(status, "Returning snapshot without average: {}", message);
            }
            Err(e) => return Err(e),
        }

        Ok(snapshot)
    }

    /// 7-day average for the window ending before today, resolving the location first.
    pub async fn historical_weather(&self, api_key: &str) -> Result<HistoricalWeather, ServiceError> {
        let coords = self.resolve_location(api_key).await?;
        self.historical_weather_at(api_key, &coords).await
    }

    /// 7-day average for the window ending before today at known coordinates.
    pub async fn historical_weather_at(
        &self,
        api_key: &str,
        coords: &Coordinates,
    ) -> Result<HistoricalWeather, ServiceError> {
        let window = window::window_for_today()?;
        self.historical_weather_for_window(api_key, coords, &window)
            .await
    }

    /// Average over `window`, served from the store when an average keyed by the
    /// window's last timestamp already exists.
    pub async fn historical_weather_for_window(
        &self,
        api_key: &str,
        coords: &Coordinates,
        window: &[i64],
    ) -> Result<HistoricalWeather, ServiceError> {
        let window_end = *window.last().ok_or(ServiceError::EmptyWindow)?;
        let time_id = average_time_id(window_end);

        if let Some(item) = self.store.get(&time_id).await? {
            match cached_average(&item) {
                Some(average) => {
                    return Ok(HistoricalWeather {
                        average,
                        data: Vec::new(),
                        from_cache: true,
                    })
                }
                None => tracing::warn!("Unreadable average stored under {}, recomputing", time_id),
            }
        }

        let mut samples = SampleAccumulator::default();
        let mut data = Vec::with_capacity(window.len());

        for &dt in window {
            tracing::info!(
                "Getting historical weather for {}, Date: {}",
                LOCATION_LABEL,
                self.format_timestamp(dt).unwrap_or_else(|| dt.to_string())
            );

            let response = self
                .client
                .get_timemachine(api_key, coords, dt)
                .await
                .map_err(|e| {
                    ServiceError::from_provider(
                        &format!("historical data for the past {} days", WINDOW_DAYS),
                        e,
                    )
                })?;

            match response.data.and_then(|points| points.into_iter().next()) {
                Some(sample) => {
                    samples.push(&sample);
                    data.push(sample);
                }
                None => tracing::warn!("No historical data point returned for {}", dt),
            }
        }

        let average = samples.average();

        let mut item = Item::new();
        item.insert(TIME_ID.to_string(), time_id);
        item.insert(AVERAGE_ATTRIBUTE.to_string(), serde_json::to_string(&average)?);
        self.store.put(item).await?;

        Ok(HistoricalWeather {
            average,
            data,
            from_cache: false,
        })
    }

    fn build_snapshot(&self, response: &CurrentWeatherResponse, now: DateTime<Utc>) -> WeatherSnapshot {
        let main = response.main.as_ref();

        WeatherSnapshot {
            name: response.name.clone(),
            temperature_c: main.and_then(|m| m.temp),
            humidity_pct: main.and_then(|m| m.humidity.clone()),
            pressure_hpa: main.and_then(|m| m.pressure.clone()),
            wind_speed_ms: response.wind.as_ref().and_then(|w| w.speed),
            description: response
                .weather
                .as_ref()
                .and_then(|conditions| conditions.first())
                .and_then(|c| c.description.clone()),
            weather_time: response.dt.and_then(|dt| self.format_timestamp(dt)),
            ingestion_time: now
                .with_timezone(&self.timezone)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            average: None,
        }
    }

    fn format_timestamp(&self, unix_ts: i64) -> Option<String> {
        DateTime::from_timestamp(unix_ts, 0).map(|t| {
            t.with_timezone(&self.timezone)
                .format(TIMESTAMP_FORMAT)
                .to_string()
        })
    }
}

fn cached_average(item: &Item) -> Option<AverageRecord> {
    item.get(AVERAGE_ATTRIBUTE)
        .and_then(|raw| serde_json::from_str(raw).ok())
}
