use super::types::*;
use crate::config::Config;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenWeatherError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

pub struct OpenWeatherClient {
    client: Client,
    config: Config,
}

impl OpenWeatherClient {
    pub fn new(config: Config) -> Result<Self, OpenWeatherError> {
        let client = Client::builder()
            .user_agent("NycWeatherService/0.1")
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn geocode_direct(
        &self,
        api_key: &str,
        query: &str,
    ) -> Result<Vec<GeocodeResponse>, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_geocode_direct_path
        );

        self.get_json(&url, &[("q", query), ("appid", api_key)])
            .await
    }

    pub async fn get_current(
        &self,
        api_key: &str,
        coords: &Coordinates,
    ) -> Result<CurrentWeatherResponse, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_current_path
        );

        self.get_json(&url, &[
            ("units", "metric"),
            ("lat", &coords.lat.to_string()),
            ("lon", &coords.lon.to_string()),
            ("appid", api_key),
        ])
        .await
    }

    pub async fn get_timemachine(
        &self,
        api_key: &str,
        coords: &Coordinates,
        dt: i64,
    ) -> Result<TimeMachineResponse, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_timemachine_path
        );

        self.get_json(&url, &[
            ("units", "metric"),
            ("lat", &coords.lat.to_string()),
            ("lon", &coords.lon.to_string()),
            ("appid", api_key),
            ("dt", &dt.to_string()),
        ])
        .await
    }

    // Anything but 200 is surfaced as a status error; there is no retry.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, OpenWeatherError> {
        let response = self.client.get(url).query(params).send().await?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let json: Value = response.json().await?;
                Ok(serde_json::from_value(json)?)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(OpenWeatherError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
