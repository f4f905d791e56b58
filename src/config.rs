use serde::{Deserialize, Serialize};
use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow::anyhow!("Unknown STORE_BACKEND: {}", other)),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub openweather_base_url: String,
    pub openweather_geocode_direct_path: String,
    pub openweather_current_path: String,
    pub openweather_timemachine_path: String,
    pub api_key_parameter: String,
    pub weather_route: String,
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub cache_table_name: String,
    pub app_timezone: chrono_tz::Tz,
    pub bind_addr: String,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let timezone = env::var("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let timeout = env::var("HTTP_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());

        Ok(Config {
            openweather_base_url: env::var("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org".to_string()),
            openweather_geocode_direct_path: env::var("OPENWEATHER_GEOCODE_DIRECT_PATH")
                .unwrap_or_else(|_| "/geo/1.0/direct".to_string()),
            openweather_current_path: env::var("OPENWEATHER_CURRENT_PATH")
                .unwrap_or_else(|_| "/data/2.5/weather".to_string()),
            openweather_timemachine_path: env::var("OPENWEATHER_TIMEMACHINE_PATH")
                .unwrap_or_else(|_| "/data/3.0/onecall/timemachine".to_string()),
            api_key_parameter: env::var("API_KEY_PARAMETER")
                .unwrap_or_else(|_| "/owm/owmapikey".to_string()),
            weather_route: env::var("WEATHER_ROUTE")
                .unwrap_or_else(|_| "/test/getWeatherNyc".to_string()),
            store_backend: env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "sqlite".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./weather_cache.db?mode=rwc".to_string()),
            cache_table_name: env::var("CACHE_TABLE_NAME")
                .unwrap_or_else(|_| "weather_cache".to_string()),
            app_timezone: timezone
                .parse::<chrono_tz::Tz>()
                .map_err(|_| anyhow::anyhow!("Invalid APP_TIMEZONE: {}", timezone))?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            http_timeout_secs: timeout
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid HTTP_TIMEOUT_SECS: {}", timeout))?,
        })
    }

    /// Defaults pointed at a custom provider base URL, used by tests against a mock server.
    #[cfg(test)]
    pub fn for_base_url(base_url: &str) -> Self {
        Config {
            openweather_base_url: base_url.to_string(),
            openweather_geocode_direct_path: "/geo/1.0/direct".to_string(),
            openweather_current_path: "/data/2.5/weather".to_string(),
            openweather_timemachine_path: "/data/3.0/onecall/timemachine".to_string(),
            api_key_parameter: "/owm/owmapikey".to_string(),
            weather_route: "/test/getWeatherNyc".to_string(),
            store_backend: StoreBackend::Memory,
            database_url: "sqlite::memory:".to_string(),
            cache_table_name: "weather_cache".to_string(),
            app_timezone: chrono_tz::UTC,
            bind_addr: "127.0.0.1:0".to_string(),
            http_timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("sqlite".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
        assert_eq!("MEMORY".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("dynamo".parse::<StoreBackend>().is_err());
    }

    // Single test so no other test races on these variables.
    #[test]
    fn test_from_env_rejects_invalid_values() {
        env::set_var("APP_TIMEZONE", "America/New_York");
        let config = Config::from_env().unwrap();
        assert_eq!(config.app_timezone, chrono_tz::America::New_York);

        env::set_var("APP_TIMEZONE", "Mars/Olympus_Mons");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("Invalid APP_TIMEZONE"));
        env::remove_var("APP_TIMEZONE");

        env::set_var("HTTP_TIMEOUT_SECS", "soon");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("Invalid HTTP_TIMEOUT_SECS"));
        env::remove_var("HTTP_TIMEOUT_SECS");
    }
}
