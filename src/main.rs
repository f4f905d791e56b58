use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod handler;
mod routes;
mod secrets;
mod store;
#[cfg(test)]
mod test_support;
mod weather;
mod window;

use config::{Config, StoreBackend};
use routes::{create_router, AppState};
use secrets::EnvSecretStore;
use store::{KeyValueStore, MemoryStore, SqliteStore};
use weather::{openweather::OpenWeatherClient, WeatherService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nyc_weather_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn KeyValueStore> = match config.store_backend {
        StoreBackend::Sqlite => {
            let pool = sqlx::SqlitePool::connect(&config.database_url).await?;
            let store = SqliteStore::new(pool, &config.cache_table_name)?;
            store.init_tables().await?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, cached averages are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let weather_client = Arc::new(OpenWeatherClient::new(config.clone())?);
    let weather = Arc::new(WeatherService::new(weather_client, store, config.app_timezone));

    let bind_addr = config.bind_addr.clone();
    let route = config.weather_route.clone();

    let state = AppState {
        config: Arc::new(config),
        weather,
        secrets: Arc::new(EnvSecretStore::new()),
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server starting on http://{} (weather route {})", bind_addr, route);

    axum::serve(listener, app).await?;

    Ok(())
}
