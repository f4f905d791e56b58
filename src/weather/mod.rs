pub mod aggregate;
pub mod openweather;
pub mod service;
pub mod types;

pub use service::{ServiceError, WeatherService};
