use crate::{WeatherQuery, WeatherReading, error::FetchError};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::WeatherFetcher;

/// Anything that can turn a query into a reading with a single request.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherReading, FetchError>;
}
