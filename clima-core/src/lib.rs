//! Core library for the `clima` weather app.
//!
//! This crate defines:
//! - Queries (city name or coordinates) and the normalized `WeatherReading`
//! - The OpenWeather fetcher and the condition-code icon table
//! - A session that delivers fetch outcomes to a single presenter
//! - Configuration & credentials handling
//!
//! It is used by `clima-cli`, but can also be reused by other front ends.

pub mod condition;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod location;
pub mod model;
pub mod query;
pub mod session;

pub use condition::ConditionIcon;
pub use config::Config;
pub use error::FetchError;
pub use fetcher::{WeatherFetcher, WeatherService};
pub use location::{FixedLocation, LocationError, LocationSource};
pub use model::WeatherReading;
pub use query::{Coordinates, QueryError, WeatherQuery};
pub use session::{SessionError, WeatherEvent, WeatherSession};
