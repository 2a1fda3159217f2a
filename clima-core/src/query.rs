use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Validated constructor. Both values must be finite and within the WGS84 ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, QueryError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(QueryError::InvalidCoordinates { latitude, longitude });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(QueryError::InvalidCoordinates { latitude, longitude });
        }

        Ok(Self { latitude, longitude })
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// What location to fetch the current weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates(Coordinates),
}

impl WeatherQuery {
    /// City query from user input; surrounding whitespace is dropped.
    pub fn city(name: &str) -> Result<Self, QueryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryError::EmptyCityName);
        }
        Ok(Self::City(name.to_string()))
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Result<Self, QueryError> {
        Coordinates::new(latitude, longitude).map(Self::Coordinates)
    }

    /// `(name, value)` pairs selecting the location, unencoded.
    pub(crate) fn location_params(&self) -> Vec<(&'static str, String)> {
        match self {
            WeatherQuery::City(name) => vec![("q", name.clone())],
            WeatherQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        }
    }
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherQuery::City(name) => f.write_str(name),
            WeatherQuery::Coordinates(c) => write!(f, "({c})"),
        }
    }
}

impl From<Coordinates> for WeatherQuery {
    fn from(value: Coordinates) -> Self {
        WeatherQuery::Coordinates(value)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("City name must not be empty")]
    EmptyCityName,

    #[error("Invalid coordinates ({latitude}, {longitude}): latitude must be within ±90 and longitude within ±180")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}
