//! Device location, as consumed by the session.
//!
//! Platform geolocation lives outside this crate; callers plug it in through
//! [`LocationSource`].

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::query::Coordinates;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable")]
    Unavailable,

    #[error("Location error: {0}")]
    Other(String),
}

/// Yields at most one coordinate pair per call.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_location(&self) -> Result<Coordinates, LocationError>;
}

/// A source that always reports the same configured position, if any.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    coordinates: Option<Coordinates>,
}

impl FixedLocation {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        self.coordinates.ok_or(LocationError::Unavailable)
    }
}
