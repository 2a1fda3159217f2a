//! Failure outcomes of a single weather fetch.

use thiserror::Error;

use crate::query::QueryError;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout, or body read failure.
    #[error("Network error while contacting OpenWeather: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("OpenWeather request failed with status {status}: {body}")]
    InvalidResponse { status: u16, body: String },

    /// The body was not valid JSON or lacked a required field.
    #[error("Failed to decode OpenWeather response: {0}")]
    Decode(String),

    /// Rejected before any request was sent.
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),
}

impl FetchError {
    /// HTTP status of an `InvalidResponse`, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::InvalidResponse { status: 401, .. } => {
                "The weather service rejected the API key".to_string()
            }
            Self::InvalidResponse { status: 404, .. } => "City not found".to_string(),
            Self::InvalidResponse { status, .. } => {
                format!("Weather service returned an error (HTTP {status})")
            }
            Self::Decode(_) => "Weather service returned data we could not read".to_string(),
            Self::InvalidQuery(err) => err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
