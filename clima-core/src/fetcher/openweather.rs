use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{
    config::{Config, DEFAULT_TIMEOUT_SECS},
    error::FetchError,
    model::WeatherReading,
    query::{Coordinates, WeatherQuery},
};

use super::WeatherService;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";
const REDACTED: &str = "<redacted>";

/// Client for the OpenWeather current-weather endpoint.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Clone)]
pub struct WeatherFetcher {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl std::fmt::Debug for WeatherFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherFetcher")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

impl WeatherFetcher {
    /// Fetcher for the public endpoint with the default request timeout.
    pub fn new(api_key: impl Into<String>) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
            http: http_client(timeout)?,
        })
    }

    /// Build a fetcher from the API key, base URL and timeout in `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::from_config_with_key(config, config.api_key())
    }

    pub(super) fn from_config_with_key(config: &Config, api_key: Option<String>) -> anyhow::Result<Self> {
        let api_key = api_key.ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `clima configure` or set {}.",
                crate::config::API_KEY_ENV
            )
        })?;

        Ok(Self {
            api_key,
            base_url: config.base_url().to_string(),
            timeout: config.timeout(),
            http: http_client(config.timeout())?,
        })
    }

    /// Point the fetcher at another host, e.g. a proxy or a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the HTTP client with one using the given request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> anyhow::Result<Self> {
        self.http = http_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full request URL for `query`. Contains the API key.
    pub fn request_url(&self, query: &WeatherQuery) -> String {
        self.build_url(&self.api_key, query)
    }

    /// Request URL with the API key masked, for logs.
    fn redacted_url(&self, query: &WeatherQuery) -> String {
        self.build_url(REDACTED, query)
    }

    fn build_url(&self, api_key: &str, query: &WeatherQuery) -> String {
        let mut url = format!(
            "{}{}?appid={}&units=metric",
            self.base_url.trim_end_matches('/'),
            CURRENT_WEATHER_PATH,
            urlencoding::encode(api_key),
        );

        for (name, value) in query.location_params() {
            url.push_str(&format!("&{}={}", name, urlencoding::encode(&value)));
        }

        url
    }

    pub async fn fetch_by_city_name(&self, name: &str) -> Result<WeatherReading, FetchError> {
        self.fetch(&WeatherQuery::City(name.to_string())).await
    }

    /// Coordinates must be finite and in range; otherwise no request is sent.
    pub async fn fetch_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReading, FetchError> {
        let coordinates = Coordinates::new(latitude, longitude)?;
        self.fetch(&WeatherQuery::Coordinates(coordinates)).await
    }

    /// One GET against the current-weather endpoint. Never retries.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherReading, FetchError> {
        // The variant is public, so coordinates may not have gone through `Coordinates::new`.
        if let WeatherQuery::Coordinates(c) = query {
            Coordinates::new(c.latitude, c.longitude)?;
        }

        debug!(url = %self.redacted_url(query), "requesting current weather");

        let res = self.http.get(self.request_url(query)).send().await?;

        let status = res.status();
        if !status.is_success() {
            // Best effort: a broken body must not hide the status.
            let body = res.text().await.unwrap_or_default();
            warn!(%status, "OpenWeather returned an error status");
            return Err(FetchError::InvalidResponse {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body = res.text().await?;
        parse_current(&body).inspect_err(|err| warn!(error = %err, "could not decode response"))
    }
}

#[async_trait]
impl WeatherService for WeatherFetcher {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherReading, FetchError> {
        WeatherFetcher::fetch(self, query).await
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i32,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

fn parse_current(body: &str) -> Result<WeatherReading, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;

    let condition = parsed
        .weather
        .first()
        .ok_or_else(|| FetchError::Decode("response contained no weather conditions".to_string()))?;

    Ok(WeatherReading {
        temperature_celsius: parsed.main.temp,
        condition_code: condition.id,
        city_name: parsed.name,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
