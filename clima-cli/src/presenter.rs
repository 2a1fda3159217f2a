use anyhow::Context;
use clima_core::{
    ConditionIcon, FetchError, LocationError, SessionError, WeatherEvent, WeatherReading,
};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Renders session events on the terminal.
#[derive(Debug)]
pub struct Presenter {
    format: OutputFormat,
}

#[derive(Serialize)]
struct ReadingView<'a> {
    city_name: &'a str,
    temperature_celsius: f64,
    condition_code: i32,
    condition_icon: ConditionIcon,
}

/// Points the user at `clima configure` for failures it can fix.
fn configure_hint(err: &SessionError) -> Option<&'static str> {
    match err {
        SessionError::Fetch(FetchError::InvalidResponse { status: 401, .. }) => {
            Some("Run `clima configure` to update it.")
        }
        SessionError::Location(LocationError::Unavailable) => {
            Some("Set a home location with `clima configure --lat <LAT> --lon <LON>`.")
        }
        _ => None,
    }
}

impl Presenter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a reading to stdout, or turn a failure into a user-facing error.
    pub fn present(&self, event: WeatherEvent) -> anyhow::Result<()> {
        match event {
            WeatherEvent::Updated(reading) => {
                println!("{}", self.format_reading(&reading)?);
                Ok(())
            }
            WeatherEvent::Failed(err) => {
                warn!(error = %err, "weather update failed");
                let message = match configure_hint(&err) {
                    Some(hint) => format!("{}. {hint}", err.user_message()),
                    None => err.user_message(),
                };
                Err(anyhow::Error::new(err).context(message))
            }
        }
    }

    pub fn format_reading(&self, reading: &WeatherReading) -> anyhow::Result<String> {
        let icon = reading.condition_icon();

        match self.format {
            OutputFormat::Text => Ok(format!(
                "{} {}°C  {} ({})",
                icon.glyph(),
                reading.temperature_string(),
                reading.city_name,
                icon.description(),
            )),
            OutputFormat::Json => {
                let view = ReadingView {
                    city_name: &reading.city_name,
                    temperature_celsius: reading.temperature_celsius,
                    condition_code: reading.condition_code,
                    condition_icon: icon,
                };
                serde_json::to_string_pretty(&view).context("Failed to serialize reading as JSON")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> WeatherReading {
        WeatherReading {
            temperature_celsius: 11.5,
            condition_code: 800,
            city_name: "London".to_string(),
        }
    }

    #[test]
    fn text_output_rounds_temperature() {
        let line = Presenter::new(OutputFormat::Text).format_reading(&london()).unwrap();
        assert_eq!(line, "☀ 12°C  London (Clear sky)");
    }

    #[test]
    fn json_output_keeps_raw_temperature_and_icon() {
        let json = Presenter::new(OutputFormat::Json).format_reading(&london()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["temperature_celsius"], 11.5);
        assert_eq!(value["condition_code"], 800);
        assert_eq!(value["condition_icon"], "clear");
        assert_eq!(value["city_name"], "London");
    }

    #[test]
    fn failure_is_reported_with_user_message() {
        let event = WeatherEvent::Failed(SessionError::Fetch(FetchError::InvalidResponse {
            status: 404,
            body: String::new(),
        }));

        let err = Presenter::new(OutputFormat::Text).present(event).unwrap_err();
        assert_eq!(err.to_string(), "City not found");
        assert!(format!("{err:#}").contains("404"));
    }

    #[test]
    fn fixable_failures_point_at_configure() {
        let presenter = Presenter::new(OutputFormat::Text);

        let event = WeatherEvent::Failed(SessionError::Fetch(FetchError::InvalidResponse {
            status: 401,
            body: String::new(),
        }));
        let err = presenter.present(event).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The weather service rejected the API key. Run `clima configure` to update it."
        );

        let event = WeatherEvent::Failed(SessionError::Location(LocationError::Unavailable));
        let err = presenter.present(event).unwrap_err();
        assert!(err.to_string().starts_with("Location unavailable. Set a home location"));
    }
}
