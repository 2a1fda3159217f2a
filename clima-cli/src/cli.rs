use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use clima_core::{
    Config, Coordinates, FixedLocation, WeatherEvent, WeatherFetcher, WeatherQuery,
    WeatherSession,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::presenter::{OutputFormat, Presenter};

/// Search input that asks for the configured home location.
const HERE_COMMAND: &str = ":here";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "clima", version, about = "Current weather from OpenWeather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and optional defaults.
    Configure {
        /// Home latitude, used by `show --here` and `:here`.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Home longitude.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Request timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Show the current weather once.
    Show {
        /// City name, e.g. "London" or "New York".
        city: Option<String>,

        /// Latitude in decimal degrees.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Use the configured home location.
        #[arg(long)]
        here: bool,

        /// Print the reading as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search interactively until Esc or Ctrl-C.
    Search,
}

/// What `show` should fetch.
#[derive(Debug, PartialEq)]
enum ShowTarget {
    Query(WeatherQuery),
    Here,
}

fn show_target(
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    here: bool,
) -> anyhow::Result<ShowTarget> {
    match (city, lat.zip(lon), here) {
        (Some(city), None, false) => Ok(ShowTarget::Query(WeatherQuery::city(&city)?)),
        (None, Some((lat, lon)), false) => {
            Ok(ShowTarget::Query(WeatherQuery::coordinates(lat, lon)?))
        }
        (None, None, true) => Ok(ShowTarget::Here),
        _ => bail!("Specify exactly one of CITY, --lat/--lon, or --here."),
    }
}

type Session = WeatherSession<WeatherFetcher, FixedLocation>;

fn build_session(config: &Config) -> anyhow::Result<(Session, UnboundedReceiver<WeatherEvent>)> {
    let fetcher = WeatherFetcher::from_config(config)?;
    let home = config
        .home_location()
        .context("Invalid home location in config file")?;

    Ok(WeatherSession::new(fetcher, FixedLocation::new(home)))
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { lat, lon, timeout_secs } => configure(lat.zip(lon), timeout_secs),
            Command::Show { city, lat, lon, here, json } => {
                let target = show_target(city, lat, lon, here)?;
                let format = if json { OutputFormat::Json } else { OutputFormat::Text };
                show(target, Presenter::new(format)).await
            }
            Command::Search => search().await,
        }
    }
}

fn configure(home: Option<(f64, f64)>, timeout_secs: Option<u64>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let mut prompt = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked);
    if config.api_key.is_some() {
        prompt = prompt.with_help_message("Leave empty to keep the current key");
    }

    let api_key = prompt.prompt().context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key);
    } else if config.api_key.is_none() {
        bail!("An API key is required. Create one at https://home.openweathermap.org/api_keys");
    }

    if let Some((lat, lon)) = home {
        config.home = Some(Coordinates::new(lat, lon)?);
    }
    if let Some(secs) = timeout_secs {
        config.timeout_secs = Some(secs);
    }

    let path = config.save()?;
    info!(path = %path.display(), "configuration saved");
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn show(target: ShowTarget, presenter: Presenter) -> anyhow::Result<()> {
    let config = Config::load()?;
    let (session, mut events) = build_session(&config)?;

    match target {
        ShowTarget::Query(query) => session.fetch(query).await,
        ShowTarget::Here => session.locate().await,
    }

    let event = events
        .recv()
        .await
        .ok_or_else(|| anyhow!("Weather session closed without a result"))?;
    presenter.present(event)
}

async fn search() -> anyhow::Result<()> {
    let config = Config::load()?;
    let (session, mut events) = build_session(&config)?;
    let presenter = Presenter::new(OutputFormat::Text);

    loop {
        let input = match Text::new("Search")
            .with_help_message("City name, `:here` for your home location, Esc to quit")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read search input"),
        };

        if input.trim() == HERE_COMMAND {
            session.locate().await;
        } else {
            session.search(&input).await;
        }

        // Errors are shown and the prompt continues; the user may retry.
        if let Some(event) = events.recv().await {
            if let Err(err) = presenter.present(event) {
                eprintln!("{err}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_accepts_city() {
        let cli = Cli::try_parse_from(["clima", "show", "New York"]).unwrap();
        let Command::Show { city, lat, lon, here, json } = cli.command else {
            panic!("expected show");
        };
        assert_eq!(
            show_target(city, lat, lon, here).unwrap(),
            ShowTarget::Query(WeatherQuery::City("New York".to_string()))
        );
        assert!(!json);
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli =
            Cli::try_parse_from(["clima", "show", "--lat", "51.5", "--lon", "-0.12", "--json"])
                .unwrap();
        let Command::Show { city, lat, lon, here, json } = cli.command else {
            panic!("expected show");
        };
        assert_eq!(
            show_target(city, lat, lon, here).unwrap(),
            ShowTarget::Query(WeatherQuery::Coordinates(Coordinates {
                latitude: 51.5,
                longitude: -0.12
            }))
        );
        assert!(json);
    }

    #[test]
    fn lat_without_lon_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["clima", "show", "--lat", "51.5"]).is_err());
    }

    #[test]
    fn show_requires_exactly_one_target() {
        let err = show_target(None, None, None, false).unwrap_err();
        assert!(err.to_string().contains("exactly one"));

        let err = show_target(Some("Oslo".into()), None, None, true).unwrap_err();
        assert!(err.to_string().contains("exactly one"));

        assert_eq!(show_target(None, None, None, true).unwrap(), ShowTarget::Here);
    }

    #[test]
    fn show_rejects_invalid_input() {
        assert!(show_target(Some("   ".into()), None, None, false).is_err());
        assert!(show_target(None, Some(95.0), Some(0.0), false).is_err());
    }

    #[test]
    fn configure_accepts_home_coordinates() {
        let cli = Cli::try_parse_from([
            "clima",
            "configure",
            "--lat",
            "-33.87",
            "--lon",
            "151.21",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        let Command::Configure { lat, lon, timeout_secs } = cli.command else {
            panic!("expected configure");
        };
        assert_eq!(lat.zip(lon), Some((-33.87, 151.21)));
        assert_eq!(timeout_secs, Some(5));
    }
}
