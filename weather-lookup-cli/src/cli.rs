use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use weather_lookup_core::{
    Config, ForecastSession, LocationQuery, QueryState, TransportMode, WeatherFetcher,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-lookup", version, about = "Current conditions and hourly forecast")]
pub struct Cli {
    /// WeatherAPI.com key; overrides the configured one.
    #[arg(long, global = true, env = "WEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request path to the provider: "direct" or "relay".
    #[arg(long, global = true)]
    pub transport: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key, default location and transport.
    Configure,

    /// Show the forecast for one location.
    Show {
        #[command(flatten)]
        location: LocationArgs,

        /// Print the forecast as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Look up the default location, then keep prompting for cities.
    Search,
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// City name; the configured default location when omitted.
    #[arg(conflicts_with_all = ["lat", "lon"])]
    pub city: Option<String>,

    /// Latitude in decimal degrees.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl LocationArgs {
    fn query(&self, config: &Config) -> anyhow::Result<LocationQuery> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            return Ok(LocationQuery::coordinates(lat, lon));
        }

        let name = self.city.as_deref().unwrap_or(&config.default_location);
        LocationQuery::city(name).context("Location must not be empty")
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let mut config = Config::load()?;
        config.override_api_key(self.api_key);
        if let Some(transport) = self.transport.as_deref() {
            config.set_transport_mode(TransportMode::try_from(transport)?);
        }

        match self.command {
            Command::Configure => {
                configure(config)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { location, json } => {
                let query = location.query(&config)?;
                let session = session_from_config(&config)?;
                let state = session.search(&query).await;
                show(&state, json)
            }
            Command::Search => {
                let session = session_from_config(&config)?;
                search_loop(&session, &config.default_location).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn session_from_config(config: &Config) -> anyhow::Result<ForecastSession> {
    let fetcher = WeatherFetcher::from_config(config)?;
    Ok(ForecastSession::new(Arc::new(fetcher), config.race_policy()?))
}

fn show(state: &QueryState, json: bool) -> anyhow::Result<ExitCode> {
    match state.forecast() {
        Some(forecast) if json => {
            println!("{}", serde_json::to_string_pretty(forecast)?);
            Ok(ExitCode::SUCCESS)
        }
        Some(forecast) => {
            print!("{}", render::forecast(forecast));
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("{}", render::NO_RESULTS);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn search_loop(session: &ForecastSession, default_location: &str) -> anyhow::Result<()> {
    let mut next = LocationQuery::city(default_location);

    loop {
        if let Some(query) = next.take() {
            let state = session.search(&query).await;
            show(&state, false)?;
        }

        let input = Text::new("City:")
            .with_help_message("Enter a city name, or press Enter / Esc to quit")
            .prompt_skippable()?;

        match input.and_then(LocationQuery::city) {
            Some(query) => next = Some(query),
            None => return Ok(()),
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key.trim());

    config.default_location = Text::new("Default location:")
        .with_default(&config.default_location)
        .prompt()?;

    let current = config.transport_mode().unwrap_or_default();
    let modes = TransportMode::all().to_vec();
    let start = modes.iter().position(|m| *m == current).unwrap_or(0);
    let mode = Select::new("Transport:", modes).with_starting_cursor(start).prompt()?;
    config.set_transport_mode(mode);

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}
