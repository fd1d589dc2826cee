use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text, required};
use skyglance_core::{
    Action, Config, Coordinates, Phase, Session, TemperatureUnit, Theme, ViewState,
    location_from_config, provider_from_config,
};
use tracing::info;

use crate::{interactive, logging, render::render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyglance", version, about = "Terminal weather widget")]
pub struct Cli {
    /// Print diagnostics to stderr at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to the interactive widget.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default city.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "Rio de Janeiro".
        city: String,

        /// Display temperatures in °F.
        #[arg(short, long)]
        fahrenheit: bool,
    },

    /// Show current weather for your location.
    Here {
        /// Latitude in degrees; overrides the configured location.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude in degrees; overrides the configured location.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Display temperatures in °F.
        #[arg(short, long)]
        fahrenheit: bool,
    },

    /// Interactive widget with search, location, unit and theme toggles.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        logging::init(&config, self.verbose);
        info!(version = env!("CARGO_PKG_VERSION"), "skyglance starting");

        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(config),
            Command::Show { city, fahrenheit } => {
                let session = build_session(&config, None, fahrenheit)?;
                one_shot(session, Action::SubmitSearch(city)).await
            }
            Command::Here {
                lat,
                lon,
                fahrenheit,
            } => {
                let explicit = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                let session = build_session(&config, explicit, fahrenheit)?;
                one_shot(session, Action::RequestLocation).await
            }
            Command::Interactive => {
                let session = build_session(&config, None, false)?;
                interactive::run(session, config.default_city()).await
            }
        }
    }
}

fn build_session(
    config: &Config,
    explicit: Option<Coordinates>,
    fahrenheit: bool,
) -> anyhow::Result<Session> {
    let provider = provider_from_config(config)?;
    let location = location_from_config(explicit, config.location.as_ref());
    let unit = if fahrenheit {
        TemperatureUnit::Fahrenheit
    } else {
        TemperatureUnit::Celsius
    };

    Ok(Session::new(
        ViewState::new(unit, Theme::default()),
        provider,
        location,
    ))
}

async fn one_shot(mut session: Session, action: Action) -> anyhow::Result<()> {
    session.dispatch(action);
    let state = session.settle().await;

    match state.phase() {
        Phase::Ready => {
            print!("{}", render(state));
            Ok(())
        }
        Phase::Error(message) => bail!("{message}"),
        Phase::Idle | Phase::Loading => bail!("Nothing to look up: the city name is empty."),
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(required!("An API key is required"))
        .prompt()
        .context("Failed to read API key")?;

    let default_city = Text::new("Default city:")
        .with_default(config.default_city())
        .prompt()
        .context("Failed to read default city")?;

    config.set_api_key(api_key.trim().to_string());
    config.default_city = Some(default_city.trim().to_string()).filter(|c| !c.is_empty());

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
