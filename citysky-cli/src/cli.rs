use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};

use citysky_core::{Config, Session, Units, provider_from_config};

use crate::{app, logging::{self, LogLevel}};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citysky", version, about = "Current weather by city name")]
pub struct Cli {
    /// Maximum log level. The interactive view logs to a file instead of stderr.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Defaults to the interactive view.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weatherstack access key and preferred units.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name; several words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,

        /// Override the configured units for this lookup.
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,
    },

    /// List city suggestions for a partial name.
    Suggest {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Interactive lookup screen with live suggestions.
    App,
}

fn parse_units(value: &str) -> Result<Units, String> {
    Units::try_from(value).map_err(|err| err.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let level = self.log_level;

        match self.command.unwrap_or(Command::App) {
            Command::App => {
                let _log_guard = logging::setup_file_logging(level, &Config::log_dir()?)?;
                let config = Config::load()?;
                let provider = provider_from_config(&config)?;
                app::run(&config, provider).await
            }
            Command::Configure => {
                logging::setup_stderr_logging(level)?;
                configure()
            }
            Command::Show { city, units } => {
                logging::setup_stderr_logging(level)?;
                let mut config = Config::load()?;
                if let Some(units) = units {
                    config.units = units;
                }
                show(&config, &city.join(" ")).await
            }
            Command::Suggest { query } => {
                logging::setup_stderr_logging(level)?;
                let config = Config::load()?;
                suggest(&config, &query.join(" ")).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("weatherstack access key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read access key")?;

    let key = key.trim();
    if key.is_empty() {
        bail!("Access key must not be empty.");
    }
    config.set_access_key(key.to_string());

    let options = Units::all().to_vec();
    let current = options.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", options)
        .with_starting_cursor(current)
        .prompt()
        .context("Failed to read units")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(config: &Config, city: &str) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let (mut session, _updates) = Session::new(provider, config.debounce());

    session.fetch_current(city).await?;

    if let Some(weather) = session.weather() {
        println!("{}", weather.report(config.units));
        let animation = session.animation();
        println!("Animation: {animation} ({})", animation.uri());
    }

    Ok(())
}

async fn suggest(config: &Config, query: &str) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let suggestions = provider.suggestions(query).await?;

    if suggestions.is_empty() {
        println!("No suggestions for {query}");
    }
    for suggestion in suggestions {
        println!("{suggestion}");
    }

    Ok(())
}
