use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use sunrise_control_lib::config::WakeupConfig;
use sunrise_control_lib::control_interface::LifxClient;
use sunrise_control_lib::schedule::DailyTrigger;
use sunrise_control_lib::util::discovery::Discovery;
use sunrise_control_lib::wakeup::run_wakeup;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    handle_cli(cli).await
}

/// This struct defines the command line interface of the application
#[derive(Parser)]
#[clap(
    name = "sunrise_control",
    about = "Wakes you up with a simulated sunrise on a LIFX light",
    version
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

/// Supported output formats for the `discover` command.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Plain text format.
    Plaintext,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

/// Subcommands available for the CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Runs the wake-up every day, or once right away with `--now`
    #[clap(name = "run")]
    Run {
        /// Location of the wake-up configuration file
        #[clap(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Time of day to start the wake-up, as H:MM
        #[clap(short, long, default_value = "8:00")]
        time: String,

        /// IANA time zone the time of day is given in
        #[clap(long, default_value = "Europe/Amsterdam")]
        timezone: String,

        /// Run the wake-up immediately instead of scheduling it
        #[clap(long, alias = "nocron")]
        now: bool,
    },
    /// Lists the LIFX lights on the local network
    #[clap(name = "discover")]
    Discover {
        /// Output format (plaintext, json, yaml)
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Plaintext)]
        output: OutputFormat,

        /// Search timeout in milliseconds
        #[clap(short = 't', long = "timeout", default_value_t = 2000)]
        timeout: u64,
    },
}

/// Loads the configuration and runs one wake-up against a fresh LIFX client.
async fn wakeup(config_path: &Path) -> Result<()> {
    info!("Waking up!");
    let config = WakeupConfig::load(config_path)?;
    let client = LifxClient::connect()
        .await
        .context("Cannot create LIFX client")?;
    run_wakeup(&client, &config).await?;
    Ok(())
}

async fn handle_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            config,
            time,
            timezone,
            now,
        } => {
            if now {
                wakeup(&config).await?;
            } else {
                let trigger = DailyTrigger::parse(&time, &timezone)?;
                // fail on a broken configuration now rather than at the first wake-up
                WakeupConfig::load(&config)?;
                info!("Scheduled daily wake-up at {} ({})", time, timezone);
                trigger.run(|| wakeup(&config)).await;
            }
        }
        Commands::Discover { output, timeout } => {
            let devices = Discovery::find_devices(Duration::from_millis(timeout)).await?;
            match output {
                OutputFormat::Plaintext => {
                    Discovery::pretty_print_devices(&devices);
                }
                OutputFormat::Json => {
                    let json = serde_json::to_string(&devices)?;
                    println!("{}", json);
                }
                OutputFormat::Yaml => {
                    let yaml = serde_yaml::to_string(&devices)?;
                    println!("{}", yaml);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::parse_from(["sunrise_control", "run"]);
        match cli.command {
            Commands::Run {
                config,
                time,
                timezone,
                now,
            } => {
                assert_eq!(config, PathBuf::from("config.yaml"));
                assert_eq!(time, "8:00");
                assert_eq!(timezone, "Europe/Amsterdam");
                assert!(!now);
            }
            Commands::Discover { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn test_nocron_alias() {
        let cli = Cli::parse_from(["sunrise_control", "run", "--nocron", "-c", "wake.yaml"]);
        assert!(matches!(cli.command, Commands::Run { now: true, .. }));
    }
}
