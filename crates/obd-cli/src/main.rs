//! obd2 - Command-line tool for OBD-II diagnostics and telemetry logging
//!
//! Talks to a vehicle over a SocketCAN interface (or the built-in simulated
//! vehicle when the network is `mock`) and logs live readings to CSV.

mod commands;
mod config;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use obd_device::{DeviceConfig, Obd2Device};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use crate::config::{Config, MergedConfig};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "obd2")]
#[command(author, version, about = "OBD-II diagnostics and telemetry logger")]
#[command(propagate_version = true)]
struct Cli {
    /// Vehicle network: a SocketCAN interface (e.g. can0) or "mock"
    network: String,

    /// Configuration file path
    #[arg(short, long, env = "OBD2_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show VIN, ignition type and the modules on the network
    Info,

    /// List stored trouble codes of every module
    DtcList,

    /// Clear stored trouble codes on every module
    DtcClear,

    /// List supported current-data PIDs of every module
    Pids,

    /// Log live readings to CSV until interrupted
    Log {
        /// Vehicle definition file with the requests to log
        #[arg(required_unless_present = "requests")]
        vehicle_file: Option<PathBuf>,

        /// Extra request, ECU:SERVICE:PID[:FORMULA[:UNIT]] in hex
        #[arg(short, long = "request", value_name = "SPEC")]
        requests: Vec<String>,

        /// Sampling interval in milliseconds
        #[arg(long, value_name = "MS")]
        refresh_ms: Option<u64>,

        /// Log file (default: a new timestamped file in the log directory)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Create and edit vehicle definition files
    Vehicle {
        #[command(subcommand)]
        action: VehicleCommands,
    },
}

#[derive(Subcommand)]
enum VehicleCommands {
    /// Create an empty vehicle definition file
    New {
        file: PathBuf,

        #[arg(long, default_value = "")]
        make: String,

        #[arg(long, default_value = "")]
        model: String,
    },

    /// Print the requests of a vehicle definition file
    Show { file: PathBuf },

    /// Append a request to a vehicle definition file
    Add {
        file: PathBuf,

        /// ECU:SERVICE:PID[:FORMULA[:UNIT]] in hex
        spec: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Remove a request by id
    Remove { file: PathBuf, id: Uuid },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_message(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    let refresh_arg = match &cli.command {
        Commands::Log { refresh_ms, .. } => *refresh_ms,
        _ => None,
    };
    let merged = config.merge_with_args(refresh_arg, cli.no_color);

    let ctx = OutputContext::new(cli.format, merged.no_color, cli.quiet);

    match &cli.command {
        Commands::Info => {
            let device = connect(&cli.network, &merged).await?;
            commands::info(device.as_ref(), &ctx).await?;
        }

        Commands::DtcList => {
            let device = connect(&cli.network, &merged).await?;
            commands::dtc_list(device, &ctx).await?;
        }

        Commands::DtcClear => {
            let device = connect(&cli.network, &merged).await?;
            commands::dtc_clear(device.as_ref(), &ctx).await?;
        }

        Commands::Pids => {
            let device = connect(&cli.network, &merged).await?;
            commands::pids(device.as_ref(), &ctx).await?;
        }

        Commands::Log {
            vehicle_file,
            requests,
            output,
            ..
        } => {
            let vehicle = commands::build_vehicle(vehicle_file.as_deref(), requests)?;
            let device = connect(&cli.network, &merged).await?;
            commands::log(device.as_ref(), &vehicle, output.as_deref(), &merged, &ctx).await?;
        }

        Commands::Vehicle { action } => match action {
            VehicleCommands::New { file, make, model } => {
                commands::vehicle_new(file, make, model, &ctx)?;
            }
            VehicleCommands::Show { file } => {
                commands::vehicle_show(file, &ctx)?;
            }
            VehicleCommands::Add {
                file,
                spec,
                name,
                description,
                category,
            } => {
                let details = commands::RequestDetails {
                    name: name.clone(),
                    description: description.clone(),
                    category: category.clone(),
                };
                commands::vehicle_add(file, spec, details, &ctx)?;
            }
            VehicleCommands::Remove { file, id } => {
                commands::vehicle_remove(file, id, &ctx)?;
            }
        },
    }

    Ok(())
}

/// Open the device for a network name
async fn connect(network: &str, merged: &MergedConfig) -> Result<Arc<Obd2Device>> {
    let mut device_config = DeviceConfig::for_network(network);
    device_config.request_timeout_ms = merged.request_timeout_ms;
    device_config.refresh_ms = merged.refresh.as_millis() as u64;
    debug!(
        network,
        timeout_ms = device_config.request_timeout_ms,
        "Connecting to vehicle network"
    );

    let device = Obd2Device::connect(device_config)
        .await
        .with_context(|| format!("Cannot connect to {}", network))?;
    Ok(Arc::new(device))
}

/// Fatal error line: `obd2: <title>: <description>`
fn error_message(err: &anyhow::Error) -> String {
    let mut chain = err.chain();
    let title = chain.next().map(ToString::to_string).unwrap_or_default();
    let description: Vec<String> = chain.map(ToString::to_string).collect();

    if description.is_empty() {
        format!("obd2: {}", title)
    } else {
        format!("obd2: {}: {}", title, description.join(": "))
    }
}
