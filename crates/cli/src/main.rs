// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cap` - a host front-end for the capture engine.
//!
//! Wires logging and configuration, then drives the controller: a demo
//! capture with synthetic sensors, plus the read/delete/sync operations a
//! real host application would expose.

mod demo;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use cap_controller::{Config, Controller};
use cap_core::{MeasurementId, MeasurementStatus, Modality};
use cap_strategies::StrategyRegistry;

#[derive(Parser)]
#[command(name = "cap", version, about = "Sensor & location capture engine")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the state directory
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a demo measurement with synthetic sensors
    Demo {
        /// Roughly how long to capture, in seconds
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        /// Transport type to record under
        #[arg(long, default_value = "unknown")]
        modality: String,
    },
    /// List stored measurements
    List {
        /// Only measurements in this status (open, paused, finished, synced)
        #[arg(long)]
        status: Option<String>,
    },
    /// Print the reconstructed track of a measurement
    Track { id: u64 },
    /// Delete a measurement and everything it owns
    Delete { id: u64 },
    /// Record a completed upload (finished -> synced)
    MarkSynced { id: u64 },
    /// Print the stable device identifier
    Device,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = state_dir;
    }

    let platform = Arc::new(demo::DemoPlatform::new(config.state_dir.clone()));
    let controller = Controller::open(config, platform, Arc::new(StrategyRegistry::new()))?;

    match cli.command {
        Command::Demo { seconds, modality } => {
            demo::run(&controller, parse_modality(&modality)?, seconds).await
        }
        Command::List { status } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            output::list(&controller, status);
            Ok(())
        }
        Command::Track { id } => output::track(&controller, MeasurementId::new(id)),
        Command::Delete { id } => {
            controller.delete_measurement(MeasurementId::new(id))?;
            println!("deleted measurement {id}");
            Ok(())
        }
        Command::MarkSynced { id } => {
            controller.mark_synced(MeasurementId::new(id))?;
            println!("measurement {id} marked synced");
            Ok(())
        }
        Command::Device => {
            println!("{}", controller.device_id().as_str());
            Ok(())
        }
    }
}

fn parse_modality(raw: &str) -> Result<Modality> {
    match raw.to_ascii_lowercase().as_str() {
        "bicycle" => Ok(Modality::Bicycle),
        "car" => Ok(Modality::Car),
        "motorbike" => Ok(Modality::Motorbike),
        "bus" => Ok(Modality::Bus),
        "train" => Ok(Modality::Train),
        "walking" => Ok(Modality::Walking),
        "unknown" => Ok(Modality::Unknown),
        other => Err(anyhow!("unknown modality: {other}")),
    }
}

fn parse_status(raw: &str) -> Result<MeasurementStatus> {
    match raw.to_ascii_lowercase().as_str() {
        "open" => Ok(MeasurementStatus::Open),
        "paused" => Ok(MeasurementStatus::Paused),
        "finished" => Ok(MeasurementStatus::Finished),
        "synced" => Ok(MeasurementStatus::Synced),
        other => Err(anyhow!("unknown status: {other}")),
    }
}
