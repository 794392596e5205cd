/*
 * This file is part of tscal.
 *
 * Copyright (C) 2025 tscal contributors
 *
 * tscal is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * tscal is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with tscal. If not, see <https://www.gnu.org/licenses/>.
 */

//! Command line interface
//!
//! `tscal` with no subcommand runs the interactive calibration. The other
//! subcommands work on the saved calibration and the device list.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tc_core::{apply_calibration, list_input_devices, load_calibration, OutputForm};
use tracing::{info, warn};

use crate::app::{effective_device_name, open_device};
use crate::config::Settings;

#[derive(Parser, Debug)]
#[command(name = "tscal")]
#[command(version)]
#[command(about = "Four-point touchscreen calibration")]
#[command(long_about = "Four-point touchscreen calibration

Shows a crosshair near each screen corner in turn, averages the raw
touch coordinates while it is held, and writes either raw axis bounds
or a libinput calibration matrix.

EXAMPLES:
    tscal                              Calibrate (default)
    tscal --output bounds              Calibrate and save raw axis bounds
    tscal apply                        Re-apply the saved calibration
    tscal show --json                  Print the saved calibration as JSON
    tscal devices                      List input devices and their names

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Enable debug logging

FILES:
    ~/.config/tscal/config.json        User settings
    /etc/tscal/config.json             System settings
    /mnt/settings/touchscreen.conf     Saved calibration matrix
    /mnt/settings/touchscreen.cal      Saved raw axis bounds")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file to load instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Touchscreen event node, e.g. /dev/input/event1
    #[arg(long, global = true)]
    pub device: Option<PathBuf>,

    /// Output form: matrix or bounds
    #[arg(long, global = true)]
    pub output: Option<OutputForm>,

    /// Log file used while calibrating
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the interactive calibration (default)
    Calibrate,
    /// Apply the saved calibration to the running system
    Apply,
    /// Print the saved calibration
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List input devices and their names
    Devices,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Calibrate)
    }

    /// Commands that touch the device or the settings partition
    pub fn needs_root(&self) -> bool {
        matches!(self.command(), Commands::Calibrate | Commands::Apply)
    }
}

/// Flags win over the settings file
pub fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(device) = &cli.device {
        settings.device_path = Some(device.clone());
    }
    if let Some(output) = cli.output {
        settings.output = output;
    }
    if let Some(log_file) = &cli.log_file {
        settings.log_file = Some(log_file.clone());
    }
}

/// Run a non-interactive subcommand. Returns false when the caller should calibrate.
pub fn run_cli(cli: &Cli, settings: &Settings) -> anyhow::Result<bool> {
    match cli.command() {
        Commands::Calibrate => Ok(false),
        cmd => {
            execute_command(&cmd, settings)?;
            Ok(true)
        }
    }
}

fn execute_command(cmd: &Commands, settings: &Settings) -> anyhow::Result<()> {
    match cmd {
        Commands::Calibrate => Ok(()),
        Commands::Apply => cmd_apply(settings),
        Commands::Show { json } => cmd_show(settings, *json),
        Commands::Devices => cmd_devices(),
    }
}

fn cmd_apply(settings: &Settings) -> anyhow::Result<()> {
    let path = settings.calibration_path();
    let result = load_calibration(&path, settings.output)
        .with_context(|| format!("no usable calibration at {}", path.display()))?;

    let device = match open_device(settings) {
        Ok(d) => Some(d),
        Err(e) if settings.output == OutputForm::Matrix => {
            // The matrix goes through X by name; the event node is optional
            warn!("{}", e);
            None
        }
        Err(e) => return Err(e).context("raw bounds need the touchscreen device"),
    };
    let name = effective_device_name(settings, device.as_ref());
    apply_calibration(device.as_ref(), &name, &result)?;
    info!("Applied {} calibration from {:?}", settings.output, path);
    println!("Applied {} calibration from {}", settings.output, path.display());
    Ok(())
}

fn cmd_show(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let path = settings.calibration_path();
    let result = load_calibration(&path, settings.output)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", tc_core::encode_calibration(&result));
    }
    Ok(())
}

fn cmd_devices() -> anyhow::Result<()> {
    let devices = list_input_devices()?;
    if devices.is_empty() {
        println!("No readable input devices");
        return Ok(());
    }
    for (path, name) in devices {
        println!("{:<24} {}", path.display(), name);
    }
    Ok(())
}
