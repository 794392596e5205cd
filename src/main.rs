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

use anyhow::Context;
use clap::Parser;
use tracing::info;

use tscal::app::run_calibration;
use tscal::cli::{apply_overrides, run_cli, Cli, Commands};
use tscal::config::load_settings;
use tscal::{logger, system};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    apply_overrides(&mut settings, &cli);
    settings.validate().context("invalid settings")?;

    if cli.needs_root() && !system::is_root() {
        eprintln!("Error: tscal requires root privileges to read the touchscreen and save calibration.");
        eprintln!(
            "Please run with: sudo {}",
            std::env::args().next().unwrap_or_else(|| "tscal".to_string())
        );
        std::process::exit(1);
    }

    if cli.command() != Commands::Calibrate {
        logger::init_stderr_logging();
        run_cli(&cli, &settings)?;
        return Ok(());
    }

    logger::init_file_logging(&settings.log_path());
    info!("tscal {} starting", env!("CARGO_PKG_VERSION"));
    run_calibration(&settings)
}
