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

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tc_core::constants::paths::FALLBACK_LOG_FILE;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn open_append(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Log to a file so the terminal stays free for the calibration screen
pub fn init_file_logging(path: &Path) {
    let file = match open_append(path) {
        Some(f) => f,
        // Last resort: fall back to /tmp (silent)
        None => match open_append(Path::new(FALLBACK_LOG_FILE)) {
            Some(f) => f,
            None => return,
        },
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter())
        .try_init();
}

/// Log to stderr for one-shot subcommands
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter())
        .try_init();
}
