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

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tc_core::constants::{calibration, device, paths, timing};
use tc_core::{default_calibration_path, OutputForm, Result, TscalError};
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

fn default_device_name() -> String {
    device::DEFAULT_TOUCHSCREEN_NAME.to_string()
}

fn default_crosshair_offset() -> u32 {
    calibration::CROSSHAIR_OFFSET
}

fn default_raw_range() -> i32 {
    calibration::RAW_RANGE
}

fn default_no_device_timeout() -> u64 {
    timing::NO_DEVICE_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Name the touchscreen driver reports through EVIOCGNAME
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Explicit event node; skips name-based discovery
    #[serde(default)]
    pub device_path: Option<PathBuf>,
    #[serde(default)]
    pub output: OutputForm,
    /// Where the result is saved; defaults depend on `output`
    #[serde(default)]
    pub calibration_file: Option<PathBuf>,
    /// Screen size in pixels; detected from the framebuffer when absent
    #[serde(default)]
    pub screen: Option<ScreenSize>,
    #[serde(default = "default_crosshair_offset")]
    pub crosshair_offset: u32,
    #[serde(default = "default_raw_range")]
    pub raw_range: i32,
    #[serde(default = "default_no_device_timeout")]
    pub no_device_timeout_secs: u64,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            device_path: None,
            output: OutputForm::default(),
            calibration_file: None,
            screen: None,
            crosshair_offset: default_crosshair_offset(),
            raw_range: default_raw_range(),
            no_device_timeout_secs: default_no_device_timeout(),
            log_file: None,
        }
    }
}

impl Settings {
    pub fn calibration_path(&self) -> PathBuf {
        self.calibration_file
            .clone()
            .unwrap_or_else(|| default_calibration_path(self.output))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| PathBuf::from(paths::LOG_FILE))
    }

    pub fn validate(&self) -> Result<()> {
        if self.device_name.trim().is_empty() && self.device_path.is_none() {
            return Err(TscalError::invalid_config("device_name", "must not be empty"));
        }
        if self.raw_range <= 0 {
            return Err(TscalError::invalid_config("raw_range", "must be positive"));
        }
        if self.no_device_timeout_secs > timing::MAX_NO_DEVICE_TIMEOUT_SECS {
            return Err(TscalError::invalid_config(
                "no_device_timeout_secs",
                format!("must be at most {}", timing::MAX_NO_DEVICE_TIMEOUT_SECS),
            ));
        }
        if let Some(screen) = self.screen {
            validate_screen(screen, self.crosshair_offset)?;
        }
        Ok(())
    }
}

/// The crosshairs must stay inside the screen and must not overlap
pub fn validate_screen(screen: ScreenSize, offset: u32) -> Result<()> {
    let min = offset.saturating_mul(2);
    if screen.width <= min || screen.height <= min {
        return Err(TscalError::invalid_config(
            "screen",
            format!(
                "{}x{} is too small for a crosshair offset of {}",
                screen.width, screen.height, offset
            ),
        ));
    }
    Ok(())
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("tscal").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home).join(".config").join("tscal").join("config.json");
    }
    dirs::config_dir()
        .map(|d| d.join("tscal").join("config.json"))
        .unwrap_or_else(|| PathBuf::from(paths::SYSTEM_CONFIG_FILE))
}

/// First existing settings file: user config, then the system one
pub fn resolve_config_path() -> Option<PathBuf> {
    [config_path(), PathBuf::from(paths::SYSTEM_CONFIG_FILE)]
        .into_iter()
        .find(|p| p.exists())
}

pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let data = fs::read_to_string(path).map_err(|e| TscalError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let settings: Settings = serde_json::from_str(&data)?;
    settings.validate()?;
    debug!("Loaded settings from {:?}", path);
    Ok(settings)
}

/// Load settings from `explicit`, else the resolved config path, else defaults
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => load_settings_from(path),
        None => match resolve_config_path() {
            Some(path) => load_settings_from(&path),
            None => Ok(Settings::default()),
        },
    }
}
