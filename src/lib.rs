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

//! tscal - four-point touchscreen calibration for Linux
//!
//! The binary front-end: command line, settings file, logging setup,
//! screen-size discovery, terminal rendering and the readiness loop that
//! feeds touchscreen events into a [`tc_core::CalibrationSession`].

pub mod app;
pub mod cli;
pub mod config;
pub mod logger;
pub mod system;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
