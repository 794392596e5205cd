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

use std::fs;
use std::path::Path;

use tc_core::constants::screen;
use tc_core::Result;
use tracing::debug;

use crate::config::{validate_screen, ScreenSize, Settings};

/// Parse sysfs `virtual_size` contents ("W,H")
pub fn parse_virtual_size(s: &str) -> Option<ScreenSize> {
    let (w, h) = s.trim().split_once(',')?;
    let width = w.trim().parse().ok()?;
    let height = h.trim().parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some(ScreenSize { width, height })
}

pub fn read_framebuffer_size(path: &Path) -> Option<ScreenSize> {
    fs::read_to_string(path).ok().and_then(|s| parse_virtual_size(&s))
}

/// Screen size from settings, then the framebuffer, then the built-in default
pub fn screen_size(settings: &Settings) -> Result<ScreenSize> {
    screen_size_with(settings, Path::new(screen::FB_VIRTUAL_SIZE))
}

/// Like [`screen_size`] with an explicit `virtual_size` path; the result is
/// checked against the crosshair offset wherever it came from
pub fn screen_size_with(settings: &Settings, fb_virtual_size: &Path) -> Result<ScreenSize> {
    let size = if let Some(size) = settings.screen {
        size
    } else if let Some(size) = read_framebuffer_size(fb_virtual_size) {
        debug!("Framebuffer reports {}x{}", size.width, size.height);
        size
    } else {
        ScreenSize {
            width: screen::DEFAULT_WIDTH,
            height: screen::DEFAULT_HEIGHT,
        }
    };
    validate_screen(size, settings.crosshair_offset)?;
    Ok(size)
}

/// Live calibration rewrites device state and system files
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}
