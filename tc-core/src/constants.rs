//! Constants and configuration defaults for tscal
//!
//! Kernel input ABI numbers, calibration geometry and default paths live here
//! so the rest of the crate never carries magic numbers.

use std::time::Duration;

/// Linux input event ABI (linux/input-event-codes.h)
pub mod evdev {
    /// Event types
    pub const EV_SYN: u16 = 0x00;
    pub const EV_KEY: u16 = 0x01;
    pub const EV_ABS: u16 = 0x03;

    /// Synchronization codes
    pub const SYN_REPORT: u16 = 0;

    /// Key codes
    pub const BTN_TOUCH: u16 = 0x14a;

    /// Absolute axis codes
    pub const ABS_X: u16 = 0x00;
    pub const ABS_Y: u16 = 0x01;

    /// Size of the buffer handed to EVIOCGNAME
    pub const NAME_BUFFER_LEN: usize = 32;

    /// Size in bytes of one `struct input_event` record on this platform
    pub fn record_size() -> usize {
        std::mem::size_of::<libc::input_event>()
    }
}

/// Calibration geometry and sampling
pub mod calibration {
    /// Highest raw coordinate reported by the digitizer
    pub const RAW_RANGE: i32 = 4095;

    /// Number of reference points, one per screen corner
    pub const NUM_POINTS: usize = 4;

    /// Maximum number of samples averaged for one reference point
    pub const MAX_AVG_SAMPLES: usize = 5;

    /// Distance in pixels from the screen edges to the crosshair centres
    pub const CROSSHAIR_OFFSET: u32 = 20;

    /// Decimal places used when serializing matrix entries
    pub const MATRIX_DECIMALS: usize = 6;
}

/// Default screen geometry when nothing better is known
pub mod screen {
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_HEIGHT: u32 = 480;

    /// Framebuffer size as "W,H"
    pub const FB_VIRTUAL_SIZE: &str = "/sys/class/graphics/fb0/virtual_size";
}

/// Device discovery
pub mod device {
    /// Directory scanned for event nodes
    pub const INPUT_DIR: &str = "/dev/input";

    /// Prefix of evdev nodes inside INPUT_DIR
    pub const EVENT_NODE_PREFIX: &str = "event";

    /// Name reported by the touchscreen this tool was written for
    pub const DEFAULT_TOUCHSCREEN_NAME: &str = "Chumby 8 touchscreen";
}

/// Live-apply through the X server
pub mod xinput {
    pub const PROGRAM: &str = "xinput";
    pub const CALIBRATION_PROPERTY: &str = "libinput Calibration Matrix";
}

/// File system paths
pub mod paths {
    /// Saved calibration in matrix form (X.org InputClass stanza)
    pub const MATRIX_CALIBRATION_FILE: &str = "/mnt/settings/touchscreen.conf";

    /// Saved calibration in raw-bounds form
    pub const BOUNDS_CALIBRATION_FILE: &str = "/mnt/settings/touchscreen.cal";

    /// System-wide settings file
    pub const SYSTEM_CONFIG_FILE: &str = "/etc/tscal/config.json";

    /// Log file used while the terminal UI owns the screen
    pub const LOG_FILE: &str = "/var/log/tscal.log";

    /// Fallback when LOG_FILE cannot be opened
    pub const FALLBACK_LOG_FILE: &str = "/tmp/tscal.log";
}

/// Timing for the front-end loop
pub mod timing {
    use super::Duration;

    /// How long the "no touchscreen" message stays up before exiting
    pub const NO_DEVICE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Upper bound accepted for a configured no-device timeout, in seconds
    pub const MAX_NO_DEVICE_TIMEOUT_SECS: u64 = 3600;

    /// Poll tick while waiting for touch input
    pub const POLL_TICK_MS: i32 = 50;
}

/// User-visible messages shown by the renderer
pub mod messages {
    pub const INSTRUCTIONS: &str =
        "To calibrate the touchscreen, tap each crosshair point that appears.";
    pub const NO_TOUCHSCREEN: &str = "Unable to find touchscreen.";
    pub const CALIBRATION_ERROR: &str = "Calibration error. Tap the screen to quit.";
    pub const CALIBRATION_COMPLETE: &str =
        "Calibration complete. Tap the screen to apply and save.";
    pub const SAVE_ERROR: &str = "Error saving calibration. Tap the screen to quit.";
    pub const APPLY_ERROR: &str = "Error applying final calibration. Tap the screen to quit.";
    pub const SAVED_AND_APPLIED: &str =
        "New calibration saved and applied successfully. Tap the screen to finish.";
}
