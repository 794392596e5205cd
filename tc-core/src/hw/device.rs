//! Touchscreen discovery and access
//!
//! Scans `/dev/input/event*` and matches devices by the name the kernel
//! driver reports through `EVIOCGNAME`. Nodes are opened read-only and
//! non-blocking so the readiness loop can drain them without stalling.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::device::{EVENT_NODE_PREFIX, INPUT_DIR};
use crate::constants::evdev::NAME_BUFFER_LEN;
use crate::error::{Result, TscalError};
use crate::hw::ioctl;

/// An open evdev node
#[derive(Debug)]
pub struct TouchDevice {
    file: File,
    path: PathBuf,
    name: String,
}

impl TouchDevice {
    /// Open an event node and read its name
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|e| TscalError::device_io(path, format!("open failed: {}", e)))?;
        let name = read_device_name(&file).unwrap_or_else(|e| {
            debug!("EVIOCGNAME failed on {:?}: {}", path, e);
            String::new()
        });
        Ok(Self {
            file,
            path: path.to_path_buf(),
            name,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

impl AsRawFd for TouchDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl Read for &TouchDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.file).read(buf)
    }
}

/// Query the device name, truncated to the kernel's 32-byte buffer
fn read_device_name(file: &File) -> io::Result<String> {
    let mut buf = [0u8; NAME_BUFFER_LEN];
    // SAFETY: EVIOCGNAME writes at most `buf.len()` bytes into `buf`, which
    // lives for the duration of the call.
    let rc = unsafe {
        libc::ioctl(
            file.as_raw_fd(),
            ioctl::eviocgname(buf.len()) as _,
            buf.as_mut_ptr(),
        )
    };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    // Force termination within the buffer
    buf[NAME_BUFFER_LEN - 1] = 0;
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

/// Event nodes under `dir`, sorted by name
fn event_nodes(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| TscalError::FileRead {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut nodes: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(EVENT_NODE_PREFIX))
                .unwrap_or(false)
        })
        .collect();
    nodes.sort();
    Ok(nodes)
}

/// True when `reported` is `wanted`, allowing for EVIOCGNAME truncation
pub fn names_match(reported: &str, wanted: &str) -> bool {
    reported == wanted
        || (!reported.is_empty() && reported.len() == NAME_BUFFER_LEN - 1 && wanted.starts_with(reported))
}

/// Name to hand to X: the configured name unless the device reports a different one
pub fn preferred_device_name<'a>(configured: &'a str, reported: Option<&'a str>) -> &'a str {
    match reported {
        Some(r) if !r.is_empty() && !names_match(r, configured) => r,
        _ => configured,
    }
}

/// Find the touchscreen whose reported name matches `name`
pub fn find_touchscreen(name: &str) -> Result<TouchDevice> {
    find_touchscreen_in(Path::new(INPUT_DIR), name)
}

pub fn find_touchscreen_in(dir: &Path, name: &str) -> Result<TouchDevice> {
    for node in event_nodes(dir)? {
        match TouchDevice::open(&node) {
            Ok(device) if names_match(device.name(), name) => {
                info!("Found touchscreen '{}' at {:?}", name, node);
                return Ok(device);
            }
            Ok(device) => debug!("Skipping {:?} ('{}')", node, device.name()),
            Err(e) => debug!("Skipping {:?}: {}", node, e),
        }
    }
    warn!("Unable to locate touchscreen '{}' in {:?}", name, dir);
    Err(TscalError::DeviceNotFound(name.to_string()))
}

/// Every readable event node with its reported name
pub fn list_input_devices() -> Result<Vec<(PathBuf, String)>> {
    let mut devices = Vec::new();
    for node in event_nodes(Path::new(INPUT_DIR))? {
        if let Ok(device) = TouchDevice::open(&node) {
            devices.push((node, device.name));
        }
    }
    Ok(devices)
}
