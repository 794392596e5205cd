//! evdev ioctl request numbers (linux/input.h)

use std::mem::size_of;

const IOC_WRITE: u64 = 1;
const IOC_READ: u64 = 2;
const EVDEV_MAGIC: u64 = b'E' as u64;

const fn ioc(dir: u64, nr: u64, size: usize) -> u64 {
    (dir << 30) | ((size as u64) << 16) | (EVDEV_MAGIC << 8) | nr
}

/// EVIOCGNAME(len): read the device name
pub const fn eviocgname(len: usize) -> u64 {
    ioc(IOC_READ, 0x06, len)
}

/// EVIOCGABS(abs): read axis info
pub const fn eviocgabs(abs: u16) -> u64 {
    ioc(IOC_READ, 0x40 + abs as u64, size_of::<libc::input_absinfo>())
}

/// EVIOCSABS(abs): write axis info
pub const fn eviocsabs(abs: u16) -> u64 {
    ioc(IOC_WRITE, 0xc0 + abs as u64, size_of::<libc::input_absinfo>())
}
