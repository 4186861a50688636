//! Hardware collaborator interfaces
//!
//! The controller core never touches hardware directly. A board support
//! crate implements these traits for the real peripherals; tests use
//! in-memory mocks.

use core::fmt;

use embassy_time::Duration;
use heapless::String;

use crate::color::Rgb;
use crate::renderer::PaintFrame;

/// Capacity of a device identifier
pub const DEVICE_ID_LEN: usize = 24;

/// Error type for non-volatile storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// No file exists at the requested path
    NotFound,
    /// Driver level read or write failure
    Failed,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Failed => write!(f, "driver failure"),
        }
    }
}

/// Pixel transmission backend
pub trait PixelOutput {
    /// Transmit the active channel buffers to the strips
    fn paint(&mut self, frame: &PaintFrame<'_>);
}

/// Single status indicator LED
pub trait StatusLed {
    fn set_status_color(&mut self, color: Rgb);
}

/// Hardware watchdog
pub trait Watchdog {
    fn arm(&mut self, timeout: Duration);
    fn kick(&mut self);
}

/// Non-volatile file storage
pub trait ConfigStorage {
    /// Read the whole file at `path` into `buffer`, returning its length
    fn read_all(&mut self, path: &str, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Replace the file at `path` with `bytes`
    fn write_all(&mut self, path: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Line-oriented text console
///
/// Bytes are pulled without blocking; responses are written through
/// [`fmt::Write`].
pub trait Console: fmt::Write {
    fn read_byte(&mut self) -> Option<u8>;

    /// Received bytes dropped before the main loop could read them
    fn overruns(&self) -> u32 {
        0
    }
}

/// Everything the controller needs from the board
pub trait Board: PixelOutput + StatusLed + Watchdog + ConfigStorage + Console {
    /// Device-unique identifier, used for display only
    fn unique_id(&self) -> String<DEVICE_ID_LEN>;

    /// Reset the device; may return on hosts that cannot reboot
    fn reboot(&mut self);
}
