use nusb::transfer::TransferError;
use thiserror::Error;

/// The primary error type for the `taptst10-lib` library.
#[derive(Error, Debug)]
pub enum TapError {
    #[error("USB device {vid:04x}:{pid:04x} not found. Is the TAP-TST10 connected?")]
    DeviceNotFound { vid: u16, pid: u16 },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Failures of the USB link itself. None of these are retried: the device
/// has no way to resume a half-read history, so the poll starts over.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),

    #[error("USB transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Timeout during USB operation: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Failed to select a configuration: {0}")]
    Configuration(String),

    #[error("Interface {0} not present in the active configuration")]
    MissingInterface(u8),

    #[error("Short write: expected {expected} bytes, device accepted {actual}")]
    ShortWrite { expected: usize, actual: usize },
}

/// A response packet broke the framing rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Response data length is invalid: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Bad packet marker {0:#04x}")]
    BadMarker(u8),

    #[error("First packet is not a stream header (status {0:#04x})")]
    MissingHeader(u8),
}
