use crate::error::TransportError;
use bytes::Bytes;
use std::time::Duration;

/// Blocking byte pipe to a TAP-TST10.
///
/// The decoder only needs these two primitives; how the device was found and
/// opened is up to the implementation.
pub trait Transport {
    /// Send `data` to the device's OUT endpoint, returning how many bytes it accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Read one packet of up to `length` bytes from `endpoint`, giving up after `timeout`.
    fn read(&mut self, endpoint: u8, length: usize, timeout: Duration) -> Result<Bytes, TransportError>;
}
