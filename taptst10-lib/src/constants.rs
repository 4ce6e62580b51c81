// Protocol constants for the SANWA TAP-TST10

use std::time::Duration;

/// USB vendor ID of the TAP-TST10
pub const VID: u16 = 0x040b;

/// USB product ID of the TAP-TST10
pub const PID: u16 = 0x2201;

/// Interface carrying the measurement endpoints
pub const INTERFACE_NUMBER: u8 = 0;

/// OUT endpoint used when the descriptors do not list one
pub const DEFAULT_ENDPOINT_OUT: u8 = 0x01;

/// IN endpoint the response stream arrives on
pub const ENDPOINT_IN: u8 = 0x82;

/// Command requesting the stored power history
pub const QUERY_FRAME: [u8; 3] = [0x02, 0x18, 0x0a];

/// Every response packet is exactly this long
pub const PACKET_SIZE: usize = 17;

/// First byte of every response packet
pub const PACKET_MARKER: u8 = 0x01;

/// Offset of the status byte (last byte of the packet)
pub const STATUS_OFFSET: usize = PACKET_SIZE - 1;

/// Offsets of the five 3-byte sample slots in a data packet
pub const SLOT_OFFSETS: [usize; 5] = [1, 4, 7, 10, 13];

/// Bytes of stream data consumed by one sample
pub const SAMPLE_SIZE: i32 = 3;

/// Tag bit in a sample's high byte selecting tenths-of-a-watt encoding
pub const WATT_TENTHS_FLAG: u8 = 0x80;

/// Mask for the value bits of a sample's high byte
pub const WATT_HIGH_MASK: u8 = 0x7f;

/// Per-read deadline while waiting on the device
pub const READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// Deadline for sending the query frame
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Spacing between consecutive stored samples
pub const SAMPLE_INTERVAL_MINUTES: i64 = 10;
