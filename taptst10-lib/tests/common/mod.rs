//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
#[allow(unused_imports)]
pub use taptst10_lib::constants::{ENDPOINT_IN, PACKET_SIZE, QUERY_FRAME, READ_TIMEOUT};
#[allow(unused_imports)]
pub use taptst10_lib::error::{ProtocolError, TapError, TransportError};
#[allow(unused_imports)]
pub use taptst10_lib::{SampleSeries, Transport, decode, read_history, render};

use nusb::transfer::TransferError;
use std::collections::VecDeque;
use std::time::Duration;

/// One scripted reply to a `read` call.
#[allow(dead_code)]
pub enum Reply {
    Packet(Vec<u8>),
    Fail,
}

/// In-memory stand-in for the USB link, replaying canned packets.
#[allow(dead_code)]
pub struct ScriptedTransport {
    replies: VecDeque<Reply>,
    /// Override for the byte count reported by `write`
    pub accepted: Option<usize>,
    pub written: Vec<Vec<u8>>,
    pub reads: Vec<(u8, usize, Duration)>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(packets: Vec<Vec<u8>>) -> Self {
        Self::with_replies(packets.into_iter().map(Reply::Packet).collect())
    }

    pub fn with_replies(replies: Vec<Reply>) -> Self {
        ScriptedTransport {
            replies: replies.into(),
            accepted: None,
            written: Vec::new(),
            reads: Vec::new(),
        }
    }

    pub fn unread(&self) -> usize {
        self.replies.len()
    }
}

impl Transport for ScriptedTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.written.push(data.to_vec());
        Ok(self.accepted.unwrap_or(data.len()))
    }

    fn read(&mut self, endpoint: u8, length: usize, timeout: Duration) -> Result<Bytes, TransportError> {
        self.reads.push((endpoint, length, timeout));
        match self.replies.pop_front() {
            Some(Reply::Packet(bytes)) => Ok(Bytes::from(bytes)),
            Some(Reply::Fail) | None => Err(TransportError::Transfer(TransferError::Disconnected)),
        }
    }
}

/// Header packet announcing `remaining` bytes of sample data.
#[allow(dead_code)]
pub fn header_packet(remaining: u16, status: u8) -> Vec<u8> {
    let mut p = vec![0u8; PACKET_SIZE];
    p[0] = 0x01;
    p[1] = 23;
    p[2] = 42;
    p[3..5].copy_from_slice(&remaining.to_be_bytes());
    p[16] = status;
    p
}

/// Data packet with up to five (watt_high, watt_low, kwh_delta) slots.
/// Unused slots are filled with 0xee so decoding them would be noticed.
#[allow(dead_code)]
pub fn data_packet(slots: &[(u8, u8, u8)], status: u8) -> Vec<u8> {
    assert!(slots.len() <= 5);
    let mut p = vec![0xeeu8; PACKET_SIZE];
    p[0] = 0x01;
    for (i, &(hi, lo, kwh)) in slots.iter().enumerate() {
        p[1 + i * 3] = hi;
        p[2 + i * 3] = lo;
        p[3 + i * 3] = kwh;
    }
    p[16] = status;
    p
}

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_packet(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).expect("Failed to decode hex")
}

#[allow(dead_code)]
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid test timestamp")
}
