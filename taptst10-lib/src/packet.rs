//! Framing of the 17-byte TAP-TST10 response packets.
//!
//! Every packet starts with the marker byte `0x01` and ends with a status byte.
//! The first packet of a session is a header carrying the number of sample
//! bytes that follow; every later packet carries up to five 3-byte samples.
//!
//! ```text
//! header:  01 | minute | second | size_hi size_lo | 11 bytes unused     | 0a
//! data:    01 | w_hi w_lo kwh | w_hi w_lo kwh | ... (5 slots)          | status
//! ```

use crate::constants::{PACKET_MARKER, PACKET_SIZE};
use crate::error::ProtocolError;
use crate::sample::RawSample;
use bytes::Bytes;
use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;
use zerocopy::byteorder::big_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Status byte in the last position of every response packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Status {
    #[strum(to_string = "header")]
    Header = 0x0a,
    #[strum(to_string = "end of stream")]
    End = 0xfe,
    #[num_enum(catch_all)]
    #[strum(to_string = "continuation")]
    Continuation(u8),
}

/// Generic view of a response packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct RawFrame {
    pub marker: u8,
    pub body: [u8; 15],
    pub status: u8,
}

/// Header packet layout. The size field is big-endian, unlike most USB gear.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct RawHeader {
    pub marker: u8,
    pub minute: u8,
    pub second: u8,
    pub remaining_size: U16,
    pub reserved: [u8; 11],
    pub status: u8,
}

/// Metadata from the first packet of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamHeader {
    /// Device clock minute at the time of the query. Not used for timestamps.
    pub minute: u8,
    /// Device clock second at the time of the query. Not used for timestamps.
    pub second: u8,
    /// Bytes of sample data still to arrive
    pub remaining_size: u16,
}

impl From<RawHeader> for StreamHeader {
    fn from(raw: RawHeader) -> Self {
        StreamHeader {
            minute: raw.minute,
            second: raw.second,
            remaining_size: raw.remaining_size.get(),
        }
    }
}

/// A response packet whose length and marker have been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsePacket {
    frame: RawFrame,
}

impl ResponsePacket {
    pub fn status(&self) -> Status {
        Status::from_primitive(self.frame.status)
    }

    /// Interpret the packet as a stream header.
    pub fn header(&self) -> StreamHeader {
        let raw: RawHeader = zerocopy::transmute!(self.frame);
        StreamHeader::from(raw)
    }

    /// The five sample slots of a data packet, in wire order.
    ///
    /// The last packet of a stream may only be partly filled; callers decide
    /// how many slots are real from the header's size countdown.
    pub fn slots(&self) -> impl Iterator<Item = RawSample> + '_ {
        self.frame
            .body
            .chunks_exact(3)
            .map(|slot| RawSample::new(slot[0], slot[1], slot[2]))
    }
}

impl TryFrom<&[u8]> for ResponsePacket {
    type Error = ProtocolError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let frame = RawFrame::read_from_bytes(bytes).map_err(|_| ProtocolError::InvalidLength {
            expected: PACKET_SIZE,
            actual: bytes.len(),
        })?;
        if frame.marker != PACKET_MARKER {
            return Err(ProtocolError::BadMarker(frame.marker));
        }
        Ok(ResponsePacket { frame })
    }
}

impl TryFrom<Bytes> for ResponsePacket {
    type Error = ProtocolError;

    fn try_from(bytes: Bytes) -> Result<Self, Self::Error> {
        ResponsePacket::try_from(bytes.as_ref())
    }
}
