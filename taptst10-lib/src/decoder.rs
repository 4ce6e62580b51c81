use crate::constants::{ENDPOINT_IN, PACKET_SIZE, QUERY_FRAME, READ_TIMEOUT, SAMPLE_SIZE};
use crate::error::{ProtocolError, TapError, TransportError};
use crate::packet::{ResponsePacket, Status, StreamHeader};
use crate::sample::SampleSeries;
use crate::transport::Transport;
use tracing::{debug, info, trace};

/// Result of one complete history read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub header: StreamHeader,
    pub series: SampleSeries,
}

/// Whether the decoder wants another packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    Done,
}

/// Accumulates one response stream, packet by packet.
///
/// The first packet must be a header; it sets a countdown of sample bytes.
/// Each later packet contributes up to five samples, and decoding stops as
/// soon as the countdown is exhausted, even in the middle of a packet. The
/// stream also ends early when a packet carries the end-of-stream status.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    header: Option<StreamHeader>,
    remaining: i32,
    series: SampleSeries,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, packet: &ResponsePacket) -> Result<Progress, ProtocolError> {
        let status = packet.status();

        if self.header.is_none() {
            // An end-of-stream status on the header means there is nothing stored.
            if !matches!(status, Status::Header | Status::End) {
                return Err(ProtocolError::MissingHeader(status.into()));
            }
            let header = packet.header();
            debug!(
                minute = header.minute,
                second = header.second,
                remaining_size = header.remaining_size,
                "Stream header"
            );
            self.remaining = i32::from(header.remaining_size);
            self.header = Some(header);
        } else {
            for raw in packet.slots() {
                let sample = self.series.push_raw(raw);
                trace!(index = self.series.len(), %sample, "Decoded sample");
                self.remaining -= SAMPLE_SIZE;
                if self.remaining <= 0 {
                    break;
                }
            }
        }

        if status == Status::End || self.remaining <= 0 {
            debug!(%status, remaining = self.remaining, "Stream finished");
            Ok(Progress::Done)
        } else {
            Ok(Progress::Continue)
        }
    }

    pub fn series(&self) -> &SampleSeries {
        &self.series
    }

    pub fn finish(self) -> Session {
        Session {
            // `feed` never reports Done before a header was accepted
            header: self.header.unwrap_or_default(),
            series: self.series,
        }
    }
}

/// Send `query` and decode the response stream that follows.
///
/// Any error aborts the read: a partial series has no meaning because every
/// cumulative kWh value depends on all earlier samples.
pub fn read_history<T: Transport + ?Sized>(transport: &mut T, query: &[u8]) -> Result<Session, TapError> {
    debug!(bytes = hex::encode(query), "USB Write");
    let written = transport.write(query)?;
    if written != query.len() {
        return Err(TransportError::ShortWrite {
            expected: query.len(),
            actual: written,
        }
        .into());
    }

    let mut decoder = StreamDecoder::new();
    loop {
        let data = transport.read(ENDPOINT_IN, PACKET_SIZE, READ_TIMEOUT)?;
        trace!(bytes = hex::encode(&data), "USB Read");
        let packet = ResponsePacket::try_from(data)?;
        if decoder.feed(&packet)? == Progress::Done {
            break;
        }
    }

    let session = decoder.finish();
    info!(samples = session.series.len(), "History read complete");
    Ok(session)
}

/// Read the stored power history with the standard query frame.
pub fn decode<T: Transport + ?Sized>(transport: &mut T) -> Result<SampleSeries, TapError> {
    read_history(transport, &QUERY_FRAME).map(|session| session.series)
}
