use crate::constants::{WATT_HIGH_MASK, WATT_TENTHS_FLAG};
use std::fmt;

/// Power reading of one sample.
///
/// The high bit of the first wire byte selects the unit: set means the
/// remaining 15 bits count tenths of a watt, clear means whole watts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Watt {
    Whole(u16),
    Tenths(u16),
}

impl Watt {
    pub fn from_bytes(high: u8, low: u8) -> Self {
        let value = (u16::from(high & WATT_HIGH_MASK) << 8) | u16::from(low);
        if high & WATT_TENTHS_FLAG != 0 {
            Watt::Tenths(value)
        } else {
            Watt::Whole(value)
        }
    }

    /// Power in watts
    pub fn as_watts(&self) -> f64 {
        match *self {
            Watt::Whole(w) => f64::from(w),
            Watt::Tenths(t) => f64::from(t) / 10.0,
        }
    }
}

impl fmt::Display for Watt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} W", self.as_watts())
    }
}

/// One undecoded 3-byte sample slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub watt_high: u8,
    pub watt_low: u8,
    /// Energy used since the previous sample, in hundredths of a kWh
    pub kwh_delta: u8,
}

impl RawSample {
    pub fn new(watt_high: u8, watt_low: u8, kwh_delta: u8) -> Self {
        RawSample {
            watt_high,
            watt_low,
            kwh_delta,
        }
    }

    pub fn watt(&self) -> Watt {
        Watt::from_bytes(self.watt_high, self.watt_low)
    }

    pub fn kwh_delta(&self) -> f64 {
        f64::from(self.kwh_delta) / 100.0
    }
}

/// A decoded sample with its cumulative energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub watt: Watt,
    /// Running total since the first sample of the session, in hundredths of a kWh
    pub kwh_hundredths: u32,
}

impl Sample {
    pub fn watts(&self) -> f64 {
        self.watt.as_watts()
    }

    pub fn kwh(&self) -> f64 {
        f64::from(self.kwh_hundredths) / 100.0
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {:.2} kWh", self.watt, self.kwh())
    }
}

/// All samples of one poll, oldest first.
///
/// Energy is stored on the wire as per-sample deltas, so samples are only
/// meaningful as a complete series: each one's cumulative value depends on
/// every sample before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    samples: Vec<Sample>,
}

impl SampleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw slot, folding its delta into the running total.
    pub fn push_raw(&mut self, raw: RawSample) -> Sample {
        let previous = self.samples.last().map_or(0, |s| s.kwh_hundredths);
        let sample = Sample {
            watt: raw.watt(),
            kwh_hundredths: previous + u32::from(raw.kwh_delta),
        };
        self.samples.push(sample);
        sample
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Cumulative energy of the latest sample
    pub fn total_kwh(&self) -> f64 {
        self.samples.last().map_or(0.0, Sample::kwh)
    }
}

impl<'a> IntoIterator for &'a SampleSeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
