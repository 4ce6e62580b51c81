//! CSV rendering of a decoded history.
//!
//! The device stores one sample every ten minutes and does not report when
//! the newest one was taken, so timestamps are reconstructed by counting
//! backward from the time of the query.

use crate::constants::SAMPLE_INTERVAL_MINUTES;
use crate::sample::SampleSeries;
use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike};

pub const CSV_HEADER: &str = "No.,DateTime,Watt,kWh";

fn interval() -> TimeDelta {
    TimeDelta::minutes(SAMPLE_INTERVAL_MINUTES)
}

/// Timestamp of each sample, oldest first; the last one equals `now`.
pub fn timestamps(count: usize, now: NaiveDateTime) -> impl Iterator<Item = NaiveDateTime> {
    let start = now - interval() * count.saturating_sub(1) as i32;
    (0..count).map(move |i| start + interval() * i as i32)
}

/// `YYYY/MM/DD hh:mm` with the minute floored to a multiple of ten.
pub fn format_timestamp(t: NaiveDateTime) -> String {
    format!(
        "{}/{:02}/{:02} {:02}:{:02}",
        t.year(),
        t.month(),
        t.day(),
        t.hour(),
        (t.minute() / 10) * 10
    )
}

/// Render `series` as CSV, newest sample stamped with `now`.
pub fn render(series: &SampleSeries, now: NaiveDateTime) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + series.len() * 40);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for (i, (sample, t)) in series.iter().zip(timestamps(series.len(), now)).enumerate() {
        out.push_str(&format!(
            "{},{},{:.1},{:.2}\n",
            i + 1,
            format_timestamp(t),
            sample.watts(),
            sample.kwh()
        ));
    }
    out
}
