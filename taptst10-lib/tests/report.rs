//! Tests for CSV rendering

mod common;

use common::*;
use taptst10_lib::report::{CSV_HEADER, timestamps};
use taptst10_lib::sample::RawSample;

fn series_of(samples: &[(u8, u8, u8)]) -> SampleSeries {
    let mut series = SampleSeries::new();
    for &(hi, lo, kwh) in samples {
        series.push_raw(RawSample::new(hi, lo, kwh));
    }
    series
}

#[test]
fn test_empty_series_renders_header_only() {
    let csv = render(&SampleSeries::new(), at(2013, 7, 16, 21, 33));
    assert_eq!(csv, format!("{}\n", CSV_HEADER));
}

#[test]
fn test_rows_count_back_from_now() {
    let series = series_of(&[(0x00, 100, 10), (0x80, 125, 5), (0x00, 0, 0)]);
    let csv = render(&series, at(2013, 7, 16, 21, 33));
    let expected = "\
No.,DateTime,Watt,kWh
1,2013/07/16 21:10,100.0,0.10
2,2013/07/16 21:20,12.5,0.15
3,2013/07/16 21:30,0.0,0.15
";
    assert_eq!(csv, expected);
}

#[test]
fn test_minute_floor() {
    let series = series_of(&[(0x00, 1, 0)]);
    let csv = render(&series, at(2013, 7, 16, 9, 47));
    assert!(csv.ends_with("1,2013/07/16 09:40,1.0,0.00\n"), "{csv}");

    let csv = render(&series, at(2013, 7, 16, 9, 0));
    assert!(csv.ends_with("1,2013/07/16 09:00,1.0,0.00\n"), "{csv}");
}

#[test]
fn test_rows_cross_midnight_and_year() {
    let series = series_of(&[(0x00, 1, 0), (0x00, 2, 0), (0x00, 3, 0)]);
    let csv = render(&series, at(2014, 1, 1, 0, 5));
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[1], "1,2013/12/31 23:40,1.0,0.00");
    assert_eq!(lines[2], "2,2013/12/31 23:50,2.0,0.00");
    assert_eq!(lines[3], "3,2014/01/01 00:00,3.0,0.00");
}

#[test]
fn test_timestamps_step_ten_minutes() {
    let now = at(2013, 7, 16, 12, 34);
    let n = 50;
    let stamps: Vec<NaiveDateTime> = timestamps(n, now).collect();
    assert_eq!(stamps.len(), n);
    assert_eq!(*stamps.last().unwrap(), now);
    for (i, t) in stamps.iter().enumerate() {
        let expected = now - TimeDelta::minutes(10 * (n as i64 - 1)) + TimeDelta::minutes(10 * i as i64);
        assert_eq!(*t, expected);
    }
    for pair in stamps.windows(2) {
        assert_eq!(pair[1] - pair[0], TimeDelta::minutes(10));
    }
}

#[test]
fn test_large_values_formatting() {
    let series = series_of(&[(0x7f, 0xff, 255), (0xff, 0xff, 255)]);
    let csv = render(&series, at(2013, 7, 16, 12, 0));
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[1], "1,2013/07/16 11:50,32767.0,2.55");
    assert_eq!(lines[2], "2,2013/07/16 12:00,3276.7,5.10");
}

#[test]
fn test_bad_marker_produces_no_rows() {
    let mut bad = data_packet(&[(0x00, 1, 1)], 0x00);
    bad[0] = 0x7f;
    let mut transport = ScriptedTransport::new(vec![header_packet(3, 0x0a), bad]);
    let result = decode(&mut transport).map(|series| render(&series, at(2013, 7, 16, 12, 0)));
    assert!(matches!(
        result,
        Err(TapError::Protocol(ProtocolError::BadMarker(0x7f)))
    ));
}
