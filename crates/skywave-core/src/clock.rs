//! Wall-clock abstraction and time/date readouts.

use core::fmt::Write;

use chrono::{Datelike, Timelike};
use heapless::String;

/// Unix timestamps earlier than this are treated as "clock never set".
pub const MIN_PLAUSIBLE_EPOCH: i64 = 1_600_000_000;

/// Polled time source collaborator.
///
/// Synchronization is asynchronous: `begin_sync` requests it and
/// `now_unix` stays `None` until the source has an answer. The core
/// applies its own plausibility threshold on top.
pub trait ClockSource {
    type Error;

    /// Requests synchronization against up to three time servers.
    fn begin_sync(&mut self, servers: &'static [&'static str]) -> Result<(), Self::Error>;
    /// Current UTC time as seconds since the Unix epoch, once known.
    fn now_unix(&self) -> Option<i64>;
}

pub fn is_plausible(unix: i64) -> bool {
    unix >= MIN_PLAUSIBLE_EPOCH
}

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Broken-down local time for the ready screen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WallClock {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub day: u8,
    /// 1..=12
    pub month: u8,
    pub year: i32,
    /// 0 = Monday
    pub weekday: u8,
}

impl WallClock {
    /// Splits a UTC timestamp, shifted by the configured offset, into
    /// civil fields.
    pub fn from_unix(unix: i64, utc_offset_minutes: i32) -> Option<Self> {
        let local = unix.checked_add(i64::from(utc_offset_minutes) * 60)?;
        let dt = chrono::DateTime::from_timestamp(local, 0)?;

        Some(Self {
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
            day: dt.day() as u8,
            month: dt.month() as u8,
            year: dt.year(),
            weekday: dt.weekday().num_days_from_monday() as u8,
        })
    }

    /// `HH:MM:SS`, every field zero-padded to two digits.
    pub fn time_text(&self) -> String<8> {
        let mut out = String::new();
        let _ = write!(out, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second);
        out
    }

    /// `Tue 03 Aug 2026` style date line.
    pub fn date_text(&self) -> String<16> {
        let weekday = WEEKDAYS[(self.weekday as usize) % WEEKDAYS.len()];
        let month = MONTHS[(self.month as usize).saturating_sub(1) % MONTHS.len()];

        let mut out = String::new();
        let _ = write!(out, "{} {:02} {} {}", weekday, self.day, month, self.year);
        out
    }
}

/// Zero-pads sub-10 values to two digits; larger values pass through.
pub fn two_digit(value: u32) -> String<10> {
    let mut out = String::new();
    let _ = write!(out, "{value:02}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_split_is_correct() {
        // 2026-08-06 09:05:03 UTC, a Thursday.
        let clock = WallClock::from_unix(1_786_007_103, 0).unwrap();

        assert_eq!(clock.hour, 9);
        assert_eq!(clock.minute, 5);
        assert_eq!(clock.second, 3);
        assert_eq!(clock.day, 6);
        assert_eq!(clock.month, 8);
        assert_eq!(clock.year, 2026);
        assert_eq!(clock.weekday, 3);
    }

    #[test]
    fn offset_shifts_civil_fields() {
        let utc = WallClock::from_unix(1_786_007_103, 0).unwrap();
        let shifted = WallClock::from_unix(1_786_007_103, 90).unwrap();

        assert_eq!(shifted.hour, utc.hour + 1);
        assert_eq!(shifted.minute, utc.minute + 30);
    }

    #[test]
    fn readouts_are_zero_padded() {
        let clock = WallClock::from_unix(1_786_007_103, 0).unwrap();

        assert_eq!(clock.time_text().as_str(), "09:05:03");
        assert_eq!(clock.date_text().as_str(), "Thu 06 Aug 2026");
    }

    #[test]
    fn two_digit_pads_only_below_ten() {
        for value in 0..10 {
            assert_eq!(two_digit(value).len(), 2);
        }
        assert_eq!(two_digit(10).as_str(), "10");
        assert_eq!(two_digit(59).as_str(), "59");
        assert_eq!(two_digit(123).as_str(), "123");
    }

    #[test]
    fn plausibility_threshold_is_inclusive() {
        assert!(!is_plausible(0));
        assert!(!is_plausible(MIN_PLAUSIBLE_EPOCH - 1));
        assert!(is_plausible(MIN_PLAUSIBLE_EPOCH));
    }
}
