use chrono::{DateTime, Utc};

/// NMEA2000 date and time as carried by GNSS and AIS PGNs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct N2kDateTime {
    pub date: f64, // days since 1970-01-01
    pub time: f64, // seconds since midnight
}

impl N2kDateTime {
    /// Returns None while either half is missing (NaN) or out of range.
    pub fn new(date: f64, time: f64) -> Option<Self> {
        if !date.is_finite() || !time.is_finite() || date < 0.0 || !(0.0..86400.5).contains(&time) {
            return None;
        }
        Some(Self { date, time })
    }

    /// Convert NMEA2000 date/time to Unix timestamp (seconds since epoch)
    pub fn to_unix_timestamp(&self) -> i64 {
        self.date as i64 * 86400 + self.time as i64
    }

    pub fn milliseconds(&self) -> u32 {
        ((self.time.fract() * 1000.0) as u32).min(999)
    }

    pub fn to_date_time(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.to_unix_timestamp(), self.milliseconds() * 1_000_000)
    }
}
