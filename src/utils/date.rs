//! UTC datetime utilities without timezone dependencies.
//!
//! Provides a lightweight `DateTimeUtc` struct for the timestamps the
//! index handles (record `lastmod`, sitemap `<lastmod>`).
//!
//! # Features
//!
//! - Zero external dependencies for date parsing
//! - Database (`YYYY-MM-DD HH:MM:SS`) and ISO 8601 parsing
//! - Epoch conversion in both directions
//! - W3C datetime formatting for sitemaps
//!
//! # Examples
//!
//! ```ignore
//! let dt = DateTimeUtc::parse("2024-01-05 10:00:00").unwrap();
//! assert_eq!(dt.to_w3c(), "2024-01-05T10:00:00+00:00");
//! assert_eq!(DateTimeUtc::from_epoch(dt.to_epoch()).to_w3c(), dt.to_w3c());
//! ```

use anyhow::{Result, bail};

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self::from_epoch(now_epoch())
    }

    /// Parse a date or datetime string.
    ///
    /// Accepted shapes:
    /// - `YYYY-MM-DD`
    /// - `YYYY-MM-DD HH:MM:SS` (database format)
    /// - `YYYY-MM-DDTHH:MM:SS` with optional `Z` or `+00:00` suffix
    ///
    /// Offsets other than UTC are applied so the result stays in UTC.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.trim().as_bytes();

        // Minimum: "YYYY-MM-DD" (10 chars)
        if bytes.len() < 10 {
            return None;
        }

        let year = parse_u16(&bytes[0..4])?;
        if bytes[4] != b'-' {
            return None;
        }
        let month = parse_u8(&bytes[5..7])?;
        if bytes[7] != b'-' {
            return None;
        }
        let day = parse_u8(&bytes[8..10])?;

        if bytes.len() == 10 {
            let dt = Self::new(year, month, day, 0, 0, 0);
            dt.validate().ok()?;
            return Some(dt);
        }

        // Time part: "?HH:MM:SS" after the separator
        if bytes.len() < 19 || !matches!(bytes[10], b'T' | b' ') {
            return None;
        }
        if bytes[13] != b':' || bytes[16] != b':' {
            return None;
        }
        let hour = parse_u8(&bytes[11..13])?;
        let minute = parse_u8(&bytes[14..16])?;
        let second = parse_u8(&bytes[17..19])?;

        let dt = Self::new(year, month, day, hour, minute, second);
        dt.validate().ok()?;

        let offset = parse_offset(&bytes[19..])?;
        Some(Self::from_epoch(dt.to_epoch() - offset))
    }

    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = *self;

        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        if second > 59 {
            bail!("second is invalid: {second}");
        }

        Ok(())
    }

    #[inline]
    #[allow(clippy::manual_is_multiple_of)] // Manual impl for const fn
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// Seconds since the Unix epoch.
    pub fn to_epoch(self) -> i64 {
        let days = days_from_civil(i64::from(self.year), self.month, self.day);
        days * 86_400
            + i64::from(self.hour) * 3600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }

    /// Build from seconds since the Unix epoch.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Ranges checked by construction
    pub fn from_epoch(epoch: i64) -> Self {
        let days = epoch.div_euclid(86_400);
        let secs = epoch.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);
        Self::new(
            year.clamp(0, 9999) as u16,
            month,
            day,
            (secs / 3600) as u8,
            ((secs / 60) % 60) as u8,
            (secs % 60) as u8,
        )
    }

    /// Format as W3C datetime (sitemap `<lastmod>`).
    ///
    /// Returns: `YYYY-MM-DDTHH:MM:SS+00:00`
    pub fn to_w3c(self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}+00:00",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Current Unix timestamp in seconds.
pub fn now_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Interpret a stored timestamp value as epoch seconds.
///
/// Values containing a date separator are database-formatted timestamps,
/// anything else is taken to be epoch seconds already.
pub fn epoch_from_value(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.contains('-') && !value.starts_with('-') {
        DateTimeUtc::parse(value).map(DateTimeUtc::to_epoch)
    } else {
        value.parse().ok()
    }
}

/// Format a stored timestamp value as W3C, falling back to `fallback` epoch.
pub fn w3c_from_value(value: Option<&str>, fallback: i64) -> String {
    let epoch = value.and_then(epoch_from_value).unwrap_or(fallback);
    DateTimeUtc::from_epoch(epoch).to_w3c()
}

// Proleptic Gregorian day arithmetic (days relative to 1970-01-01).
fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let mp = (i64::from(month) + 9) % 12;
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // month/day always fit
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Parse a trailing UTC offset (`""`, `Z`, `+HH:MM`, `-HH:MM`) into seconds.
fn parse_offset(bytes: &[u8]) -> Option<i64> {
    match bytes {
        [] | [b'Z'] => Some(0),
        [sign @ (b'+' | b'-'), h1, h2, b':', m1, m2] => {
            let hours = i64::from(parse_u8(&[*h1, *h2])?);
            let minutes = i64::from(parse_u8(&[*m1, *m2])?);
            let secs = hours * 3600 + minutes * 60;
            Some(if *sign == b'-' { -secs } else { secs })
        }
        _ => None,
    }
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = bytes[0].wrapping_sub(b'0');
    let d2 = bytes[1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    let mut result = 0u16;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        result = result * 10 + u16::from(d);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_only() {
        let dt = DateTimeUtc::parse("2024-06-15").unwrap();
        assert_eq!(dt, DateTimeUtc::new(2024, 6, 15, 0, 0, 0));
    }

    #[test]
    fn test_parse_database_format() {
        let dt = DateTimeUtc::parse("2024-01-05 10:00:00").unwrap();
        assert_eq!(dt, DateTimeUtc::new(2024, 1, 5, 10, 0, 0));
    }

    #[test]
    fn test_parse_iso_with_offset() {
        let dt = DateTimeUtc::parse("2024-01-05T12:30:00+02:00").unwrap();
        assert_eq!(dt, DateTimeUtc::new(2024, 1, 5, 10, 30, 0));
        let dt = DateTimeUtc::parse("2024-01-05T10:00:00Z").unwrap();
        assert_eq!(dt.hour, 10);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(DateTimeUtc::parse("2024-13-01").is_none());
        assert!(DateTimeUtc::parse("2023-02-29").is_none());
        assert!(DateTimeUtc::parse("yesterday").is_none());
        assert!(DateTimeUtc::parse("2024-01-05 25:00:00").is_none());
    }

    #[test]
    fn test_epoch_conversion() {
        let dt = DateTimeUtc::new(2024, 1, 5, 10, 0, 0);
        assert_eq!(dt.to_epoch(), 1_704_448_800);
        assert_eq!(DateTimeUtc::from_epoch(1_704_448_800), dt);
        assert_eq!(DateTimeUtc::from_epoch(0), DateTimeUtc::new(1970, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_leap_day_round_trip() {
        let dt = DateTimeUtc::new(2024, 2, 29, 23, 59, 59);
        assert_eq!(DateTimeUtc::from_epoch(dt.to_epoch()), dt);
    }

    #[test]
    fn test_to_w3c() {
        let dt = DateTimeUtc::new(2024, 1, 5, 10, 0, 0);
        assert_eq!(dt.to_w3c(), "2024-01-05T10:00:00+00:00");
    }

    #[test]
    fn test_epoch_from_value() {
        assert_eq!(epoch_from_value("2024-01-05 10:00:00"), Some(1_704_448_800));
        assert_eq!(epoch_from_value("1704448800"), Some(1_704_448_800));
        assert_eq!(epoch_from_value("garbage"), None);
    }

    #[test]
    fn test_w3c_from_value_fallback() {
        assert_eq!(
            w3c_from_value(Some("2024-01-05 10:00:00"), 0),
            "2024-01-05T10:00:00+00:00"
        );
        assert_eq!(w3c_from_value(None, 0), "1970-01-01T00:00:00+00:00");
        assert_eq!(w3c_from_value(Some("n/a"), 0), "1970-01-01T00:00:00+00:00");
    }
}
