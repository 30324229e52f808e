//! Syntactic checks for event dates and times.
//!
//! These are range checks only: `2025-02-31` is accepted because the day is
//! within 1–31. No calendar arithmetic happens anywhere in the desk.

use crate::error::Violation;

const YEAR_RANGE: std::ops::RangeInclusive<u32> = 1900..=2100;

/// Accept `YYYY-MM-DD` with year 1900–2100, month 1–12, day 1–31.
///
/// # Errors
///
/// Returns [`Violation::InvalidDate`] on any shape or range failure.
pub fn check_date(raw: &str) -> Result<(), Violation> {
    let invalid = || Violation::InvalidDate(raw.to_string());
    let bytes = raw.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(invalid());
    }
    let year = digits(&raw[0..4]).ok_or_else(invalid)?;
    let month = digits(&raw[5..7]).ok_or_else(invalid)?;
    let day = digits(&raw[8..10]).ok_or_else(invalid)?;

    if YEAR_RANGE.contains(&year) && (1..=12).contains(&month) && (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Accept `HH:MM` on a 24-hour clock.
///
/// # Errors
///
/// Returns [`Violation::InvalidTime`] on any shape or range failure.
pub fn check_time(raw: &str) -> Result<(), Violation> {
    let invalid = || Violation::InvalidTime(raw.to_string());
    let bytes = raw.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid());
    }
    let hour = digits(&raw[0..2]).ok_or_else(invalid)?;
    let minute = digits(&raw[3..5]).ok_or_else(invalid)?;

    if hour <= 23 && minute <= 59 {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Parse a run of ASCII digits. Signs and whitespace are rejected.
fn digits(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates() {
        assert!(check_date("2025-10-20").is_ok());
        assert!(check_date("1900-01-01").is_ok());
        assert!(check_date("2100-12-31").is_ok());
        // No month-length check.
        assert!(check_date("2025-02-31").is_ok());

        for bad in [
            "2025-13-01",
            "2025-00-10",
            "2025-01-32",
            "1899-12-31",
            "2101-01-01",
            "2025/10/20",
            "25-10-20",
            "2025-1-020",
            "2025-+1-20",
            "",
        ] {
            assert_eq!(
                check_date(bad),
                Err(Violation::InvalidDate(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn times() {
        assert!(check_time("00:00").is_ok());
        assert!(check_time("23:59").is_ok());
        assert!(check_time("09:00").is_ok());

        for bad in ["24:00", "12:60", "9:00", "09-00", "0900", " 9:00", "ab:cd"] {
            assert!(check_time(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn multibyte_input_does_not_panic() {
        // 10 bytes with a multi-byte char straddling a slice boundary.
        assert!(check_date("20é5-10-2").is_err());
        assert!(check_time("é:00").is_err());
    }
}
