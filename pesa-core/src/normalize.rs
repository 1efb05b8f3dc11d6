//! Amount and date normalization shared by every extractor.
//!
//! Inputs are the raw tokens pulled out of SMS bodies, statement rows and
//! user questions: "Ksh1,234.50", "5/6/24", "2:30 PM", "5th", "Sept".

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a currency string like "Ksh1,234.50" or "1,000".
///
/// Returns `None` for anything that is not a finite, non-negative number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '$' || c == '.')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let cleaned = cleaned.trim_end_matches('.');
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Build a date from day/month/year numerals; two-digit years are 20xx.
pub fn parse_day_month_year(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let d: u32 = day.trim().parse().ok()?;
    let m: u32 = month.trim().parse().ok()?;
    let mut y: i32 = year.trim().parse().ok()?;
    if year.trim().len() <= 2 {
        y += 2000;
    }
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Convert a 12-hour clock hour to 24-hour.
///
/// 12 PM stays 12, 12 AM becomes 0.
pub fn to_24_hour(hour: u32, meridiem: &str) -> Option<u32> {
    if !(1..=12).contains(&hour) {
        return None;
    }
    match meridiem.trim().to_ascii_uppercase().as_str() {
        "AM" => Some(if hour == 12 { 0 } else { hour }),
        "PM" => Some(if hour == 12 { 12 } else { hour + 12 }),
        _ => None,
    }
}

/// Parse a 12-hour clock string such as "2:30 PM" or "11:05AM".
pub fn parse_clock_12h(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    let split = raw.find(|c: char| c.is_ascii_alphabetic())?;
    let (clock, meridiem) = raw.split_at(split);
    let (h, m) = clock.trim().split_once(':')?;
    let hour = to_24_hour(h.parse().ok()?, meridiem)?;
    NaiveTime::from_hms_opt(hour, m.parse().ok()?, 0)
}

/// Parse "D/M/YY" plus an optional "H:MM AM" clock; no clock means midnight.
pub fn parse_sms_datetime(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    let mut parts = date.trim().split('/');
    let d = parts.next()?;
    let m = parts.next()?;
    let y = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let date = parse_day_month_year(d, m, y)?;
    let time = match time {
        Some(t) => parse_clock_12h(t)?,
        None => NaiveTime::MIN,
    };
    Some(date.and_time(time))
}

/// Drop an English ordinal suffix: "21st" -> "21".
pub fn strip_ordinal(token: &str) -> &str {
    let lower = token.to_ascii_lowercase();
    for suffix in ["st", "nd", "rd", "th"] {
        if lower.ends_with(suffix) && token.len() > suffix.len() {
            return &token[..token.len() - suffix.len()];
        }
    }
    token
}

/// Month number from a full name or 3/4-letter abbreviation.
pub fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim().to_ascii_lowercase();
    let month = match name.as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59).unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

/// Last calendar day of a month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("1,234.50"), Some(1234.5));
        assert_eq!(parse_amount("Ksh1,500.00"), Some(1500.0));
        assert_eq!(parse_amount("Ksh 10,000.00."), Some(10000.0));
        assert_eq!(parse_amount("KES.250"), Some(250.0));
        assert_eq!(parse_amount("$99"), Some(99.0));
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("12a"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_to_24_hour_edges() {
        assert_eq!(to_24_hour(12, "PM"), Some(12));
        assert_eq!(to_24_hour(12, "am"), Some(0));
        assert_eq!(to_24_hour(2, "PM"), Some(14));
        assert_eq!(to_24_hour(9, "AM"), Some(9));
        assert_eq!(to_24_hour(13, "PM"), None);
        assert_eq!(to_24_hour(0, "AM"), None);
    }

    #[test]
    fn test_parse_sms_datetime() {
        let dt = parse_sms_datetime("5/6/24", Some("2:30 PM")).unwrap();
        assert_eq!(dt.to_string(), "2024-06-05 14:30:00");

        let midnight = parse_sms_datetime("1/1/2025", Some("12:05 AM")).unwrap();
        assert_eq!(midnight.to_string(), "2025-01-01 00:05:00");

        let date_only = parse_sms_datetime("31/12/23", None).unwrap();
        assert_eq!(date_only.to_string(), "2023-12-31 00:00:00");

        assert!(parse_sms_datetime("31/2/24", None).is_none());
        assert!(parse_sms_datetime("5/6", None).is_none());
    }

    #[test]
    fn test_strip_ordinal() {
        assert_eq!(strip_ordinal("1st"), "1");
        assert_eq!(strip_ordinal("22nd"), "22");
        assert_eq!(strip_ordinal("3rd"), "3");
        assert_eq!(strip_ordinal("14TH"), "14");
        assert_eq!(strip_ordinal("5"), "5");
    }

    #[test]
    fn test_month_names_and_abbreviations() {
        assert_eq!(month_from_name("March"), Some(3));
        assert_eq!(month_from_name("SEPT"), Some(9));
        assert_eq!(month_from_name("dec"), Some(12));
        assert_eq!(month_from_name("decem"), None);
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(last_day_of_month(2023, 12), NaiveDate::from_ymd_opt(2023, 12, 31));
    }
}
