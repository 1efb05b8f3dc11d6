//! Natural-language timeframe resolution.
//!
//! Patterns are tried in a fixed order and the first hit wins. Relative
//! periods ("this month", "last 7 days") run through the end of today;
//! calendar references ("in March", "Q2 2024", "5th June") cover the whole
//! named span. Anything unrecognised falls back to a trailing window.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use pesa_core::normalize::{end_of_day, last_day_of_month, month_from_name, start_of_day, strip_ordinal};
use pesa_core::DateRange;
use regex::Regex;
use tracing::debug;

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";
const DAY: &str = r"(\d{1,2}(?:st|nd|rd|th)?)";
const YEAR: &str = r"(?:,?\s+(\d{4}))?";

fn re(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("valid timeframe regex")
}

static LAST_MONTH: Lazy<Regex> = Lazy::new(|| re(r"\blast\s+month\b"));
static THIS_MONTH: Lazy<Regex> = Lazy::new(|| re(r"\bthis\s+month\b"));
static LAST_WEEK: Lazy<Regex> = Lazy::new(|| re(r"\b(?:last|past)\s+week\b"));
static THIS_WEEK: Lazy<Regex> = Lazy::new(|| re(r"\bthis\s+week\b"));
static YESTERDAY: Lazy<Regex> = Lazy::new(|| re(r"\byesterday\b"));
static TODAY: Lazy<Regex> = Lazy::new(|| re(r"\btoday\b"));
static LAST_N: Lazy<Regex> = Lazy::new(|| re(r"\b(?:last|past)\s+(\d{1,4})\s+(days?|weeks?|months?)\b"));
static SINCE_DATE: Lazy<Regex> =
    Lazy::new(|| re(&format!(r"\b(?:since|from)\s+{DAY}\s+(?:of\s+)?{MONTH}\b{YEAR}")));
static IN_MONTH: Lazy<Regex> = Lazy::new(|| re(&format!(r"\bin\s+{MONTH}\b{YEAR}")));
static BARE_DATE: Lazy<Regex> =
    Lazy::new(|| re(&format!(r"\b{DAY}\s+(?:of\s+)?{MONTH}\b{YEAR}")));
static QUARTER: Lazy<Regex> = Lazy::new(|| re(r"\bq([1-4])\b(?:\s+(\d{4}))?"));
static SPELLED_QUARTER: Lazy<Regex> = Lazy::new(|| {
    re(r"\b(first|second|third|fourth|1st|2nd|3rd|4th)\s+quarter\b(?:\s+(?:of\s+)?(\d{4}))?")
});
static YEAR_TO_DATE: Lazy<Regex> = Lazy::new(|| re(r"\b(?:ytd|year\s+to\s+date)\b"));

type Rule = fn(&str, NaiveDateTime) -> Option<DateRange>;

const RULES: &[(&str, Rule)] = &[
    ("last_month", last_month),
    ("this_month", this_month),
    ("last_week", last_week),
    ("this_week", this_week),
    ("yesterday", yesterday),
    ("today", today),
    ("last_n", last_n),
    ("since_date", since_date),
    ("in_month", in_month),
    ("bare_date", bare_date),
    ("quarter", quarter),
    ("year_to_date", year_to_date),
];

fn span(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange {
        start: start_of_day(start),
        end: end_of_day(end),
    }
}

fn month_span(year: i32, month: u32) -> Option<DateRange> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(span(first, last_day_of_month(year, month)?))
}

/// `days` calendar days ending today, inclusive.
fn trailing_days(today: NaiveDate, days: u32) -> Option<DateRange> {
    let start = today.checked_sub_days(Days::new(u64::from(days.max(1) - 1)))?;
    Some(span(start, today))
}

/// Year for a month/day reference that carries no year: the most recent one
/// not in the future.
fn implied_year(today: NaiveDate, month: u32, day: u32) -> i32 {
    if (month, day) > (today.month(), today.day()) {
        today.year() - 1
    } else {
        today.year()
    }
}

fn explicit_year(caps: &regex::Captures<'_>, idx: usize) -> Option<i32> {
    caps.get(idx).and_then(|m| m.as_str().parse().ok())
}

fn day_and_month(caps: &regex::Captures<'_>) -> Option<(u32, u32)> {
    let day = strip_ordinal(caps.get(1)?.as_str()).parse().ok()?;
    let month = month_from_name(caps.get(2)?.as_str())?;
    Some((day, month))
}

fn last_month(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    if !LAST_MONTH.is_match(q) {
        return None;
    }
    let prev = now.date().with_day(1)?.checked_sub_months(Months::new(1))?;
    month_span(prev.year(), prev.month())
}

fn this_month(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    if !THIS_MONTH.is_match(q) {
        return None;
    }
    Some(span(now.date().with_day(1)?, now.date()))
}

fn last_week(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    if LAST_WEEK.is_match(q) { trailing_days(now.date(), 7) } else { None }
}

fn this_week(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    if !THIS_WEEK.is_match(q) {
        return None;
    }
    let today = now.date();
    let monday = today.checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))?;
    Some(span(monday, today))
}

fn yesterday(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    if !YESTERDAY.is_match(q) {
        return None;
    }
    let day = now.date().pred_opt()?;
    Some(span(day, day))
}

fn today(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    TODAY.is_match(q).then(|| span(now.date(), now.date()))
}

fn last_n(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    let caps = LAST_N.captures(q)?;
    let n: u32 = caps[1].parse().ok()?;
    let unit = caps[2].to_ascii_lowercase();
    let today = now.date();
    if unit.starts_with("day") {
        trailing_days(today, n)
    } else if unit.starts_with("week") {
        trailing_days(today, n.checked_mul(7)?)
    } else {
        let start = today.checked_sub_months(Months::new(n))?;
        Some(span(start, today))
    }
}

fn since_date(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    let caps = SINCE_DATE.captures(q)?;
    let (day, month) = day_and_month(&caps)?;
    let year = explicit_year(&caps, 3).unwrap_or_else(|| implied_year(now.date(), month, day));
    let start = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(span(start, now.date()))
}

fn in_month(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    let caps = IN_MONTH.captures(q)?;
    let month = month_from_name(&caps[1])?;
    let year = explicit_year(&caps, 2).unwrap_or_else(|| implied_year(now.date(), month, 1));
    month_span(year, month)
}

fn bare_date(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    let caps = BARE_DATE.captures(q)?;
    let (day, month) = day_and_month(&caps)?;
    let year = explicit_year(&caps, 3).unwrap_or_else(|| implied_year(now.date(), month, day));
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(span(date, date))
}

fn quarter_number(word: &str) -> Option<u32> {
    match word.to_ascii_lowercase().as_str() {
        "1" | "first" | "1st" => Some(1),
        "2" | "second" | "2nd" => Some(2),
        "3" | "third" | "3rd" => Some(3),
        "4" | "fourth" | "4th" => Some(4),
        _ => None,
    }
}

fn quarter(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    let caps = QUARTER.captures(q).or_else(|| SPELLED_QUARTER.captures(q))?;
    let n = quarter_number(&caps[1])?;
    let year = explicit_year(&caps, 2).unwrap_or(now.year());
    let first_month = (n - 1) * 3 + 1;
    let start = NaiveDate::from_ymd_opt(year, first_month, 1)?;
    Some(span(start, last_day_of_month(year, first_month + 2)?))
}

fn year_to_date(q: &str, now: NaiveDateTime) -> Option<DateRange> {
    if !YEAR_TO_DATE.is_match(q) {
        return None;
    }
    let jan1 = NaiveDate::from_ymd_opt(now.year(), 1, 1)?;
    Some(span(jan1, now.date()))
}

/// Resolve the period a question refers to, with a trailing-window default.
pub fn resolve_timeframe_with(question: &str, now: NaiveDateTime, window_days: u32) -> DateRange {
    for (name, rule) in RULES {
        if let Some(range) = rule(question, now) {
            debug!(rule = name, start = %range.start, end = %range.end, "resolved timeframe");
            return range;
        }
    }
    trailing_days(now.date(), window_days).unwrap_or_else(|| span(now.date(), now.date()))
}

pub fn resolve_timeframe(question: &str, now: NaiveDateTime) -> DateRange {
    resolve_timeframe_with(question, now, DEFAULT_WINDOW_DAYS)
}
