//! Date and time normalization
//!
//! Input documents carry dates and times in several formats; everything is
//! normalized to `NaiveDate` / `NaiveTime` at parse time so the rest of the
//! pipeline only ever sees one representation.

use chrono::{Duration, NaiveDate, NaiveTime};

/// Accepted date formats, tried in order; the first successful parse wins.
/// Ambiguous day/month inputs therefore resolve month-first, matching the
/// `MM/DD/YYYY` convention of the source reports.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y", "%d-%m-%Y"];

/// Parse a date string in any accepted format.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Parse an `H:MM` / `HH:MM` time with an optional AM/PM marker into a
/// 24-hour `NaiveTime`. Out-of-range components are clamped rather than
/// rejected, matching the tolerant behavior of the source reports.
pub fn normalize_time(raw: &str, meridiem: Option<&str>) -> Option<NaiveTime> {
    let (h, m) = raw.trim().split_once(':')?;
    let mut hour: u32 = h.trim().parse().ok()?;
    let minute: u32 = m.trim().parse().ok()?;

    match meridiem.map(str::to_ascii_uppercase).as_deref() {
        Some("PM") if hour != 12 => hour += 12,
        Some("AM") if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0)
}

/// Parse a break field (`HH:MM` on the report row) into a duration.
pub fn parse_break(raw: &str) -> Option<Duration> {
    let (h, m) = raw.trim().split_once(':')?;
    let hours: i64 = h.trim().parse().ok()?;
    let minutes: i64 = m.trim().parse().ok()?;
    if hours < 0 || minutes < 0 {
        return None;
    }
    Some(Duration::minutes(hours * 60 + minutes))
}
