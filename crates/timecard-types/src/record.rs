use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One day's attendance: a date plus optional clock-in, clock-out and break.
///
/// Records are immutable value objects: created once per parsed row, consumed
/// by the generator or writer, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub break_duration: Option<Duration>,
}

impl AttendanceRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            start: None,
            end: None,
            break_duration: None,
        }
    }

    /// Time worked between start and end, treating `end < start` as a shift
    /// wrapping past midnight. `None` unless both endpoints are present.
    pub fn worked_span(&self) -> Option<Duration> {
        let (start, end) = (self.start?, self.end?);
        let mut span = end.signed_duration_since(start);
        if span < Duration::zero() {
            span = span + Duration::hours(24);
        }
        Some(span)
    }

    /// Whether the record satisfies the break invariant:
    /// `0 <= break < worked span` whenever all three fields are present.
    pub fn is_consistent(&self) -> bool {
        match (self.worked_span(), self.break_duration) {
            (Some(span), Some(brk)) => brk >= Duration::zero() && brk < span,
            (None, Some(brk)) => brk >= Duration::zero(),
            _ => true,
        }
    }

    /// Net worked hours (span minus break), rounded to two decimals.
    pub fn worked_hours(&self) -> Option<f64> {
        let span = self.worked_span()?;
        let brk = self.break_duration.unwrap_or_else(Duration::zero);
        let net = (span - brk).num_minutes().max(0) as f64 / 60.0;
        Some((net * 100.0).round() / 100.0)
    }

    pub fn to_dto(&self) -> RecordDto {
        RecordDto {
            date: self.date.format("%Y-%m-%d").to_string(),
            start: self.start.map(|t| t.format("%H:%M").to_string()),
            end: self.end.map(|t| t.format("%H:%M").to_string()),
            break_duration: self.break_duration.map(format_break),
        }
    }
}

fn format_break(d: Duration) -> String {
    let minutes = d.num_minutes().max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Wire form of a record: ISO-like strings, optional keys omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDto {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(rename = "break", skip_serializing_if = "Option::is_none")]
    pub break_duration: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn record(start: (u32, u32), end: (u32, u32)) -> AttendanceRecord {
        AttendanceRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            start: Some(t(start.0, start.1)),
            end: Some(t(end.0, end.1)),
            break_duration: None,
        }
    }

    #[test]
    fn test_worked_span_regular_day() {
        let r = record((8, 0), (17, 0));
        assert_eq!(r.worked_span(), Some(Duration::hours(9)));
    }

    #[test]
    fn test_worked_span_wraps_past_midnight() {
        let r = record((22, 0), (6, 0));
        assert_eq!(r.worked_span(), Some(Duration::hours(8)));
    }

    #[test]
    fn test_worked_hours_subtracts_break() {
        let mut r = record((8, 0), (17, 0));
        r.break_duration = Some(Duration::minutes(30));
        assert_eq!(r.worked_hours(), Some(8.5));
    }

    #[test]
    fn test_consistency_rejects_break_longer_than_span() {
        let mut r = record((9, 0), (10, 0));
        r.break_duration = Some(Duration::hours(2));
        assert!(!r.is_consistent());
    }

    #[test]
    fn test_consistency_accepts_date_only_record() {
        let r = AttendanceRecord::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(r.is_consistent());
    }

    #[test]
    fn test_dto_omits_missing_fields() {
        let r = AttendanceRecord::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let json = serde_json::to_string(&r.to_dto()).unwrap();
        assert_eq!(json, r#"{"date":"2024-05-01"}"#);
    }

    #[test]
    fn test_dto_serializes_full_record() {
        let mut r = record((8, 0), (17, 0));
        r.break_duration = Some(Duration::minutes(30));
        let json = serde_json::to_string(&r.to_dto()).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2024-05-01","start":"08:00","end":"17:00","break":"00:30"}"#
        );
    }
}
