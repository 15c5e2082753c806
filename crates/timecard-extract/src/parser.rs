//! Line-oriented record parser
//!
//! Turns raw extracted text into `AttendanceRecord`s. Each merged line that
//! carries a date yields at most one record; malformed lines are skipped with
//! a warning and never abort the document.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use timecard_types::{normalize_date, normalize_time, parse_break, AttendanceRecord};

use crate::patterns::{classify_time_role, TimeRole, DATE_PATTERN, TIME_PATTERN};

lazy_static! {
    static ref HORIZONTAL_WS: Regex = Regex::new(r"[ \t]+").unwrap();
    static ref BLANK_RUNS: Regex = Regex::new(r"\n{2,}").unwrap();
}

/// Outcome of parsing one merged line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Record(AttendanceRecord),
    /// No date on the line; not a data row.
    NoDate,
    /// Recognizably a data row, but malformed; carries the reason.
    Skipped(String),
}

/// Parse a whole document's text into records.
///
/// Text is sanitized, broken rows are re-merged, then each line is parsed
/// independently. Skipped lines are logged and counted, never fatal.
pub fn parse_text(text: &str) -> Vec<AttendanceRecord> {
    let clean = sanitize(text);
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for line in merge_broken_lines(&clean) {
        match parse_line(&line) {
            LineOutcome::Record(record) => records.push(record),
            LineOutcome::NoDate => {}
            LineOutcome::Skipped(reason) => {
                skipped += 1;
                warn!(line = line.as_str(), reason = reason.as_str(), "skipping malformed line");
            }
        }
    }

    debug!(records = records.len(), skipped, "document parsed");
    records
}

/// Parse a single (already merged) line.
pub fn parse_line(line: &str) -> LineOutcome {
    let Some(date_match) = DATE_PATTERN.find(line) else {
        return LineOutcome::NoDate;
    };
    let Some(date) = normalize_date(date_match.as_str()) else {
        return LineOutcome::Skipped(format!("unparseable date: {}", date_match.as_str()));
    };

    let mut record = AttendanceRecord::new(date);
    let mut positional = Vec::new();

    for caps in TIME_PATTERN.captures_iter(line) {
        let token = caps.get(1).unwrap();
        // A time regex can land inside the date token on H-MM style dates.
        if token.start() < date_match.end() && token.end() > date_match.start() {
            continue;
        }
        let meridiem = caps.get(2).map(|m| m.as_str());
        let span_end = caps.get(0).unwrap().end();

        match classify_time_role(line, token.start(), span_end) {
            Some(role) => {
                if let Err(reason) = assign(&mut record, role, token.as_str(), meridiem) {
                    return LineOutcome::Skipped(reason);
                }
            }
            None => positional.push((token.as_str(), meridiem)),
        }
    }

    // Unkeyworded tokens fill remaining slots in start, end, break order.
    for (token, meridiem) in positional {
        let role = if record.start.is_none() {
            TimeRole::Start
        } else if record.end.is_none() {
            TimeRole::End
        } else if record.break_duration.is_none() {
            TimeRole::Break
        } else {
            debug!(token, "extra time token ignored");
            continue;
        };
        if let Err(reason) = assign(&mut record, role, token, meridiem) {
            return LineOutcome::Skipped(reason);
        }
    }

    if !record.is_consistent() {
        warn!(date = %record.date, "break exceeds worked span, dropping break");
        record.break_duration = None;
    }

    LineOutcome::Record(record)
}

fn assign(
    record: &mut AttendanceRecord,
    role: TimeRole,
    token: &str,
    meridiem: Option<&str>,
) -> Result<(), String> {
    match role {
        TimeRole::Start => {
            if record.start.is_some() {
                return Err("conflicting duplicate start time".into());
            }
            record.start = normalize_time(token, meridiem);
        }
        TimeRole::End => {
            if record.end.is_some() {
                return Err("conflicting duplicate end time".into());
            }
            record.end = normalize_time(token, meridiem);
        }
        TimeRole::Break => {
            if record.break_duration.is_some() {
                return Err("conflicting duplicate break".into());
            }
            record.break_duration = parse_break(token);
        }
    }
    Ok(())
}

/// Normalize whitespace artifacts common in extracted PDF text: CRs, BOMs,
/// non-breaking spaces, runs of blanks.
pub fn sanitize(text: &str) -> String {
    let replaced = text
        .replace('\r', " ")
        .replace('\u{FEFF}', "")
        .replace('\u{A0}', " ")
        .replace('\x0C', "\n");
    let collapsed = HORIZONTAL_WS.replace_all(&replaced, " ");
    BLANK_RUNS.replace_all(&collapsed, "\n").trim().to_string()
}

/// Re-join rows that the extractor split across physical lines: a line
/// starting with a date opens a new row, anything else continues the
/// current one.
pub fn merge_broken_lines(text: &str) -> Vec<String> {
    let mut merged = Vec::new();
    let mut buffer = String::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let starts_row = DATE_PATTERN
            .find(line)
            .map(|m| m.start() == 0)
            .unwrap_or(false);
        if starts_row {
            if !buffer.is_empty() {
                merged.push(std::mem::take(&mut buffer));
            }
            buffer.push_str(line);
        } else if buffer.is_empty() {
            // Header/metadata line before any data row; keep it standalone so
            // date-less content never leaks into a record.
            merged.push(line.to_string());
        } else {
            buffer.push(' ');
            buffer.push_str(line);
        }
    }
    if !buffer.is_empty() {
        merged.push(buffer);
    }
    merged
}
