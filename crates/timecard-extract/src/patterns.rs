//! Regex patterns and keyword tables for attendance-row recognition

use lazy_static::lazy_static;
use regex::Regex;

/// Keywords marking a clock-in time
pub const START_KEYWORDS: &[&str] = &["start", "in", "arrive", "begin"];

/// Keywords marking a clock-out time
pub const END_KEYWORDS: &[&str] = &["end", "out", "leave", "finish"];

/// Keywords marking a break duration
pub const BREAK_KEYWORDS: &[&str] = &["break", "lunch", "rest"];

lazy_static! {
    /// Date in any accepted format: YYYY-MM-DD, M/D/YYYY, M-D-YYYY
    pub static ref DATE_PATTERN: Regex =
        Regex::new(r"\b(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{4}|\d{1,2}-\d{1,2}-\d{4})\b")
            .unwrap();

    /// H:MM time with optional AM/PM marker
    pub static ref TIME_PATTERN: Regex =
        Regex::new(r"(?i)\b(\d{1,2}:\d{2})(?:\s*(am|pm))?\b").unwrap();

    static ref START_RE: Regex = keyword_regex(START_KEYWORDS);
    static ref END_RE: Regex = keyword_regex(END_KEYWORDS);
    static ref BREAK_RE: Regex = keyword_regex(BREAK_KEYWORDS);
}

fn keyword_regex(words: &[&str]) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).unwrap()
}

/// Role a time token plays within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRole {
    Start,
    End,
    Break,
}

/// Classify a time token by keyword proximity within its line.
///
/// The nearest keyword *preceding* the token wins; a keyword after the token
/// is only considered when nothing precedes it. Ties resolve to the earliest
/// keyword occurrence in the line. Returns `None` when the line carries no
/// role keyword, leaving the token to positional assignment.
pub fn classify_time_role(line: &str, token_start: usize, token_end: usize) -> Option<TimeRole> {
    let mut candidates: Vec<(usize, usize, TimeRole)> = Vec::new();
    for (re, role) in [
        (&*START_RE, TimeRole::Start),
        (&*END_RE, TimeRole::End),
        (&*BREAK_RE, TimeRole::Break),
    ] {
        for m in re.find_iter(line) {
            candidates.push((m.start(), m.end(), role));
        }
    }
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by_key(|&(start, _, _)| start);

    // Prefer the closest keyword before the token.
    let preceding = candidates
        .iter()
        .filter(|&&(_, end, _)| end <= token_start)
        .min_by_key(|&&(_, end, _)| token_start - end);
    if let Some(&(_, _, role)) = preceding {
        return Some(role);
    }

    candidates
        .iter()
        .filter(|&&(start, _, _)| start >= token_end)
        .min_by_key(|&&(start, _, _)| start - token_end)
        .map(|&(_, _, role)| role)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_of(line: &str, token: &str) -> Option<TimeRole> {
        let start = line.find(token).unwrap();
        classify_time_role(line, start, start + token.len())
    }

    #[test]
    fn test_preceding_keyword_wins() {
        let line = "Start: 08:00 End: 17:00";
        assert_eq!(role_of(line, "08:00"), Some(TimeRole::Start));
        assert_eq!(role_of(line, "17:00"), Some(TimeRole::End));
    }

    #[test]
    fn test_short_keywords_match_whole_words_only() {
        // "in" must not match inside "finish"
        let line = "finish 17:00";
        assert_eq!(role_of(line, "17:00"), Some(TimeRole::End));
    }

    #[test]
    fn test_break_keywords() {
        assert_eq!(role_of("lunch 00:45", "00:45"), Some(TimeRole::Break));
        assert_eq!(role_of("Break: 00:30", "00:30"), Some(TimeRole::Break));
    }

    #[test]
    fn test_no_keyword_yields_none() {
        assert_eq!(role_of("2024-05-01 08:00", "08:00"), None);
    }

    #[test]
    fn test_following_keyword_used_when_nothing_precedes() {
        // Hebrew-style reports put the label after the value.
        assert_eq!(role_of("08:00 start of shift", "08:00"), Some(TimeRole::Start));
    }
}
