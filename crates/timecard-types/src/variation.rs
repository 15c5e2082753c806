//! Variation levels
//!
//! Each named level maps to a fixed symmetric bound, in minutes, applied to
//! start/end perturbation, plus a smaller bound for the break field. The
//! table is process-wide and never mutated.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;

/// How far synthetic times may deviate from the originals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariationLevel {
    /// Very small changes (±5 minutes).
    Minimal,
    /// Moderate changes (±15 minutes).
    #[default]
    Moderate,
    /// Significant changes (±30 minutes).
    Significant,
}

/// Perturbation bounds for one level, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariationBounds {
    pub start_minutes: i64,
    pub end_minutes: i64,
    pub break_minutes: i64,
}

impl VariationLevel {
    pub fn bounds(self) -> VariationBounds {
        match self {
            VariationLevel::Minimal => VariationBounds {
                start_minutes: 5,
                end_minutes: 5,
                break_minutes: 2,
            },
            VariationLevel::Moderate => VariationBounds {
                start_minutes: 15,
                end_minutes: 15,
                break_minutes: 5,
            },
            VariationLevel::Significant => VariationBounds {
                start_minutes: 30,
                end_minutes: 30,
                break_minutes: 10,
            },
        }
    }
}

impl fmt::Display for VariationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VariationLevel::Minimal => "minimal",
            VariationLevel::Moderate => "moderate",
            VariationLevel::Significant => "significant",
        };
        f.write_str(s)
    }
}

impl FromStr for VariationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(VariationLevel::Minimal),
            "moderate" => Ok(VariationLevel::Moderate),
            "significant" => Ok(VariationLevel::Significant),
            other => Err(format!("unknown variation level: {}", other)),
        }
    }
}

/// Window the varied start time is clamped into.
pub fn start_window() -> (NaiveTime, NaiveTime) {
    (
        NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
    )
}

/// Window the varied end time is clamped into.
pub fn end_window() -> (NaiveTime, NaiveTime) {
    (
        NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trips_through_str() {
        for level in [
            VariationLevel::Minimal,
            VariationLevel::Moderate,
            VariationLevel::Significant,
        ] {
            assert_eq!(level.to_string().parse::<VariationLevel>(), Ok(level));
        }
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        assert!("extreme".parse::<VariationLevel>().is_err());
    }

    #[test]
    fn test_moderate_bounds() {
        let b = VariationLevel::Moderate.bounds();
        assert_eq!(b.start_minutes, 15);
        assert_eq!(b.end_minutes, 15);
        assert_eq!(b.break_minutes, 5);
    }
}
