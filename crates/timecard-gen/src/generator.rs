use chrono::{Duration, NaiveTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use timecard_types::{end_window, start_window, AttendanceRecord, VariationLevel};

/// Longest break the generator will ever emit.
const MAX_BREAK_MINUTES: i64 = 120;

/// Applies bounded random offsets to records.
///
/// Each field gets an independent offset drawn uniformly from the level's
/// symmetric bound, then is clamped: starts into the morning window, ends
/// after the (varied) start and inside the evening window, breaks into
/// `[0, span)`. Dates are never touched.
pub struct VariationGenerator {
    rng: StdRng,
    level: VariationLevel,
}

impl VariationGenerator {
    pub fn new(level: VariationLevel) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            level,
        }
    }

    /// Deterministic generator for reproducible output.
    pub fn with_seed(level: VariationLevel, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            level,
        }
    }

    pub fn level(&self) -> VariationLevel {
        self.level
    }

    pub fn vary_all(&mut self, records: &[AttendanceRecord]) -> Vec<AttendanceRecord> {
        records.iter().map(|r| self.vary_record(r)).collect()
    }

    pub fn vary_record(&mut self, record: &AttendanceRecord) -> AttendanceRecord {
        let bounds = self.level.bounds();

        let start = record.start.map(|t| {
            let offset = self.rng.gen_range(-bounds.start_minutes..=bounds.start_minutes);
            let (lo, hi) = start_window();
            clamp_time(shift_time(t, offset), lo, hi)
        });

        let end = record.end.map(|t| {
            let offset = self.rng.gen_range(-bounds.end_minutes..=bounds.end_minutes);
            let (lo, hi) = end_window();
            // An end time must not land before the same day's start.
            let lo = match start {
                Some(s) if s > lo => s,
                _ => lo,
            };
            clamp_time(shift_time(t, offset), lo, hi)
        });

        let mut varied = AttendanceRecord {
            date: record.date,
            start,
            end,
            break_duration: None,
        };

        varied.break_duration = record.break_duration.map(|brk| {
            let offset = self.rng.gen_range(-bounds.break_minutes..=bounds.break_minutes);
            let mut minutes = (brk.num_minutes() + offset).clamp(0, MAX_BREAK_MINUTES);
            if let Some(span) = varied.worked_span() {
                minutes = minutes.min((span.num_minutes() - 1).max(0));
            }
            Duration::minutes(minutes)
        });

        debug!(date = %varied.date, level = %self.level, "record varied");
        varied
    }
}

fn shift_time(t: NaiveTime, offset_minutes: i64) -> NaiveTime {
    let minutes = t.hour() as i64 * 60 + t.minute() as i64 + offset_minutes;
    let wrapped = minutes.rem_euclid(24 * 60);
    NaiveTime::from_hms_opt((wrapped / 60) as u32, (wrapped % 60) as u32, 0).unwrap()
}

fn clamp_time(t: NaiveTime, lo: NaiveTime, hi: NaiveTime) -> NaiveTime {
    t.clamp(lo, hi)
}
