//! Shared attendance data model
//!
//! This crate provides the record type produced by extraction and consumed by
//! the variation generator and PDF writer, plus the date/time normalization
//! rules and the fixed variation-level table used across the workspace.

pub mod normalize;
pub mod record;
pub mod variation;

pub use normalize::{normalize_date, normalize_time, parse_break};
pub use record::{AttendanceRecord, RecordDto};
pub use variation::{end_window, start_window, VariationBounds, VariationLevel};
