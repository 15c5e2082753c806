//! Synthetic time variation
//!
//! Perturbs attendance records by a bounded random offset per field, then
//! clamps the result into plausible working-hour windows so the output still
//! reads like a real timesheet.

mod generator;

pub use generator::VariationGenerator;
