//! Layout structure recovery
//!
//! Derives a table model from positioned fragments: column left edges by
//! x-clustering, row pitch as the most common baseline gap, dominant font by
//! fragment count. The model is what the writer needs to produce a visually
//! similar document; it is never exact typography.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::PdfError;
use crate::fonts;
use crate::geometry::{first_page_fragments, TextFragment, DEFAULT_PAGE_SIZE};

/// Fragments whose left edges are within this many points share a column.
pub const X_CLUSTER_TOLERANCE: f64 = 8.0;

/// Baselines within this many points share a row.
pub const Y_ROW_TOLERANCE: f64 = 2.0;

const DEFAULT_FONT_SIZE: f64 = 11.0;
const DEFAULT_ROW_PITCH: f64 = 18.0;
const DEFAULT_LEFT_MARGIN: f64 = 72.0;
const DEFAULT_TOP_MARGIN: f64 = 72.0;

/// Column labels in the order the writer draws them.
pub const COLUMN_LABELS: &[&str] = &["Date", "Start", "End", "Break"];

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub label: String,
    pub x: f64,
}

/// Everything the writer needs to lay out a replacement document.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureModel {
    pub page_width: f64,
    pub page_height: f64,
    pub top_margin: f64,
    pub left_margin: f64,
    pub columns: Vec<ColumnSpec>,
    pub font_name: String,
    pub font_size: f64,
    pub row_pitch: f64,
}

impl StructureModel {
    /// Whether column detection succeeded; otherwise the writer falls back to
    /// one text line per record.
    pub fn is_columnar(&self) -> bool {
        self.columns.len() >= 2
    }

    /// Baseline y for the row at `index` (header is index 0).
    pub fn row_y(&self, index: usize) -> f64 {
        self.page_height - self.top_margin - self.row_pitch * index as f64
    }
}

impl Default for StructureModel {
    fn default() -> Self {
        let columns = COLUMN_LABELS
            .iter()
            .enumerate()
            .map(|(i, label)| ColumnSpec {
                label: label.to_string(),
                x: DEFAULT_LEFT_MARGIN + 100.0 * i as f64,
            })
            .collect();
        Self {
            page_width: DEFAULT_PAGE_SIZE.0,
            page_height: DEFAULT_PAGE_SIZE.1,
            top_margin: DEFAULT_TOP_MARGIN,
            left_margin: DEFAULT_LEFT_MARGIN,
            columns,
            font_name: fonts::DEFAULT_FONT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            row_pitch: DEFAULT_ROW_PITCH,
        }
    }
}

/// Analyze a PDF's first page into a structure model.
pub fn analyze_pdf(bytes: &[u8]) -> Result<StructureModel, PdfError> {
    let (fragments, page_size) = first_page_fragments(bytes)?;
    Ok(analyze_fragments(&fragments, page_size))
}

/// Build a model from fragments. Empty or degenerate input degrades to the
/// default layout rather than failing.
pub fn analyze_fragments(fragments: &[TextFragment], page_size: (f64, f64)) -> StructureModel {
    if fragments.is_empty() {
        warn!("no text fragments, using default layout");
        return StructureModel::default();
    }

    let (page_width, page_height) = page_size;
    let top_y = fragments.iter().map(|f| f.y).fold(f64::MIN, f64::max);
    let left_margin = fragments.iter().map(|f| f.x).fold(f64::MAX, f64::min);

    let column_xs = cluster_x(fragments);
    let columns = label_columns(&column_xs, fragments, top_y);
    let (font_name, font_size) = dominant_font(fragments);
    let row_pitch = row_pitch(fragments).unwrap_or(DEFAULT_ROW_PITCH);

    let model = StructureModel {
        page_width,
        page_height,
        top_margin: (page_height - top_y).max(0.0),
        left_margin,
        columns,
        font_name,
        font_size,
        row_pitch,
    };
    debug!(
        columns = model.columns.len(),
        row_pitch = model.row_pitch,
        font = model.font_name.as_str(),
        "structure model built"
    );
    if model.is_columnar() {
        model
    } else {
        warn!("fewer than two columns detected, using default layout");
        StructureModel {
            page_width,
            page_height,
            font_name: model.font_name,
            font_size: model.font_size,
            ..StructureModel::default()
        }
    }
}

/// Cluster left edges into column positions; a new cluster opens when the gap
/// to the running cluster start exceeds the tolerance.
fn cluster_x(fragments: &[TextFragment]) -> Vec<f64> {
    let mut xs: Vec<f64> = fragments.iter().map(|f| f.x).collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for x in xs {
        match clusters.last_mut() {
            Some(cluster) if x - cluster[0] <= X_CLUSTER_TOLERANCE => cluster.push(x),
            _ => clusters.push(vec![x]),
        }
    }
    clusters
        .into_iter()
        .map(|c| c.iter().sum::<f64>() / c.len() as f64)
        .collect()
}

/// Name columns from the header row's text where possible, positionally
/// otherwise.
fn label_columns(column_xs: &[f64], fragments: &[TextFragment], top_y: f64) -> Vec<ColumnSpec> {
    column_xs
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let header = fragments.iter().find(|f| {
                (f.y - top_y).abs() <= Y_ROW_TOLERANCE && (f.x - x).abs() <= X_CLUSTER_TOLERANCE
            });
            let label = match header {
                Some(f) if f.text.chars().any(char::is_alphabetic) => f.text.trim().to_string(),
                _ => COLUMN_LABELS
                    .get(i)
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| format!("Column {}", i + 1)),
            };
            ColumnSpec { label, x }
        })
        .collect()
}

fn dominant_font(fragments: &[TextFragment]) -> (String, f64) {
    let mut counts: HashMap<(String, i64), usize> = HashMap::new();
    for f in fragments {
        *counts
            .entry((f.font_name.clone(), (f.font_size * 10.0) as i64))
            .or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|((name, size_tenths), _)| (name, size_tenths as f64 / 10.0))
        .unwrap_or_else(|| (fonts::DEFAULT_FONT.to_string(), DEFAULT_FONT_SIZE))
}

/// Most common gap between adjacent distinct baselines, rounded to half a
/// point to absorb float noise.
fn row_pitch(fragments: &[TextFragment]) -> Option<f64> {
    let mut ys: Vec<f64> = fragments.iter().map(|f| f.y).collect();
    ys.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    ys.dedup_by(|a, b| (*a - *b).abs() <= Y_ROW_TOLERANCE);
    if ys.len() < 2 {
        return None;
    }

    let mut gap_counts: HashMap<i64, usize> = HashMap::new();
    for pair in ys.windows(2) {
        let gap_halves = ((pair[0] - pair[1]) * 2.0).round() as i64;
        if gap_halves > 0 {
            *gap_counts.entry(gap_halves).or_default() += 1;
        }
    }
    gap_counts
        .into_iter()
        .max_by_key(|&(gap, count)| (count, std::cmp::Reverse(gap)))
        .map(|(gap_halves, _)| gap_halves as f64 / 2.0)
}
