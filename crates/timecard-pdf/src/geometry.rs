//! Positioned text recovery
//!
//! Walks page content streams and records where each text-showing operator
//! lands, keeping track of the current font and text position. The fragments
//! feed the structure analyzer; width is estimated from glyph count since the
//! analyzer only needs relative extents, not typeset precision.

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::PdfError;

/// Average glyph width as a fraction of the font size. Good enough for
/// column-edge detection across the base-14 fonts.
const GLYPH_WIDTH_FACTOR: f64 = 0.6;

/// Default page size (US Letter, points) when no MediaBox is present.
pub const DEFAULT_PAGE_SIZE: (f64, f64) = (612.0, 792.0);

/// One text-showing operation with its resolved position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_name: String,
    pub font_size: f64,
}

impl TextFragment {
    /// Estimated horizontal extent of the drawn text.
    pub fn width(&self) -> f64 {
        GLYPH_WIDTH_FACTOR * self.font_size * self.text.chars().count() as f64
    }

    pub fn right(&self) -> f64 {
        self.x + self.width()
    }
}

/// Collect fragments from the first page of a document along with its page
/// size. Attendance reports are analyzed from their first page only.
pub fn first_page_fragments(bytes: &[u8]) -> Result<(Vec<TextFragment>, (f64, f64)), PdfError> {
    let doc = Document::load_mem(bytes)?;
    let page_id = *doc
        .get_pages()
        .values()
        .next()
        .ok_or_else(|| PdfError::Parse("document has no pages".into()))?;
    let fragments = page_fragments(&doc, page_id)?;
    let size = page_size(&doc, page_id);
    debug!(fragments = fragments.len(), "page geometry collected");
    Ok((fragments, size))
}

/// Walk one page's content stream and emit a fragment per Tj/TJ.
pub fn page_fragments(doc: &Document, page_id: ObjectId) -> Result<Vec<TextFragment>, PdfError> {
    let data = doc.get_page_content(page_id)?;
    let content =
        Content::decode(&data).map_err(|e| PdfError::Parse(format!("content stream: {}", e)))?;

    let mut fragments = Vec::new();
    let mut font_name = String::new();
    let mut font_size = 0.0f64;
    // Current text position; Td/TD move the line start, Tm sets it outright.
    let mut line_x = 0.0f64;
    let mut line_y = 0.0f64;
    let mut cursor_x = 0.0f64;

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => {
                line_x = 0.0;
                line_y = 0.0;
                cursor_x = 0.0;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    font_name = String::from_utf8_lossy(name).into_owned();
                }
                if let Some(size) = op.operands.get(1).and_then(as_number) {
                    font_size = size;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    op.operands.first().and_then(as_number),
                    op.operands.get(1).and_then(as_number),
                ) {
                    line_x += tx;
                    line_y += ty;
                    cursor_x = line_x;
                }
            }
            "Tm" => {
                if let (Some(e), Some(f)) = (
                    op.operands.get(4).and_then(as_number),
                    op.operands.get(5).and_then(as_number),
                ) {
                    line_x = e;
                    line_y = f;
                    cursor_x = line_x;
                }
            }
            "Tj" | "TJ" => {
                let text = operand_text(&op.operands);
                if !text.trim().is_empty() {
                    let fragment = TextFragment {
                        text,
                        x: cursor_x,
                        y: line_y,
                        font_name: font_name.clone(),
                        font_size,
                    };
                    cursor_x = fragment.right();
                    fragments.push(fragment);
                }
            }
            _ => {}
        }
    }
    Ok(fragments)
}

/// Group fragments into visual lines (shared baseline within `y_tolerance`),
/// left to right within each line, top of page first.
pub fn fragments_to_lines(fragments: &[TextFragment], y_tolerance: f64) -> Vec<String> {
    let mut sorted: Vec<&TextFragment> = fragments.iter().collect();
    sorted.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<String> = Vec::new();
    let mut current: Vec<&TextFragment> = Vec::new();
    let mut current_y = f64::NAN;

    for fragment in sorted {
        if current.is_empty() || (current_y - fragment.y).abs() <= y_tolerance {
            if current.is_empty() {
                current_y = fragment.y;
            }
            current.push(fragment);
        } else {
            lines.push(join_line(&current));
            current_y = fragment.y;
            current = vec![fragment];
        }
    }
    if !current.is_empty() {
        lines.push(join_line(&current));
    }
    lines
}

fn join_line(fragments: &[&TextFragment]) -> String {
    let mut ordered: Vec<&&TextFragment> = fragments.iter().collect();
    ordered.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    let mut parts: Vec<&str> = ordered.iter().map(|f| f.text.trim()).collect();
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

fn page_size(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    let media_box = doc
        .get_object(page_id)
        .ok()
        .and_then(|obj| obj.as_dict().ok())
        .and_then(|dict| dict.get(b"MediaBox").ok())
        .and_then(|obj| obj.as_array().ok())
        .map(|arr| arr.iter().filter_map(as_number).collect::<Vec<_>>());

    match media_box.as_deref() {
        Some([x0, y0, x1, y1]) => (x1 - x0, y1 - y0),
        _ => DEFAULT_PAGE_SIZE,
    }
}

fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn operand_text(operands: &[Object]) -> String {
    let mut out = String::new();
    for operand in operands {
        match operand {
            Object::String(bytes, _) => out.push_str(&String::from_utf8_lossy(bytes)),
            Object::Array(items) => {
                for item in items {
                    if let Object::String(bytes, _) = item {
                        out.push_str(&String::from_utf8_lossy(bytes));
                    }
                }
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frag(text: &str, x: f64, y: f64) -> TextFragment {
        TextFragment {
            text: text.to_string(),
            x,
            y,
            font_name: "F1".to_string(),
            font_size: 11.0,
        }
    }

    #[test]
    fn test_fragments_to_lines_groups_by_baseline() {
        let fragments = vec![
            frag("17:00", 300.0, 700.0),
            frag("2024-05-01", 72.0, 700.2),
            frag("2024-05-02", 72.0, 682.0),
        ];
        let lines = fragments_to_lines(&fragments, 2.0);
        assert_eq!(lines, vec!["2024-05-01 17:00".to_string(), "2024-05-02".to_string()]);
    }

    #[test]
    fn test_lines_are_top_down() {
        let fragments = vec![frag("bottom", 72.0, 100.0), frag("top", 72.0, 700.0)];
        let lines = fragments_to_lines(&fragments, 2.0);
        assert_eq!(lines, vec!["top".to_string(), "bottom".to_string()]);
    }

    #[test]
    fn test_width_scales_with_text_length() {
        let short = frag("ab", 0.0, 0.0);
        let long = frag("abcdef", 0.0, 0.0);
        assert!(long.width() > short.width());
        assert_eq!(short.right(), short.width());
    }
}
