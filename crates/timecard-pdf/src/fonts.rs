//! Font resolution
//!
//! Regenerated documents use only the base-14 fonts, so a detected font name
//! (often subset-tagged, e.g. `ABCDEF+Arial-BoldMT`) is mapped onto the
//! closest base-14 face, falling through an ordered chain to Helvetica.

use crate::error::PdfError;

pub const DEFAULT_FONT: &str = "Helvetica";

/// Tried in order when the detected name maps onto nothing.
pub const FALLBACK_CHAIN: &[&str] = &["Helvetica", "Times-Roman", "Courier"];

const BASE14: &[&str] = &[
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Courier",
    "Courier-Bold",
    "Courier-Oblique",
    "Courier-BoldOblique",
    "Symbol",
    "ZapfDingbats",
];

/// Map a detected font name onto a base-14 face, trying `chain` when the name
/// itself matches nothing. Fails only when the chain is exhausted.
pub fn resolve_with_chain(detected: &str, chain: &[&str]) -> Result<&'static str, PdfError> {
    if let Some(font) = match_base14(detected) {
        return Ok(font);
    }
    for candidate in chain {
        if let Some(font) = match_base14(candidate) {
            return Ok(font);
        }
    }
    Err(PdfError::FontResolution(format!(
        "'{}' matches no base-14 font and the fallback chain is empty",
        detected
    )))
}

/// Infallible resolution through the default chain.
pub fn resolve(detected: &str) -> &'static str {
    resolve_with_chain(detected, FALLBACK_CHAIN).unwrap_or(DEFAULT_FONT)
}

fn match_base14(name: &str) -> Option<&'static str> {
    // Subset prefixes look like "ABCDEF+Real-Name".
    let name = name.rsplit('+').next().unwrap_or(name);

    if let Some(exact) = BASE14.iter().find(|f| f.eq_ignore_ascii_case(name)) {
        return Some(exact);
    }

    let lower = name.to_ascii_lowercase();
    let bold = lower.contains("bold");
    let italic = lower.contains("italic") || lower.contains("oblique");

    let family = if lower.contains("times") || lower.contains("serif") {
        "Times"
    } else if lower.contains("courier") || lower.contains("mono") {
        "Courier"
    } else if lower.contains("helvetica") || lower.contains("arial") {
        "Helvetica"
    } else {
        return None;
    };

    let resolved = match (family, bold, italic) {
        ("Times", false, false) => "Times-Roman",
        ("Times", true, false) => "Times-Bold",
        ("Times", false, true) => "Times-Italic",
        ("Times", true, true) => "Times-BoldItalic",
        ("Courier", false, false) => "Courier",
        ("Courier", true, false) => "Courier-Bold",
        ("Courier", false, true) => "Courier-Oblique",
        ("Courier", true, true) => "Courier-BoldOblique",
        (_, false, false) => "Helvetica",
        (_, true, false) => "Helvetica-Bold",
        (_, false, true) => "Helvetica-Oblique",
        (_, true, true) => "Helvetica-BoldOblique",
    };
    Some(resolved)
}
