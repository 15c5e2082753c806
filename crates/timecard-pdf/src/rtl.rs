//! Right-to-left text handling
//!
//! Drawing operators place glyphs left to right, so Hebrew/Arabic runs must
//! be reversed into visual order before they hit the content stream. Mixed
//! lines keep digits and Latin runs in logical order.

/// Whether a character belongs to a right-to-left script (Hebrew or Arabic
/// blocks).
pub fn is_rtl_char(c: char) -> bool {
    matches!(c, '\u{0590}'..='\u{05FF}' | '\u{0600}'..='\u{06FF}')
}

/// Whether any character in the text needs RTL treatment.
pub fn contains_rtl(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}

/// Reorder a logical-order string into visual order: each maximal RTL run is
/// reversed in place, and runs themselves are laid out right to left when the
/// text is RTL-dominant. Pure LTR text comes back unchanged.
pub fn to_visual_order(text: &str) -> String {
    if !contains_rtl(text) {
        return text.to_string();
    }

    let mut runs: Vec<(bool, String)> = Vec::new();
    for c in text.chars() {
        let rtl = is_rtl_char(c);
        match runs.last_mut() {
            // Whitespace glues onto the current run to keep spacing intact.
            Some((last_rtl, run)) if *last_rtl == rtl || c.is_whitespace() => run.push(c),
            _ => runs.push((rtl, c.to_string())),
        }
    }

    for (rtl, run) in runs.iter_mut() {
        if *rtl {
            *run = run.chars().rev().collect();
        }
    }
    // RTL-dominant text reads right to left, so run order flips too.
    runs.reverse();
    runs.into_iter().map(|(_, run)| run).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_text_is_untouched() {
        assert_eq!(to_visual_order("Start 08:00"), "Start 08:00");
    }

    #[test]
    fn test_hebrew_run_is_reversed() {
        // "שלום" logical becomes "םולש" visual.
        assert_eq!(to_visual_order("שלום"), "םולש");
    }

    #[test]
    fn test_detection_covers_hebrew_and_arabic() {
        assert!(contains_rtl("כניסה"));
        assert!(contains_rtl("دخول"));
        assert!(!contains_rtl("08:00"));
    }
}
