//! Turning records into cleaned, deduplicated text units.

use crate::types::{FaqRecord, HotlineRecord, TextUnit, UnitOrigin};
use std::collections::HashSet;

/// Trim, turn newlines into spaces and collapse repeated spaces.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;

    for c in text.trim().chars() {
        let c = if c == '\n' || c == '\r' { ' ' } else { c };
        if c == ' ' {
            if last_was_space {
                continue;
            }
            last_was_space = true;
        } else {
            last_was_space = false;
        }
        out.push(c);
    }

    out
}

/// Sentence describing a hotline.
pub fn hotline_sentence(hotline: &HotlineRecord) -> String {
    format!(
        "{} supports {}. Call: {}, Website: {}",
        hotline.organization, hotline.topic, hotline.phone, hotline.website
    )
}

/// Derive text units from FAQ and hotline records.
///
/// FAQ answers come first, then hotline sentences. A unit whose normalized
/// text was already accepted in this pass is dropped, as is an empty one.
pub fn load_text_units(faq: &[FaqRecord], hotlines: &[HotlineRecord]) -> Vec<TextUnit> {
    let mut seen = HashSet::new();
    let mut units = Vec::new();
    let mut duplicates = 0usize;

    let candidates = faq
        .iter()
        .map(|item| (normalize_whitespace(&item.answer), UnitOrigin::Faq))
        .chain(
            hotlines
                .iter()
                .map(|item| (normalize_whitespace(&hotline_sentence(item)), UnitOrigin::Hotline)),
        );

    for (text, origin) in candidates {
        if text.is_empty() {
            continue;
        }
        if !seen.insert(text.clone()) {
            duplicates += 1;
            continue;
        }
        units.push(TextUnit { text, origin });
    }

    tracing::info!(
        "Loaded {} text units ({} duplicates skipped)",
        units.len(),
        duplicates
    );

    units
}
