// src/extractors/metadata.rs
use once_cell::sync::Lazy;
use regex::Regex;

use crate::filing::models::FilingMetadata;

const CHECKED_BOX: char = '\u{2612}';
const UNCHECKED_BOX: char = '\u{2610}';

/// Pattern capturing the nearest non-blank line above a line that contains `marker`.
fn line_before(marker: &str) -> Regex {
    let pattern = format!(r"(?im)^[ \t]*(\S[^\n]*?)[ \t]*\n(?:[ \t]*\n)*[^\n]*{}", marker);
    Regex::new(&pattern).expect("Failed to compile line-before pattern")
}

// --- Cover-page patterns (Lazy Static) ---
static COMPANY_RE: Lazy<Regex> = Lazy::new(|| line_before(r"\(?exact name of registrant as specified in its charter\)?"));

static FISCAL_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)for\s+the\s+fiscal\s+year\s+ended\s+[a-z]+\s+\d{1,2}\s*,?\s*(\d{4})\b")
        .expect("Failed to compile FISCAL_YEAR_RE")
});

static TAX_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{2}-\d{7})\b[^\n]*\n(?:[ \t]*\n)*[^\n]*I\.R\.S\.\s+Employer")
        .expect("Failed to compile TAX_ID_RE")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| line_before(r"telephone\s+number"));

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| line_before("address"));

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|found| found.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Reads the cover-page facts from the rendered intro section. Each field is
/// matched independently; the ones that do not match are left empty.
pub fn extract_metadata(intro: &str) -> FilingMetadata {
    let metadata = FilingMetadata {
        company: capture(&COMPANY_RE, intro),
        fiscal_year: capture(&FISCAL_YEAR_RE, intro).and_then(|year| year.parse().ok()),
        tax_id: capture(&TAX_ID_RE, intro),
        phone: capture(&PHONE_RE, intro),
        address: capture(&ADDRESS_RE, intro),
        checkboxes: extract_checkboxes(intro),
    };

    for field in metadata.missing_fields() {
        tracing::warn!("Cover page: {} not found", field);
    }
    metadata
}

/// Cover-page checkbox states in text order: `true` for a checked box.
pub fn extract_checkboxes(intro: &str) -> Vec<bool> {
    intro
        .chars()
        .filter_map(|c| match c {
            CHECKED_BOX => Some(true),
            UNCHECKED_BOX => Some(false),
            _ => None,
        })
        .collect()
}
