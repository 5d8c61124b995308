// src/filing/catalog.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::utils::error::ConfigError;

/// Synthetic id for everything before the first item (cover page, table of contents).
pub const INTRO: &str = "intro";
/// Synthetic id marking the end of the rendered text.
pub const END: &str = "end";

/// One recognized item of the filing, e.g. `i1` / "Item 1." / "Business".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub id: String,
    pub label: String,
    pub title: String,
    #[serde(default)]
    pub alternates: Vec<String>,
}

impl SectionEntry {
    pub fn new(id: &str, label: &str, title: &str, alternates: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            title: title.to_string(),
            alternates: alternates.iter().map(|alt| alt.to_string()).collect(),
        }
    }
}

/// Ordered registry of the items the engine looks for.
///
/// The bookends `intro` and `end` are implicit: [`SectionCatalog::ids`] always
/// starts with `intro` and finishes with `end`, with the entries in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SectionEntry>", into = "Vec<SectionEntry>")]
pub struct SectionCatalog {
    entries: Vec<SectionEntry>,
    ids: Vec<String>,
}

impl SectionCatalog {
    pub fn new(entries: Vec<SectionEntry>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.id == INTRO || entry.id == END {
                return Err(ConfigError::InvalidCatalog(format!("'{}' is a reserved section id", entry.id)));
            }
            if entry.id.trim().is_empty() || entry.label.trim().is_empty() || entry.title.trim().is_empty() {
                return Err(ConfigError::InvalidCatalog(format!("section '{}' needs an id, a label and a title", entry.id)));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::InvalidCatalog(format!("duplicate section id '{}'", entry.id)));
            }
        }

        let ids = std::iter::once(INTRO.to_string())
            .chain(entries.iter().map(|entry| entry.id.clone()))
            .chain(std::iter::once(END.to_string()))
            .collect();

        Ok(Self { entries, ids })
    }

    /// The standard Form 10-K item structure.
    pub fn form_10k() -> Self {
        let entries = vec![
            SectionEntry::new("i1", "Item 1.", "Business", &[]),
            SectionEntry::new("i1a", "Item 1A.", "Risk Factors", &[]),
            SectionEntry::new("i1b", "Item 1B.", "Unresolved Staff Comments", &[]),
            SectionEntry::new("i1c", "Item 1C.", "Cybersecurity", &[]),
            SectionEntry::new("i2", "Item 2.", "Properties", &[]),
            SectionEntry::new("i3", "Item 3.", "Legal Proceedings", &[]),
            SectionEntry::new("i4", "Item 4.", "Mine Safety Disclosures", &[]),
            SectionEntry::new("i5", "Item 5.", "Market for Registrant's Common Equity", &["Market for the Registrant's Common Equity"]),
            SectionEntry::new("i6", "Item 6.", "Selected Financial Data", &[]),
            SectionEntry::new("i7", "Item 7.", "Management's Discussion and Analysis", &[]),
            SectionEntry::new("i7a", "Item 7A.", "Quantitative and Qualitative Disclosures About Market Risk", &[]),
            SectionEntry::new("i8", "Item 8.", "Financial Statements and Supplementary Data", &[]),
            SectionEntry::new("i9", "Item 9.", "Changes in and Disagreements with Accountants", &[]),
            SectionEntry::new("i9a", "Item 9A.", "Controls and Procedures", &[]),
            SectionEntry::new("i9b", "Item 9B.", "Other Information", &[]),
            SectionEntry::new("i9c", "Item 9C.", "Disclosure Regarding Foreign Jurisdictions that Prevent Inspections", &[]),
            SectionEntry::new("i10", "Item 10.", "Directors, Executive Officers and Corporate Governance", &["Directors and Executive Officers of the Registrant"]),
            SectionEntry::new("i11", "Item 11.", "Executive Compensation", &[]),
            SectionEntry::new("i12", "Item 12.", "Security Ownership of Certain Beneficial Owners", &[]),
            SectionEntry::new("i13", "Item 13.", "Certain Relationships and Related Transactions", &["Certain Relationships and Related Party Transactions"]),
            SectionEntry::new("i14", "Item 14.", "Principal Accounting Fees and Services", &["Principal Accountant Fees and Services"]),
            SectionEntry::new("i15", "Item 15.", "Exhibits, Financial Statement Schedules", &["Exhibits and Financial Statement Schedules"]),
            SectionEntry::new("i16", "Item 16.", "Form 10-K Summary", &[]),
        ];
        Self::new(entries).expect("built-in Form 10-K catalog is valid")
    }

    /// Item entries in order, without the bookends.
    pub fn entries(&self) -> &[SectionEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&SectionEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Every section id in order, bookends included.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|known| known == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }
}

impl Default for SectionCatalog {
    fn default() -> Self {
        Self::form_10k()
    }
}

impl TryFrom<Vec<SectionEntry>> for SectionCatalog {
    type Error = ConfigError;

    fn try_from(entries: Vec<SectionEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<SectionCatalog> for Vec<SectionEntry> {
    fn from(catalog: SectionCatalog) -> Self {
        catalog.entries
    }
}
