// src/filing/mod.rs
pub mod batch;
pub mod catalog;
pub mod config;
pub mod models;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::extractors::{build_markup_index, build_text, extract_metadata, normalize};
use crate::utils::error::{ExtractError, FilingError};

pub use catalog::{SectionCatalog, SectionEntry, END, INTRO};
pub use config::EngineConfig;
pub use models::{FilingMetadata, MarkupOffsetIndex, MetadataField, TextIndex};

/// One 10-K document, fully processed at construction:
/// normalize → index markup → render text → read the cover page.
/// Nothing is recomputed afterwards.
#[derive(Debug, Clone)]
pub struct Filing {
    filepath: PathBuf,
    raw_markup: String,
    markup: String,
    catalog: Arc<SectionCatalog>,
    markup_index: MarkupOffsetIndex,
    text: String,
    text_index: TextIndex,
    metadata: FilingMetadata,
}

impl Filing {
    /// Loads and processes the filing at `path` with the default configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FilingError> {
        Self::open_with(path, &EngineConfig::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, config: &EngineConfig) -> Result<Self, FilingError> {
        let path = path.as_ref();
        // The file is read in one call, so the handle is closed before any parsing
        let bytes = std::fs::read(path).map_err(|source| FilingError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let raw_markup = String::from_utf8_lossy(&bytes).into_owned();
        tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());

        Ok(Self::from_markup(path, raw_markup, config))
    }

    /// Processes markup that is already in memory. `filepath` is kept only as a label.
    pub fn from_markup<P: AsRef<Path>>(filepath: P, raw_markup: String, config: &EngineConfig) -> Self {
        let filepath = filepath.as_ref().to_path_buf();
        let catalog = Arc::clone(&config.catalog);

        // 1. Canonicalize character encodings
        let markup = normalize(&raw_markup, &config.replacements);

        // 2. Locate every catalog item in the markup
        let markup_index = build_markup_index(&catalog, &markup);

        // 3. Render the text buffer and its section index
        let (text, text_index) = build_text(&catalog, &markup_index, &markup);
        if !text_index.is_consistent(&catalog, text.len()) {
            tracing::error!("Text index for {} violates section ordering: {:?}", filepath.display(), text_index);
        }

        // 4. Read cover-page facts from the intro
        let intro = text_index
            .bounds(INTRO)
            .map(|(start, end)| &text[start..end])
            .unwrap_or_default();
        let metadata = extract_metadata(intro);

        tracing::info!(
            "Processed {}: {} of {} sections located, {} characters of text",
            filepath.display(),
            markup_index.located().len(),
            catalog.entries().len(),
            text.chars().count()
        );

        Self {
            filepath,
            raw_markup,
            markup,
            catalog,
            markup_index,
            text,
            text_index,
            metadata,
        }
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn raw_markup(&self) -> &str {
        &self.raw_markup
    }

    /// Markup after normalization; markup offsets refer to this string.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn catalog(&self) -> &SectionCatalog {
        &self.catalog
    }

    pub fn markup_index(&self) -> &MarkupOffsetIndex {
        &self.markup_index
    }

    /// The whole rendered text, sections concatenated in catalog order.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_index(&self) -> &TextIndex {
        &self.text_index
    }

    /// Length of the rendered text in characters.
    pub fn size(&self) -> usize {
        self.text.chars().count()
    }

    pub fn metadata(&self) -> &FilingMetadata {
        &self.metadata
    }

    pub fn checkboxes(&self) -> &[bool] {
        &self.metadata.checkboxes
    }

    /// Text of section `id`. A section missing from this filing yields `""`;
    /// use [`Filing::is_located`] or [`Filing::require_section`] to tell it apart.
    pub fn section(&self, id: &str) -> Result<&str, ExtractError> {
        let (start, end) = self.text_index.bounds(id)?;
        Ok(&self.text[start..end])
    }

    /// Like [`Filing::section`], but a section missing from this filing is an error.
    pub fn require_section(&self, id: &str) -> Result<&str, ExtractError> {
        if !self.is_located(id)? {
            return Err(ExtractError::SectionNotFound(id.to_string()));
        }
        self.section(id)
    }

    /// Whether `id` was found in this filing. The bookends always are.
    pub fn is_located(&self, id: &str) -> Result<bool, ExtractError> {
        if !self.catalog.contains(id) {
            return Err(ExtractError::UnknownSectionId(id.to_string()));
        }
        Ok(id == INTRO || id == END || self.markup_index.is_located(id))
    }

    /// Located item ids in catalog order.
    pub fn located_sections(&self) -> Vec<&str> {
        self.markup_index.located()
    }
}

impl fmt::Display for Filing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unknown = "unknown";
        let metadata = &self.metadata;
        let company = metadata.company.as_deref().unwrap_or(unknown);

        match metadata.fiscal_year {
            Some(year) => writeln!(
                f,
                "Annual Form 10-K for {} covering fiscal year {}, filed in {}.",
                company,
                year,
                year + 1
            )?,
            None => writeln!(f, "Annual Form 10-K for {} (fiscal year unknown).", company)?,
        }

        let year = metadata.fiscal_year.map(|year| year.to_string());
        let rows = [
            ("Company Name", Some(company)),
            ("Fiscal Year (filed in following year)", year.as_deref()),
            ("Employer Identification Number (IRS)", metadata.tax_id.as_deref()),
            ("Address", metadata.address.as_deref()),
            ("Phone Number", metadata.phone.as_deref()),
        ];
        for (label, value) in rows {
            writeln!(f, "    {:<40}{}", label, value.unwrap_or(unknown))?;
        }
        writeln!(f, "    {:<40}{}", "File Path", self.filepath.display())?;
        writeln!(f, "    {:<40}{}", "Size (in characters)", self.size())?;
        write!(f, "    {:<40}{}", "Sections Located", self.located_sections().join(", "))
    }
}
