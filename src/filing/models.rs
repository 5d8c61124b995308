// src/filing/models.rs
use serde::{Serialize, Serializer};
use std::fmt;

use crate::filing::catalog::{SectionCatalog, END, INTRO};
use crate::utils::error::ExtractError;

/// The cover-page fields pulled out of the intro text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Company,
    FiscalYear,
    TaxId,
    Phone,
    Address,
}

impl MetadataField {
    pub const ALL: [MetadataField; 5] = [
        MetadataField::Company,
        MetadataField::FiscalYear,
        MetadataField::TaxId,
        MetadataField::Phone,
        MetadataField::Address,
    ];
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetadataField::Company => "company name",
            MetadataField::FiscalYear => "fiscal year",
            MetadataField::TaxId => "employer tax id",
            MetadataField::Phone => "phone number",
            MetadataField::Address => "address",
        };
        f.write_str(name)
    }
}

/// Facts read from the cover page. Each field is independent; a pattern that
/// fails to match leaves its field `None` without affecting the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilingMetadata {
    pub company: Option<String>,
    /// Year the report covers; the form itself is filed the following year.
    pub fiscal_year: Option<u32>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Cover-page checkboxes, left-to-right then top-to-bottom.
    pub checkboxes: Vec<bool>,
}

impl FilingMetadata {
    fn is_present(&self, field: MetadataField) -> bool {
        match field {
            MetadataField::Company => self.company.is_some(),
            MetadataField::FiscalYear => self.fiscal_year.is_some(),
            MetadataField::TaxId => self.tax_id.is_some(),
            MetadataField::Phone => self.phone.is_some(),
            MetadataField::Address => self.address.is_some(),
        }
    }

    pub fn missing_fields(&self) -> Vec<MetadataField> {
        MetadataField::ALL
            .into_iter()
            .filter(|field| !self.is_present(*field))
            .collect()
    }

    /// Strict mode: all five fields are required.
    pub fn require_complete(&self) -> Result<(), ExtractError> {
        match self.missing_fields().first() {
            Some(field) => Err(ExtractError::MetadataFieldMissing(*field)),
            None => Ok(()),
        }
    }

    /// Calendar year the form was filed in.
    pub fn filing_year(&self) -> Option<u32> {
        self.fiscal_year.map(|year| year + 1)
    }
}

/// Byte offset of each catalog item inside the normalized markup.
/// `None` marks an item whose anchor could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupOffsetIndex {
    offsets: Vec<(String, Option<usize>)>,
    // Table elements still open where a section starts, outermost first
    open_elements: Vec<(String, Vec<String>)>,
}

impl MarkupOffsetIndex {
    pub(crate) fn from_offsets(offsets: Vec<(String, Option<usize>)>) -> Self {
        Self { offsets, open_elements: Vec::new() }
    }

    pub(crate) fn with_open_elements(mut self, open_elements: Vec<(String, Vec<String>)>) -> Self {
        self.open_elements = open_elements;
        self
    }

    /// Names of the table elements enclosing the start of `id`, outermost
    /// first. Empty when the section starts outside any table.
    pub fn open_elements(&self, id: &str) -> &[String] {
        self.open_elements
            .iter()
            .find(|(known, _)| known == id)
            .map(|(_, names)| names.as_slice())
            .unwrap_or(&[])
    }

    /// Offset of `id`, or `None` when unknown or absent.
    pub fn offset(&self, id: &str) -> Option<usize> {
        self.offsets
            .iter()
            .find(|(known, _)| known == id)
            .and_then(|(_, offset)| *offset)
    }

    pub fn is_located(&self, id: &str) -> bool {
        self.offset(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<usize>)> {
        self.offsets.iter().map(|(id, offset)| (id.as_str(), *offset))
    }

    /// Located ids in catalog order.
    pub fn located(&self) -> Vec<&str> {
        self.iter()
            .filter_map(|(id, offset)| offset.map(|_| id))
            .collect()
    }
}

/// Byte offset of every catalog id, bookends included, inside the rendered text.
/// Serializes as an `id -> offset` map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextIndex {
    offsets: Vec<(String, usize)>,
}

impl TextIndex {
    pub(crate) fn from_offsets(offsets: Vec<(String, usize)>) -> Self {
        Self { offsets }
    }

    pub fn offset(&self, id: &str) -> Option<usize> {
        self.offsets.iter().find(|(known, _)| known == id).map(|(_, offset)| *offset)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.offsets.iter().map(|(id, offset)| (id.as_str(), *offset))
    }

    /// Text span of `id`: from its offset to the offset of the id that
    /// follows it in the catalog.
    pub fn bounds(&self, id: &str) -> Result<(usize, usize), ExtractError> {
        let position = self
            .offsets
            .iter()
            .position(|(known, _)| known == id)
            .ok_or_else(|| ExtractError::UnknownSectionId(id.to_string()))?;

        let start = self.offsets[position].1;
        let end = self
            .offsets
            .get(position + 1)
            .map(|(_, offset)| *offset)
            .unwrap_or(start);
        Ok((start, end))
    }

    /// Checks the index against the catalog and the rendered text: one entry per
    /// catalog id in order, offsets non-decreasing, `intro` at 0 and `end` at
    /// `text_len`.
    pub fn is_consistent(&self, catalog: &SectionCatalog, text_len: usize) -> bool {
        let same_ids = self.offsets.len() == catalog.ids().len()
            && self.offsets.iter().zip(catalog.ids()).all(|((id, _), known)| id == known);
        let ordered = self.offsets.windows(2).all(|pair| pair[0].1 <= pair[1].1);

        same_ids
            && ordered
            && self.offset(INTRO) == Some(0)
            && self.offset(END) == Some(text_len)
    }
}

impl Serialize for TextIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
