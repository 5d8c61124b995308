// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::filing::{Filing, FilingMetadata, MetadataField, TextIndex};
use crate::utils::error::StorageError;
use serde::Serialize;
use std::io::Write;

pub struct StorageManager {
    base_dir: PathBuf,
}

/// Layout of `<key>_meta.json`.
#[derive(Serialize)]
struct MetadataDocument<'a> {
    source: String,
    #[serde(flatten)]
    metadata: &'a FilingMetadata,
    filing_year: Option<u32>,
    missing_fields: Vec<MetadataField>,
    text_length: usize,
    sections_located: Vec<&'a str>,
    text_offsets: &'a TextIndex,
    extraction_timestamp: String,
}

/// Directory/file prefix for a filing: `<file stem>_<fiscal year>`, or the stem
/// alone when the year is unknown. Unsafe path characters become `_`.
pub fn filing_key(filing: &Filing) -> String {
    let stem = filing
        .filepath()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "filing".to_string());

    let key = match filing.metadata().fiscal_year {
        Some(year) => format!("{}_{}", stem, year),
        None => stem,
    };

    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    fn target_dir(&self, key: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(key);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir)
                .map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves the rendered text of one section to `<base>/<key>/<key>_<id>.txt`
    pub fn save_section(&self, filing: &Filing, id: &str) -> Result<PathBuf, StorageError> {
        let text = filing.section(id)?;

        let key = filing_key(filing);
        let file_path = self.target_dir(&key)?.join(format!("{}_{}.txt", key, id));

        let mut file = fs::File::create(&file_path)
            .map_err(StorageError::IoError)?;
        file.write_all(text.as_bytes())
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved section {} ({} bytes) to {}", id, text.len(), file_path.display());

        Ok(file_path)
    }

    /// Saves the cover-page metadata and section layout in JSON format
    pub fn save_metadata(&self, filing: &Filing) -> Result<PathBuf, StorageError> {
        let key = filing_key(filing);
        let file_path = self.target_dir(&key)?.join(format!("{}_meta.json", key));

        let metadata = filing.metadata();
        let document = MetadataDocument {
            source: filing.filepath().display().to_string(),
            metadata,
            filing_year: metadata.filing_year(),
            missing_fields: metadata.missing_fields(),
            text_length: filing.size(),
            sections_located: filing.located_sections(),
            text_offsets: filing.text_index(),
            extraction_timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let metadata_str = serde_json::to_string_pretty(&document)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}
