//! Section extraction for SEC Form 10-K filings.
//!
//! A [`Filing`] is built once from the filing's HTML: the markup is normalized,
//! each catalog item is located through its table-of-contents link, the markup
//! is rendered to plain text section by section, and the cover-page facts are
//! read from the intro.
//!
//! ```no_run
//! use tenk_extractor::Filing;
//!
//! let filing = Filing::open("data/AAPL/2023/primary-document.html")?;
//! println!("{}", filing.metadata().company.as_deref().unwrap_or("unknown"));
//! println!("{}", filing.section("i1")?);
//! # Ok::<(), tenk_extractor::AppError>(())
//! ```

pub mod extractors;
pub mod filing;
pub mod storage;
pub mod utils;

pub use filing::{EngineConfig, Filing, FilingMetadata, SectionCatalog, SectionEntry};
pub use utils::error::{AppError, ConfigError, ExtractError, FilingError, StorageError};
