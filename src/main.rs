// src/main.rs
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tenk_extractor::filing::batch;
use tenk_extractor::storage::StorageManager;
use tenk_extractor::utils::{self, AppError};
use tenk_extractor::{EngineConfig, Filing};

/// Command Line Interface for Form 10-K section extraction
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Filing HTML documents to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Section ids to print or save (e.g. i1, i7, i8); repeatable
    #[arg(short, long = "section")]
    sections: Vec<String>,

    /// Output directory for extracted sections and metadata (prints to stdout if omitted)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// JSON config with a custom section catalog and/or replacement rules
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treat a filing with any missing cover-page field as failed
    #[arg(long)]
    strict_metadata: bool,

    /// Debug mode - save annotated HTML marking each located section (requires --output-dir)
    #[arg(short, long)]
    debug: bool,
}

/// Prints or saves what was asked for one filing. Errors here fail the filing.
fn report(filing: &Filing, args: &Args, storage: Option<&StorageManager>) -> Result<(), AppError> {
    if args.strict_metadata {
        filing.metadata().require_complete()?;
    }

    println!("{}\n", filing);

    match storage {
        Some(storage) => {
            for id in &args.sections {
                storage.save_section(filing, id)?;
            }
            storage.save_metadata(filing)?;

            if args.debug {
                let key = tenk_extractor::storage::filing_key(filing);
                let debug_path = args
                    .output_dir
                    .as_ref()
                    .map(|dir| dir.join(&key).join(format!("{}_annotated.html", key)));
                if let Some(debug_path) = debug_path {
                    if let Err(e) = utils::html_debug::save_debug_html(filing, &debug_path) {
                        tracing::warn!("Failed to create debug HTML: {}", e);
                    }
                }
            }
        }
        None => {
            for id in &args.sections {
                if !filing.is_located(id)? {
                    tracing::warn!("Section {} not found in {}", id, filing.filepath().display());
                }
                println!("===== {} =====\n{}\n", id, filing.section(id)?);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging("info");

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Load engine configuration
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let config = Arc::new(config);

    // Fail fast on ids the catalog does not know
    if let Some(unknown) = args.sections.iter().find(|id| !config.catalog.contains(id)) {
        return Err(AppError::Extraction(tenk_extractor::ExtractError::UnknownSectionId(unknown.clone())));
    }
    if args.debug && args.output_dir.is_none() {
        tracing::warn!("--debug has no effect without --output-dir");
    }

    // 4. Initialize storage
    let storage = args.output_dir.as_ref().map(StorageManager::new).transpose()?;

    // 5. Build all filings in parallel
    let results = batch::load_all(args.files.clone(), Arc::clone(&config)).await;

    // 6. Report each filing
    let mut success_count = 0;
    let mut failure_count = 0;

    for (path, result) in results {
        let outcome = result.and_then(|filing| report(&filing, &args, storage.as_ref()));
        match outcome {
            Ok(()) => success_count += 1,
            Err(e) => {
                tracing::error!("Failed to process {}: {}", path.display(), e);
                failure_count += 1;
            }
        }
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!("Failed to process any of {} filings", failure_count)));
    }

    Ok(())
}
