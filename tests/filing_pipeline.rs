use std::path::PathBuf;
use std::sync::Arc;

use tenk_extractor::filing::batch;
use tenk_extractor::storage::StorageManager;
use tenk_extractor::{EngineConfig, ExtractError, Filing};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/globex_10k.html")
}

fn globex() -> Filing {
    Filing::open(fixture()).expect("fixture filing loads")
}

#[test]
fn test_locates_table_of_contents_targets() {
    let filing = globex();
    assert_eq!(filing.located_sections(), vec!["i1", "i1a", "i2", "i7", "i9a"]);

    let markup_offsets: Vec<usize> = filing.markup_index().iter().filter_map(|(_, offset)| offset).collect();
    assert!(markup_offsets.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(filing.markup()[markup_offsets[0]..].starts_with("<a name=\"business\">"));
}

#[test]
fn test_text_index_covers_the_text() {
    let filing = globex();
    let index = filing.text_index();
    assert_eq!(index.offset("intro"), Some(0));
    assert_eq!(index.offset("end"), Some(filing.text().len()));
    assert!(index.is_consistent(filing.catalog(), filing.text().len()));

    let offsets: Vec<usize> = index.iter().map(|(_, offset)| offset).collect();
    assert_eq!(offsets.len(), filing.catalog().ids().len());
    assert!(offsets.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn test_sections_reconstruct_the_text() {
    let filing = globex();
    let rebuilt: String = filing
        .catalog()
        .ids()
        .iter()
        .map(|id| filing.section(id).expect("catalog id"))
        .collect();
    assert_eq!(rebuilt, filing.text());
}

#[test]
fn test_section_contents() {
    let filing = globex();

    let intro = filing.section("intro").unwrap();
    assert!(intro.starts_with("UNITED STATES SECURITIES AND EXCHANGE COMMISSION"), "intro was: {:?}", intro);
    assert!(intro.contains("TABLE OF CONTENTS"));
    assert!(!intro.contains("gbx-20220930"));
    assert!(!intro.contains("padding"));
    assert!(!intro.contains("dei:EntityRegistrantName"));

    let business = filing.section("i1").unwrap();
    assert!(business.starts_with("Item 1. Business"), "business was: {:?}", business);
    assert!(business.contains("Globex sells everything to everyone."));
    assert!(!business.contains("world domination"));

    let properties = filing.section("i2").unwrap();
    assert!(properties.contains("Location Square feet"), "properties was: {:?}", properties);
    assert!(properties.contains("Cypress Creek 1,200,000"));

    let mdna = filing.section("i7").unwrap();
    assert!(mdna.starts_with("MANAGEMENT'S DISCUSSION AND ANALYSIS"));
    assert!(mdna.contains("Net sales increased 12% to $4.2 billion."));

    let controls = filing.section("i9a").unwrap();
    assert!(controls.contains("Our disclosure controls are effective."));
    assert!(controls.ends_with("SIGNATURES"));

    assert_eq!(filing.section("end").unwrap(), "");
}

#[test]
fn test_unlinked_and_missing_items_are_empty() {
    let filing = globex();
    for id in ["i9", "i7a", "i8", "i16"] {
        assert_eq!(filing.section(id).unwrap(), "", "section {} should be empty", id);
        assert!(!filing.is_located(id).unwrap());
        assert!(matches!(filing.require_section(id), Err(ExtractError::SectionNotFound(_))));
    }
    assert!(matches!(filing.section("item-1"), Err(ExtractError::UnknownSectionId(_))));
}

#[test]
fn test_cover_page_metadata() {
    let filing = globex();
    let metadata = filing.metadata();
    assert_eq!(metadata.company.as_deref(), Some("GLOBEX CORPORATION"));
    assert_eq!(metadata.fiscal_year, Some(2022));
    assert_eq!(metadata.filing_year(), Some(2023));
    assert_eq!(metadata.tax_id.as_deref(), Some("98-7654321"));
    assert_eq!(metadata.address.as_deref(), Some("1 Globex Way, Cypress Creek, OR 97000"));
    assert_eq!(metadata.phone.as_deref(), Some("(503) 555-0199"));
    assert_eq!(filing.checkboxes(), &[true, false]);
    assert!(metadata.require_complete().is_ok());
}

#[test]
fn test_custom_catalog_spans_to_next_configured_item() {
    let config = EngineConfig::from_json_str(
        r#"{"sections": [
            {"id": "i1", "label": "Item 1.", "title": "Business"},
            {"id": "i2", "label": "Item 2.", "title": "Properties"}
        ]}"#,
    )
    .unwrap();
    let filing = Filing::open_with(fixture(), &config).unwrap();

    assert_eq!(filing.located_sections(), vec!["i1", "i2"]);
    assert!(filing.section("i1").unwrap().contains("world domination"));
    assert!(filing.section("i2").unwrap().contains("Net sales increased"));
    assert!(matches!(filing.section("i7"), Err(ExtractError::UnknownSectionId(_))));
}

#[test]
fn test_batch_load_and_save() {
    let results = tokio_test::block_on(batch::load_all(vec![fixture()], Arc::new(EngineConfig::default())));
    let (path, result) = results.into_iter().next().expect("one result");
    assert_eq!(path, fixture());
    let filing = result.expect("fixture builds");

    let dir = tempfile::tempdir().unwrap();
    let storage = StorageManager::new(dir.path()).unwrap();
    let saved = storage.save_section(&filing, "i7").unwrap();
    assert!(saved.ends_with("globex_10k_2022/globex_10k_2022_i7.txt"));
    assert_eq!(std::fs::read_to_string(saved).unwrap(), filing.section("i7").unwrap());
}
