// src/extractors/offsets.rs
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::extractors::anchor::AnchorResolver;
use crate::filing::catalog::SectionCatalog;
use crate::filing::models::MarkupOffsetIndex;
use crate::utils::error::ExtractError;

/// Resolves every catalog item and records where its destination starts in `markup`.
/// Items that cannot be resolved or located are recorded as absent.
pub fn build_markup_index(catalog: &SectionCatalog, markup: &str) -> MarkupOffsetIndex {
    let document = Html::parse_document(markup);
    let resolver = AnchorResolver::new(&document);

    let mut offsets = Vec::with_capacity(catalog.entries().len());
    let mut open_elements = Vec::new();
    for entry in catalog.entries() {
        let offset = match resolver.resolve(entry) {
            Ok(Some(destination)) => {
                let located = locate_in_markup(markup, destination);
                if located.is_none() {
                    tracing::debug!("Section {}: destination <{}> not found in markup", entry.id, destination.value().name());
                } else {
                    let enclosing = open_table_elements(destination);
                    if !enclosing.is_empty() {
                        tracing::debug!("Section {} starts inside <{}>", entry.id, enclosing.join("><"));
                        open_elements.push((entry.id.clone(), enclosing));
                    }
                }
                located
            }
            Ok(None) => None,
            Err(ExtractError::SectionNotLocatable(id)) => {
                tracing::debug!("Section {} not locatable, marking absent", id);
                None
            }
            Err(e) => {
                tracing::warn!("Section {}: unexpected resolution error: {}", entry.id, e);
                None
            }
        };
        offsets.push((entry.id.clone(), offset));
    }

    enforce_order(&mut offsets);

    let index = MarkupOffsetIndex::from_offsets(offsets).with_open_elements(open_elements);
    tracing::debug!("Markup index: {} of {} sections located", index.located().len(), catalog.entries().len());
    index
}

// Elements whose start tags are dropped when a fragment begins inside them
const TABLE_STRUCTURE: &[&str] = &["table", "caption", "colgroup", "thead", "tbody", "tfoot", "tr", "td", "th"];

/// Table elements enclosing `destination`, outermost first.
fn open_table_elements(destination: ElementRef<'_>) -> Vec<String> {
    let mut enclosing: Vec<String> = destination
        .ancestors()
        .filter_map(ElementRef::wrap)
        .map(|element| element.value().name().to_string())
        .filter(|name| TABLE_STRUCTURE.contains(&name.as_str()))
        .collect();
    enclosing.reverse();
    enclosing
}

/// Start of the destination node in the source text.
///
/// Scans for the node's opening tag by name and identifying attribute; when
/// that fails (e.g. the attribute is entity-encoded in the source), falls back
/// to searching for the node's serialized HTML.
pub fn locate_in_markup(markup: &str, destination: ElementRef<'_>) -> Option<usize> {
    let element = destination.value();
    let tag = element.name();

    let by_attribute = element
        .attr("name")
        .map(|value| ("name", value))
        .into_iter()
        .chain(element.id().map(|value| ("id", value)))
        .find_map(|(attr, value)| find_opening_tag(markup, tag, attr, value));

    by_attribute.or_else(|| {
        let serialized = destination.html();
        tracing::trace!("Falling back to serialized search for <{}>", tag);
        markup.find(&serialized)
    })
}

/// Byte offset of the first `<tag ... attr=value ...>` in `markup`. Tag and
/// attribute names match case-insensitively, the value exactly, quoted or not.
pub fn find_opening_tag(markup: &str, tag: &str, attr: &str, value: &str) -> Option<usize> {
    let value = regex::escape(value);
    let pattern = format!(
        r#"<(?i:{tag})\s(?:[^>]*?\s)?(?i:{attr})\s*=\s*(?:"{value}"|'{value}'|{value}[\s/>])"#,
        tag = regex::escape(tag),
        attr = regex::escape(attr),
        value = value,
    );

    match Regex::new(&pattern) {
        Ok(re) => re.find(markup).map(|found| found.start()),
        Err(e) => {
            tracing::warn!("Could not build opening-tag pattern for <{} {}=\"{}\">: {}", tag, attr, value, e);
            None
        }
    }
}

/// Located offsets must not decrease in catalog order. The longest run of
/// items whose offsets are already in order is kept; every other located item
/// points at a misresolved anchor and is dropped. Ties keep the earlier items.
fn enforce_order(offsets: &mut [(String, Option<usize>)]) {
    let located: Vec<(usize, usize)> = offsets
        .iter()
        .enumerate()
        .filter_map(|(position, (_, offset))| offset.map(|offset| (position, offset)))
        .collect();

    // lengths[i]: longest ordered run ending at located[i]
    let mut lengths = vec![1usize; located.len()];
    let mut previous: Vec<Option<usize>> = vec![None; located.len()];
    for i in 0..located.len() {
        for j in 0..i {
            if located[j].1 <= located[i].1 && lengths[j] + 1 > lengths[i] {
                lengths[i] = lengths[j] + 1;
                previous[i] = Some(j);
            }
        }
    }

    let mut keep = vec![false; located.len()];
    let mut cursor = (0..located.len()).rev().max_by_key(|&i| lengths[i]);
    while let Some(i) = cursor {
        keep[i] = true;
        cursor = previous[i];
    }

    for (i, &(position, offset)) in located.iter().enumerate() {
        if keep[i] {
            continue;
        }
        let (id, slot) = &mut offsets[position];
        tracing::warn!("Section {} at {} is out of order with the other sections, treating as absent", id, offset);
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filing::catalog::SectionEntry;

    fn catalog() -> SectionCatalog {
        SectionCatalog::new(vec![
            SectionEntry::new("i1", "Item 1.", "Business", &[]),
            SectionEntry::new("i1a", "Item 1A.", "Risk Factors", &[]),
            SectionEntry::new("i2", "Item 2.", "Properties", &[]),
        ])
        .unwrap()
    }

    #[test]
    fn test_find_opening_tag_variants() {
        let markup = r#"<p data-id="x">no</p><A NAME=x>one</A><div id='y' class="c">two</div>"#;
        assert_eq!(find_opening_tag(markup, "a", "name", "x"), markup.find("<A NAME"));
        assert_eq!(find_opening_tag(markup, "div", "id", "y"), markup.find("<div id='y'"));
        assert_eq!(find_opening_tag(markup, "p", "id", "x"), None);
        assert_eq!(find_opening_tag(markup, "a", "name", "X"), None);
    }

    #[test]
    fn test_find_opening_tag_ignores_links_to_the_target() {
        let markup = r##"<a href="#x">Item 1.</a><div style="margin:0" id="x"></div>"##;
        assert_eq!(find_opening_tag(markup, "a", "href", "x"), None);
        assert_eq!(find_opening_tag(markup, "div", "id", "x"), markup.find("<div style"));
    }

    #[test]
    fn test_index_records_offsets_and_absent_sections() {
        let markup = r##"<html><body>
<table>
<tr><td><a href="#s1">Item 1.</a></td><td>Business</td></tr>
<tr><td><a href="#s1a">Item 1A.</a></td><td>Risk Factors</td></tr>
</table>
<div id="s1"></div><p>Business text</p>
<div id="s1a"></div><p>Risk text</p>
</body></html>"##;

        let index = build_markup_index(&catalog(), markup);
        assert_eq!(index.offset("i1"), markup.find(r#"<div id="s1">"#));
        assert_eq!(index.offset("i1a"), markup.find(r#"<div id="s1a">"#));
        assert_eq!(index.offset("i2"), None);
        assert_eq!(index.located(), vec!["i1", "i1a"]);
    }

    #[test]
    fn test_out_of_order_offset_is_dropped() {
        let markup = r##"<html><body>
<p><a href="#late">Item 1.</a></p>
<p><a href="#early">Item 1A.</a></p>
<a name="early"></a><p>first in document</p>
<a name="late"></a><p>second in document</p>
</body></html>"##;

        let index = build_markup_index(&catalog(), markup);
        assert_eq!(index.offset("i1"), markup.find(r#"<a name="late">"#));
        assert_eq!(index.offset("i1a"), None);
    }

    #[test]
    fn test_single_misplaced_item_does_not_hide_the_rest() {
        let catalog = SectionCatalog::new(vec![
            SectionEntry::new("i1", "Item 1.", "Business", &[]),
            SectionEntry::new("i1a", "Item 1A.", "Risk Factors", &[]),
            SectionEntry::new("i2", "Item 2.", "Properties", &[]),
            SectionEntry::new("i3", "Item 3.", "Legal Proceedings", &[]),
        ])
        .unwrap();
        let markup = r##"<html><body>
<p><a href="#wrong">Item 1.</a></p>
<p><a href="#risk">Item 1A.</a></p>
<p><a href="#props">Item 2.</a></p>
<p><a href="#legal">Item 3.</a></p>
<div id="risk"></div><p>Risk text</p>
<div id="props"></div><p>Properties text</p>
<div id="legal"></div><p>Legal text</p>
<a name="wrong"></a><p>Exhibit index</p>
</body></html>"##;

        let index = build_markup_index(&catalog, markup);
        assert_eq!(index.located(), vec!["i1a", "i2", "i3"]);
        assert_eq!(index.offset("i1"), None);
        assert_eq!(index.offset("i3"), markup.find(r#"<div id="legal">"#));
    }

    #[test]
    fn test_enforce_order_keeps_longest_ordered_run() {
        let mut offsets = vec![
            ("a".to_string(), Some(10)),
            ("b".to_string(), Some(40)),
            ("c".to_string(), None),
            ("d".to_string(), Some(20)),
            ("e".to_string(), Some(30)),
            ("f".to_string(), Some(50)),
        ];
        enforce_order(&mut offsets);
        let kept: Vec<&str> = offsets.iter().filter(|(_, offset)| offset.is_some()).map(|(id, _)| id.as_str()).collect();
        assert_eq!(kept, vec!["a", "d", "e", "f"]);
    }

    #[test]
    fn test_destination_inside_cell_records_open_table_elements() {
        let markup = r##"<html><body>
<p><a href="#fin">Item 1.</a></p>
<table><tr><td><a name="fin"></a>Item 1.</td><td>Business</td></tr><tr><td>Revenue</td><td>100</td></tr></table>
</body></html>"##;

        let index = build_markup_index(&catalog(), markup);
        assert_eq!(index.offset("i1"), markup.find(r#"<a name="fin">"#));
        assert_eq!(index.open_elements("i1"), &["table", "tbody", "tr", "td"]);
        assert!(index.open_elements("i1a").is_empty());
    }

    #[test]
    fn test_serialized_fallback_for_encoded_attribute() {
        let markup = r##"<html><body><p><a href="#a&amp;b">Item 1.</a></p><a name="a&amp;b"></a><p>text</p></body></html>"##;
        let index = build_markup_index(&catalog(), markup);
        assert_eq!(index.offset("i1"), markup.find(r#"<a name="a&amp;b">"#));
    }
}
