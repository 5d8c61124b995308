// src/extractors/anchor.rs

// --- Imports ---
use crate::filing::catalog::SectionEntry;
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

// --- CSS Selectors (Lazy Static) ---
// First real hyperlink inside a table-of-contents row
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("Failed to compile LINK_SELECTOR")
});

// --- Data Structures ---

/// A non-empty text node of the document: its trimmed, lower-cased content
/// and the element that directly holds it.
#[derive(Debug, Clone)]
pub struct TextCandidate<'a> {
    pub holder: ElementRef<'a>,
    pub folded: String,
}

/// One tier of the table-of-contents search. Given every text node of the
/// document, returns the holders of those that name `entry`, in document order.
pub trait MatchStrategy {
    fn name(&self) -> &'static str;

    fn candidates<'a>(&self, texts: &[TextCandidate<'a>], entry: &SectionEntry) -> Vec<ElementRef<'a>>;
}

fn starting_or_ending_with<'a>(texts: &[TextCandidate<'a>], phrase: &str) -> Vec<ElementRef<'a>> {
    let phrase = phrase.to_lowercase();
    texts
        .iter()
        .filter(|text| text.folded.starts_with(&phrase) || text.folded.ends_with(&phrase))
        .map(|text| text.holder)
        .collect()
}

/// Tier 1: text starting with the short label ("item 1a."), or equal to it without its period.
pub struct LabelStrategy;

impl MatchStrategy for LabelStrategy {
    fn name(&self) -> &'static str {
        "label"
    }

    fn candidates<'a>(&self, texts: &[TextCandidate<'a>], entry: &SectionEntry) -> Vec<ElementRef<'a>> {
        let label = entry.label.to_lowercase();
        let bare = label.strip_suffix('.').unwrap_or(&label);
        texts
            .iter()
            .filter(|text| text.folded.starts_with(&label) || text.folded == bare)
            .map(|text| text.holder)
            .collect()
    }
}

/// Tier 2: text starting or ending with the long title ("risk factors").
pub struct TitleStrategy;

impl MatchStrategy for TitleStrategy {
    fn name(&self) -> &'static str {
        "title"
    }

    fn candidates<'a>(&self, texts: &[TextCandidate<'a>], entry: &SectionEntry) -> Vec<ElementRef<'a>> {
        starting_or_ending_with(texts, &entry.title)
    }
}

/// Tier 3: text that is exactly "<label> [Reserved]".
pub struct ReservedStrategy;

impl MatchStrategy for ReservedStrategy {
    fn name(&self) -> &'static str {
        "reserved"
    }

    fn candidates<'a>(&self, texts: &[TextCandidate<'a>], entry: &SectionEntry) -> Vec<ElementRef<'a>> {
        let reserved = format!("{} [reserved]", entry.label.to_lowercase());
        texts
            .iter()
            .filter(|text| text.folded == reserved)
            .map(|text| text.holder)
            .collect()
    }
}

/// Tier 4: the entry's alternate titles, first one with any hit wins.
pub struct AlternateStrategy;

impl MatchStrategy for AlternateStrategy {
    fn name(&self) -> &'static str {
        "alternate"
    }

    fn candidates<'a>(&self, texts: &[TextCandidate<'a>], entry: &SectionEntry) -> Vec<ElementRef<'a>> {
        entry
            .alternates
            .iter()
            .map(|alternate| starting_or_ending_with(texts, alternate))
            .find(|hits| !hits.is_empty())
            .unwrap_or_default()
    }
}

pub fn default_strategies() -> Vec<Box<dyn MatchStrategy>> {
    vec![
        Box::new(LabelStrategy),
        Box::new(TitleStrategy),
        Box::new(ReservedStrategy),
        Box::new(AlternateStrategy),
    ]
}

// --- Resolver ---

/// Finds where a section's table-of-contents link points to.
pub struct AnchorResolver<'a> {
    document: &'a Html,
    texts: Vec<TextCandidate<'a>>,
    strategies: Vec<Box<dyn MatchStrategy>>,
}

impl<'a> AnchorResolver<'a> {
    pub fn new(document: &'a Html) -> Self {
        Self::with_strategies(document, default_strategies())
    }

    pub fn with_strategies(document: &'a Html, strategies: Vec<Box<dyn MatchStrategy>>) -> Self {
        let texts: Vec<TextCandidate<'a>> = document
            .tree
            .root()
            .descendants()
            .filter_map(|node| {
                let Node::Text(text) = node.value() else {
                    return None;
                };
                // Entity spellings the replacement rules miss still decode to U+00A0
                let folded = text.text.trim().replace('\u{a0}', " ").to_lowercase();
                if folded.is_empty() {
                    return None;
                }
                let holder = node.parent().and_then(ElementRef::wrap)?;
                Some(TextCandidate { holder, folded })
            })
            .collect();

        tracing::trace!("Collected {} text nodes for anchor matching", texts.len());
        Self { document, texts, strategies }
    }

    /// Resolves the destination node of `entry`.
    ///
    /// `Err(SectionNotLocatable)` when no tier produced a candidate; `Ok(None)`
    /// when a candidate was found but leads to no destination (no link, a link
    /// without a fragment, or a fragment naming nothing in the document).
    pub fn resolve(&self, entry: &SectionEntry) -> Result<Option<ElementRef<'a>>, ExtractError> {
        let (tier, hits) = self
            .strategies
            .iter()
            .map(|strategy| (strategy.name(), strategy.candidates(&self.texts, entry)))
            .find(|(_, hits)| !hits.is_empty())
            .ok_or_else(|| ExtractError::SectionNotLocatable(entry.id.clone()))?;

        let holder = hits[0];
        tracing::debug!(
            "Section {} matched by {} tier ({} candidates), first in <{}>",
            entry.id,
            tier,
            hits.len(),
            holder.value().name()
        );

        let Some(link) = self.link_for(holder) else {
            tracing::debug!("Section {}: table-of-contents entry has no link", entry.id);
            return Ok(None);
        };

        let Some(target) = link
            .value()
            .attr("href")
            .and_then(|href| href.split_once('#'))
            .map(|(_, fragment)| fragment)
            .filter(|fragment| !fragment.is_empty())
        else {
            tracing::debug!("Section {}: link has no fragment reference", entry.id);
            return Ok(None);
        };

        let destination = self.destination(target);
        if destination.is_none() {
            tracing::debug!("Section {}: no node named or identified as '{}'", entry.id, target);
        }
        Ok(destination)
    }

    /// Walks up from the matched text to the enclosing link, or to the
    /// enclosing row and then its first link.
    fn link_for(&self, holder: ElementRef<'a>) -> Option<ElementRef<'a>> {
        let container = std::iter::once(holder)
            .chain(holder.ancestors().filter_map(ElementRef::wrap))
            .find(|element| matches!(element.value().name(), "a" | "tr"))?;

        if container.value().name() == "tr" {
            container.select(&LINK_SELECTOR).next()
        } else {
            Some(container)
        }
    }

    /// `<a name=target>` first, then any element with `id=target`.
    fn destination(&self, target: &str) -> Option<ElementRef<'a>> {
        let elements = || self.document.tree.root().descendants().filter_map(ElementRef::wrap);

        elements()
            .find(|element| element.value().name() == "a" && element.value().attr("name") == Some(target))
            .or_else(|| elements().find(|element| element.value().id() == Some(target)))
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::filing::catalog::SectionCatalog;

    fn entry(id: &str) -> SectionEntry {
        SectionCatalog::form_10k().entry(id).expect("known id").clone()
    }

    fn resolve(html: &str, id: &str) -> Result<Option<(String, String)>, ExtractError> {
        let document = Html::parse_document(html);
        let resolver = AnchorResolver::new(&document);
        resolver.resolve(&entry(id)).map(|found| {
            found.map(|element| {
                let key = element
                    .value()
                    .attr("name")
                    .or_else(|| element.value().id())
                    .unwrap_or_default()
                    .to_string();
                (element.value().name().to_string(), key)
            })
        })
    }

    #[test]
    fn test_label_link_resolves_to_id_destination() {
        let html = r##"
            <table><tr><td><a href="#item_one">Item 1.</a></td><td>Business</td></tr></table>
            <p>Cover page text.</p>
            <div id="item_one">Item 1. Business</div>
        "##;
        let found = resolve(html, "i1").expect("locatable");
        assert_eq!(found, Some(("div".to_string(), "item_one".to_string())));
    }

    #[test]
    fn test_plain_text_row_uses_first_link_in_row() {
        let html = r##"
            <table><tr><td>Item 1.</td><td><a href="#b1">Business</a></td></tr></table>
            <div id="b1">Body</div>
        "##;
        let found = resolve(html, "i1").expect("locatable");
        assert_eq!(found, Some(("div".to_string(), "b1".to_string())));
    }

    #[test]
    fn test_row_without_link_is_absent() {
        let html = r##"<table><tr><td>Item 1.</td><td>Business</td></tr></table>"##;
        assert_eq!(resolve(html, "i1").expect("locatable"), None);
    }

    #[test]
    fn test_name_attribute_preferred_over_id() {
        let html = r##"
            <p><a href="#x">Item 1.</a></p>
            <div id="x">by id</div>
            <a name="x"></a>
        "##;
        let found = resolve(html, "i1").expect("locatable");
        assert_eq!(found, Some(("a".to_string(), "x".to_string())));
    }

    #[test]
    fn test_bare_label_without_period_matches() {
        let html = r##"<p><a href="#z">ITEM 1</a></p><a name="z"></a>"##;
        let found = resolve(html, "i1").expect("locatable");
        assert_eq!(found, Some(("a".to_string(), "z".to_string())));
    }

    #[test]
    fn test_longer_item_number_is_not_a_label_match() {
        let html = r##"<p><a href="#ten">Item 10.</a></p><div id="ten"></div>"##;
        assert!(matches!(resolve(html, "i1"), Err(ExtractError::SectionNotLocatable(id)) if id == "i1"));
    }

    #[test]
    fn test_long_title_tier() {
        let html = r##"<p><a href="#biz">Our Business</a></p><div id="biz"></div>"##;
        let found = resolve(html, "i1").expect("locatable");
        assert_eq!(found, Some(("div".to_string(), "biz".to_string())));
    }

    #[test]
    fn test_alternate_title_tier() {
        let html = r##"<p><a href="#ex">Exhibits and Financial Statement Schedules</a></p><div id="ex"></div>"##;
        let found = resolve(html, "i15").expect("locatable");
        assert_eq!(found, Some(("div".to_string(), "ex".to_string())));
    }

    #[test]
    fn test_reserved_tier_in_isolation() {
        let document = Html::parse_document("<p>Item 6. [Reserved]</p><p>Item 6 notes</p>");
        let resolver = AnchorResolver::new(&document);

        let hits = ReservedStrategy.candidates(&resolver.texts, &entry("i6"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].value().name(), "p");

        // The label tier already covers the reserved form
        assert_eq!(LabelStrategy.candidates(&resolver.texts, &entry("i6")).len(), 1);
    }

    #[test]
    fn test_link_without_fragment_is_absent() {
        let html = r##"<p><a href="page2.htm">Item 1.</a></p><a name="Item 1."></a>"##;
        assert_eq!(resolve(html, "i1").expect("locatable"), None);
    }

    #[test]
    fn test_missing_destination_is_absent() {
        let html = r##"<p><a href="#nowhere">Item 1.</a></p>"##;
        assert_eq!(resolve(html, "i1").expect("locatable"), None);
    }

    #[test]
    fn test_decoded_nbsp_in_label_matches() {
        let html = r##"<p><a href="#x">Item&#xA0;1A.</a></p><p><a href="#y">Item&#XA0;1B.</a></p><div id="x"></div><div id="y"></div>"##;
        assert_eq!(resolve(html, "i1a").expect("locatable"), Some(("div".to_string(), "x".to_string())));
        assert_eq!(resolve(html, "i1b").expect("locatable"), Some(("div".to_string(), "y".to_string())));
    }

    #[test]
    fn test_no_candidates_is_not_locatable() {
        let result = resolve("<p>Nothing relevant here.</p>", "i1b");
        assert!(matches!(result, Err(ExtractError::SectionNotLocatable(id)) if id == "i1b"));
    }
}
