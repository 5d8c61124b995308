// src/extractors/text.rs
use crate::extractors::render::render_within;
use crate::filing::catalog::{SectionCatalog, END, INTRO};
use crate::filing::models::{MarkupOffsetIndex, TextIndex};

/// Renders the markup section by section into one text buffer.
///
/// Each located section spans from its own markup offset up to the offset of
/// the next located section (or the end of the markup). `intro` always starts
/// at offset 0. An absent section renders nothing and takes the current buffer
/// length as its text offset, which is where the next located section begins.
pub fn build_text(catalog: &SectionCatalog, markup_index: &MarkupOffsetIndex, markup: &str) -> (String, TextIndex) {
    let ids = catalog.ids();
    let start_of = |id: &str| if id == INTRO { Some(0) } else { markup_index.offset(id) };

    let mut text = String::new();
    let mut offsets = Vec::with_capacity(ids.len());

    for (position, id) in ids.iter().enumerate() {
        if id == END {
            break;
        }
        offsets.push((id.clone(), text.len()));

        let Some(start) = start_of(id.as_str()) else {
            tracing::debug!("Section {} absent, empty at text offset {}", id, text.len());
            continue;
        };

        let end = ids[position + 1..]
            .iter()
            .filter(|next| next.as_str() != END)
            .find_map(|next| markup_index.offset(next))
            .unwrap_or(markup.len())
            .max(start);

        let rendered = render_within(&markup[start..end], markup_index.open_elements(id));
        tracing::debug!(
            "Section {}: markup {}..{} rendered to {} bytes at text offset {}",
            id,
            start,
            end,
            rendered.len(),
            text.len()
        );
        text.push_str(&rendered);
    }

    offsets.push((END.to_string(), text.len()));
    (text, TextIndex::from_offsets(offsets))
}
