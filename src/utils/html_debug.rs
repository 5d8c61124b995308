// src/utils/html_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::filing::Filing;
use crate::utils::error::StorageError;

/// Markup offsets of every located section, labelled with the section id.
pub fn section_markers(filing: &Filing) -> Vec<(usize, String)> {
    filing
        .markup_index()
        .iter()
        .filter_map(|(id, offset)| offset.map(|offset| (offset, id.to_string())))
        .collect()
}

/// Copy of `markup` with a visible banner inserted before each marker offset.
pub fn annotate(markup: &str, markers: &[(usize, String)]) -> String {
    let mut sorted: Vec<&(usize, String)> = markers.iter().collect();
    sorted.sort_by_key(|marker| marker.0); // Sort by position

    let mut debug_html = String::with_capacity(markup.len() + markers.len() * 160);
    debug_html.push_str("<style>\n.section-marker { background-color: #FFFF00; border-top: 3px solid #FFA500; font: bold 12px monospace; }\n</style>\n");

    let mut last_pos = 0;
    for (offset, label) in sorted {
        let offset = (*offset).min(markup.len());
        if !markup.is_char_boundary(offset) {
            tracing::warn!("Skipping marker '{}' at {}: not a character boundary", label, offset);
            continue;
        }

        // Add content before the marker
        debug_html.push_str(&markup[last_pos..offset]);
        debug_html.push_str(&format!(
            "<div class=\"section-marker\" title=\"Position: {}\">&#9654; {} @ {}</div>",
            offset, label, offset
        ));
        last_pos = offset;
    }

    // Add any remaining content
    debug_html.push_str(&markup[last_pos..]);
    debug_html
}

/// Saves the normalized markup of `filing` with section start markers, for
/// checking anchors by eye in a browser.
pub fn save_debug_html<P: AsRef<Path>>(filing: &Filing, path: P) -> Result<(), StorageError> {
    let path = path.as_ref();
    let debug_html = annotate(filing.markup(), &section_markers(filing));

    let mut file = File::create(path)?;
    file.write_all(debug_html.as_bytes())?;

    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}
