// src/extractors/render.rs
use scraper::{ElementRef, Html, Node};

// Subtrees whose content never reaches the output
const SKIPPED_ELEMENTS: &[&str] = &["title", "ix:header", "style", "script"];

/// Flattens a markup fragment to plain text.
///
/// Character data is copied verbatim in document order. A `tr` starts a new
/// line; a `div` starts a new line unless it sits directly in a `td`, where it
/// only adds a space, so layout tables keep their cells on one line.
pub fn render(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let mut text = String::with_capacity(fragment.len() / 2);

    // Pre-order walk: children go on top of the stack, last child pushed first
    let mut stack = vec![parsed.tree.root()];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(chars) => {
                text.push_str(&chars.text);
                continue;
            }
            Node::Element(element) => {
                let name = element.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "tr" {
                    text.push('\n');
                } else if name == "div" {
                    let in_cell = node
                        .parent()
                        .and_then(ElementRef::wrap)
                        .is_some_and(|parent| parent.value().name() == "td");
                    text.push(if in_cell { ' ' } else { '\n' });
                }
            }
            Node::Document | Node::Fragment => {}
            // Comments, doctypes and processing instructions carry no text
            _ => continue,
        }

        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
    }

    text.trim().to_string()
}

/// Like [`render`], for a fragment that starts inside the elements named by
/// `open_elements` (outermost first). Their start tags are restored ahead of
/// the fragment so table rows after the cut still parse as rows.
pub fn render_within<S: AsRef<str>>(fragment: &str, open_elements: &[S]) -> String {
    if open_elements.is_empty() {
        return render(fragment);
    }

    let mut restored: String = open_elements
        .iter()
        .map(|name| format!("<{}>", name.as_ref()))
        .collect();
    restored.push_str(fragment);
    render(&restored)
}
