// src/extractors/normalize.rs
use serde::{Deserialize, Serialize};

/// Ordered literal `(target, replacement)` pairs applied to raw markup before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizationRules {
    pairs: Vec<(String, String)>,
}

impl NormalizationRules {
    pub fn new<T, R>(pairs: impl IntoIterator<Item = (T, R)>) -> Self
    where
        T: Into<String>,
        R: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(target, replacement)| (target.into(), replacement.into()))
                .collect(),
        }
    }

    /// Appends a rule; it runs after the existing ones.
    pub fn with(mut self, target: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.pairs.push((target.into(), replacement.into()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl Default for NormalizationRules {
    /// Non-breaking spaces and curly apostrophes, both as entities and as literal characters.
    fn default() -> Self {
        Self::new([
            ("&#160;", " "),
            ("&nbsp;", " "),
            ("&#xa0;", " "),
            ("\u{a0}", " "),
            ("&#8217;", "'"),
            ("&rsquo;", "'"),
            ("&#x2019;", "'"),
            ("\u{2019}", "'"),
        ])
    }
}

/// Applies every rule as a plain substring replacement, in order.
pub fn normalize(markup: &str, rules: &NormalizationRules) -> String {
    rules
        .pairs()
        .iter()
        .filter(|(target, _)| !target.is_empty())
        .fold(markup.to_string(), |text, (target, replacement)| {
            if text.contains(target.as_str()) {
                text.replace(target.as_str(), replacement)
            } else {
                text
            }
        })
}
