// src/extractors/mod.rs
pub mod anchor;
pub mod metadata;
pub mod normalize;
pub mod offsets;
pub mod render;
pub mod text;

// Re-export key extraction types for convenience
pub use anchor::{
    AlternateStrategy,
    AnchorResolver,
    LabelStrategy,
    MatchStrategy,
    ReservedStrategy,
    TitleStrategy,
};
pub use metadata::{extract_checkboxes, extract_metadata};
pub use normalize::{normalize, NormalizationRules};
pub use offsets::build_markup_index;
pub use render::{render, render_within};
pub use text::build_text;
