//! Context-aware completion engine.
//!
//! The pipeline runs once per edit event: resolve the cursor context,
//! pick the suggestion sources that apply, fetch (through the cache for
//! anything remote), then prefix-filter by the word in progress.

mod cache;
mod catalog;
mod context;
mod filter;
mod pipeline;
mod sources;

pub use cache::{SuggestionCache, DEFAULT_PURGE_AFTER, DEFAULT_TTL};
pub use catalog::{Catalog, CatalogError};
pub use context::{CompletionContext, ContextResolver};
pub use filter::filter_prefix;
pub use pipeline::CompletionPipeline;
pub use sources::{select_sources, StaticTable, SuggestionSource};

use serde::{Deserialize, Serialize};

/// A candidate completion: the literal token to insert plus a one-line
/// description shown next to it in the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub description: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
        }
    }
}
