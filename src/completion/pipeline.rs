//! The per-keystroke completion pipeline: resolve the context, pick the
//! applicable sources, gather candidates (through the cache for remote
//! sources), and prefix-filter by the word in progress.
//!
//! Nothing here returns an error: unresolvable input degrades to the root
//! context, failed lookups to an empty candidate list.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::engine::ResourceLookup;
use crate::registry::CatalogFetch;

use super::sources::{
    ports_to_suggestions, resources_to_suggestions, search_hits_to_suggestions, select_sources,
    StaticTable, SuggestionSource,
};
use super::{filter_prefix, Catalog, ContextResolver, Suggestion, SuggestionCache};

/// Default number of hits requested from image search.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
/// Default page size for the Hub default catalog.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Process-wide completion pipeline. One instance is shared between the
/// editor's completer and the background prefetch task.
pub struct CompletionPipeline {
    catalog: Arc<Catalog>,
    cache: Arc<SuggestionCache>,
    engine: Arc<dyn ResourceLookup>,
    registry: Arc<dyn CatalogFetch>,
    resolver: Mutex<ContextResolver>,
    search_limit: usize,
    page_size: usize,
}

impl CompletionPipeline {
    pub fn new(
        catalog: Arc<Catalog>,
        cache: Arc<SuggestionCache>,
        engine: Arc<dyn ResourceLookup>,
        registry: Arc<dyn CatalogFetch>,
    ) -> Self {
        Self {
            catalog,
            cache,
            engine,
            registry,
            resolver: Mutex::new(ContextResolver::new()),
            search_limit: DEFAULT_SEARCH_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_limits(mut self, search_limit: usize, page_size: usize) -> Self {
        self.search_limit = search_limit;
        self.page_size = page_size;
        self
    }

    /// Run the pipeline for one edit event.
    pub async fn complete(&self, line: &str, pos: usize) -> Vec<Suggestion> {
        let ctx = self.resolver.lock().resolve(&self.catalog, line, pos);
        let sources = select_sources(&ctx, &self.catalog);
        trace!(?ctx.command, ?ctx.subcommand, word = %ctx.word, ?sources, "completion event");

        let mut candidates = Vec::new();
        for source in &sources {
            candidates.extend(self.gather(source).await);
        }
        filter_prefix(candidates, &ctx.word)
    }

    /// Warm the blank-query Hub entry so the common case is hot before the
    /// user ever reaches an image argument.
    pub async fn prewarm(&self) {
        let _ = self.gather(&SuggestionSource::RemoteCatalogDefault).await;
    }

    async fn gather(&self, source: &SuggestionSource) -> Vec<Suggestion> {
        match source {
            SuggestionSource::Static(table) => match table {
                StaticTable::Root => self.catalog.root_suggestions(),
                StaticTable::Subcommands(cmd) => self.catalog.subcommands(cmd),
                StaticTable::Flags(cmd) => self.catalog.flags(cmd),
                StaticTable::CommandTable(cmd) => self.catalog.command_table(cmd),
            },
            SuggestionSource::LocalResource { kind, all } => {
                resources_to_suggestions(self.engine.list_resources(*kind, *all).await)
            }
            SuggestionSource::ExposedPorts => {
                ports_to_suggestions(self.engine.exposed_ports().await)
            }
            SuggestionSource::RemoteSearch(query) => {
                let key = source
                    .cache_key()
                    .unwrap_or_else(|| format!("search:{query}"));
                let engine = Arc::clone(&self.engine);
                let query = query.clone();
                let limit = self.search_limit;
                self.cache
                    .get_or_fetch(&key, move || async move {
                        search_hits_to_suggestions(engine.search_images(&query, limit).await)
                    })
                    .await
            }
            SuggestionSource::RemoteCatalogDefault => {
                let key = source
                    .cache_key()
                    .unwrap_or_else(|| "catalog:default".to_string());
                let registry = Arc::clone(&self.registry);
                let page_size = self.page_size;
                self.cache
                    .get_or_fetch(&key, move || async move {
                        search_hits_to_suggestions(
                            registry.fetch_default_images(page_size).await,
                        )
                    })
                    .await
            }
        }
    }
}
