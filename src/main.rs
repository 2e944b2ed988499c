//! Dockhand - interactive docker shell with context-aware autocompletion.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dockhand::cli::{print_banner, Repl};
use dockhand::completion::{
    Catalog, CompletionPipeline, SuggestionCache, DEFAULT_PURGE_AFTER,
};
use dockhand::engine::{EngineClient, ResourceLookup};
use dockhand::registry::{CatalogFetch, HubClient};

/// Dockhand - an interactive docker prompt
#[derive(Parser, Debug)]
#[command(name = "dockhand")]
#[command(version, long_about = None)]
pub struct Args {
    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Enable verbose logging (equivalent to RUST_LOG=trace)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Skip pre-warming the Docker Hub default catalog at startup
    #[arg(long)]
    pub no_prefetch: bool,

    /// Maximum hits requested from image search
    #[arg(long, default_value_t = 10)]
    pub search_limit: usize,

    /// Page size for the Docker Hub default catalog
    #[arg(long, default_value_t = 10)]
    pub page_size: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "trace"
    } else if args.debug {
        "debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let catalog = Arc::new(Catalog::load()?);
    let engine = EngineClient::discover()?;
    let binary = engine.binary().clone();

    // The shell is useless without a reachable engine; this is the one
    // fatal failure in the system.
    let engine_version = runtime.block_on(engine.ping()).map_err(|err| {
        anyhow::anyhow!("couldn't check docker status, make sure docker is running: {err}")
    })?;
    tracing::info!(%engine_version, "engine reachable");

    let cache = Arc::new(SuggestionCache::new());
    let registry = Arc::new(HubClient::new()?);
    let pipeline = Arc::new(
        CompletionPipeline::new(
            Arc::clone(&catalog),
            Arc::clone(&cache),
            Arc::new(engine) as Arc<dyn ResourceLookup>,
            registry as Arc<dyn CatalogFetch>,
        )
        .with_limits(args.search_limit, args.page_size),
    );

    // Warm the blank-query Hub entry in the background so the first image
    // completion is already hot.
    if !args.no_prefetch {
        let pipeline = Arc::clone(&pipeline);
        runtime.spawn(async move {
            pipeline.prewarm().await;
            tracing::debug!("default catalog prefetched");
        });
    }

    // Lazy eviction of entries well past their TTL.
    {
        let cache = Arc::clone(&cache);
        runtime.spawn(async move {
            let mut interval = tokio::time::interval(DEFAULT_PURGE_AFTER);
            interval.tick().await;
            loop {
                interval.tick().await;
                cache.sweep();
            }
        });
    }

    print_banner(&engine_version);
    let mut repl = Repl::new(
        pipeline,
        catalog,
        runtime.handle().clone(),
        binary,
        &engine_version,
    );
    repl.run()
}
