//! Catalog command handlers for the CLI.
//!
//! Output is pretty-printed JSON on stdout; logs go to stderr.

use std::sync::Arc;
use std::time::Duration;

use tcgshop_catalog::{spawn_feed, CatalogService, Debouncer, FeedEvent, FeedHandle, SearchParams};
use tcgshop_core::{load_category_groups, AppConfig, CategoryGroups, SortOrder, StockFilter};

pub(crate) struct SearchOptions {
    pub max_pages: usize,
    /// Minimum spacing between page requests.
    pub interval: Duration,
}

fn build_service(config: &AppConfig) -> anyhow::Result<CatalogService> {
    let groups = match &config.category_groups_path {
        Some(path) => load_category_groups(path)?,
        None => CategoryGroups::builtin(),
    };
    CatalogService::from_app_config(config, Arc::new(groups))
        .map_err(|e| anyhow::anyhow!("failed to build catalog client: {e}"))
}

/// Drives a page feed until `max_pages` pages have loaded or the result set
/// is exhausted, then prints the accumulated items in display order. Page
/// requests are spaced at least `interval` apart.
///
/// # Errors
///
/// Returns an error if the client cannot be built, a page fetch fails, or the
/// feed task stops unexpectedly.
pub(crate) async fn run_search(
    config: &AppConfig,
    query: Option<String>,
    stock: &str,
    sort: SortOrder,
    options: SearchOptions,
) -> anyhow::Result<()> {
    let service = Arc::new(build_service(config)?);
    let params = SearchParams {
        search: query,
        stock: StockFilter::parse(stock),
        sort,
    };

    let (handle, mut events, task) = spawn_feed(service, params);
    let mut debouncer = Debouncer::new(options.interval);
    paced_fetch(&handle, &mut debouncer).await?;

    let mut pages = 0usize;
    while let Some(event) = events.recv().await {
        match event {
            FeedEvent::PageLoaded {
                added,
                total,
                has_more,
                ..
            } => {
                pages += 1;
                tracing::info!(page = pages, added, total, has_more, "page loaded");
                if !has_more || pages >= options.max_pages.max(1) {
                    break;
                }
                paced_fetch(&handle, &mut debouncer).await?;
            }
            FeedEvent::FetchFailed { error, .. } => {
                anyhow::bail!("catalog page fetch failed: {error}");
            }
            FeedEvent::StaleDiscarded { .. } | FeedEvent::Reset { .. } => {}
        }
    }

    let snapshot = handle.snapshot().await?;
    drop(handle);
    task.await?;

    println!("{}", serde_json::to_string_pretty(&snapshot.items)?);
    tracing::info!(
        items = snapshot.items.len(),
        pages = snapshot.pages_loaded,
        has_more = snapshot.has_more,
        "search complete"
    );
    Ok(())
}

async fn paced_fetch(handle: &FeedHandle, debouncer: &mut Debouncer) -> anyhow::Result<()> {
    while !debouncer.ready() {
        tokio::time::sleep(debouncer.wait_time()).await;
    }
    handle.fetch_next()?;
    Ok(())
}

/// Fetches one product with inventory reconciled and prints it.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the product lookup
/// fails.
pub(crate) async fn run_product(config: &AppConfig, id: &str, stock: &str) -> anyhow::Result<()> {
    let service = build_service(config)?;
    let product = service.get_product(id, StockFilter::parse(stock)).await?;
    println!("{}", serde_json::to_string_pretty(&product)?);
    Ok(())
}
