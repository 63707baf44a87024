use tracing::{info, warn};

use crate::anchors::BatchView;
use crate::asset::Asset;
use crate::catalog::Catalog;
use crate::classifier::{BatchClassifier, BatchSummary, DispatchMode, DEFAULT_LOG_CAPACITY};
use crate::decision::decide;
use crate::error::CatalogError;
use crate::filter::SearchFilter;
use crate::interpolation::{interpolate, InterpolationMethod, Interpolations};
use crate::resolver::TimezoneResolver;

pub const DEFAULT_PAGE_SIZE: u32 = 250;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub filter: SearchFilter,
    pub page_size: u32,
    /// `None` disables interpolation entirely.
    pub interpolation: Option<InterpolationMethod>,
    pub mode: DispatchMode,
    pub log_capacity: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            filter: SearchFilter::default(),
            page_size: DEFAULT_PAGE_SIZE,
            interpolation: None,
            mode: DispatchMode::DryRun,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchedBatch {
    /// Assets in arrival order.
    pub assets: Vec<Asset>,
    pub pages: u32,
    /// Set when pagination stopped on a failure; `assets` keeps what arrived
    /// before it.
    pub fetch_error: Option<CatalogError>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: BatchSummary,
    pub estimated_total: Option<u64>,
    pub pages: u32,
    pub fetch_error: Option<CatalogError>,
    pub anchors: usize,
    pub interpolated: usize,
}

/// Fetches every page matching `filter`, one request at a time.
///
/// Stops on an empty page, a short page, or the first failure.
pub async fn fetch_batch(catalog: &dyn Catalog, filter: &SearchFilter, page_size: u32) -> FetchedBatch {
    let size = page_size.max(1);
    let mut assets = Vec::new();
    let mut pages = 0;
    let mut page = 1;

    let fetch_error = loop {
        match catalog.list_assets(filter, page, size).await {
            Ok(items) => {
                if items.is_empty() {
                    break None;
                }
                pages += 1;
                let last_page = items.len() < size as usize;
                info!(page, received = items.len(), "fetched page");
                assets.extend(items);
                if last_page {
                    break None;
                }
                page += 1;
            }
            Err(err) => {
                warn!(page, error = %err, kept = assets.len(), "fetch failed; processing assets already retrieved");
                break Some(err);
            }
        }
    };

    FetchedBatch {
        assets,
        pages,
        fetch_error,
    }
}

/// Decides and classifies every asset of an already-fetched batch, in
/// arrival order.
pub async fn classify_batch(
    assets: &[Asset],
    catalog: &dyn Catalog,
    resolver: &dyn TimezoneResolver,
    interpolation: Option<InterpolationMethod>,
    mode: DispatchMode,
    log_capacity: usize,
) -> (BatchSummary, BatchView, Interpolations) {
    let view = BatchView::build(assets);
    let interpolations = match interpolation {
        Some(method) => interpolate(&view, method),
        None => Interpolations::default(),
    };

    let mut classifier = BatchClassifier::new(mode, log_capacity);
    for (idx, asset) in assets.iter().enumerate() {
        let decision = decide(asset, interpolations.get(idx), resolver);
        classifier.classify(asset, decision, catalog).await;
    }

    (classifier.finish(), view, interpolations)
}

/// Runs one full correction pass. Never fails as a whole: fetch problems are
/// reported in [`RunReport::fetch_error`], per-asset problems in the tallies.
pub async fn run(
    catalog: &dyn Catalog,
    resolver: &dyn TimezoneResolver,
    options: &RunOptions,
) -> RunReport {
    let estimated_total = catalog.count_assets(&options.filter).await;
    match estimated_total {
        Some(total) => info!(total, mode = %options.mode, "estimated workload"),
        None => info!(mode = %options.mode, "workload size unknown"),
    }

    let batch = fetch_batch(catalog, &options.filter, options.page_size).await;

    let (summary, view, interpolations) = classify_batch(
        &batch.assets,
        catalog,
        resolver,
        options.interpolation,
        options.mode,
        options.log_capacity,
    )
    .await;

    info!(
        total = summary.tally.total(),
        updated = summary.tally.updated,
        already_correct = summary.tally.already_correct,
        skipped = summary.tally.skipped,
        errors = summary.tally.errors,
        "batch complete"
    );

    RunReport {
        summary,
        estimated_total,
        pages: batch.pages,
        fetch_error: batch.fetch_error,
        anchors: view.anchors().len(),
        interpolated: interpolations.len(),
    }
}
