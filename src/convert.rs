//! Batch driver and top-level entry points.
//!
//! ```text
//! prepare_workspace ──▶ EngineHandle::launch
//!                           │
//!     for category in [manual, script]:
//!         for (i, doc) in manifest:        (strictly sequential)
//!             trim ──▶ render ──▶ persist  → <root>/<category>/NNNN.<name>.pdf
//!                           │
//!                      EngineHandle::stop
//! ```
//!
//! Any failure inside one document is caught at the document boundary,
//! logged with the offending path, recorded in its [`DocumentResult`], and
//! the loop moves on to `i + 1`. Indices come from manifest position, so a
//! failure never shifts or reuses a later document's output slot.

use crate::config::{Category, ConversionConfig};
use crate::engine::EngineHandle;
use crate::error::{DocumentError, Html2PdfError};
use crate::output::{BatchReport, CategoryReport, DocumentResult, OutputSlot};
use crate::pipeline::input::{resolve_manifest, DocumentRef};
use crate::pipeline::render::{render_document, RenderEngine};
use crate::pipeline::trim::write_trimmed;
use crate::pipeline::workspace::prepare_workspace;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Convert both categories with a freshly launched headless Chrome.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(BatchReport)` once every document has been attempted, even if some
/// of them failed (check `report.stats.failed`).
///
/// # Errors
/// Returns `Err(Html2PdfError)` only for fatal errors, before any document
/// is processed:
/// - The output tree cannot be created
/// - Chrome cannot be found, started, or reached on its control port
pub async fn run(config: &ConversionConfig) -> Result<BatchReport, Html2PdfError> {
    prepare_workspace(config).await?;

    let engine = EngineHandle::launch(config).await?;
    let report = convert_all(engine.engine(), config).await;
    engine.stop().await;

    Ok(report)
}

/// Like [`run`], but with a caller-supplied engine whose lifecycle the
/// caller owns.
pub async fn run_with_engine<E: RenderEngine + ?Sized>(
    engine: &E,
    config: &ConversionConfig,
) -> Result<BatchReport, Html2PdfError> {
    prepare_workspace(config).await?;
    Ok(convert_all(engine, config).await)
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(config: &ConversionConfig) -> Result<BatchReport, Html2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Html2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(config))
}

/// Process every category in order against an already running engine.
async fn convert_all<E: RenderEngine + ?Sized>(
    engine: &E,
    config: &ConversionConfig,
) -> BatchReport {
    let total_start = Instant::now();
    let mut categories = Vec::with_capacity(Category::ALL.len());

    for category in Category::ALL {
        let documents = resolve_manifest(&config.docs_root, config.manifests.get(category));
        info!(
            "Processing a total of {} {} pages, hang tight!",
            documents.len(),
            category
        );
        let output_dir = config.category_dir(category);
        categories.push(convert_category(engine, config, category, &output_dir, &documents).await);
    }

    let report = BatchReport::new(categories, total_start.elapsed().as_millis() as u64);
    info!(
        "Batch complete: {}/{} converted, {} failed, {} untrimmed, {}ms total",
        report.stats.converted,
        report.stats.total_documents,
        report.stats.failed,
        report.stats.untrimmed,
        report.stats.total_duration_ms
    );
    report
}

/// Convert one category's documents into `output_dir`, one at a time.
///
/// Never aborts early: every entry of `documents` yields exactly one
/// [`DocumentResult`], in order.
pub async fn convert_category<E: RenderEngine + ?Sized>(
    engine: &E,
    config: &ConversionConfig,
    category: Category,
    output_dir: &Path,
    documents: &[DocumentRef],
) -> CategoryReport {
    let total = documents.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_category_start(category, total);
    }

    let mut results = Vec::with_capacity(total);
    for (index, doc) in documents.iter().enumerate() {
        info!("Converting {}", doc.path().display());
        if let Some(ref cb) = config.progress_callback {
            cb.on_document_start(category, index, total, doc.path());
        }

        let result = convert_document(engine, config, output_dir, index, doc).await;

        match (&result.error, &result.output) {
            (None, Some(output)) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_complete(category, index, total, output);
                }
            }
            (Some(e), _) => {
                error!("{}", e);
                error!("Failed to convert page {}", doc.path().display());
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_error(category, index, total, &e.to_string());
                }
            }
            (None, None) => {}
        }

        results.push(result);
    }

    let report = CategoryReport {
        category,
        output_dir: output_dir.to_path_buf(),
        documents: results,
    };
    if let Some(ref cb) = config.progress_callback {
        cb.on_category_complete(category, total, report.converted());
    }
    report
}

/// Trim, render and persist a single document.
///
/// Always returns a `DocumentResult`; errors are stored in it rather than
/// propagated so one bad page can't abort the category.
pub async fn convert_document<E: RenderEngine + ?Sized>(
    engine: &E,
    config: &ConversionConfig,
    output_dir: &Path,
    index: usize,
    doc: &DocumentRef,
) -> DocumentResult {
    let start = Instant::now();
    let slot = OutputSlot::new(output_dir, index, doc.path());
    let timeout = Duration::from_secs(config.render_timeout_secs);
    let mut missing_markers = Vec::new();

    let outcome: Result<(), DocumentError> = async {
        let trimmed = write_trimmed(doc.path(), config).await?;
        missing_markers = trimmed.missing().to_vec();

        let pdf = render_document(engine, trimmed, timeout).await?;
        info!("Writing converted {}", slot.path().display());
        pdf.persist(slot.path()).await
    }
    .await;

    let (output, error) = match outcome {
        Ok(()) => (Some(slot.path().to_path_buf()), None),
        Err(e) => (None, Some(e)),
    };

    DocumentResult {
        index,
        source: doc.path().to_path_buf(),
        output,
        missing_markers,
        duration_ms: start.elapsed().as_millis() as u64,
        error,
    }
}
