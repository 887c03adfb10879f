//! Progress-callback trait for per-document conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the batch driver walks each category's manifest.
//!
//! Documents are processed strictly one after another, so events for a
//! category always arrive in manifest order:
//! `on_category_start`, then for each document `on_document_start` followed
//! by exactly one of `on_document_complete` / `on_document_error`, then
//! `on_category_complete`.
//!
//! # Example
//!
//! ```rust
//! use edgequake_html2pdf::{Category, ConversionConfig, ConversionProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, _category: Category, index: usize, total: usize, output: &Path) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} → {}", index + 1, total, output.display());
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .docs_root("/docs")
//!     .progress_callback(Arc::new(CountingCallback { written: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::config::Category;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch driver as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is always the 0-based manifest index.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first document of `category`.
    fn on_category_start(&self, category: Category, total: usize) {
        let _ = (category, total);
    }

    /// Called before a document is trimmed and submitted.
    fn on_document_start(&self, category: Category, index: usize, total: usize, source: &Path) {
        let _ = (category, index, total, source);
    }

    /// Called after the PDF has been written to its output slot.
    fn on_document_complete(&self, category: Category, index: usize, total: usize, output: &Path) {
        let _ = (category, index, total, output);
    }

    /// Called when any stage fails for a document. The batch continues.
    fn on_document_error(&self, category: Category, index: usize, total: usize, error: &str) {
        let _ = (category, index, total, error);
    }

    /// Called once after every document of `category` has been attempted.
    fn on_category_complete(&self, category: Category, total: usize, success_count: usize) {
        let _ = (category, total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
