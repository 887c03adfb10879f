//! Output naming and per-run reports.
//!
//! Output files are named by position, not by source name:
//! `<root>/<category>/NNNN.<basename>.pdf`, with `NNNN` the 1-based index in
//! the manifest, zero-padded to four digits. Sorting the directory listing
//! therefore reproduces manifest order even though source file names sort
//! differently.

use crate::config::Category;
use crate::error::DocumentError;
use crate::pipeline::trim::Marker;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Width of the zero-padded index prefix.
pub const INDEX_WIDTH: usize = 4;

/// Deterministic destination of one document's PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSlot {
    path: PathBuf,
}

impl OutputSlot {
    /// `index` is 0-based; the file name carries `index + 1`.
    pub fn new(category_dir: &Path, index: usize, source: &Path) -> Self {
        Self {
            path: category_dir.join(slot_file_name(index, source)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `0003.class-Rigidbody.pdf` for index 2 of `…/class-Rigidbody.html`.
pub fn slot_file_name(index: usize, source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = name
        .strip_suffix(".html")
        .map(str::to_string)
        .unwrap_or_else(|| {
            source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(name.clone())
        });
    format!("{:0width$}.{}.pdf", index + 1, base, width = INDEX_WIDTH)
}

/// Outcome of one manifest entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// 0-based manifest index.
    pub index: usize,
    /// Absolute source path.
    pub source: PathBuf,
    /// Written PDF, when conversion succeeded.
    pub output: Option<PathBuf>,
    /// Markers the trimmer could not find; empty means the page was trimmed.
    pub missing_markers: Vec<Marker>,
    pub duration_ms: u64,
    pub error: Option<DocumentError>,
}

impl DocumentResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// All results for one category, in manifest order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: Category,
    pub output_dir: PathBuf,
    pub documents: Vec<DocumentResult>,
}

impl CategoryReport {
    pub fn converted(&self) -> usize {
        self.documents.iter().filter(|d| d.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.documents.len() - self.converted()
    }

    /// Converted, but printed in full because a marker was missing.
    pub fn untrimmed(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.is_success() && !d.missing_markers.is_empty())
            .count()
    }
}

/// Aggregate counters over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_documents: usize,
    pub converted: usize,
    pub failed: usize,
    pub untrimmed: usize,
    pub total_duration_ms: u64,
}

/// Result of a full run: one report per category, in processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub categories: Vec<CategoryReport>,
    pub stats: BatchStats,
}

impl BatchReport {
    pub fn new(categories: Vec<CategoryReport>, total_duration_ms: u64) -> Self {
        let stats = BatchStats {
            total_documents: categories.iter().map(|c| c.documents.len()).sum(),
            converted: categories.iter().map(CategoryReport::converted).sum(),
            failed: categories.iter().map(CategoryReport::failed).sum(),
            untrimmed: categories.iter().map(CategoryReport::untrimmed).sum(),
            total_duration_ms,
        };
        Self { categories, stats }
    }

    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.category == category)
    }
}
