//! Output tree preparation.
//!
//! Every run starts from an empty `<root>/manual` and `<root>/script`, so
//! leftovers from a previous run (including stale print-ready copies or PDFs
//! for pages that have since left a manifest) never mix with new output.

use crate::config::{Category, ConversionConfig};
use crate::error::Html2PdfError;
use tracing::debug;

/// Wipe the output root and recreate it with one directory per category.
///
/// Removal is best effort (a missing tree is the normal first-run case);
/// failing to create a directory is fatal because nothing could be written.
pub async fn prepare_workspace(config: &ConversionConfig) -> Result<(), Html2PdfError> {
    let root = &config.output_root;
    if tokio::fs::remove_dir_all(root).await.is_ok() {
        debug!("Removed previous output tree {}", root.display());
    }

    for category in Category::ALL {
        let dir = config.category_dir(category);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Html2PdfError::WorkspaceCreateFailed {
                path: dir.clone(),
                source: e,
            })?;
    }

    debug!("Prepared output tree {}", root.display());
    Ok(())
}
