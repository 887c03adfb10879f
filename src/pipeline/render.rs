//! Render client seam: hand a print-ready page to the engine, persist the PDF.
//!
//! The engine itself is a black box behind [`RenderEngine`]. Production code
//! uses [`crate::pipeline::cdp::CdpEngine`]; tests plug in an in-process fake
//! so the batch driver can be exercised without a browser.
//!
//! ## Cleanup
//!
//! [`render_document`] takes the [`TrimmedDocument`] by value. The sibling
//! file is deleted when that value drops at the end of the call, so it is
//! gone by the time the function returns whatever the engine did.

use crate::error::DocumentError;
use crate::pipeline::trim::TrimmedDocument;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Rendered PDF bytes for one document. Consumed by [`PdfArtifact::persist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfArtifact {
    bytes: Vec<u8>,
}

impl PdfArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the PDF to `dest`.
    pub async fn persist(self, dest: &Path) -> Result<(), DocumentError> {
        tokio::fs::write(dest, &self.bytes)
            .await
            .map_err(|e| DocumentError::PersistFailed {
                path: dest.to_path_buf(),
                detail: e.to_string(),
            })
    }
}

/// Anything that can turn a document URL into PDF bytes.
///
/// Calls are issued strictly one at a time by the batch driver.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Render the page at `url` (always a `file://` URL).
    async fn render(&self, url: &Url) -> Result<PdfArtifact, DocumentError>;
}

/// `file://` URL for an absolute path.
pub fn file_url(path: &Path) -> Result<Url, DocumentError> {
    Url::from_file_path(path).map_err(|()| DocumentError::RenderFailed {
        url: path.display().to_string(),
        detail: "not an absolute path".to_string(),
    })
}

/// Render one print-ready document, bounded by `timeout`.
///
/// The print-ready file is removed before this returns, on every path.
pub async fn render_document<E: RenderEngine + ?Sized>(
    engine: &E,
    document: TrimmedDocument,
    timeout: Duration,
) -> Result<PdfArtifact, DocumentError> {
    let url = file_url(document.path())?;
    debug!("Submitting {}", url);

    let result = match tokio::time::timeout(timeout, engine.render(&url)).await {
        Ok(result) => result,
        Err(_) => Err(DocumentError::RenderTimeout {
            url: url.to_string(),
            secs: timeout.as_secs(),
        }),
    };

    drop(document);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;
    use crate::pipeline::trim::write_trimmed;
    use std::sync::Mutex;

    struct RecordingEngine {
        seen: Mutex<Vec<Url>>,
        fail: bool,
    }

    #[async_trait]
    impl RenderEngine for RecordingEngine {
        async fn render(&self, url: &Url) -> Result<PdfArtifact, DocumentError> {
            self.seen.lock().unwrap().push(url.clone());
            // The print-ready copy must still be on disk while rendering.
            assert!(url.to_file_path().unwrap().exists());
            if self.fail {
                Err(DocumentError::RenderFailed {
                    url: url.to_string(),
                    detail: "boom".into(),
                })
            } else {
                Ok(PdfArtifact::new(b"%PDF-1.4".to_vec()))
            }
        }
    }

    struct StalledEngine;

    #[async_trait]
    impl RenderEngine for StalledEngine {
        async fn render(&self, _url: &Url) -> Result<PdfArtifact, DocumentError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(PdfArtifact::new(Vec::new()))
        }
    }

    async fn trimmed_fixture(dir: &Path) -> TrimmedDocument {
        let source = dir.join("page.html");
        std::fs::write(&source, "<p>hi</p>").unwrap();
        let config = ConversionConfig::builder().docs_root(dir).build().unwrap();
        write_trimmed(&source, &config).await.unwrap()
    }

    #[test]
    fn file_url_requires_absolute_path() {
        assert!(file_url(Path::new("relative/page.html")).is_err());
        let url = file_url(Path::new("/docs/My Page.html")).unwrap();
        assert_eq!(url.as_str(), "file:///docs/My%20Page.html");
    }

    #[tokio::test]
    async fn success_submits_print_ready_copy_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let doc = trimmed_fixture(dir.path()).await;
        let sibling = doc.path().to_path_buf();
        let engine = RecordingEngine {
            seen: Mutex::new(Vec::new()),
            fail: false,
        };

        let pdf = render_document(&engine, doc, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(pdf.len(), 8);
        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].as_str().ends_with("page.print-ready.html"));
        assert!(!sibling.exists());
    }

    #[tokio::test]
    async fn failure_still_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let doc = trimmed_fixture(dir.path()).await;
        let sibling = doc.path().to_path_buf();
        let engine = RecordingEngine {
            seen: Mutex::new(Vec::new()),
            fail: true,
        };

        let err = render_document(&engine, doc, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentError::RenderFailed { .. }));
        assert!(!sibling.exists());
    }

    #[tokio::test]
    async fn timeout_is_reported_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let doc = trimmed_fixture(dir.path()).await;
        let sibling = doc.path().to_path_buf();

        let err = render_document(&StalledEngine, doc, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentError::RenderTimeout { secs: 1, .. }));
        assert!(!sibling.exists());
    }

    #[tokio::test]
    async fn persist_writes_bytes_and_reports_bad_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("0001.page.pdf");
        PdfArtifact::new(b"%PDF-1.7".to_vec())
            .persist(&dest)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.7");

        let err = PdfArtifact::new(b"x".to_vec())
            .persist(&dir.path().join("missing/0002.x.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::PersistFailed { .. }));
    }
}
