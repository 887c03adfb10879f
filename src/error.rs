//! Error types for the edgequake-html2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Html2PdfError`] — **Fatal**: the run cannot proceed at all (output
//!   tree cannot be created, manifest unreadable, browser will not start).
//!   Returned as `Err(Html2PdfError)` from the top-level `run*` functions
//!   before any document is processed.
//!
//! * [`DocumentError`] — **Non-fatal**: a single document failed (unreadable
//!   source, engine unreachable, PDF write failed) but the rest of the batch
//!   is unaffected. Stored inside [`crate::output::DocumentResult`] so the
//!   caller sees exactly which manifest entries produced no output.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-html2pdf library.
///
/// Document-level failures use [`DocumentError`] and are stored in
/// [`crate::output::DocumentResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Html2PdfError {
    // ── Workspace errors ──────────────────────────────────────────────────
    /// The output root or one of its category directories could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    WorkspaceCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Manifest errors ───────────────────────────────────────────────────
    /// A manifest file could not be read or is not a JSON array of strings.
    #[error("Failed to load manifest '{path}': {reason}")]
    ManifestReadFailed { path: PathBuf, reason: String },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// No browser executable could be located.
    #[error("Chrome not found: {0}")]
    ChromeNotFound(String),

    /// The browser process could not be spawned, or exited during startup.
    #[error("Failed to launch Chrome '{path}': {reason}")]
    EngineLaunchFailed { path: PathBuf, reason: String },

    /// The browser started but never answered on its control port.
    #[error("Chrome did not open control port {port} within {secs}s\nIncrease --startup-timeout or check that the port is free.")]
    EngineNotReady { port: u16, secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document.
///
/// The batch continues with the next manifest entry; the failing entry keeps
/// its index so later output slots are unaffected.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The source HTML could not be read.
    #[error("{path}: failed to read source: {detail}")]
    ReadFailed { path: PathBuf, detail: String },

    /// The print-ready sibling file could not be written.
    #[error("{path}: failed to write print-ready copy: {detail}")]
    TrimWriteFailed { path: PathBuf, detail: String },

    /// The rendering engine could not be reached on its control port.
    #[error("rendering engine unreachable on port {port}: {detail}")]
    EngineUnreachable { port: u16, detail: String },

    /// The engine accepted the document but rendering failed.
    #[error("{url}: render failed: {detail}")]
    RenderFailed { url: String, detail: String },

    /// Rendering did not finish within the configured timeout.
    #[error("{url}: render timed out after {secs}s")]
    RenderTimeout { url: String, secs: u64 },

    /// The rendered PDF could not be written to its output slot.
    #[error("{path}: failed to write PDF: {detail}")]
    PersistFailed { path: PathBuf, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_error_names_path() {
        let e = Html2PdfError::WorkspaceCreateFailed {
            path: PathBuf::from("/out/manual"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/out/manual"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }

    #[test]
    fn engine_not_ready_display() {
        let e = Html2PdfError::EngineNotReady { port: 9222, secs: 30 };
        assert!(e.to_string().contains("9222"));
        assert!(e.to_string().contains("30s"));
    }

    #[test]
    fn engine_unreachable_display() {
        let e = DocumentError::EngineUnreachable {
            port: 9222,
            detail: "connection refused".into(),
        };
        assert!(e.to_string().contains("9222"));
        assert!(e.to_string().contains("connection refused"));
    }

    #[test]
    fn render_timeout_display() {
        let e = DocumentError::RenderTimeout {
            url: "file:///docs/a.print-ready.html".into(),
            secs: 120,
        };
        assert!(e.to_string().contains("a.print-ready.html"));
        assert!(e.to_string().contains("120s"));
    }

    #[test]
    fn document_error_roundtrips_through_json() {
        let e = DocumentError::PersistFailed {
            path: PathBuf::from("/out/manual/0001.a.pdf"),
            detail: "disk full".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("PersistFailed"));
        let back: DocumentError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_string(), e.to_string());
    }
}
