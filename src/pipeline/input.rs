//! Input resolution: turn manifest entries into absolute document references.
//!
//! Manifests are JSON arrays of paths relative to the documentation root,
//! exactly as they appear in the shipped docs tree (`Manual/index.html`,
//! `ScriptReference/Rigidbody.html`, …). The engine is handed `file://` URLs,
//! which only exist for absolute paths, so references are made absolute once
//! here and never change afterwards.

use crate::error::Html2PdfError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Absolute path to one source HTML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    path: PathBuf,
}

impl DocumentRef {
    /// Join `relative` onto `root`, making the result absolute against the
    /// current directory when `root` is relative.
    pub fn resolve(root: &Path, relative: &str) -> Self {
        let joined = root.join(relative.trim_start_matches(['/', '\\']));
        let path = std::path::absolute(&joined).unwrap_or(joined);
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolve a whole manifest, preserving order.
pub fn resolve_manifest(root: &Path, relative: &[String]) -> Vec<DocumentRef> {
    relative
        .iter()
        .map(|rel| DocumentRef::resolve(root, rel))
        .collect()
}

/// Read a manifest file: a JSON array of relative path strings.
pub fn load_manifest(path: &Path) -> Result<Vec<String>, Html2PdfError> {
    let text = std::fs::read_to_string(path).map_err(|e| Html2PdfError::ManifestReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let entries: Vec<String> =
        serde_json::from_str(&text).map_err(|e| Html2PdfError::ManifestReadFailed {
            path: path.to_path_buf(),
            reason: format!("expected a JSON array of strings: {e}"),
        })?;

    debug!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_joins_root_and_relative() {
        let r = DocumentRef::resolve(Path::new("/docs/en"), "Manual/index.html");
        assert_eq!(r.path(), Path::new("/docs/en/Manual/index.html"));
    }

    #[test]
    fn resolve_never_escapes_root_via_leading_slash() {
        let r = DocumentRef::resolve(Path::new("/docs/en"), "/Manual/index.html");
        assert_eq!(r.path(), Path::new("/docs/en/Manual/index.html"));
    }

    #[test]
    fn resolve_makes_relative_roots_absolute() {
        let r = DocumentRef::resolve(Path::new("docs"), "a/1.html");
        assert!(r.path().is_absolute());
        assert!(r.path().ends_with("docs/a/1.html"));
    }

    #[test]
    fn resolve_manifest_keeps_order() {
        let refs = resolve_manifest(
            Path::new("/d"),
            &["z.html".to_string(), "a.html".to_string(), "m.html".to_string()],
        );
        let names: Vec<_> = refs
            .iter()
            .map(|r| r.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["z.html", "a.html", "m.html"]);
    }

    #[test]
    fn load_manifest_reads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("pages.json");
        std::fs::write(&p, r#"["Manual/a.html", "Manual/b.html"]"#).unwrap();
        assert_eq!(
            load_manifest(&p).unwrap(),
            vec!["Manual/a.html".to_string(), "Manual/b.html".to_string()]
        );
    }

    #[test]
    fn load_manifest_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("pages.json");
        std::fs::write(&p, r#"{"pages": []}"#).unwrap();
        let err = load_manifest(&p).unwrap_err();
        assert!(matches!(err, Html2PdfError::ManifestReadFailed { .. }));
        assert!(err.to_string().contains("pages.json"));
    }

    #[test]
    fn load_manifest_reports_missing_file() {
        let err = load_manifest(Path::new("/no/such/scripts.json")).unwrap_err();
        assert!(err.to_string().contains("scripts.json"));
    }
}
