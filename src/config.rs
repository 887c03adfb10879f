//! Configuration types for batch HTML-to-PDF conversion.
//!
//! Every input the pipeline needs (document root, output root, the two
//! category manifests, the engine control port, trimming markers, timeouts)
//! lives in one [`ConversionConfig`] value. It is built once at startup via
//! [`ConversionConfigBuilder`] and passed by reference into each stage; no
//! stage reads process-wide state.

use crate::error::Html2PdfError;
use crate::pipeline::trim::TrimMarkers;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Configuration for one batch run.
///
/// Built via [`ConversionConfig::builder()`].
///
/// # Example
/// ```rust
/// use edgequake_html2pdf::{Category, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .docs_root("/opt/Unity/Documentation/en")
///     .output_root("/tmp/unity-docs")
///     .manifest(Category::Manual, vec!["Manual/index.html".into()])
///     .port(9333)
///     .build()
///     .unwrap();
/// assert_eq!(config.category_dir(Category::Manual), std::path::Path::new("/tmp/unity-docs/manual"));
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Directory every manifest entry is resolved against.
    pub docs_root: PathBuf,

    /// Root of the produced tree. Wiped and recreated at the start of every
    /// run. Default: `~/unity-docs`.
    pub output_root: PathBuf,

    /// Ordered relative source paths per category.
    pub manifests: Manifests,

    /// DevTools control port the engine is bound to. Default: 9222.
    pub port: u16,

    /// Browser executable. If None, `CHROME_PATH` and then platform discovery
    /// are used.
    pub chrome_path: Option<PathBuf>,

    /// Flags appended after the fixed headless flag set.
    pub extra_flags: Vec<String>,

    /// Structural landmarks used by the trimmer.
    pub markers: TrimMarkers,

    /// Marker inserted before the extension of the print-ready sibling file.
    /// Default: `print-ready` (`page.html` → `page.print-ready.html`).
    pub trimmed_suffix: String,

    /// How long to wait for the control port after spawning the engine. Default: 30.
    pub startup_timeout_secs: u64,

    /// Upper bound for a single document render. Default: 120.
    pub render_timeout_secs: u64,

    /// Optional per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            docs_root: PathBuf::new(),
            output_root: default_output_root(),
            manifests: Manifests::default(),
            port: chrome_auto::DEFAULT_DEBUG_PORT,
            chrome_path: None,
            extra_flags: Vec::new(),
            markers: TrimMarkers::default(),
            trimmed_suffix: "print-ready".to_string(),
            startup_timeout_secs: 30,
            render_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("docs_root", &self.docs_root)
            .field("output_root", &self.output_root)
            .field("manual_documents", &self.manifests.manual.len())
            .field("script_documents", &self.manifests.script.len())
            .field("port", &self.port)
            .field("chrome_path", &self.chrome_path)
            .field("extra_flags", &self.extra_flags)
            .field("markers", &self.markers)
            .field("trimmed_suffix", &self.trimmed_suffix)
            .field("startup_timeout_secs", &self.startup_timeout_secs)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Output subdirectory for `category` under [`Self::output_root`].
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.output_root.join(category.dir_name())
    }
}

/// `~/unity-docs`, falling back to the temp dir when there is no home.
pub fn default_output_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("unity-docs")
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn docs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.docs_root = root.into();
        self
    }

    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output_root = root.into();
        self
    }

    pub fn manifest(mut self, category: Category, documents: Vec<String>) -> Self {
        *self.config.manifests.get_mut(category) = documents;
        self
    }

    pub fn manifests(mut self, manifests: Manifests) -> Self {
        self.config.manifests = manifests;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn extra_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.extra_flags.push(flag.into());
        self
    }

    pub fn markers(mut self, markers: TrimMarkers) -> Self {
        self.config.markers = markers;
        self
    }

    pub fn trimmed_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.trimmed_suffix = suffix.into();
        self
    }

    pub fn startup_timeout_secs(mut self, secs: u64) -> Self {
        self.config.startup_timeout_secs = secs.max(1);
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Html2PdfError> {
        let c = &self.config;
        if c.docs_root.as_os_str().is_empty() {
            return Err(Html2PdfError::InvalidConfig(
                "A document root directory is required".into(),
            ));
        }
        if c.port == 0 {
            return Err(Html2PdfError::InvalidConfig(
                "Control port must be non-zero".into(),
            ));
        }
        if c.trimmed_suffix.is_empty() || c.trimmed_suffix.contains(['/', '\\']) {
            return Err(Html2PdfError::InvalidConfig(format!(
                "Print-ready suffix must be a plain file-name fragment, got {:?}",
                c.trimmed_suffix
            )));
        }
        c.markers.validate()?;
        Ok(self.config)
    }
}

// ── Categories ───────────────────────────────────────────────────────────

/// One of the two fixed document groups.
///
/// Each category has its own manifest and its own output subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Manual pages, written to `<root>/manual/`.
    Manual,
    /// Script reference pages, written to `<root>/script/`.
    Script,
}

impl Category {
    /// Processing order of a full run.
    pub const ALL: [Category; 2] = [Category::Manual, Category::Script];

    /// Output subdirectory name.
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Manual => "manual",
            Category::Script => "script",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.dir_name())
    }
}

/// Ordered relative source paths for both categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifests {
    pub manual: Vec<String>,
    pub script: Vec<String>,
}

impl Manifests {
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Manual => &self.manual,
            Category::Script => &self.script,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Manual => &mut self.manual,
            Category::Script => &mut self.script,
        }
    }

    /// Total number of documents across both categories.
    pub fn len(&self) -> usize {
        self.manual.len() + self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load both manifests from JSON files (arrays of relative paths).
    pub fn load(manual: &Path, script: &Path) -> Result<Self, Html2PdfError> {
        Ok(Self {
            manual: crate::pipeline::input::load_manifest(manual)?,
            script: crate::pipeline::input::load_manifest(script)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_conventions() {
        let c = ConversionConfig::default();
        assert_eq!(c.port, 9222);
        assert_eq!(c.trimmed_suffix, "print-ready");
        assert!(c.output_root.ends_with("unity-docs"));
        assert!(c.manifests.is_empty());
    }

    #[test]
    fn build_requires_docs_root() {
        let err = ConversionConfig::builder().build().unwrap_err();
        assert!(matches!(err, Html2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn build_rejects_port_zero() {
        let err = ConversionConfig::builder()
            .docs_root("/docs")
            .port(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn build_rejects_path_like_suffix() {
        let err = ConversionConfig::builder()
            .docs_root("/docs")
            .trimmed_suffix("../x")
            .build()
            .unwrap_err();
        assert!(matches!(err, Html2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn timeouts_are_clamped_to_one_second() {
        let c = ConversionConfig::builder()
            .docs_root("/docs")
            .startup_timeout_secs(0)
            .render_timeout_secs(0)
            .build()
            .unwrap();
        assert_eq!(c.startup_timeout_secs, 1);
        assert_eq!(c.render_timeout_secs, 1);
    }

    #[test]
    fn category_dirs_hang_off_output_root() {
        let c = ConversionConfig::builder()
            .docs_root("/docs")
            .output_root("/out")
            .build()
            .unwrap();
        assert_eq!(c.category_dir(Category::Manual), PathBuf::from("/out/manual"));
        assert_eq!(c.category_dir(Category::Script), PathBuf::from("/out/script"));
    }

    #[test]
    fn manifests_are_kept_per_category() {
        let c = ConversionConfig::builder()
            .docs_root("/docs")
            .manifest(Category::Manual, vec!["a/1.html".into(), "a/2.html".into()])
            .manifest(Category::Script, vec!["s/1.html".into()])
            .build()
            .unwrap();
        assert_eq!(c.manifests.get(Category::Manual).len(), 2);
        assert_eq!(c.manifests.get(Category::Script), ["s/1.html".to_string()]);
        assert_eq!(c.manifests.len(), 3);
    }

    #[test]
    fn category_order_is_manual_then_script() {
        assert_eq!(Category::ALL, [Category::Manual, Category::Script]);
        assert_eq!(Category::Script.to_string(), "script");
    }
}
