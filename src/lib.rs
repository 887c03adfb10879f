//! # edgequake-html2pdf
//!
//! Print a large, locally stored HTML documentation tree to one PDF per page
//! with headless Chrome, trimming navigation, headers, and feedback footers
//! out of every page first.
//!
//! ## Pipeline Overview
//!
//! ```text
//! manifests (relative paths)
//!  │
//!  ├─ 1. Workspace  wipe + recreate <root>/manual and <root>/script
//!  ├─ 2. Engine     launch headless Chrome on the control port (9222)
//!  ├─ 3. Trim       four-landmark line scan → page.print-ready.html
//!  ├─ 4. Render     DevTools Page.printToPDF on the print-ready copy
//!  ├─ 5. Persist    <root>/<category>/NNNN.<basename>.pdf
//!  └─ 6. Stop       terminate Chrome (also on drop)
//! ```
//!
//! Documents are processed one at a time, in manifest order. A failure on
//! one document is logged and recorded; the batch always moves on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_html2pdf::{run, Category, ConversionConfig, Manifests};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manifests = Manifests::load(Path::new("pages.json"), Path::new("scripts.json"))?;
//!     let config = ConversionConfig::builder()
//!         .docs_root("/Applications/Unity/Documentation/en")
//!         .manifests(manifests)
//!         .build()?;
//!     let report = run(&config).await?;
//!     eprintln!("{} converted, {} failed", report.stats.converted, report.stats.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `html2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{default_output_root, Category, ConversionConfig, ConversionConfigBuilder, Manifests};
pub use convert::{convert_category, convert_document, run, run_sync, run_with_engine};
pub use engine::EngineHandle;
pub use error::{DocumentError, Html2PdfError};
pub use output::{BatchReport, BatchStats, CategoryReport, DocumentResult, OutputSlot};
pub use pipeline::cdp::CdpEngine;
pub use pipeline::input::DocumentRef;
pub use pipeline::render::{PdfArtifact, RenderEngine};
pub use pipeline::trim::{trim, Marker, TrimMarkers, TrimOutcome};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
