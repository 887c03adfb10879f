//! End-to-end integration tests for edgequake-html2pdf.
//!
//! These tests launch a real headless Chrome and print real PDFs. They are
//! gated behind the `E2E_ENABLED` environment variable so they do not run in
//! CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture --test-threads=1
//!
//! Chrome is located via `CHROME_PATH` or the usual install locations. Each
//! test binds its own control port so a desktop Chrome on 9222 is left alone.

use edgequake_html2pdf::{
    run, Category, ConversionConfig, DocumentError, EngineHandle, RenderEngine,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test if E2E_ENABLED is not set *or* no Chrome can be found.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        if let Err(e) = chrome_auto::locate_chrome(None) {
            println!("SKIP — {e}");
            println!("       Set CHROME_PATH to a Chrome/Chromium executable");
            return;
        }
    }};
}

const PAGE: &str = "<!DOCTYPE html><html><head><title>Rigidbody</title></head><body>\
<div class=\"header\">Unity Manual navigation</div>\
<div class=\"scrollToFeedback\"><h1>Rigidbody</h1>\
<p>Control of an object's position through physics simulation.</p></div>\
<div class=\"feedbackbox\"><p>Did you find this page useful?</p></div>\
</body></html>";

fn write_docs(root: &Path, pages: &[&str]) {
    for rel in pages {
        let p = root.join(rel);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(p, PAGE).unwrap();
    }
}

fn config(docs: &Path, out: &Path, port: u16, manual: &[&str], script: &[&str]) -> ConversionConfig {
    ConversionConfig::builder()
        .docs_root(docs)
        .output_root(out)
        .port(port)
        .manifest(Category::Manual, manual.iter().map(|s| s.to_string()).collect())
        .manifest(Category::Script, script.iter().map(|s| s.to_string()).collect())
        .startup_timeout_secs(60)
        .build()
        .unwrap()
}

/// Assert `path` looks like a non-trivial PDF.
fn assert_pdf(path: &PathBuf) {
    let bytes = std::fs::read(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
    assert!(bytes.starts_with(b"%PDF-"), "{} is not a PDF", path.display());
    assert!(bytes.len() > 500, "{} suspiciously small: {} bytes", path.display(), bytes.len());
    println!("✓  {}  {} bytes", path.display(), bytes.len());
}

// ── Engine lifecycle ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_engine_launch_and_stop() {
    e2e_skip_unless_ready!();
    let tmp = TempDir::new().unwrap();
    let cfg = config(tmp.path(), &tmp.path().join("out"), 9341, &[], &[]);

    let engine = EngineHandle::launch(&cfg).await.expect("Chrome should start");
    let version = engine.engine().version().await.expect("version probe");
    println!("Browser: {} ({})", version.browser, engine.executable().display());
    assert!(!version.browser.is_empty());

    engine.stop().await;
    assert!(
        edgequake_html2pdf::CdpEngine::new(9341).version().await.is_err(),
        "control port should be closed after stop"
    );
}

#[tokio::test]
async fn test_render_single_page() {
    e2e_skip_unless_ready!();
    let tmp = TempDir::new().unwrap();
    let page = tmp.path().join("page.html");
    std::fs::write(&page, PAGE).unwrap();
    let cfg = config(tmp.path(), &tmp.path().join("out"), 9342, &[], &[]);

    let engine = EngineHandle::launch(&cfg).await.expect("Chrome should start");
    let url = url::Url::from_file_path(&page).unwrap();
    let pdf = engine.engine().render(&url).await;
    engine.stop().await;

    let pdf = pdf.expect("render should succeed");
    assert!(pdf.len() > 500, "PDF only {} bytes", pdf.len());
}

#[tokio::test]
async fn test_render_without_engine_is_unreachable() {
    e2e_skip_unless_ready!();
    let engine = edgequake_html2pdf::CdpEngine::new(9349);
    let url = url::Url::parse("file:///nonexistent.html").unwrap();

    let err = engine.render(&url).await.unwrap_err();
    assert!(
        matches!(err, DocumentError::EngineUnreachable { port: 9349, .. }),
        "got: {err:?}"
    );
}

// ── Full batch ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_batch() {
    e2e_skip_unless_ready!();
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("Documentation/en");
    let out = tmp.path().join("unity-docs");
    write_docs(
        &docs,
        &[
            "Manual/index.html",
            "Manual/class-Rigidbody.html",
            "ScriptReference/Vector3.Lerp.html",
        ],
    );
    let cfg = config(
        &docs,
        &out,
        9343,
        &["Manual/index.html", "Manual/class-Rigidbody.html"],
        &["ScriptReference/Vector3.Lerp.html", "ScriptReference/Missing.html"],
    );

    let report = run(&cfg).await.expect("batch should run");

    assert_pdf(&out.join("manual/0001.index.pdf"));
    assert_pdf(&out.join("manual/0002.class-Rigidbody.pdf"));
    assert_pdf(&out.join("script/0001.Vector3.Lerp.pdf"));
    assert!(!out.join("script/0002.Missing.pdf").exists());

    assert_eq!(report.stats.total_documents, 4);
    assert_eq!(report.stats.converted, 3);
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.stats.untrimmed, 0);

    assert!(!docs.join("Manual/index.print-ready.html").exists());

    println!("{}", serde_json::to_string_pretty(&report.stats).unwrap());
}
