//! CLI binary for edgequake-html2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints the batch summary.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_html2pdf::{
    default_output_root, run, BatchReport, Category, ConversionConfig, ConversionProgressCallback,
    Manifests, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar per category, re-sized at each
/// `on_category_start`, with a log line per document printed above it.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Starting Chrome…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_category_start(&self, category: Category, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_style(style);
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_prefix(format!("{category:<7}"));
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing a total of {total} {category} pages…"))
        ));
    }

    fn on_document_start(&self, _category: Category, _index: usize, _total: usize, source: &Path) {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn on_document_complete(&self, _category: Category, index: usize, total: usize, output: &Path) {
        let name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.println(format!(
            "  {} {:>4}/{:<4}  {}  {}",
            green("✓"),
            index + 1,
            total,
            name,
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, _category: Category, index: usize, total: usize, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>4}/{:<4}  {}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_category_complete(&self, category: Category, total: usize, success_count: usize) {
        let failed = total.saturating_sub(success_count);
        let mark = if failed == 0 {
            green("✔")
        } else if failed == total {
            red("✘")
        } else {
            cyan("⚠")
        };
        self.bar.println(format!(
            "{} {} {}/{} pages converted{}",
            mark,
            bold(category.dir_name()),
            success_count,
            total,
            if failed > 0 {
                format!("  ({} failed)", red(&failed.to_string()))
            } else {
                String::new()
            },
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert the bundled Unity docs into ~/unity-docs
  html2pdf /Applications/Unity/Documentation/en

  # Custom output root and manifests
  html2pdf ./Documentation/en -o ./pdfs \
      --manual-manifest lists/pages.json --script-manifest lists/scripts.json

  # Use a specific browser binary on another control port
  html2pdf --chrome-path /usr/bin/chromium --port 9333 ./Documentation/en

  # Machine-readable batch report
  html2pdf --json ./Documentation/en > report.json

OUTPUT LAYOUT:
  <output>/manual/0001.<page>.pdf, 0002.<page>.pdf, …
  <output>/script/0001.<page>.pdf, …
  The output tree is wiped at the start of every run.

ENVIRONMENT VARIABLES:
  CHROME_PATH             Path to a Chrome/Chromium executable
  RUST_LOG                Override log filtering (e.g. edgequake_html2pdf=debug)
"#;

/// Print a local HTML documentation tree to one PDF per page.
#[derive(Parser, Debug)]
#[command(
    name = "html2pdf",
    version,
    about = "Print a local HTML documentation tree to one PDF per page via headless Chrome",
    long_about = "Reads ordered page lists for the manual and scripting reference, strips \
navigation and feedback footers from each page, and prints every page to its own PDF \
through a headless Chrome instance controlled over the DevTools protocol.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Root directory the manifest entries are relative to.
    docs_root: PathBuf,

    /// Output root (default: ~/unity-docs). Wiped at the start of the run.
    #[arg(short, long, env = "HTML2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// JSON array of manual page paths.
    #[arg(long, env = "HTML2PDF_MANUAL_MANIFEST", default_value = "pages.json")]
    manual_manifest: PathBuf,

    /// JSON array of scripting reference page paths.
    #[arg(long, env = "HTML2PDF_SCRIPT_MANIFEST", default_value = "scripts.json")]
    script_manifest: PathBuf,

    /// Chrome remote-debugging port.
    #[arg(long, env = "HTML2PDF_PORT", default_value_t = chrome_auto::DEFAULT_DEBUG_PORT)]
    port: u16,

    /// Chrome/Chromium executable (default: auto-detect).
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Seconds to wait for Chrome to answer on its control port.
    #[arg(long, env = "HTML2PDF_STARTUP_TIMEOUT", default_value_t = 30)]
    startup_timeout: u64,

    /// Per-page render timeout in seconds.
    #[arg(long, env = "HTML2PDF_RENDER_TIMEOUT", default_value_t = 120)]
    render_timeout: u64,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "HTML2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "HTML2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "HTML2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "HTML2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces the per-page INFO lines.
    let show_progress =
        !cli.quiet && !cli.no_progress && !cli.json && !cli.verbose && io::stderr().is_terminal();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = progress
        .clone()
        .map(|cb| cb as Arc<dyn ConversionProgressCallback>);

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let outcome = run(&config).await;
    if let Some(ref cb) = progress {
        cb.finish();
    }
    let report = outcome.context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&report, &config);
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let manifests = Manifests::load(&cli.manual_manifest, &cli.script_manifest)
        .context("Failed to load page manifests")?;

    let mut builder = ConversionConfig::builder()
        .docs_root(&cli.docs_root)
        .output_root(cli.output.clone().unwrap_or_else(default_output_root))
        .manifests(manifests)
        .port(cli.port)
        .startup_timeout_secs(cli.startup_timeout)
        .render_timeout_secs(cli.render_timeout);

    if let Some(ref path) = cli.chrome_path {
        builder = builder.chrome_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(report: &BatchReport, config: &ConversionConfig) {
    let stats = &report.stats;
    eprintln!(
        "{}  {}/{} pages  {}ms  →  {}",
        if stats.failed == 0 {
            green("✔")
        } else {
            cyan("⚠")
        },
        stats.converted,
        stats.total_documents,
        stats.total_duration_ms,
        bold(&config.output_root.display().to_string()),
    );
    if stats.failed > 0 {
        eprintln!("   {} pages failed", red(&stats.failed.to_string()));
    }
    if stats.untrimmed > 0 {
        eprintln!(
            "   {}",
            dim(&format!(
                "{} pages printed untrimmed (landmarks not found)",
                stats.untrimmed
            ))
        );
    }
}
