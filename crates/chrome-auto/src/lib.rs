//! # chrome-auto
//!
//! Locate a Chrome or Chromium executable on the local machine and build the
//! command line that starts it as a headless, non-interactive rendering
//! engine reachable over the DevTools control port.
//!
//! ## How it works
//!
//! On a call to [`locate_chrome`]:
//!
//! 1. An explicit path passed by the caller wins (and must exist).
//! 2. Otherwise `CHROME_PATH` is honoured when it points at a file.
//! 3. Otherwise well-known install locations for the current platform are
//!    probed, then every directory on `PATH` for the platform's executable
//!    names.
//!
//! Discovery results are cached for the lifetime of the process.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chrome_auto::{headless_args, locate_chrome, DEFAULT_DEBUG_PORT};
//! use std::path::Path;
//!
//! let chrome = locate_chrome(None).expect("no Chrome installed");
//! let args = headless_args(DEFAULT_DEBUG_PORT, Path::new("/tmp/profile"), &[]);
//! println!("{} {}", chrome.display(), args.join(" "));
//! ```
//!
//! ## Platform support
//!
//! | OS      | Probed locations                                         |
//! |---------|----------------------------------------------------------|
//! | Linux   | `google-chrome-stable`, `google-chrome`, `chromium`, … on `PATH` |
//! | macOS   | `/Applications/Google Chrome.app`, `Chromium.app`        |
//! | Windows | `%PROGRAMFILES%`, `%PROGRAMFILES(X86)%`, `%LOCALAPPDATA%` |
//!
//! ## Environment variable overrides
//!
//! - `CHROME_PATH` — path to a Chrome/Chromium executable; skips discovery.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Control port Chrome listens on when nothing else is configured.
pub const DEFAULT_DEBUG_PORT: u16 = 9222;

/// Flags that make the browser headless and deterministic: no GPU, no
/// networking in the background, no extensions, no auto-updates, no
/// first-run UI.
pub const HEADLESS_FLAGS: &[&str] = &[
    "--headless",
    "--disable-gpu",
    "--disable-translate",
    "--disable-extensions",
    "--disable-background-networking",
    "--safebrowsing-disable-auto-update",
    "--disable-sync",
    "--metrics-recording-only",
    "--disable-default-apps",
    "--no-first-run",
    "--mute-audio",
    "--hide-scrollbars",
];

/// Environment variable consulted before discovery.
pub const CHROME_PATH_ENV: &str = "CHROME_PATH";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by chrome-auto operations.
#[derive(Error, Debug)]
pub enum ChromeAutoError {
    /// The current OS has no known install locations.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// The caller named an executable that does not exist.
    #[error("Chrome executable '{path}' does not exist")]
    MissingExecutable { path: PathBuf },

    /// Nothing usable was found anywhere.
    #[error("No Chrome/Chromium executable found (searched {searched} locations).\nSet CHROME_PATH=/path/to/chrome.")]
    NotFound { searched: usize },
}

// ── Internal: platform metadata ──────────────────────────────────────────────

struct PlatformInfo {
    /// Executable names looked up on `PATH`, most preferred first.
    executable_names: &'static [&'static str],
    /// Absolute install locations checked before `PATH`.
    install_paths: Vec<PathBuf>,
}

fn detect_platform() -> Result<PlatformInfo, ChromeAutoError> {
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;

    match os {
        "linux" | "freebsd" | "openbsd" => Ok(PlatformInfo {
            executable_names: &[
                "google-chrome-stable",
                "google-chrome",
                "chromium-browser",
                "chromium",
            ],
            install_paths: vec![
                PathBuf::from("/opt/google/chrome/chrome"),
                PathBuf::from("/snap/bin/chromium"),
            ],
        }),
        "macos" => Ok(PlatformInfo {
            executable_names: &["chromium", "google-chrome"],
            install_paths: vec![
                PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
                PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
            ],
        }),
        "windows" => {
            let suffix = Path::new("Google")
                .join("Chrome")
                .join("Application")
                .join("chrome.exe");
            let install_paths = ["LOCALAPPDATA", "PROGRAMFILES", "PROGRAMFILES(X86)"]
                .iter()
                .filter_map(|var| std::env::var_os(var))
                .map(|base| PathBuf::from(base).join(&suffix))
                .collect();
            Ok(PlatformInfo {
                executable_names: &["chrome.exe"],
                install_paths,
            })
        }
        os => Err(ChromeAutoError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        }),
    }
}

// ── Thread-safe singleton path cache ─────────────────────────────────────────

static RESOLVED_PATH: OnceLock<PathBuf> = OnceLock::new();

// ── Public API ───────────────────────────────────────────────────────────────

/// Resolve the Chrome executable to launch.
///
/// `explicit` bypasses discovery entirely and is not cached; a missing file
/// is an error rather than a silent fallback.
pub fn locate_chrome(explicit: Option<&Path>) -> Result<PathBuf, ChromeAutoError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(ChromeAutoError::MissingExecutable {
            path: path.to_path_buf(),
        });
    }

    if let Some(path) = RESOLVED_PATH.get() {
        return Ok(path.clone());
    }

    let path = discover()?;
    let _ = RESOLVED_PATH.set(path.clone());
    Ok(path)
}

/// Build the argument list for a headless browser bound to `port`.
///
/// `user_data_dir` should be a throw-away profile so runs never share state
/// with an interactive browser. `extra` is appended after the fixed flags.
pub fn headless_args(port: u16, user_data_dir: &Path, extra: &[String]) -> Vec<String> {
    let mut args: Vec<String> = HEADLESS_FLAGS.iter().map(|f| f.to_string()).collect();
    args.push(format!("--remote-debugging-port={port}"));
    args.push(format!("--user-data-dir={}", user_data_dir.display()));
    args.extend(extra.iter().cloned());
    args.push("about:blank".to_string());
    args
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn discover() -> Result<PathBuf, ChromeAutoError> {
    // 1. Environment variable override.
    if let Some(env_path) = std::env::var_os(CHROME_PATH_ENV) {
        let p = PathBuf::from(env_path);
        if p.is_file() {
            return Ok(p);
        }
        eprintln!(
            "chrome-auto: {CHROME_PATH_ENV} '{}' not found; searching …",
            p.display()
        );
    }

    let info = detect_platform()?;

    // 2. Well-known install locations.
    if let Some(p) = info.install_paths.iter().find(|p| p.is_file()) {
        return Ok(p.clone());
    }

    // 3. PATH lookup.
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    let dirs: Vec<PathBuf> = std::env::split_paths(&path_var).collect();
    if let Some(p) = search_dirs(&dirs, info.executable_names) {
        return Ok(p);
    }

    Err(ChromeAutoError::NotFound {
        searched: info.install_paths.len() + dirs.len() * info.executable_names.len(),
    })
}

/// First `dir/name` that exists, iterating names in preference order.
fn search_dirs(dirs: &[PathBuf], names: &[&str]) -> Option<PathBuf> {
    names
        .iter()
        .flat_map(|name| dirs.iter().map(move |dir| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
