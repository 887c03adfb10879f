//! Boundary trimming: cut documentation chrome out of a page before printing.
//!
//! ## Why not a DOM?
//!
//! The source pages are generated HTML of uneven quality. Some are pretty-
//! printed, others (the script reference) arrive with every tag bunched onto
//! one line. A line-oriented scan for four landmarks is robust to both and to
//! markup an HTML parser would reject, and it keeps the step a pure
//! `&str → String` function that is trivial to test with literal fixtures.
//!
//! ## Landmarks
//!
//! | Marker       | Default                     | Match        | Armed after |
//! |--------------|-----------------------------|--------------|-------------|
//! | `BodyStart`  | `<body>`                    | line prefix  | always      |
//! | `BodyEnd`    | `</body>`                   | line prefix  | `BodyStart` |
//! | `KeepFrom`   | `class="scrollToFeedback"`  | substring    | `BodyStart` |
//! | `DumpFrom`   | `class="feedbackbox"`       | substring    | `KeepFrom`  |
//!
//! A line claims at most one marker (tested in table order) and each marker
//! is claimed at most once. When all four are found the output is the head
//! of the page, the kept section, and a synthetic close. Otherwise the page
//! is returned byte-for-byte so it still prints, just untrimmed.

use crate::config::ConversionConfig;
use crate::error::{DocumentError, Html2PdfError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One of the four structural landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Marker {
    BodyStart,
    BodyEnd,
    KeepFrom,
    DumpFrom,
}

impl Marker {
    /// Human-readable name used in warnings.
    pub fn description(self) -> &'static str {
        match self {
            Marker::BodyStart => "body start",
            Marker::BodyEnd => "body end",
            Marker::KeepFrom => "interesting body section",
            Marker::DumpFrom => "uninteresting footer section",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// The literal text the trimmer looks for, plus the synthetic closing tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimMarkers {
    /// Prefix of the line that opens the body.
    pub body_open: String,
    /// Prefix of the line that closes the body.
    pub body_close: String,
    /// Substring of the line where user-relevant content starts.
    pub keep_from: String,
    /// Substring of the line where the footer/feedback section starts.
    pub dump_from: String,
    /// Appended after the kept section.
    pub closing_tags: String,
}

impl Default for TrimMarkers {
    fn default() -> Self {
        Self {
            body_open: "<body>".to_string(),
            body_close: "</body>".to_string(),
            keep_from: r#"class="scrollToFeedback""#.to_string(),
            dump_from: r#"class="feedbackbox""#.to_string(),
            closing_tags: "</body></html>".to_string(),
        }
    }
}

impl TrimMarkers {
    pub(crate) fn validate(&self) -> Result<(), Html2PdfError> {
        let empty = [
            ("body_open", &self.body_open),
            ("body_close", &self.body_close),
            ("keep_from", &self.keep_from),
            ("dump_from", &self.dump_from),
        ]
        .into_iter()
        .find(|(_, v)| v.is_empty());

        match empty {
            Some((name, _)) => Err(Html2PdfError::InvalidConfig(format!(
                "Trim marker '{name}' must not be empty"
            ))),
            None => Ok(()),
        }
    }
}

/// Result of [`trim`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimOutcome {
    /// Reduced markup, or the untouched input when any marker is missing.
    pub text: String,
    /// Markers that could not be located, in [`Marker`] order.
    pub missing: Vec<Marker>,
}

impl TrimOutcome {
    pub fn is_trimmed(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Default)]
struct Boundaries {
    body_start: Option<usize>,
    body_end: Option<usize>,
    keep_from: Option<usize>,
    dump_from: Option<usize>,
}

impl Boundaries {
    fn missing(&self) -> Vec<Marker> {
        [
            (Marker::BodyStart, self.body_start),
            (Marker::BodyEnd, self.body_end),
            (Marker::KeepFrom, self.keep_from),
            (Marker::DumpFrom, self.dump_from),
        ]
        .into_iter()
        .filter_map(|(m, idx)| idx.is_none().then_some(m))
        .collect()
    }
}

/// Reduce `raw` to its print-worthy part.
pub fn trim(raw: &str, markers: &TrimMarkers) -> TrimOutcome {
    // Script pages are bunched onto few lines; break between adjacent tags.
    let normalised = raw.replace("><", ">\n<");
    let lines: Vec<&str> = normalised.split('\n').collect();

    let mut b = Boundaries::default();
    for (i, line) in lines.iter().enumerate() {
        if b.body_start.is_none() && line.starts_with(markers.body_open.as_str()) {
            b.body_start = Some(i);
        } else if b.body_start.is_some()
            && b.body_end.is_none()
            && line.starts_with(markers.body_close.as_str())
        {
            b.body_end = Some(i);
        } else if b.body_start.is_some()
            && b.keep_from.is_none()
            && line.contains(markers.keep_from.as_str())
        {
            b.keep_from = Some(i);
        } else if b.keep_from.is_some()
            && b.dump_from.is_none()
            && line.contains(markers.dump_from.as_str())
        {
            b.dump_from = Some(i);
        }
    }

    let missing = b.missing();
    let (Some(body_start), Some(keep_from), Some(dump_from), true) =
        (b.body_start, b.keep_from, b.dump_from, missing.is_empty())
    else {
        return TrimOutcome {
            text: raw.to_string(),
            missing,
        };
    };

    debug!(
        "Trim boundaries: body={} keep={} dump={} of {} lines",
        body_start,
        keep_from,
        dump_from,
        lines.len()
    );

    let mut text = lines[..body_start]
        .iter()
        .chain(&lines[keep_from..dump_from])
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    text.push_str(&markers.closing_tags);

    TrimOutcome {
        text,
        missing: Vec::new(),
    }
}

/// Sibling path the print-ready copy is written to.
///
/// `dir/page.html` → `dir/page.<suffix>.html`.
pub fn print_ready_path(source: &Path, suffix: &str) -> PathBuf {
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "html".to_string());
    source.with_extension(format!("{suffix}.{ext}"))
}

/// A print-ready copy of one source document on disk.
///
/// Owns the file: it is removed when the value is dropped, on success,
/// error, or panic alike. Removal failures are ignored; the next run
/// regenerates every copy anyway.
#[derive(Debug)]
pub struct TrimmedDocument {
    path: PathBuf,
    missing: Vec<Marker>,
}

impl TrimmedDocument {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Markers that were not found; empty when the copy is actually trimmed.
    pub fn missing(&self) -> &[Marker] {
        &self.missing
    }

    pub fn is_trimmed(&self) -> bool {
        self.missing.is_empty()
    }
}

impl Drop for TrimmedDocument {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Read `source`, trim it, and write the print-ready sibling.
///
/// Each missing marker is logged as a warning; the untouched page is written
/// instead so it is still rendered in full.
pub async fn write_trimmed(
    source: &Path,
    config: &ConversionConfig,
) -> Result<TrimmedDocument, DocumentError> {
    let raw = tokio::fs::read(source)
        .await
        .map_err(|e| DocumentError::ReadFailed {
            path: source.to_path_buf(),
            detail: e.to_string(),
        })?;

    // Older pages are not always UTF-8; a bad byte must not cost the page.
    let outcome = trim(&String::from_utf8_lossy(&raw), &config.markers);
    for marker in &outcome.missing {
        warn!("  Unable to find {} in {}", marker, source.display());
    }

    let contents = if outcome.is_trimmed() {
        outcome.text.as_bytes()
    } else {
        raw.as_slice()
    };

    let path = print_ready_path(source, &config.trimmed_suffix);
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| DocumentError::TrimWriteFailed {
            path: path.clone(),
            detail: e.to_string(),
        })?;

    Ok(TrimmedDocument {
        path,
        missing: outcome.missing,
    })
}
