//! Pipeline stages for batch HTML-to-PDF conversion.
//!
//! Each submodule implements exactly one step, so each is independently
//! testable and the rendering backend can be swapped without touching the
//! trimming or naming logic.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ trim ──▶ render ──▶ (persist)
//! (paths)   (text)   (engine)    (output slot)
//! ```
//!
//! 1. [`workspace`] — wipe and recreate the output tree before a run
//! 2. [`input`]     — resolve manifest entries to absolute document references
//! 3. [`trim`]      — cut chrome and footers out of the page, write the
//!    print-ready sibling file
//! 4. [`render`]    — the engine seam; submit the sibling, always remove it
//! 5. [`cdp`]       — the Chrome DevTools implementation of that seam; the
//!    only stage with network I/O

pub mod cdp;
pub mod input;
pub mod render;
pub mod trim;
pub mod workspace;
