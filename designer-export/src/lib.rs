//! # Designer Export
//!
//! Export pipeline for the template designer: drives a page renderer to
//! rasterize each page of a finalized document, then assembles the
//! results into a single image, a multi-page PDF, or a zip archive of
//! per-page images.
//!
//! ```text
//! Document ──► PageRenderer (awaited per page, sequential)
//!                   │
//!                   ▼ RgbaImage
//!          ┌────────┼─────────┐
//!          ▼        ▼         ▼
//!       PNG/JPEG   PDF      zip of
//!       (one page) sheets   page images
//! ```
//!
//! The pipeline never mutates the document. Failing pages are skipped
//! and reported per page; a [`pipeline::CancelToken`] aborts between
//! pages.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod pipeline;
pub mod renderer;

pub use error::{ExportError, ExportResult};
pub use pipeline::{
    CancelToken, ExportConfig, ExportReport, Exporter, ImageFormat, PageFailure,
};
pub use renderer::{PageRenderer, SvgPageRenderer};
