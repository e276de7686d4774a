//! Export pipeline error types.

use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A page's render target could not be located in the rendering
    /// surface. Reported per page, not a silent skip.
    #[error("Render target not found: {0}")]
    RenderTargetNotFound(String),

    /// The page renderer failed to rasterize a page.
    #[error("Render failed: {0}")]
    Render(String),

    /// Raster encoding (PNG/JPEG) failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// PDF assembly failed.
    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    /// Zip archive assembly failed.
    #[error("Zip assembly failed: {0}")]
    Zip(String),

    /// I/O error while writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The export was cancelled between pages.
    #[error("Export cancelled")]
    Cancelled,

    /// Page index out of range for the document.
    #[error("Page index out of range: {0}")]
    PageOutOfRange(usize),
}
