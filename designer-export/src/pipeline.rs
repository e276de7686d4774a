//! The export pipeline: single image, multi-page PDF, zip of images.
//!
//! Pages are processed strictly sequentially; each page's raster and
//! intermediates are dropped before the next page begins. The pipeline
//! reads a finalized document and never mutates it.

use std::io::Write as IoWrite;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use designer_core::{Document, Page};
use image::{ImageEncoder, RgbaImage};

use crate::error::{ExportError, ExportResult};
use crate::renderer::PageRenderer;

/// Raster encoding for image and zip exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG image.
    Png,
    /// JPEG image (no alpha; composited over the export background).
    Jpeg,
}

impl ImageFormat {
    /// File extension for archive entry names.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Configuration for the export pipeline.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Upscaling factor for single-image export.
    pub image_scale: f32,
    /// JPEG quality 1-100.
    pub jpeg_quality: u8,
    /// Background composited under JPEG output and PDF pages, RGBA.
    pub background: [u8; 4],
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            image_scale: 2.0,
            jpeg_quality: 85,
            background: [255, 255, 255, 255],
        }
    }
}

/// Cooperative cancellation flag, checked between pages.
///
/// Cheap to clone; `cancel()` from any holder makes the pipeline return
/// [`ExportError::Cancelled`] before it starts the next page.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// A page that could not be exported.
#[derive(Debug, Clone)]
pub struct PageFailure {
    /// Zero-based page index in the document.
    pub page_index: usize,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Result of a batch export: the artifact plus any per-page failures.
///
/// A failing page is skipped and reported here after the batch
/// completes, never silently dropped.
#[derive(Debug)]
pub struct ExportReport<T> {
    /// The assembled output.
    pub artifact: T,
    /// Pages that were skipped, in document order.
    pub failures: Vec<PageFailure>,
}

impl<T> ExportReport<T> {
    /// Whether every page made it into the artifact.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives a [`PageRenderer`] to produce export artifacts.
pub struct Exporter<R: PageRenderer> {
    renderer: R,
    config: ExportConfig,
}

impl<R: PageRenderer> Exporter<R> {
    /// Create an exporter with the given renderer and configuration.
    #[must_use]
    pub fn new(renderer: R, config: ExportConfig) -> Self {
        Self { renderer, config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults(renderer: R) -> Self {
        Self::new(renderer, ExportConfig::default())
    }

    /// Export one page as an encoded raster at the configured upscale.
    ///
    /// # Errors
    ///
    /// Returns an error if the page index is out of range, the render
    /// target is missing, or rendering/encoding fails.
    pub async fn export_page_image(
        &self,
        document: &Document,
        page_index: usize,
        format: ImageFormat,
    ) -> ExportResult<Vec<u8>> {
        let page = document
            .pages()
            .get(page_index)
            .ok_or(ExportError::PageOutOfRange(page_index))?;
        let raster = self.renderer.rasterize(page, self.config.image_scale).await?;
        self.encode(&raster, format)
    }

    /// Export every page into a multi-page PDF.
    ///
    /// Pages are rasterized sequentially against detached page data and
    /// appended in document order. A raster taller than one sheet is
    /// sliced across successive sheets by re-drawing the same image at
    /// successive negative vertical offsets until the remaining height
    /// is exhausted. Failing pages are skipped and reported.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Cancelled`] if the token fires between
    /// pages, or [`ExportError::Pdf`] if no page could be rendered.
    pub async fn export_pdf(
        &self,
        document: &Document,
        cancel: &CancelToken,
    ) -> ExportResult<ExportReport<Vec<u8>>> {
        let mut failures = Vec::new();
        let mut pdf: Option<printpdf::PdfDocumentReference> = None;

        for (index, page) in document.pages().iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ExportError::Cancelled);
            }
            // Raster and decoded image stay scoped to this iteration.
            match self.renderer.rasterize(page, 1.0).await {
                Ok(raster) => {
                    let png = self.composite_to_png(&raster)?;
                    Self::append_pdf_page(&mut pdf, page, &png)?;
                }
                Err(error) => {
                    tracing::warn!("Skipping page {index}: {error}");
                    failures.push(PageFailure {
                        page_index: index,
                        reason: error.to_string(),
                    });
                }
            }
        }

        let Some(pdf) = pdf else {
            return Err(ExportError::Pdf(
                "No page could be rendered".to_string(),
            ));
        };
        let bytes = pdf
            .save_to_bytes()
            .map_err(|e| ExportError::Pdf(format!("PDF save failed: {e}")))?;
        tracing::info!(
            "Exported PDF: {} pages, {} skipped",
            document.pages().len() - failures.len(),
            failures.len()
        );
        Ok(ExportReport {
            artifact: bytes,
            failures,
        })
    }

    /// Export every page as an individually encoded raster inside a zip
    /// archive, entries named `page-<1-based index>.<ext>`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Cancelled`] if the token fires between
    /// pages, or [`ExportError::Zip`] if archive assembly fails.
    pub async fn export_zip(
        &self,
        document: &Document,
        format: ImageFormat,
        cancel: &CancelToken,
    ) -> ExportResult<ExportReport<Vec<u8>>> {
        let mut failures = Vec::new();
        let cursor = std::io::Cursor::new(Vec::new());
        let mut archive = zip::ZipWriter::new(cursor);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for (index, page) in document.pages().iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ExportError::Cancelled);
            }
            match self.renderer.rasterize(page, 1.0).await {
                Ok(raster) => {
                    let encoded = self.encode(&raster, format)?;
                    let name = format!("page-{}.{}", index + 1, format.extension());
                    archive
                        .start_file(name, options)
                        .map_err(|e| ExportError::Zip(e.to_string()))?;
                    archive.write_all(&encoded)?;
                }
                Err(error) => {
                    tracing::warn!("Skipping page {index}: {error}");
                    failures.push(PageFailure {
                        page_index: index,
                        reason: error.to_string(),
                    });
                }
            }
        }

        let cursor = archive
            .finish()
            .map_err(|e| ExportError::Zip(e.to_string()))?;
        Ok(ExportReport {
            artifact: cursor.into_inner(),
            failures,
        })
    }

    /// Encode a raster in the requested format.
    fn encode(&self, raster: &RgbaImage, format: ImageFormat) -> ExportResult<Vec<u8>> {
        match format {
            ImageFormat::Png => {
                let mut buf = std::io::Cursor::new(Vec::new());
                let encoder = image::codecs::png::PngEncoder::new(&mut buf);
                encoder
                    .write_image(
                        raster.as_raw(),
                        raster.width(),
                        raster.height(),
                        image::ExtendedColorType::Rgba8,
                    )
                    .map_err(|e| ExportError::Encode(format!("PNG encoding failed: {e}")))?;
                Ok(buf.into_inner())
            }
            ImageFormat::Jpeg => {
                let rgb = self.composite_over_background(raster);
                let mut buf = std::io::Cursor::new(Vec::new());
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut buf,
                    self.config.jpeg_quality,
                );
                encoder
                    .write_image(
                        &rgb,
                        raster.width(),
                        raster.height(),
                        image::ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| ExportError::Encode(format!("JPEG encoding failed: {e}")))?;
                Ok(buf.into_inner())
            }
        }
    }

    /// Flatten RGBA over the configured background into RGB bytes.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn composite_over_background(&self, raster: &RgbaImage) -> Vec<u8> {
        let bg = &self.config.background;
        let mut rgb = Vec::with_capacity((raster.width() * raster.height() * 3) as usize);
        for pixel in raster.pixels() {
            let alpha = f32::from(pixel[3]) / 255.0;
            let inv = 1.0 - alpha;
            for channel in 0..3 {
                let value = f32::from(pixel[channel]).mul_add(alpha, f32::from(bg[channel]) * inv);
                rgb.push(value as u8);
            }
        }
        rgb
    }

    /// Flatten over the background (forcing opaque pages) and encode PNG
    /// for PDF embedding.
    fn composite_to_png(&self, raster: &RgbaImage) -> ExportResult<Vec<u8>> {
        let rgb = self.composite_over_background(raster);
        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        encoder
            .write_image(
                &rgb,
                raster.width(),
                raster.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| ExportError::Encode(format!("PNG encoding failed: {e}")))?;
        Ok(buf.into_inner())
    }

    /// Append one rasterized page to the PDF, slicing tall rasters
    /// across as many sheets as the remaining height requires.
    #[allow(clippy::cast_precision_loss)]
    fn append_pdf_page(
        pdf: &mut Option<printpdf::PdfDocumentReference>,
        page: &Page,
        png: &[u8],
    ) -> ExportResult<()> {
        let decoded = printpdf::image_crate::load_from_memory(png)
            .map_err(|e| ExportError::Pdf(format!("Failed to decode raster for PDF: {e}")))?;
        let img_h_px = decoded.height();

        let (page_w_px, page_h_px) = page.details.pixel_resolution();
        let dpi = page.details.effective_dpi();
        let sheet_w_mm = page_w_px as f32 / dpi * 25.4;
        let sheet_h_mm = page_h_px as f32 / dpi * 25.4;
        let img_h_mm = img_h_px as f32 / dpi * 25.4;

        for slice in 0..sheet_count(img_h_mm, sheet_h_mm) {
            let layer = match pdf.as_ref() {
                None => {
                    let (doc, first_page, first_layer) = printpdf::PdfDocument::new(
                        "Document Export",
                        printpdf::Mm(sheet_w_mm),
                        printpdf::Mm(sheet_h_mm),
                        "Layer 1",
                    );
                    let layer = doc.get_page(first_page).get_layer(first_layer);
                    *pdf = Some(doc);
                    layer
                }
                Some(doc) => {
                    let (page_index, layer_index) = doc.add_page(
                        printpdf::Mm(sheet_w_mm),
                        printpdf::Mm(sheet_h_mm),
                        "Layer 1",
                    );
                    doc.get_page(page_index).get_layer(layer_index)
                }
            };

            let pdf_image = printpdf::Image::from_dynamic_image(&decoded);
            pdf_image.add_to_layer(layer, slice_transform(dpi, sheet_h_mm, img_h_mm, slice));
        }
        Ok(())
    }
}

/// Placement for one slice of a page raster on a PDF sheet.
///
/// The raster is placed at the page's own dpi so it fills the sheet
/// exactly; printpdf's implicit 300 dpi placement would shrink it.
/// Slice k re-draws the same image shifted up by k sheet heights, so
/// the portion below the previous sheet's bottom edge becomes visible.
#[allow(clippy::cast_precision_loss)]
fn slice_transform(
    dpi: f32,
    sheet_h_mm: f32,
    img_h_mm: f32,
    slice: u32,
) -> printpdf::ImageTransform {
    let translate_y = (slice + 1) as f32 * sheet_h_mm - img_h_mm;
    printpdf::ImageTransform {
        translate_x: Some(printpdf::Mm(0.0)),
        translate_y: Some(printpdf::Mm(translate_y)),
        dpi: Some(dpi),
        ..Default::default()
    }
}

/// Number of sheets a raster of `raster_height` units spans when each
/// sheet holds `sheet_height` units.
///
/// A raster overhanging a sheet boundary by less than half a unit does
/// not spill onto an extra sheet, so rounding fuzz from the px-to-mm
/// conversion cannot produce a near-empty trailing sheet.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sheet_count(raster_height: f32, sheet_height: f32) -> u32 {
    if sheet_height <= 0.0 || raster_height <= 0.0 {
        return 0;
    }
    ((raster_height - 0.5) / sheet_height).ceil().max(1.0) as u32
}
