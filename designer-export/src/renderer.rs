//! The page renderer contract and the built-in SVG-intermediate renderer.
//!
//! The export pipeline only depends on [`PageRenderer`]: an opaque
//! capability that turns one laid-out page into a bitmap. The bundled
//! [`SvgPageRenderer`] composes the page as an SVG string and rasterizes
//! it with the resvg/tiny-skia pipeline.

use std::collections::HashSet;
use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use designer_core::{
    BackgroundFilters, Element, ElementKind, ImageFit, Page, ShapeKind, TextAlign,
};
use image::RgbaImage;

use crate::error::{ExportError, ExportResult};

/// Rasterizes one page of a document.
///
/// Rasterization is a suspension point: implementations may hand the
/// page off to an external rendering surface. The pipeline awaits pages
/// strictly one at a time. Implementations must fail with
/// [`ExportError::RenderTargetNotFound`] when the page's render target
/// cannot be located in the surface.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Rasterize a page at the given upscaling factor.
    ///
    /// # Errors
    ///
    /// Returns an error if the render target is missing or rendering
    /// fails.
    async fn rasterize(&self, page: &Page, scale: f32) -> ExportResult<RgbaImage>;
}

/// Built-in renderer: page -> SVG intermediate -> resvg raster.
///
/// Renders against a detached copy of the page data only; the live
/// document is never touched. When a registered-target set is attached
/// (mirroring a surface that mounted specific page roots), pages outside
/// it fail with [`ExportError::RenderTargetNotFound`].
///
/// The renderer owns a font database loaded once at construction; usvg
/// drops text nodes it cannot resolve a face for, so rasterizing with
/// an empty database would silently erase every text element.
#[derive(Debug, Clone)]
pub struct SvgPageRenderer {
    registered: Option<HashSet<String>>,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Default for SvgPageRenderer {
    fn default() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        Self {
            registered: None,
            fontdb: Arc::new(fontdb),
        }
    }
}

impl SvgPageRenderer {
    /// Create a renderer that accepts every page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict rendering to a set of registered render targets.
    #[must_use]
    pub fn with_targets<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registered: Some(targets.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Compose a page into an SVG string at the given scale.
    ///
    /// The canvas extends below the page edge when content overflows it,
    /// so a tall page yields a raster taller than one output sheet.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn page_to_svg(page: &Page, scale: f32) -> String {
        let (page_w, page_h) = page.details.pixel_resolution();
        let view_w = page_w as f32;
        let mut view_h = page_h as f32;
        for element in &page.elements {
            view_h = view_h.max(element.y + element.height);
        }
        view_h = view_h.ceil();

        let out_w = (view_w * scale).round().max(1.0);
        let out_h = (view_h * scale).round().max(1.0);

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );

        let color = escape_xml(&page.details.background.color);
        let _ = write!(svg, "<rect width=\"100%\" height=\"100%\" fill=\"{color}\"/>");

        if let Some(image) = &page.details.background.image {
            let needs_filter = background_filter_svg(&mut svg, &image.filters);
            let src = escape_xml(&image.src);
            let w = view_w * image.scale;
            let h = page_h as f32 * image.scale;
            let filter_attr = if needs_filter {
                " filter=\"url(#bg-filters)\""
            } else {
                ""
            };
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{w}\" height=\"{h}\" opacity=\"{}\" preserveAspectRatio=\"xMidYMid slice\" href=\"{src}\"{filter_attr}/>",
                image.offset_x, image.offset_y, image.opacity,
            );
        }

        for element in page.elements_by_paint_order() {
            element_svg(&mut svg, element);
        }

        svg.push_str("</svg>");
        svg
    }

    /// Rasterize an SVG string to an RGBA image.
    ///
    /// # Errors
    ///
    /// Returns an error if SVG parsing or rasterization fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rasterize_svg(&self, svg: &str) -> ExportResult<RgbaImage> {
        let opt = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg, &opt)
            .map_err(|e| ExportError::Render(format!("SVG parsing failed: {e}")))?;

        let px_w = (tree.size().width() as u32).max(1);
        let px_h = (tree.size().height() as u32).max(1);

        let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h)
            .ok_or_else(|| ExportError::Render("Failed to create pixmap".to_string()))?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        // Round-trip through PNG to demultiply alpha.
        let png = pixmap
            .encode_png()
            .map_err(|e| ExportError::Render(format!("Pixmap encoding failed: {e}")))?;
        let decoded = image::load_from_memory(&png)
            .map_err(|e| ExportError::Render(format!("Pixmap decoding failed: {e}")))?;
        Ok(decoded.to_rgba8())
    }
}

#[async_trait]
impl PageRenderer for SvgPageRenderer {
    async fn rasterize(&self, page: &Page, scale: f32) -> ExportResult<RgbaImage> {
        let target = page.render_target();
        if let Some(registered) = &self.registered {
            if !registered.contains(&target) {
                return Err(ExportError::RenderTargetNotFound(target));
            }
        }
        tracing::debug!("Rasterizing {target} at {scale}x");
        let svg = Self::page_to_svg(page, scale);
        self.rasterize_svg(&svg)
    }
}

/// Emit a filter definition for non-neutral background filters.
/// Returns whether a filter was emitted.
fn background_filter_svg(svg: &mut String, filters: &BackgroundFilters) -> bool {
    let neutral = filters.blur <= 0.0
        && filters.grayscale <= 0.0
        && (filters.brightness - 100.0).abs() < f32::EPSILON
        && (filters.contrast - 100.0).abs() < f32::EPSILON
        && (filters.saturation - 100.0).abs() < f32::EPSILON;
    if neutral {
        return false;
    }

    svg.push_str("<filter id=\"bg-filters\">");
    if filters.blur > 0.0 {
        let _ = write!(svg, "<feGaussianBlur stdDeviation=\"{}\"/>", filters.blur);
    }
    let saturation = (filters.saturation / 100.0) * (1.0 - filters.grayscale / 100.0).max(0.0);
    if (saturation - 1.0).abs() > f32::EPSILON {
        let _ = write!(svg, "<feColorMatrix type=\"saturate\" values=\"{saturation}\"/>");
    }
    let brightness = filters.brightness / 100.0;
    let contrast = filters.contrast / 100.0;
    if (brightness - 1.0).abs() > f32::EPSILON || (contrast - 1.0).abs() > f32::EPSILON {
        let slope = brightness * contrast;
        let intercept = 0.5 - 0.5 * contrast * brightness;
        svg.push_str("<feComponentTransfer>");
        for channel in ["R", "G", "B"] {
            let _ = write!(
                svg,
                "<feFunc{channel} type=\"linear\" slope=\"{slope}\" intercept=\"{intercept}\"/>",
            );
        }
        svg.push_str("</feComponentTransfer>");
    }
    svg.push_str("</filter>");
    true
}

/// Render one element (and its children) into the SVG string.
fn element_svg(svg: &mut String, element: &Element) {
    let rotation = element.normalized_rotation();
    let rotated = rotation.abs() > f32::EPSILON;
    if rotated {
        let (cx, cy) = element.center();
        let _ = write!(svg, "<g transform=\"rotate({rotation} {cx} {cy})\">");
    }

    match &element.kind {
        ElementKind::Text { content, style } => {
            let escaped = escape_xml(content);
            let color = escape_xml(&style.color);
            let family = escape_xml(&style.font_family);
            let weight = if style.bold { "bold" } else { "normal" };
            let font_style = if style.italic { "italic" } else { "normal" };
            let (anchor, text_x) = match style.align {
                TextAlign::Left => ("start", element.x),
                TextAlign::Center => ("middle", element.x + element.width / 2.0),
                TextAlign::Right => ("end", element.x + element.width),
            };
            let text_y = element.y + style.font_size;
            let _ = write!(
                svg,
                "<text x=\"{text_x}\" y=\"{text_y}\" font-size=\"{}\" fill=\"{color}\" font-family=\"{family}\" font-weight=\"{weight}\" font-style=\"{font_style}\" text-anchor=\"{anchor}\">{escaped}</text>",
                style.font_size,
            );
        }

        ElementKind::Image { src, fit, opacity } => {
            let src = escape_xml(src);
            let preserve = match fit {
                ImageFit::Fill => "none",
                ImageFit::Contain => "xMidYMid meet",
                ImageFit::Cover => "xMidYMid slice",
            };
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" opacity=\"{opacity}\" preserveAspectRatio=\"{preserve}\" href=\"{src}\"/>",
                element.x, element.y, element.width, element.height,
            );
        }

        ElementKind::Shape { shape, style } => {
            let fill = escape_xml(&style.fill);
            let stroke = escape_xml(&style.stroke);
            let mut shadow_attr = String::new();
            if let Some(shadow) = &style.shadow {
                let id = format!("shadow-{}", element.id);
                let color = escape_xml(&shadow.color);
                let _ = write!(
                    svg,
                    "<filter id=\"{id}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\"><feDropShadow dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{color}\"/></filter>",
                    shadow.offset_x, shadow.offset_y, shadow.blur,
                );
                shadow_attr = format!(" filter=\"url(#{id})\"");
            }
            let stroke_attr = if style.stroke_width > 0.0 {
                format!(" stroke=\"{stroke}\" stroke-width=\"{}\"", style.stroke_width)
            } else {
                String::new()
            };
            match shape {
                ShapeKind::Rectangle => {
                    let _ = write!(
                        svg,
                        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" fill=\"{fill}\"{stroke_attr}{shadow_attr}/>",
                        element.x, element.y, element.width, element.height, style.corner_radius,
                    );
                }
                ShapeKind::Ellipse => {
                    let (cx, cy) = element.center();
                    let _ = write!(
                        svg,
                        "<ellipse cx=\"{cx}\" cy=\"{cy}\" rx=\"{}\" ry=\"{}\" fill=\"{fill}\"{stroke_attr}{shadow_attr}/>",
                        element.width / 2.0,
                        element.height / 2.0,
                    );
                }
            }
        }

        ElementKind::Group { children } => {
            let _ = write!(svg, "<g transform=\"translate({},{})\">", element.x, element.y);
            let mut ordered: Vec<&Element> = children.iter().collect();
            ordered.sort_by_key(|c| c.z_index);
            for child in ordered {
                element_svg(svg, child);
            }
            svg.push_str("</g>");
        }
    }

    if rotated {
        svg.push_str("</g>");
    }
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use designer_core::{PageDetails, ShapeStyle, TextStyle, Unit};

    fn px_page(width: f32, height: f32) -> Page {
        Page::new(PageDetails {
            width,
            height,
            unit: Unit::Px,
            ..Default::default()
        })
    }

    fn text(content: &str, x: f32, y: f32) -> Element {
        Element::new(ElementKind::Text {
            content: content.to_string(),
            style: TextStyle::default(),
        })
        .with_geometry(x, y, 150.0, 20.0)
    }

    #[test]
    fn test_svg_covers_page_dimensions() {
        let page = px_page(400.0, 300.0);
        let svg = SvgPageRenderer::page_to_svg(&page, 1.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"400\""));
        assert!(svg.contains("height=\"300\""));
    }

    #[test]
    fn test_svg_scale_keeps_viewbox() {
        let page = px_page(200.0, 100.0);
        let svg = SvgPageRenderer::page_to_svg(&page, 2.0);
        assert!(svg.contains("width=\"400\""));
        assert!(svg.contains("height=\"200\""));
        assert!(svg.contains("viewBox=\"0 0 200 100\""));
    }

    #[test]
    fn test_svg_extends_for_overflowing_content() {
        let mut page = px_page(200.0, 100.0);
        page.elements.push(text("tall", 10.0, 380.0));
        let svg = SvgPageRenderer::page_to_svg(&page, 1.0);
        assert!(svg.contains("height=\"400\""));
    }

    #[test]
    fn test_svg_escapes_text() {
        let mut page = px_page(200.0, 100.0);
        page.elements.push(text("A < B & C", 10.0, 10.0));
        let svg = SvgPageRenderer::page_to_svg(&page, 1.0);
        assert!(svg.contains("A &lt; B &amp; C"));
    }

    #[test]
    fn test_rotation_emits_transform() {
        let mut page = px_page(200.0, 200.0);
        let mut element = text("spin", 50.0, 50.0);
        element.rotation = 450.0;
        page.elements.push(element);
        let svg = SvgPageRenderer::page_to_svg(&page, 1.0);
        // Unbounded storage, normalized on render.
        assert!(svg.contains("rotate(90"));
    }

    #[test]
    fn test_shape_with_shadow_and_radius() {
        let mut page = px_page(200.0, 200.0);
        let element = Element::new(ElementKind::Shape {
            shape: ShapeKind::Rectangle,
            style: ShapeStyle {
                corner_radius: 8.0,
                shadow: Some(designer_core::Shadow {
                    offset_x: 2.0,
                    offset_y: 2.0,
                    blur: 4.0,
                    color: "#00000088".to_string(),
                }),
                ..Default::default()
            },
        })
        .with_geometry(20.0, 20.0, 100.0, 60.0);
        page.elements.push(element);

        let svg = SvgPageRenderer::page_to_svg(&page, 1.0);
        assert!(svg.contains("rx=\"8\""));
        assert!(svg.contains("feDropShadow"));
    }

    #[test]
    fn test_background_filters_emitted_when_not_neutral() {
        let mut page = px_page(100.0, 100.0);
        let mut bg = designer_core::BackgroundImage::new("bg.png");
        bg.filters.blur = 3.0;
        page.details.background.image = Some(bg);
        let svg = SvgPageRenderer::page_to_svg(&page, 1.0);
        assert!(svg.contains("feGaussianBlur"));
        assert!(svg.contains("url(#bg-filters)"));
    }

    #[test]
    fn test_neutral_background_filters_omitted() {
        let mut page = px_page(100.0, 100.0);
        page.details.background.image = Some(designer_core::BackgroundImage::new("bg.png"));
        let svg = SvgPageRenderer::page_to_svg(&page, 1.0);
        assert!(!svg.contains("<filter id=\"bg-filters\""));
    }

    #[tokio::test]
    async fn test_text_leaves_visible_pixels() {
        let mut page = px_page(200.0, 100.0);
        page.elements.push(text("INVOICE", 20.0, 30.0));
        let renderer = SvgPageRenderer::new();
        let raster = renderer.rasterize(&page, 1.0).await.expect("rasterize");

        // Default text is black on the white default background.
        let ink = raster.pixels().filter(|p| p[0] < 128).count();
        assert!(ink > 0, "text element left no visible pixels");
    }

    #[tokio::test]
    async fn test_rasterize_produces_page_sized_image() {
        let page = px_page(120.0, 80.0);
        let renderer = SvgPageRenderer::new();
        let raster = renderer.rasterize(&page, 1.0).await.expect("rasterize");
        assert_eq!(raster.width(), 120);
        assert_eq!(raster.height(), 80);
    }

    #[tokio::test]
    async fn test_unregistered_target_fails() {
        let page = px_page(100.0, 100.0);
        let renderer = SvgPageRenderer::with_targets(["page-other"]);
        let result = renderer.rasterize(&page, 1.0).await;
        assert!(matches!(result, Err(ExportError::RenderTargetNotFound(_))));
    }

    #[tokio::test]
    async fn test_registered_target_renders() {
        let page = px_page(100.0, 100.0);
        let renderer = SvgPageRenderer::with_targets([page.render_target()]);
        assert!(renderer.rasterize(&page, 1.0).await.is_ok());
    }
}
