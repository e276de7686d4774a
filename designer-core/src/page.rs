//! Pages - the design surfaces that own elements and page-level settings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::TemplateSettings;
use crate::{Element, ElementId};

/// Unique identifier for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(Uuid);

impl PageId {
    /// Create a new unique page ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical unit of the page dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Inches.
    In,
    /// Centimeters.
    Cm,
    /// Pixels (ppi is ignored).
    Px,
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Height >= width.
    Portrait,
    /// Width > height.
    Landscape,
}

/// Color mode metadata. Descriptive only; no color conversion is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Red/green/blue.
    Rgb,
    /// Cyan/magenta/yellow/key.
    Cmyk,
    /// Single channel.
    Grayscale,
}

/// CSS-like filter stack applied to a background image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundFilters {
    /// Blur radius in pixels.
    pub blur: f32,
    /// Grayscale amount, 0-100.
    pub grayscale: f32,
    /// Brightness percentage, 100 = unchanged.
    pub brightness: f32,
    /// Contrast percentage, 100 = unchanged.
    pub contrast: f32,
    /// Saturation percentage, 100 = unchanged.
    pub saturation: f32,
}

impl Default for BackgroundFilters {
    fn default() -> Self {
        Self {
            blur: 0.0,
            grayscale: 0.0,
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
        }
    }
}

/// An image layer behind the page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    /// Image source URI or base64 data.
    pub src: String,
    /// Horizontal offset in page units.
    pub offset_x: f32,
    /// Vertical offset in page units.
    pub offset_y: f32,
    /// Scale factor, 1.0 = natural size.
    pub scale: f32,
    /// Opacity 0.0 to 1.0.
    pub opacity: f32,
    /// Filter stack.
    pub filters: BackgroundFilters,
}

impl BackgroundImage {
    /// Create a background image layer at natural size and full opacity.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            opacity: 1.0,
            filters: BackgroundFilters::default(),
        }
    }
}

/// Page background: a solid color and an optional image layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    /// Solid color as hex.
    pub color: String,
    /// Optional image layer painted over the color.
    pub image: Option<BackgroundImage>,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            image: None,
        }
    }
}

/// Page-level settings: dimensions, background, color metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDetails {
    /// Page width in `unit`.
    pub width: f32,
    /// Page height in `unit`.
    pub height: f32,
    /// Unit of width/height.
    pub unit: Unit,
    /// Pixels per inch, used when `unit` is not [`Unit::Px`].
    pub ppi: f32,
    /// Orientation, kept consistent with width/height.
    pub orientation: Orientation,
    /// Background color and optional image layer.
    pub background: Background,
    /// Color mode metadata (not enforced numerically).
    pub color_mode: ColorMode,
    /// Bit depth metadata.
    pub bit_depth: u8,
    /// Template settings stamped at save time, so a saved template's
    /// pages are self-describing independent of editor state.
    pub template: Option<TemplateSettings>,
}

impl Default for PageDetails {
    /// US Letter portrait at 96 ppi.
    fn default() -> Self {
        Self {
            width: 8.5,
            height: 11.0,
            unit: Unit::In,
            ppi: 96.0,
            orientation: Orientation::Portrait,
            background: Background::default(),
            color_mode: ColorMode::Rgb,
            bit_depth: 8,
            template: None,
        }
    }
}

impl PageDetails {
    /// Effective pixel resolution of the page.
    ///
    /// `px` dimensions pass through directly; physical units convert to
    /// inches first (`cm` via / 2.54) and then multiply by `ppi`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_resolution(&self) -> (u32, u32) {
        let (w, h) = match self.unit {
            Unit::Px => (self.width, self.height),
            Unit::In => (self.width * self.ppi, self.height * self.ppi),
            Unit::Cm => (self.width / 2.54 * self.ppi, self.height / 2.54 * self.ppi),
        };
        ((w.round() as u32).max(1), (h.round() as u32).max(1))
    }

    /// Effective dots-per-inch of the pixel resolution.
    #[must_use]
    pub fn effective_dpi(&self) -> f32 {
        match self.unit {
            Unit::Px => 96.0,
            Unit::In | Unit::Cm => self.ppi,
        }
    }

    /// Change orientation, swapping width/height iff the aspect is
    /// actually being flipped. Square pages never swap.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        let current = if self.width > self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        if current != orientation && (self.width - self.height).abs() > f32::EPSILON {
            std::mem::swap(&mut self.width, &mut self.height);
        }
        self.orientation = orientation;
    }
}

/// One design surface: an ordered sequence of elements plus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier.
    pub id: PageId,
    /// Elements in insertion order; paint order is by z-index.
    pub elements: Vec<Element>,
    /// Page-level settings.
    pub details: PageDetails,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(PageDetails::default())
    }
}

impl Page {
    /// Create an empty page with the given settings.
    #[must_use]
    pub fn new(details: PageDetails) -> Self {
        Self {
            id: PageId::new(),
            elements: Vec::new(),
            details,
        }
    }

    /// Stable name identifying this page in a rendering surface.
    #[must_use]
    pub fn render_target(&self) -> String {
        format!("page-{}", self.id)
    }

    /// Get an element by ID.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Index of an element in the storage order.
    #[must_use]
    pub fn element_index(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Elements sorted by paint order (z-index ascending, ties by
    /// insertion order).
    #[must_use]
    pub fn elements_by_paint_order(&self) -> Vec<&Element> {
        let mut ordered: Vec<&Element> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.z_index);
        ordered
    }

    /// Highest z-index on the page, if any elements exist.
    #[must_use]
    pub fn max_z_index(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.z_index).max()
    }

    /// Lowest z-index on the page, if any elements exist.
    #[must_use]
    pub fn min_z_index(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.z_index).min()
    }

    /// Number of elements on the page.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_resolution_px_passthrough() {
        let details = PageDetails {
            width: 800.0,
            height: 600.0,
            unit: Unit::Px,
            ppi: 300.0,
            ..Default::default()
        };
        assert_eq!(details.pixel_resolution(), (800, 600));
    }

    #[test]
    fn test_pixel_resolution_inches() {
        let details = PageDetails {
            width: 8.5,
            height: 11.0,
            unit: Unit::In,
            ppi: 100.0,
            ..Default::default()
        };
        assert_eq!(details.pixel_resolution(), (850, 1100));
    }

    #[test]
    fn test_pixel_resolution_cm() {
        let details = PageDetails {
            width: 2.54,
            height: 5.08,
            unit: Unit::Cm,
            ppi: 96.0,
            ..Default::default()
        };
        assert_eq!(details.pixel_resolution(), (96, 192));
    }

    #[test]
    fn test_orientation_swap_once() {
        let mut details = PageDetails {
            width: 8.5,
            height: 11.0,
            orientation: Orientation::Portrait,
            ..Default::default()
        };

        details.set_orientation(Orientation::Landscape);
        assert!((details.width - 11.0).abs() < f32::EPSILON);
        assert!((details.height - 8.5).abs() < f32::EPSILON);

        // Setting the same orientation again must not double-swap.
        details.set_orientation(Orientation::Landscape);
        assert!((details.width - 11.0).abs() < f32::EPSILON);
        assert!((details.height - 8.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_orientation_square_never_swaps() {
        let mut details = PageDetails {
            width: 10.0,
            height: 10.0,
            ..Default::default()
        };
        details.set_orientation(Orientation::Landscape);
        assert!((details.width - 10.0).abs() < f32::EPSILON);
        assert!((details.height - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_render_target_is_stable() {
        let page = Page::default();
        assert_eq!(page.render_target(), page.render_target());
        assert!(page.render_target().starts_with("page-"));
    }

    #[test]
    fn test_paint_order_sorts_by_z() {
        use crate::element::{Element, ElementKind};

        let mut page = Page::default();
        let top = Element::new(ElementKind::Group { children: vec![] }).with_z_index(5);
        let bottom = Element::new(ElementKind::Group { children: vec![] }).with_z_index(-1);
        let top_id = top.id;
        page.elements.push(top);
        page.elements.push(bottom);

        let ordered = page.elements_by_paint_order();
        assert_eq!(ordered.last().map(|e| e.id), Some(top_id));
    }
}
