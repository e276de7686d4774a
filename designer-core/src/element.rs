//! Canvas elements - the positioned visual units of a page.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum width and height of an element, in page units.
///
/// Resize operations clamp to this floor instead of failing.
pub const MIN_ELEMENT_SIZE: f32 = 20.0;

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier shared by linked elements that move together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkId(Uuid);

impl LinkId {
    /// Create a new unique link ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LinkId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Align to the left edge.
    Left,
    /// Center horizontally.
    Center,
    /// Align to the right edge.
    Right,
}

/// Style properties for text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font family name.
    pub font_family: String,
    /// Font size in page units.
    pub font_size: f32,
    /// Text color as hex.
    pub color: String,
    /// Bold weight.
    pub bold: bool,
    /// Italic style.
    pub italic: bool,
    /// Horizontal alignment.
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 16.0,
            color: "#000000".to_string(),
            bold: false,
            italic: false,
            align: TextAlign::Left,
        }
    }
}

/// How an image is fitted into its element bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    /// Stretch to fill the bounds.
    Fill,
    /// Scale to fit entirely within the bounds.
    Contain,
    /// Scale to cover the bounds, cropping overflow.
    Cover,
}

/// Axis-aligned shape primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Rectangle, optionally with rounded corners.
    Rectangle,
    /// Ellipse inscribed in the element bounds.
    Ellipse,
}

/// Drop shadow parameters for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    /// Horizontal offset in page units.
    pub offset_x: f32,
    /// Vertical offset in page units.
    pub offset_y: f32,
    /// Blur radius in page units.
    pub blur: f32,
    /// Shadow color as hex.
    pub color: String,
}

/// Style properties for shape elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Fill color as hex.
    pub fill: String,
    /// Stroke color as hex.
    pub stroke: String,
    /// Stroke width in page units (0 disables the stroke).
    pub stroke_width: f32,
    /// Corner radius in page units (rectangles only).
    pub corner_radius: f32,
    /// Optional drop shadow.
    pub shadow: Option<Shadow>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: "#cccccc".to_string(),
            stroke: "#000000".to_string(),
            stroke_width: 0.0,
            corner_radius: 0.0,
            shadow: None,
        }
    }
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ElementKind {
    /// A text run.
    Text {
        /// Text content.
        content: String,
        /// Text styling.
        style: TextStyle,
    },

    /// A raster image.
    Image {
        /// Image source URI or base64 data.
        src: String,
        /// Fit mode within the element bounds.
        fit: ImageFit,
        /// Opacity 0.0 to 1.0.
        opacity: f32,
    },

    /// An axis-aligned shape primitive.
    Shape {
        /// Shape primitive.
        shape: ShapeKind,
        /// Shape styling.
        style: ShapeStyle,
    },

    /// A container that owns child elements.
    ///
    /// Children are positioned relative to the group's origin so the
    /// whole group moves as one unit.
    Group {
        /// Owned child elements.
        children: Vec<Element>,
    },
}

/// The role a bound template field plays on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFieldType {
    /// Company or brand logo.
    Logo,
    /// Page background slot.
    Background,
    /// Header region.
    Header,
    /// Footer region.
    Footer,
    /// Generic image placeholder.
    Image,
    /// Generic text placeholder.
    Text,
}

/// Template binding attributes for a placeholder element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    /// Placeholder role.
    pub field_type: TemplateFieldType,
    /// Placeholder name, unique per page by convention.
    pub name: String,
}

/// A positioned visual unit on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier, stable for the element's lifetime.
    pub id: ElementId,
    /// Element content.
    pub kind: ElementKind,
    /// Left edge, page-local units.
    pub x: f32,
    /// Top edge, page-local units.
    pub y: f32,
    /// Width, always >= [`MIN_ELEMENT_SIZE`].
    pub width: f32,
    /// Height, always >= [`MIN_ELEMENT_SIZE`].
    pub height: f32,
    /// Rotation in degrees. Unbounded at rest; read via
    /// [`Element::normalized_rotation`] for rendering.
    pub rotation: f32,
    /// Stacking order; higher paints later (on top). Not contiguous.
    pub z_index: i32,
    /// Template binding, if this element is a placeholder.
    pub template_field: Option<TemplateField>,
    /// Link membership; linked elements move together.
    pub link_id: Option<LinkId>,
}

impl Element {
    /// Create a new element with the given kind and default geometry.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            z_index: 0,
            template_field: None,
            link_id: None,
        }
    }

    /// Set position and size.
    #[must_use]
    pub fn with_geometry(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.x = x;
        self.y = y;
        self.width = width.max(MIN_ELEMENT_SIZE);
        self.height = height.max(MIN_ELEMENT_SIZE);
        self
    }

    /// Set the stacking order.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Rotation normalized into `[0, 360)` degrees.
    ///
    /// The stored value is left unbounded (a drag can wind past ±360);
    /// renderers and property panels read this instead.
    #[must_use]
    pub fn normalized_rotation(&self) -> f32 {
        self.rotation.rem_euclid(360.0)
    }

    /// Center point of the element bounds.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point (in page coordinates) is within the unrotated bounds.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Whether this element is a bound template field.
    #[must_use]
    pub fn is_template_field(&self) -> bool {
        self.template_field.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_floor_applied_on_build() {
        let e = Element::new(ElementKind::Shape {
            shape: ShapeKind::Rectangle,
            style: ShapeStyle::default(),
        })
        .with_geometry(10.0, 10.0, 5.0, 1.0);

        assert!((e.width - MIN_ELEMENT_SIZE).abs() < f32::EPSILON);
        assert!((e.height - MIN_ELEMENT_SIZE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_normalized_rotation_wraps() {
        let mut e = Element::new(ElementKind::Text {
            content: "r".to_string(),
            style: TextStyle::default(),
        });

        e.rotation = 725.0;
        assert!((e.normalized_rotation() - 5.0).abs() < 1e-4);

        e.rotation = -90.0;
        assert!((e.normalized_rotation() - 270.0).abs() < 1e-4);
    }

    #[test]
    fn test_contains_point() {
        let e = Element::new(ElementKind::Shape {
            shape: ShapeKind::Ellipse,
            style: ShapeStyle::default(),
        })
        .with_geometry(100.0, 100.0, 50.0, 50.0);

        assert!(e.contains_point(125.0, 125.0));
        assert!(!e.contains_point(50.0, 50.0));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Element::new(ElementKind::Group { children: vec![] });
        let b = Element::new(ElementKind::Group { children: vec![] });
        assert_ne!(a.id, b.id);
    }
}
