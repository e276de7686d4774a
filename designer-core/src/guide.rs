//! Ruler guides - non-owning alignment lines used only while editing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Guides dragged into this band next to the ruler origin are deleted.
pub const RULER_BAND: f32 = 10.0;

/// Unique identifier for a guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuideId(Uuid);

impl GuideId {
    /// Create a new unique guide ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GuideId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GuideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis of a ruler guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideAxis {
    /// A horizontal line at a fixed y position.
    Horizontal,
    /// A vertical line at a fixed x position.
    Vertical,
}

/// An alignment line with a single pixel coordinate.
///
/// Guides are an editing aid only: they never move element data and are
/// never serialized into exported output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    /// Unique identifier.
    pub id: GuideId,
    /// Axis of the line.
    pub axis: GuideAxis,
    /// The single coordinate: y for horizontal, x for vertical.
    pub position: f32,
}

impl Guide {
    /// Create a new guide on the given axis.
    #[must_use]
    pub fn new(axis: GuideAxis, position: f32) -> Self {
        Self {
            id: GuideId::new(),
            axis,
            position,
        }
    }
}
