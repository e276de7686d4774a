//! # Designer Core
//!
//! Core engine for the multi-page document template designer: the
//! document/element data model, snapshot-based undo/redo history, the
//! pointer-driven transform engine and template-field binding.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               EditorSession                 │
//! ├──────────────────────┬──────────────────────┤
//! │  Document            │  History             │
//! │  - Pages             │  - Snapshots         │
//! │  - Elements          │  - Cursor            │
//! │  - Template settings │                      │
//! ├──────────────────────┼──────────────────────┤
//! │  Transform Engine    │  Template Binder     │
//! │  - Move/resize/rotate│  - Bound fields      │
//! │  - Z-order, groups   │  - Edit-mode locking │
//! │  - Guides, snapping  │                      │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! Selection and guides are view state owned by the session; they never
//! enter history snapshots or exported output.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod element;
pub mod error;
pub mod guide;
pub mod history;
pub mod page;
pub mod session;
pub mod template;
pub mod transform;

pub use document::{Document, SavedTemplate, TemplateSettings};
pub use element::{
    Element, ElementId, ElementKind, ImageFit, LinkId, Shadow, ShapeKind, ShapeStyle,
    TemplateField, TemplateFieldType, TextAlign, TextStyle, MIN_ELEMENT_SIZE,
};
pub use error::{DesignError, DesignResult};
pub use guide::{Guide, GuideAxis, GuideId, RULER_BAND};
pub use history::{History, Snapshot};
pub use page::{
    Background, BackgroundFilters, BackgroundImage, ColorMode, Orientation, Page, PageDetails,
    PageId, Unit,
};
pub use session::{EditorSession, KeyModifiers, Selection, ShortcutAction};
pub use template::BoundField;
pub use transform::{
    HandleGesture, Rect, ResizeHandle, DUPLICATE_OFFSET, GUIDE_SNAP_DISTANCE, HANDLE_GRAB_RADIUS,
    ROTATION_HANDLE_OFFSET,
};

/// Designer core version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
