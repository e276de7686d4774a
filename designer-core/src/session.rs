//! The editor session - explicit owner of document, history and view state.
//!
//! There is no global store: every surface that edits a document holds a
//! `&mut EditorSession`, so independent sessions (e.g. multiple open
//! tabs) can coexist and tests construct sessions freely.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::element::ElementId;
use crate::guide::Guide;
use crate::history::History;

/// Keyboard modifiers, as reported by the hosting surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// The primary shortcut modifier: ctrl on most platforms, meta on macOS.
    #[must_use]
    pub fn primary(self) -> bool {
        self.ctrl || self.meta
    }
}

/// What a keyboard event resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// History stepped back.
    Undo,
    /// History stepped forward.
    Redo,
    /// The key was not a recognized shortcut.
    None,
}

/// Currently selected elements on the current page.
///
/// Selection is view state: it never enters history snapshots and is
/// cleared by undo/redo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// The element a single-select gesture landed on, if any.
    pub primary: Option<ElementId>,
    /// All selected element IDs, primary included.
    pub ids: Vec<ElementId>,
}

impl Selection {
    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of selected elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the given element is selected.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    fn clear(&mut self) {
        self.primary = None;
        self.ids.clear();
    }
}

/// An editing session over one document.
#[derive(Debug)]
pub struct EditorSession {
    /// The live document.
    pub document: Document,
    /// Undo/redo history.
    pub history: History,
    /// Current selection (view state).
    pub selection: Selection,
    /// Ruler guides (view state, per session).
    pub guides: Vec<Guide>,
    /// When set, only bound template fields are editable.
    pub template_edit_mode: bool,
    /// When set, drags reposition the page background image instead of
    /// moving elements.
    pub background_reposition: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl EditorSession {
    /// Start a session over the given document.
    ///
    /// The document's initial state is seeded into the history so the
    /// first edit is undoable.
    #[must_use]
    pub fn new(document: Document) -> Self {
        let history = History::new(&document);
        Self {
            document,
            history,
            selection: Selection::default(),
            guides: Vec::new(),
            template_edit_mode: false,
            background_reposition: false,
        }
    }

    /// Commit the current live state as one undo step.
    ///
    /// Call this at logically-complete edit boundaries (mouse-up of a
    /// drag, confirm of a property edit) rather than per pointer-move,
    /// so one gesture produces one undo step.
    pub fn commit(&mut self) {
        self.history.commit(&self.document);
    }

    /// Undo the last committed edit. Returns false if there was nothing
    /// to undo. Clears the selection.
    pub fn undo(&mut self) -> bool {
        match self.history.undo().cloned() {
            Some(snapshot) => {
                snapshot.restore_into(&mut self.document);
                self.selection.clear();
                tracing::debug!("Undo applied");
                true
            }
            None => false,
        }
    }

    /// Redo the last undone edit. Returns false if there was nothing to
    /// redo. Clears the selection.
    pub fn redo(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(snapshot) => {
                snapshot.restore_into(&mut self.document);
                self.selection.clear();
                tracing::debug!("Redo applied");
                true
            }
            None => false,
        }
    }

    /// Resolve a key press against the editor shortcuts.
    ///
    /// Primary modifier + `z` undoes; primary modifier + shift + `z`
    /// redoes. Other keys are ignored.
    pub fn handle_key(&mut self, key: &str, modifiers: KeyModifiers) -> ShortcutAction {
        if !modifiers.primary() || !key.eq_ignore_ascii_case("z") {
            return ShortcutAction::None;
        }
        if modifiers.shift {
            self.redo();
            ShortcutAction::Redo
        } else {
            self.undo();
            ShortcutAction::Undo
        }
    }

    /// Select a single element, replacing the current selection.
    pub fn select(&mut self, id: ElementId) {
        self.selection.primary = Some(id);
        self.selection.ids = vec![id];
    }

    /// Add or remove an element from a multi-selection.
    pub fn toggle_select(&mut self, id: ElementId) {
        if let Some(pos) = self.selection.ids.iter().position(|&e| e == id) {
            self.selection.ids.remove(pos);
            if self.selection.primary == Some(id) {
                self.selection.primary = self.selection.ids.first().copied();
            }
        } else {
            self.selection.ids.push(id);
            if self.selection.primary.is_none() {
                self.selection.primary = Some(id);
            }
        }
    }

    /// Clear the selection.
    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }
}
