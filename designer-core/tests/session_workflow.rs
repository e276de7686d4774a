//! Editor Session Workflow Tests
//!
//! Tests complete editing flows across the session surface:
//! - Build-edit-undo-redo cycles spanning multiple operations
//! - Multi-page documents and page-level settings
//! - Template binding, edit-mode locking and save-as-template
//! - Serialization of a fully edited document

use designer_core::{
    Document, EditorSession, Element, ElementKind, GuideAxis, ImageFit, KeyModifiers, Page,
    PageDetails, ResizeHandle, ShapeKind, ShapeStyle, ShortcutAction, TemplateFieldType,
    TextStyle, Unit, MIN_ELEMENT_SIZE,
};

/// Create a rectangle shape element at the given geometry.
fn rect(x: f32, y: f32, w: f32, h: f32) -> Element {
    Element::new(ElementKind::Shape {
        shape: ShapeKind::Rectangle,
        style: ShapeStyle::default(),
    })
    .with_geometry(x, y, w, h)
}

/// Create a text element with the given content.
fn text(content: &str) -> Element {
    Element::new(ElementKind::Text {
        content: content.to_string(),
        style: TextStyle::default(),
    })
}

/// Create an image element with the given source.
fn image(src: &str) -> Element {
    Element::new(ElementKind::Image {
        src: src.to_string(),
        fit: ImageFit::Contain,
        opacity: 1.0,
    })
}

// ============================================================================
// Edit-Undo-Redo Workflow Tests
// ============================================================================

#[test]
fn test_full_edit_cycle_walks_back_step_by_step() {
    let mut session = EditorSession::default();

    let a = session.add_element(rect(10.0, 10.0, 100.0, 50.0));
    session.add_element(text("Title"));
    session.move_element(a, 30.0, 0.0).expect("exists");
    session.commit();
    session.delete_element(a).expect("exists");

    assert_eq!(session.document.current_page().element_count(), 1);

    // Undo the delete.
    assert!(session.undo());
    let page = session.document.current_page();
    assert_eq!(page.element_count(), 2);
    assert!((page.element(a).expect("restored").x - 40.0).abs() < 1e-4);

    // Undo the move.
    assert!(session.undo());
    assert!(
        (session
            .document
            .current_page()
            .element(a)
            .expect("exists")
            .x
            - 10.0)
            .abs()
            < 1e-4
    );

    // Undo both adds back to the seeded empty page.
    assert!(session.undo());
    assert!(session.undo());
    assert_eq!(session.document.current_page().element_count(), 0);
    assert!(!session.history.can_undo());

    // Redo everything forward again.
    while session.redo() {}
    assert_eq!(session.document.current_page().element_count(), 1);
}

#[test]
fn test_drag_gesture_is_one_undo_step() {
    let mut session = EditorSession::default();
    let id = session.add_element(rect(0.0, 0.0, 100.0, 100.0));

    // Many pointer-moves, one commit on mouse-up.
    for _ in 0..10 {
        session.move_element(id, 5.0, 0.0).expect("exists");
    }
    session.commit();

    assert!(session.undo());
    let element = session.document.current_page().element(id).expect("exists");
    assert!(element.x.abs() < 1e-4);
}

#[test]
fn test_resize_below_floor_then_undo() {
    let mut session = EditorSession::default();
    let id = session.add_element(rect(50.0, 50.0, 200.0, 200.0));

    session
        .resize_element(id, ResizeHandle::BottomRight, -500.0, -500.0)
        .expect("exists");
    session.commit();

    let element = session.document.current_page().element(id).expect("exists");
    assert!((element.width - MIN_ELEMENT_SIZE).abs() < f32::EPSILON);

    assert!(session.undo());
    let element = session.document.current_page().element(id).expect("exists");
    assert!((element.width - 200.0).abs() < 1e-4);
}

#[test]
fn test_keyboard_shortcuts_drive_history() {
    let mut session = EditorSession::default();
    session.add_element(text("keyboard"));

    let meta = KeyModifiers {
        meta: true,
        ..Default::default()
    };
    assert_eq!(session.handle_key("z", meta), ShortcutAction::Undo);
    assert_eq!(session.document.current_page().element_count(), 0);

    let meta_shift = KeyModifiers {
        meta: true,
        shift: true,
        ..Default::default()
    };
    assert_eq!(session.handle_key("z", meta_shift), ShortcutAction::Redo);
    assert_eq!(session.document.current_page().element_count(), 1);
}

// ============================================================================
// Multi-Page Workflow Tests
// ============================================================================

#[test]
fn test_pages_edit_independently() {
    let mut session = EditorSession::default();
    session.add_element(rect(0.0, 0.0, 50.0, 50.0));

    session.document.add_page(Page::default());
    session.commit();
    assert_eq!(session.document.current_page_index, 1);

    session.add_element(text("second page"));
    assert_eq!(session.document.current_page().element_count(), 1);
    assert_eq!(session.document.pages()[0].element_count(), 1);

    // Undo the add on page two; page one is untouched.
    assert!(session.undo());
    assert_eq!(session.document.current_page().element_count(), 0);
    assert_eq!(session.document.pages()[0].element_count(), 1);
}

#[test]
fn test_page_removal_is_undoable() {
    let mut session = EditorSession::default();
    session.document.add_page(Page::new(PageDetails {
        width: 800.0,
        height: 600.0,
        unit: Unit::Px,
        ..Default::default()
    }));
    session.commit();
    assert_eq!(session.document.page_count(), 2);

    session.document.remove_page(1).expect("removable");
    session.commit();
    assert_eq!(session.document.page_count(), 1);

    assert!(session.undo());
    assert_eq!(session.document.page_count(), 2);
    assert_eq!(
        session.document.pages()[1].details.pixel_resolution(),
        (800, 600)
    );
}

// ============================================================================
// Template Workflow Tests
// ============================================================================

#[test]
fn test_design_bind_and_save_template() {
    let mut session = EditorSession::default();
    let logo = session.add_element(image("logo.png"));
    let heading = session.add_element(text("ACME Corp"));
    session.add_element(rect(0.0, 500.0, 600.0, 40.0));

    session
        .mark_as_template_field(logo, TemplateFieldType::Logo, "company_logo")
        .expect("exists");
    session
        .mark_as_template_field(heading, TemplateFieldType::Header, "company_name")
        .expect("exists");
    assert_eq!(session.bound_fields().len(), 2);

    let saved = session
        .document
        .save_as_template("ID Card", "Employee ID card", "id-card");
    session.commit();

    assert_eq!(saved.settings.category, "id-card");
    let stamped = saved.pages[0].details.template.as_ref().expect("stamped");
    assert_eq!(stamped.name, "ID Card");

    // A fresh session over the saved template keeps the bindings.
    let reopened = EditorSession::new(Document::from_template(saved));
    assert_eq!(reopened.bound_fields().len(), 2);
}

#[test]
fn test_template_edit_mode_guards_whole_workflow() {
    let mut session = EditorSession::default();
    let field = session.add_element(text("editable"));
    let fixed = session.add_element(rect(0.0, 0.0, 100.0, 100.0));
    session
        .mark_as_template_field(field, TemplateFieldType::Text, "note")
        .expect("exists");

    session.set_template_edit_mode(true);
    assert!(session.move_element(field, 5.0, 5.0).is_ok());
    assert!(session.move_element(fixed, 5.0, 5.0).is_err());
    assert!(session.resize_element(fixed, ResizeHandle::Right, 10.0, 0.0).is_err());
    assert!(session.rotate_element(fixed, 45.0).is_err());
    assert!(session.delete_element(fixed).is_err());
}

// ============================================================================
// View State and Serialization Tests
// ============================================================================

#[test]
fn test_guides_and_selection_survive_history_but_not_snapshots() {
    let mut session = EditorSession::default();
    let id = session.add_element(rect(0.0, 0.0, 50.0, 50.0));
    session.add_guide(GuideAxis::Vertical, 120.0);
    session.select(id);

    assert!(session.undo());
    // Selection is cleared by undo; guides are untouched view state.
    assert!(session.selection.is_empty());
    assert_eq!(session.guides.len(), 1);
}

#[test]
fn test_edited_document_round_trips_through_json() {
    let mut session = EditorSession::default();
    let id = session.add_element(rect(10.0, 20.0, 100.0, 80.0));
    session.rotate_element(id, 390.0).expect("exists");
    session.commit();
    session
        .mark_as_template_field(id, TemplateFieldType::Background, "bg")
        .expect("exists");

    let json = session.document.to_json().expect("serialize");
    let restored = Document::from_json(&json).expect("deserialize");

    let element = restored.current_page().element(id).expect("exists");
    assert!((element.rotation - 390.0).abs() < 1e-4);
    assert!((element.normalized_rotation() - 30.0).abs() < 1e-4);
    assert!(element.is_template_field());
}
