//! Template field binding - marking elements as named, typed placeholders.

use serde::{Deserialize, Serialize};

use crate::element::{ElementId, TemplateField, TemplateFieldType};
use crate::error::{DesignError, DesignResult};
use crate::session::EditorSession;

/// A bound template field on the current page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundField {
    /// The element carrying the binding.
    pub element_id: ElementId,
    /// Placeholder role.
    pub field_type: TemplateFieldType,
    /// Placeholder name.
    pub name: String,
}

impl EditorSession {
    /// Mark an element as a named, typed template placeholder; commits.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing.
    pub fn mark_as_template_field(
        &mut self,
        id: ElementId,
        field_type: TemplateFieldType,
        name: impl Into<String>,
    ) -> DesignResult<()> {
        let element = self
            .document
            .current_page_mut()
            .element_mut(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        let name = name.into();
        element.template_field = Some(TemplateField {
            field_type,
            name: name.clone(),
        });
        self.commit();
        tracing::debug!("Bound element {id} as template field '{name}'");
        Ok(())
    }

    /// Clear an element's template binding attributes; commits.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing.
    pub fn remove_template_field(&mut self, id: ElementId) -> DesignResult<()> {
        let element = self
            .document
            .current_page_mut()
            .element_mut(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        element.template_field = None;
        self.commit();
        Ok(())
    }

    /// Enumerate all bound fields on the current page.
    #[must_use]
    pub fn bound_fields(&self) -> Vec<BoundField> {
        self.document
            .current_page()
            .elements
            .iter()
            .filter_map(|element| {
                element.template_field.as_ref().map(|field| BoundField {
                    element_id: element.id,
                    field_type: field.field_type,
                    name: field.name.clone(),
                })
            })
            .collect()
    }

    /// Toggle template edit mode.
    ///
    /// While set, only bound template fields remain editable; the
    /// engine's own mutation ops reject everything else. Finer-grained
    /// presentation locking is the consuming surface's concern.
    pub fn set_template_edit_mode(&mut self, enabled: bool) {
        self.template_edit_mode = enabled;
    }

    /// Whether an element may be edited under the current mode.
    #[must_use]
    pub fn is_element_editable(&self, id: ElementId) -> bool {
        match self.document.current_page().element(id) {
            Some(element) => !self.template_edit_mode || element.is_template_field(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementKind, ShapeKind, ShapeStyle, TextStyle};

    fn session_with_two_elements() -> (EditorSession, ElementId, ElementId) {
        let mut session = EditorSession::default();
        let text = session.add_element(Element::new(ElementKind::Text {
            content: "Company name".to_string(),
            style: TextStyle::default(),
        }));
        let shape = session.add_element(Element::new(ElementKind::Shape {
            shape: ShapeKind::Rectangle,
            style: ShapeStyle::default(),
        }));
        (session, text, shape)
    }

    #[test]
    fn test_mark_and_enumerate_bound_fields() {
        let (mut session, text, shape) = session_with_two_elements();

        session
            .mark_as_template_field(text, TemplateFieldType::Header, "company_name")
            .expect("exists");

        let fields = session.bound_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].element_id, text);
        assert_eq!(fields[0].field_type, TemplateFieldType::Header);
        assert_eq!(fields[0].name, "company_name");

        session
            .mark_as_template_field(shape, TemplateFieldType::Logo, "logo")
            .expect("exists");
        assert_eq!(session.bound_fields().len(), 2);
    }

    #[test]
    fn test_remove_template_field_clears_binding() {
        let (mut session, text, _) = session_with_two_elements();
        session
            .mark_as_template_field(text, TemplateFieldType::Text, "note")
            .expect("exists");
        session.remove_template_field(text).expect("exists");
        assert!(session.bound_fields().is_empty());
    }

    #[test]
    fn test_edit_mode_locks_unbound_elements() {
        let (mut session, text, shape) = session_with_two_elements();
        session
            .mark_as_template_field(text, TemplateFieldType::Text, "note")
            .expect("exists");
        session.set_template_edit_mode(true);

        assert!(session.is_element_editable(text));
        assert!(!session.is_element_editable(shape));

        // Bound fields stay editable, everything else is rejected.
        assert!(session.move_element(text, 1.0, 1.0).is_ok());
        assert!(matches!(
            session.move_element(shape, 1.0, 1.0),
            Err(DesignError::ElementLocked(_))
        ));
        assert!(matches!(
            session.delete_element(shape),
            Err(DesignError::ElementLocked(_))
        ));

        session.set_template_edit_mode(false);
        assert!(session.move_element(shape, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_binding_survives_undo_redo() {
        let (mut session, text, _) = session_with_two_elements();
        session
            .mark_as_template_field(text, TemplateFieldType::Footer, "footer")
            .expect("exists");

        session.undo();
        assert!(session.bound_fields().is_empty());
        session.redo();
        assert_eq!(session.bound_fields().len(), 1);
    }
}
