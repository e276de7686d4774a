//! The document - an ordered sequence of pages plus template settings.

use serde::{Deserialize, Serialize};

use crate::error::{DesignError, DesignResult};
use crate::page::Page;

/// Global template metadata for a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSettings {
    /// Template display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Category (e.g. invoice, certificate, id-card).
    pub category: String,
}

/// A saved template record handed to the host application for persistence.
///
/// Every page's details carry a copy of the settings, so the pages are
/// self-describing independent of editor state at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTemplate {
    /// Template metadata.
    pub settings: TemplateSettings,
    /// Deep-cloned pages with the settings stamped into each.
    pub pages: Vec<Page>,
}

/// An ordered sequence of pages plus global template settings.
///
/// Selection state is a view-level concern owned by the editor session,
/// not part of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Pages in output order. Never empty; see [`Document::set_pages`].
    pub(crate) pages: Vec<Page>,
    /// Global template metadata.
    pub template_settings: TemplateSettings,
    /// Index of the page currently being edited.
    pub current_page_index: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with one default page.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            template_settings: TemplateSettings::default(),
            current_page_index: 0,
        }
    }

    /// Create a document from previously saved template pages.
    #[must_use]
    pub fn from_template(template: SavedTemplate) -> Self {
        let pages = if template.pages.is_empty() {
            vec![Page::default()]
        } else {
            template.pages
        };
        Self {
            pages,
            template_settings: template.settings,
            current_page_index: 0,
        }
    }

    /// Pages in output order.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Replace the pages wholesale.
    ///
    /// An empty set is replaced with a single default page and the
    /// current page index is clamped, so the document always keeps at
    /// least one valid page.
    pub fn set_pages(&mut self, pages: Vec<Page>) {
        self.pages = if pages.is_empty() {
            vec![Page::default()]
        } else {
            pages
        };
        if self.current_page_index >= self.pages.len() {
            self.current_page_index = self.pages.len() - 1;
        }
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The page currently being edited.
    #[must_use]
    pub fn current_page(&self) -> &Page {
        &self.pages[self.current_page_index.min(self.pages.len() - 1)]
    }

    /// Mutable reference to the page currently being edited.
    pub fn current_page_mut(&mut self) -> &mut Page {
        let index = self.current_page_index.min(self.pages.len() - 1);
        &mut self.pages[index]
    }

    /// Get a page by index.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::PageNotFound`] if the index is out of range.
    pub fn page(&self, index: usize) -> DesignResult<&Page> {
        self.pages.get(index).ok_or(DesignError::PageNotFound(index))
    }

    /// Append a new page after the current one and switch to it.
    pub fn add_page(&mut self, page: Page) {
        let insert_at = (self.current_page_index + 1).min(self.pages.len());
        self.pages.insert(insert_at, page);
        self.current_page_index = insert_at;
        tracing::debug!("Added page at index {insert_at}");
    }

    /// Remove a page by index. The last remaining page cannot be removed.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::PageNotFound`] for an out-of-range index and
    /// [`DesignError::InvalidOperation`] when only one page remains.
    pub fn remove_page(&mut self, index: usize) -> DesignResult<Page> {
        if index >= self.pages.len() {
            return Err(DesignError::PageNotFound(index));
        }
        if self.pages.len() == 1 {
            return Err(DesignError::InvalidOperation(
                "A document must keep at least one page".to_string(),
            ));
        }
        let page = self.pages.remove(index);
        if self.current_page_index >= self.pages.len() {
            self.current_page_index = self.pages.len() - 1;
        }
        Ok(page)
    }

    /// Switch the current page.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::PageNotFound`] if the index is out of range.
    pub fn set_current_page(&mut self, index: usize) -> DesignResult<()> {
        if index >= self.pages.len() {
            return Err(DesignError::PageNotFound(index));
        }
        self.current_page_index = index;
        Ok(())
    }

    /// Build a template record for persistence.
    ///
    /// Updates the document's template settings and stamps a copy into
    /// every page's details before cloning them out.
    pub fn save_as_template(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> SavedTemplate {
        self.template_settings = TemplateSettings {
            name: name.into(),
            description: description.into(),
            category: category.into(),
        };
        for page in &mut self.pages {
            page.details.template = Some(self.template_settings.clone());
        }
        tracing::info!(
            "Saved template '{}' with {} pages",
            self.template_settings.name,
            self.pages.len()
        );
        SavedTemplate {
            settings: self.template_settings.clone(),
            pages: self.pages.clone(),
        }
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> DesignResult<String> {
        serde_json::to_string(self).map_err(DesignError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// A document with no pages deserializes to one default page, so
    /// the at-least-one-page invariant holds for any input.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> DesignResult<Self> {
        let mut document: Self =
            serde_json::from_str(json).map_err(DesignError::Serialization)?;
        if document.pages.is_empty() {
            document.pages.push(Page::default());
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_one_page() {
        let doc = Document::new();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.current_page_index, 0);
    }

    #[test]
    fn test_add_page_inserts_after_current() {
        let mut doc = Document::new();
        let first = doc.pages[0].id;
        doc.add_page(Page::default());
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.current_page_index, 1);
        assert_eq!(doc.pages[0].id, first);
    }

    #[test]
    fn test_cannot_remove_last_page() {
        let mut doc = Document::new();
        assert!(doc.remove_page(0).is_err());
    }

    #[test]
    fn test_remove_page_clamps_current_index() {
        let mut doc = Document::new();
        doc.add_page(Page::default());
        doc.add_page(Page::default());
        doc.set_current_page(2).expect("page exists");
        doc.remove_page(2).expect("should remove");
        assert_eq!(doc.current_page_index, 1);
    }

    #[test]
    fn test_save_as_template_stamps_every_page() {
        let mut doc = Document::new();
        doc.add_page(Page::default());

        let saved = doc.save_as_template("Invoice A", "Monthly invoice", "invoice");

        assert_eq!(saved.pages.len(), 2);
        for page in &saved.pages {
            let template = page.details.template.as_ref().expect("stamped");
            assert_eq!(template.name, "Invoice A");
            assert_eq!(template.category, "invoice");
        }
        // The live document is stamped too.
        assert!(doc.pages.iter().all(|p| p.details.template.is_some()));
    }

    #[test]
    fn test_json_round_trip() {
        let doc = Document::new();
        let json = doc.to_json().expect("serialize");
        let restored = Document::from_json(&json).expect("deserialize");
        assert_eq!(restored.page_count(), 1);
        assert_eq!(restored.pages[0].id, doc.pages[0].id);
    }

    #[test]
    fn test_set_pages_keeps_at_least_one_page() {
        let mut doc = Document::new();
        doc.add_page(Page::default());
        doc.add_page(Page::default());
        assert_eq!(doc.current_page_index, 2);

        doc.set_pages(vec![Page::default()]);
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.current_page_index, 0);

        doc.set_pages(vec![]);
        assert_eq!(doc.page_count(), 1);
        let _ = doc.current_page();
        let _ = doc.current_page_mut();
    }

    #[test]
    fn test_from_json_without_pages_gets_default_page() {
        let doc = Document::from_json(
            r#"{"pages":[],"template_settings":{"name":"","description":"","category":""},"current_page_index":0}"#,
        )
        .expect("deserialize");
        assert_eq!(doc.page_count(), 1);
        let _ = doc.current_page();
    }

    #[test]
    fn test_from_empty_template_gets_default_page() {
        let doc = Document::from_template(SavedTemplate {
            settings: TemplateSettings::default(),
            pages: vec![],
        });
        assert_eq!(doc.page_count(), 1);
    }
}
