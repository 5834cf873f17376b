//! Builder pattern API for creating categories.

use crate::storage::CategoryStore;
use crate::types::Category;
use eyre::{Context, Result};

/// Builder for creating categories with a fluent API.
///
/// # Example
///
/// ```ignore
/// let physics = storage.build("Physics")
///     .description("Matter and energy")
///     .parent(science.id)
///     .create()?;
/// ```
pub struct CategoryBuilder<'a, S: CategoryStore + ?Sized> {
    store: &'a mut S,
    name: String,
    description: Option<String>,
    parent_id: Option<i64>,
}

impl<'a, S: CategoryStore + ?Sized> CategoryBuilder<'a, S> {
    /// Create a new builder for a root category with the given name.
    pub fn new(store: &'a mut S, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            description: None,
            parent_id: None,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Place the category under `parent_id`.
    pub fn parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set or clear the parent.
    pub fn parent_opt(mut self, parent_id: Option<i64>) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Insert the category and return it as stored.
    pub fn create(self) -> Result<Category> {
        let id = self
            .store
            .create(&self.name, self.description.as_deref(), self.parent_id)
            .context("Failed to create category")?;

        Ok(Category {
            id,
            name: self.name,
            description: self.description.filter(|d| !d.is_empty()),
            parent_id: self.parent_id,
        })
    }
}

/// Extension trait to add builder method to any category store.
pub trait StoreBuilderExt: CategoryStore {
    /// Start building a new category with the given name.
    fn build(&mut self, name: impl Into<String>) -> CategoryBuilder<'_, Self> {
        CategoryBuilder::new(self, name)
    }
}

impl<S: CategoryStore + ?Sized> StoreBuilderExt for S {}
