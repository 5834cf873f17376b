//! Shared test infrastructure for Knowtree integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use knowtree::{Category, CategoryReader, CategoryStore, Storage, StoreBuilderExt};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub storage: Storage,
}

impl TestEnv {
    /// Create a new test environment with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = Storage::open(&temp_dir.path().join("knowledge.db")).expect("Failed to open storage");
        Self { temp_dir, storage }
    }

    /// Create a root category with no description.
    pub fn create_root(&mut self, name: &str) -> Category {
        self.storage.build(name).create().expect("Failed to create category")
    }

    /// Create a category under `parent`.
    pub fn create_child(&mut self, parent: &Category, name: &str) -> Category {
        self.storage
            .build(name)
            .parent(parent.id)
            .create()
            .expect("Failed to create category")
    }

    /// Create a category with a description.
    pub fn create_with_desc(&mut self, parent: Option<&Category>, name: &str, description: &str) -> Category {
        self.storage
            .build(name)
            .description(description)
            .parent_opt(parent.map(|p| p.id))
            .create()
            .expect("Failed to create category")
    }

    /// Fetch a category that must exist.
    pub fn get(&self, category: &Category) -> Category {
        self.storage
            .get_by_id(category.id)
            .expect("Failed to load category")
            .expect("Category should exist")
    }

    /// Assert that a category no longer exists.
    pub fn assert_gone(&self, category: &Category) {
        assert!(
            self.storage.get_by_id(category.id).expect("Failed to load category").is_none(),
            "Expected category {} ({}) to be deleted",
            category.id,
            category.name
        );
    }

    /// Ids of the children of `parent` (roots for `None`).
    pub fn child_ids(&self, parent: Option<&Category>) -> Vec<i64> {
        self.storage
            .get_children(parent.map(|p| p.id))
            .expect("Failed to load children")
            .iter()
            .map(|c| c.id)
            .collect()
    }

    /// Total number of rows.
    pub fn total_count(&self) -> usize {
        self.storage.get_all().expect("Failed to list categories").len()
    }

    /// A path inside the temp dir.
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// R { A, B { C } }
pub struct SampleTree {
    pub r: Category,
    pub a: Category,
    pub b: Category,
    pub c: Category,
}

impl SampleTree {
    pub fn create(env: &mut TestEnv) -> Self {
        let r = env.create_root("R");
        let a = env.create_child(&r, "A");
        let b = env.create_child(&r, "B");
        let c = env.create_child(&b, "C");
        Self { r, a, b, c }
    }
}
