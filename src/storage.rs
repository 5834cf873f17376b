//! Storage layer: the `categories` table in SQLite.

use crate::types::Category;
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::{Path, PathBuf};

/// Columns selected for every category read, in `row_to_category` order.
const CATEGORY_COLUMNS: &str = "id, name, description, parent_id";

/// Read access to the hierarchy. Everything in the tree layer is built on these two queries.
pub trait CategoryReader {
    /// Look up a single category. Absence is `Ok(None)`.
    fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Children of `parent_id`, or every root when `parent_id` is `None`.
    fn get_children(&self, parent_id: Option<i64>) -> Result<Vec<Category>>;
}

/// Full CRUD access to the hierarchy.
pub trait CategoryStore: CategoryReader {
    /// Insert a new category and return its id. No validation is performed.
    fn create(&mut self, name: &str, description: Option<&str>, parent_id: Option<i64>) -> Result<i64>;

    /// Overwrite name and description. Returns false if no row has this id.
    fn update(&mut self, id: i64, name: &str, description: Option<&str>) -> Result<bool>;

    /// Delete a category and its direct children only. Grandchildren keep
    /// their (now dangling) `parent_id`.
    fn delete(&mut self, id: i64) -> Result<bool>;

    /// Delete a category and every transitive descendant. Returns rows removed.
    fn delete_subtree(&mut self, id: i64) -> Result<usize>;

    /// Every category in the store.
    fn get_all(&self) -> Result<Vec<Category>>;
}

/// SQLite-backed category storage.
///
/// Each call runs a single autocommitted statement.
pub struct Storage {
    path: PathBuf,
    db: Connection,
}

impl Storage {
    /// Open (or create) the database at `path`, creating the table if missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let db = Connection::open(path).context("Failed to open SQLite database")?;

        let storage = Self {
            path: path.to_path_buf(),
            db,
        };
        storage.init_schema()?;

        log::debug!("Opened category storage at {}", path.display());
        Ok(storage)
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Initialize SQLite schema.
    fn init_schema(&self) -> Result<()> {
        self.db
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS categories (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    description TEXT,
                    parent_id INTEGER,
                    FOREIGN KEY (parent_id) REFERENCES categories (id)
                );
            "#,
            )
            .context("Failed to initialize schema")?;

        Ok(())
    }

    /// Run a SELECT over categories with a trailing clause and collect the rows.
    fn query_categories<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Vec<Category>> {
        let sql = format!("SELECT {} FROM categories {} ORDER BY id", CATEGORY_COLUMNS, clause);
        let mut stmt = self.db.prepare(&sql)?;
        let categories = stmt
            .query_map(params, Self::row_to_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    /// Convert a database row to a Category.
    fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        let description: Option<String> = row.get(2)?;
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            description: description.filter(|d| !d.is_empty()),
            parent_id: row.get(3)?,
        })
    }
}

impl CategoryReader for Storage {
    fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS);
        let category = self
            .db
            .query_row(&sql, params![id], Self::row_to_category)
            .optional()
            .with_context(|| format!("Failed to load category {}", id))?;
        Ok(category)
    }

    fn get_children(&self, parent_id: Option<i64>) -> Result<Vec<Category>> {
        let children = match parent_id {
            Some(pid) => self.query_categories("WHERE parent_id = ?", params![pid]),
            None => self.query_categories("WHERE parent_id IS NULL", []),
        };
        children.with_context(|| match parent_id {
            Some(pid) => format!("Failed to load children of category {}", pid),
            None => "Failed to load root categories".to_string(),
        })
    }
}

impl CategoryStore for Storage {
    fn create(&mut self, name: &str, description: Option<&str>, parent_id: Option<i64>) -> Result<i64> {
        let description = description.filter(|d| !d.is_empty());
        self.db
            .execute(
                "INSERT INTO categories (name, description, parent_id) VALUES (?, ?, ?)",
                params![name, description, parent_id],
            )
            .context("Failed to insert category")?;

        let id = self.db.last_insert_rowid();
        log::info!("Created category {} ({:?}) under {:?}", id, name, parent_id);
        Ok(id)
    }

    fn update(&mut self, id: i64, name: &str, description: Option<&str>) -> Result<bool> {
        let description = description.filter(|d| !d.is_empty());
        let affected = self
            .db
            .execute(
                "UPDATE categories SET name = ?, description = ? WHERE id = ?",
                params![name, description, id],
            )
            .with_context(|| format!("Failed to update category {}", id))?;

        log::info!("Updated category {}: {} row(s)", id, affected);
        Ok(affected > 0)
    }

    fn delete(&mut self, id: i64) -> Result<bool> {
        let affected = self
            .db
            .execute(
                "DELETE FROM categories WHERE id = ?1 OR parent_id = ?1",
                params![id],
            )
            .with_context(|| format!("Failed to delete category {}", id))?;

        log::info!("Deleted category {} and direct children: {} row(s)", id, affected);
        Ok(affected > 0)
    }

    fn delete_subtree(&mut self, id: i64) -> Result<usize> {
        // UNION (not UNION ALL) stops the recursion on cyclic parent chains.
        let affected = self
            .db
            .execute(
                r#"
                WITH RECURSIVE subtree(id) AS (
                    SELECT ?1
                    UNION
                    SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id
                )
                DELETE FROM categories WHERE id IN (SELECT id FROM subtree)
                "#,
                params![id],
            )
            .with_context(|| format!("Failed to delete subtree of category {}", id))?;

        log::info!("Deleted subtree of category {}: {} row(s)", id, affected);
        Ok(affected)
    }

    fn get_all(&self) -> Result<Vec<Category>> {
        self.query_categories("", []).context("Failed to list categories")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(&temp_dir.path().join("knowledge.db")).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_open_creates_database_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("data").join("knowledge.db");
        let storage = Storage::open(&db_path).unwrap();

        assert!(db_path.exists());
        assert_eq!(storage.path(), db_path.as_path());
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("knowledge.db");

        let id = {
            let mut storage = Storage::open(&db_path).unwrap();
            storage.create("Persistent", None, None).unwrap()
        };

        let storage = Storage::open(&db_path).unwrap();
        assert_eq!(storage.get_by_id(id).unwrap().unwrap().name, "Persistent");
    }

    #[test]
    fn test_create_and_get() {
        let (_temp_dir, mut storage) = setup_test_storage();

        let id = storage.create("Mathematics", Some("Pure and applied"), None).unwrap();
        let category = storage.get_by_id(id).unwrap().unwrap();

        assert_eq!(category.id, id);
        assert_eq!(category.name, "Mathematics");
        assert_eq!(category.description, Some("Pure and applied".to_string()));
        assert_eq!(category.parent_id, None);
    }

    #[test]
    fn test_create_stores_empty_name() {
        let (_temp_dir, mut storage) = setup_test_storage();

        let id = storage.create("", None, None).unwrap();
        assert_eq!(storage.get_by_id(id).unwrap().unwrap().name, "");
    }

    #[test]
    fn test_empty_description_reads_as_none() {
        let (_temp_dir, mut storage) = setup_test_storage();

        let id = storage.create("Blank", Some(""), None).unwrap();
        assert_eq!(storage.get_by_id(id).unwrap().unwrap().description, None);

        storage.update(id, "Blank", Some("")).unwrap();
        assert_eq!(storage.get_by_id(id).unwrap().unwrap().description, None);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let (_temp_dir, storage) = setup_test_storage();
        assert!(storage.get_by_id(42).unwrap().is_none());
    }

    #[test]
    fn test_get_children_and_roots() {
        let (_temp_dir, mut storage) = setup_test_storage();

        let root = storage.create("Root", None, None).unwrap();
        let other_root = storage.create("Other", None, None).unwrap();
        let child = storage.create("Child", None, Some(root)).unwrap();

        let roots: Vec<i64> = storage.get_children(None).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(roots, vec![root, other_root]);

        let children = storage.get_children(Some(root)).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child);

        assert!(storage.get_children(Some(other_root)).unwrap().is_empty());
    }

    #[test]
    fn test_update_leaves_parent() {
        let (_temp_dir, mut storage) = setup_test_storage();

        let root = storage.create("Root", None, None).unwrap();
        let child = storage.create("Child", Some("old"), Some(root)).unwrap();

        assert!(storage.update(child, "Renamed", Some("new")).unwrap());

        let updated = storage.get_by_id(child).unwrap().unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.description, Some("new".to_string()));
        assert_eq!(updated.parent_id, Some(root));
    }

    #[test]
    fn test_update_missing_returns_false() {
        let (_temp_dir, mut storage) = setup_test_storage();
        assert!(!storage.update(99, "Nothing", None).unwrap());
    }

    #[test]
    fn test_delete_is_one_level_deep() {
        let (_temp_dir, mut storage) = setup_test_storage();

        let root = storage.create("Root", None, None).unwrap();
        let child = storage.create("Child", None, Some(root)).unwrap();
        let grandchild = storage.create("Grandchild", None, Some(child)).unwrap();

        assert!(storage.delete(root).unwrap());

        assert!(storage.get_by_id(root).unwrap().is_none());
        assert!(storage.get_by_id(child).unwrap().is_none());
        let orphan = storage.get_by_id(grandchild).unwrap().unwrap();
        assert_eq!(orphan.parent_id, Some(child));
    }

    #[test]
    fn test_delete_missing_returns_false() {
        let (_temp_dir, mut storage) = setup_test_storage();
        assert!(!storage.delete(7).unwrap());
    }

    #[test]
    fn test_delete_subtree_removes_all_levels() {
        let (_temp_dir, mut storage) = setup_test_storage();

        let root = storage.create("Root", None, None).unwrap();
        let child = storage.create("Child", None, Some(root)).unwrap();
        storage.create("Grandchild", None, Some(child)).unwrap();
        let keep = storage.create("Unrelated", None, None).unwrap();

        assert_eq!(storage.delete_subtree(root).unwrap(), 3);

        let remaining: Vec<i64> = storage.get_all().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(remaining, vec![keep]);
    }

    #[test]
    fn test_get_all() {
        let (_temp_dir, mut storage) = setup_test_storage();

        let a = storage.create("A", None, None).unwrap();
        let b = storage.create("B", None, Some(a)).unwrap();

        let all: Vec<i64> = storage.get_all().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(all, vec![a, b]);
    }
}
