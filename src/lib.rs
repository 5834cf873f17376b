//! Knowtree: a SQLite-backed hierarchy of named categories.
//!
//! Categories form a tree through a nullable `parent_id`. The storage layer
//! owns the single `categories` table; the tree layer derives paths,
//! descendants, depth, statistics and text exports from two queries
//! (`get_by_id` and `get_children`).
//!
//! # Example
//!
//! ```no_run
//! use knowtree::{CategoryStore, Storage, StoreBuilderExt, get_category_path, get_tree_statistics};
//! use std::path::Path;
//!
//! let mut storage = Storage::open(Path::new("knowledge.db")).unwrap();
//!
//! let science = storage.build("Science").create().unwrap();
//! let physics = storage.build("Physics").parent(science.id).create().unwrap();
//! storage.create("Optics", Some("Light"), Some(physics.id)).unwrap();
//!
//! let path = get_category_path(&storage, physics.id, true).unwrap();
//! assert_eq!(path[0].name, "Science");
//!
//! let stats = get_tree_statistics(&storage, science.id).unwrap();
//! assert_eq!(stats.node_count, 3);
//! ```

mod builder;
mod export;
mod storage;
mod tree;
mod types;

pub mod config;

// Re-export public API
pub use builder::{CategoryBuilder, StoreBuilderExt};
pub use config::Config;
pub use export::{
    ExportFormat, export_tree_to_text, export_tree_with_format, print_tree_to_console, write_report, write_tree,
};
pub use storage::{CategoryReader, CategoryStore, Storage};
pub use tree::{
    TreeError, build_category_tree, calculate_tree_depth, count_tree_nodes, find_category_by_name,
    get_all_descendants, get_category_path, get_tree_statistics, is_ancestor,
};
pub use types::{Category, CategoryNode, TreeStats, ValidationError, normalize_description, validate_name};
