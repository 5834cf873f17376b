//! Core data types for the category hierarchy.

use serde::{Deserialize, Serialize};

/// Maximum accepted name length, in characters.
const MAX_NAME_LEN: usize = 500;

/// A node in the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// System-assigned identifier
    pub id: i64,

    /// Display name (not unique)
    pub name: String,

    /// Optional free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parent category, `None` for a root
    #[serde(default)]
    pub parent_id: Option<i64>,
}

impl Category {
    /// Returns true if this category has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A category expanded with its subtree, as produced by `build_category_tree`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parent_id: Option<i64>,

    /// Depth relative to the node the tree was built from (0-based)
    pub level: usize,

    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub(crate) fn new(category: Category, level: usize, children: Vec<CategoryNode>) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            parent_id: category.parent_id,
            level,
            children,
        }
    }
}

/// Aggregate shape of a subtree.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeStats {
    /// Nodes in the subtree, root included
    pub node_count: usize,

    /// Deepest level reached, the root being 1
    pub depth: usize,

    /// Nodes with no children
    pub leaf_count: usize,

    /// Nodes with more than one child
    pub branch_count: usize,
}

/// Validation errors for user-supplied category fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyName,
    NameTooLong,
    InvalidCharacters,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "category name is required"),
            ValidationError::NameTooLong => write!(f, "category name exceeds {} characters", MAX_NAME_LEN),
            ValidationError::InvalidCharacters => write!(f, "category name contains control characters"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trim and validate a category name.
///
/// The storage layer accepts any name; callers that take names from users
/// run them through here first.
pub fn validate_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong);
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidCharacters);
    }
    Ok(name)
}

/// Normalize a description: blank means absent.
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description.map(str::trim).filter(|d| !d.is_empty()).map(String::from)
}
