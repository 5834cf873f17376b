//! Traversal and aggregation over the category hierarchy.
//!
//! Every function here is read-only and goes back to the store on each call.
//! Traversals track the ids they have seen and fail with
//! [`TreeError::CycleDetected`] when a parent chain loops back on itself.

use crate::storage::CategoryReader;
use crate::types::{Category, CategoryNode, TreeStats};
use eyre::Result;
use std::collections::HashSet;

/// Errors raised by tree traversals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A category was reached twice while walking the hierarchy.
    CycleDetected(i64),
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::CycleDetected(id) => write!(f, "cycle detected in hierarchy at category {}", id),
        }
    }
}

impl std::error::Error for TreeError {}

/// Record `id` as visited, failing if it was already seen.
fn visit(visited: &mut HashSet<i64>, id: i64) -> Result<()> {
    if !visited.insert(id) {
        return Err(eyre::eyre!(TreeError::CycleDetected(id)));
    }
    Ok(())
}

/// Expand the children of `parent_id` into nested nodes.
///
/// `level` is the depth assigned to the returned nodes. With `max_level`
/// set, nothing is fetched once `level >= max_level`, so `Some(1)` yields
/// the immediate children with empty `children`.
pub fn build_category_tree<S: CategoryReader + ?Sized>(
    store: &S,
    parent_id: Option<i64>,
    level: usize,
    max_level: Option<usize>,
) -> Result<Vec<CategoryNode>> {
    let mut visited = HashSet::new();
    if let Some(id) = parent_id {
        visited.insert(id);
    }
    build_level(store, parent_id, level, max_level, &mut visited)
}

fn build_level<S: CategoryReader + ?Sized>(
    store: &S,
    parent_id: Option<i64>,
    level: usize,
    max_level: Option<usize>,
    visited: &mut HashSet<i64>,
) -> Result<Vec<CategoryNode>> {
    if max_level.is_some_and(|max| level >= max) {
        return Ok(Vec::new());
    }

    let mut nodes = Vec::new();
    for category in store.get_children(parent_id)? {
        visit(visited, category.id)?;
        let children = build_level(store, Some(category.id), level + 1, max_level, visited)?;
        nodes.push(CategoryNode::new(category, level, children));
    }
    Ok(nodes)
}

/// Ancestors of `id`, root first.
///
/// The starting node is used for the walk either way; `include_self`
/// only controls whether it ends up in the result. An unknown id yields
/// an empty path.
pub fn get_category_path<S: CategoryReader + ?Sized>(
    store: &S,
    id: i64,
    include_self: bool,
) -> Result<Vec<Category>> {
    let Some(start) = store.get_by_id(id)? else {
        return Ok(Vec::new());
    };

    let mut visited = HashSet::from([start.id]);
    let mut path = Vec::new();
    let mut parent_id = start.parent_id;
    if include_self {
        path.push(start);
    }

    while let Some(pid) = parent_id {
        visit(&mut visited, pid)?;
        match store.get_by_id(pid)? {
            Some(parent) => {
                parent_id = parent.parent_id;
                path.push(parent);
            }
            None => {
                log::warn!("Category {} has a dangling parent reference", pid);
                break;
            }
        }
    }

    path.reverse();
    Ok(path)
}

/// Every descendant of `id` in pre-order, `id` itself excluded.
pub fn get_all_descendants<S: CategoryReader + ?Sized>(store: &S, id: i64) -> Result<Vec<Category>> {
    let mut visited = HashSet::from([id]);
    let mut descendants = Vec::new();
    collect_descendants(store, id, &mut visited, &mut descendants)?;
    Ok(descendants)
}

fn collect_descendants<S: CategoryReader + ?Sized>(
    store: &S,
    id: i64,
    visited: &mut HashSet<i64>,
    out: &mut Vec<Category>,
) -> Result<()> {
    for child in store.get_children(Some(id))? {
        visit(visited, child.id)?;
        let child_id = child.id;
        out.push(child);
        collect_descendants(store, child_id, visited, out)?;
    }
    Ok(())
}

/// Height of the subtree rooted at `id`: 1 for a leaf.
pub fn calculate_tree_depth<S: CategoryReader + ?Sized>(store: &S, id: i64) -> Result<usize> {
    let mut visited = HashSet::from([id]);
    subtree_depth(store, id, &mut visited)
}

fn subtree_depth<S: CategoryReader + ?Sized>(store: &S, id: i64, visited: &mut HashSet<i64>) -> Result<usize> {
    let mut deepest = 0;
    for child in store.get_children(Some(id))? {
        visit(visited, child.id)?;
        deepest = deepest.max(subtree_depth(store, child.id, visited)?);
    }
    Ok(1 + deepest)
}

/// Number of nodes in the subtree rooted at `id`, `id` included.
pub fn count_tree_nodes<S: CategoryReader + ?Sized>(store: &S, id: i64) -> Result<usize> {
    let mut visited = HashSet::from([id]);
    subtree_size(store, id, &mut visited)
}

fn subtree_size<S: CategoryReader + ?Sized>(store: &S, id: i64, visited: &mut HashSet<i64>) -> Result<usize> {
    let mut count = 1;
    for child in store.get_children(Some(id))? {
        visit(visited, child.id)?;
        count += subtree_size(store, child.id, visited)?;
    }
    Ok(count)
}

/// Case-insensitive exact name lookup below `parent_id`.
///
/// Siblings are tried in order, and each sibling's subtree is searched
/// before moving on to the next one.
pub fn find_category_by_name<S: CategoryReader + ?Sized>(
    store: &S,
    name: &str,
    parent_id: Option<i64>,
) -> Result<Option<Category>> {
    let needle = name.to_lowercase();
    let mut visited = HashSet::new();
    if let Some(id) = parent_id {
        visited.insert(id);
    }
    find_below(store, &needle, parent_id, &mut visited)
}

fn find_below<S: CategoryReader + ?Sized>(
    store: &S,
    needle: &str,
    parent_id: Option<i64>,
    visited: &mut HashSet<i64>,
) -> Result<Option<Category>> {
    for category in store.get_children(parent_id)? {
        visit(visited, category.id)?;
        if category.name.to_lowercase() == needle {
            return Ok(Some(category));
        }
        if let Some(found) = find_below(store, needle, Some(category.id), visited)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// True if `potential_ancestor_id` is `id` itself or lies on its path to the root.
pub fn is_ancestor<S: CategoryReader + ?Sized>(store: &S, id: i64, potential_ancestor_id: i64) -> Result<bool> {
    let mut visited = HashSet::new();
    let mut current = id;

    loop {
        if current == potential_ancestor_id {
            return Ok(true);
        }
        visit(&mut visited, current)?;
        match store.get_by_id(current)?.and_then(|c| c.parent_id) {
            Some(parent_id) => current = parent_id,
            None => return Ok(false),
        }
    }
}

/// Node, depth, leaf and branch counts for the subtree rooted at `id`.
pub fn get_tree_statistics<S: CategoryReader + ?Sized>(store: &S, id: i64) -> Result<TreeStats> {
    let mut stats = TreeStats::default();
    let mut visited = HashSet::from([id]);
    collect_stats(store, id, 1, &mut visited, &mut stats)?;
    Ok(stats)
}

fn collect_stats<S: CategoryReader + ?Sized>(
    store: &S,
    id: i64,
    depth: usize,
    visited: &mut HashSet<i64>,
    stats: &mut TreeStats,
) -> Result<()> {
    let children = store.get_children(Some(id))?;

    stats.node_count += 1;
    stats.depth = stats.depth.max(depth);
    match children.len() {
        0 => stats.leaf_count += 1,
        1 => {}
        _ => stats.branch_count += 1,
    }

    for child in children {
        visit(visited, child.id)?;
        collect_stats(store, child.id, depth + 1, visited, stats)?;
    }
    Ok(())
}
