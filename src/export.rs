//! Plain-text rendering of the hierarchy: console listing and file export.

use crate::storage::CategoryReader;
use crate::tree::{TreeError, get_tree_statistics};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Branch marker placed in front of every rendered category.
const BRANCH: &str = "└── ";

/// Indentation added per tree level.
const INDENT: &str = "    ";

/// Console listings always carry ids so they can be fed back to other commands.
const CONSOLE_SHOWS_IDS: bool = true;

/// Layout of an exported tree file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Titled report with IDs, root description and statistics footer.
    #[default]
    Report,
    /// Bare outline: names and descriptions only.
    Outline,
}

impl ExportFormat {
    fn title(&self) -> &'static str {
        match self {
            ExportFormat::Report => "KNOWLEDGE TREE",
            ExportFormat::Outline => "Knowledge Tree",
        }
    }

    fn rule_width(&self) -> usize {
        match self {
            ExportFormat::Report => 60,
            ExportFormat::Outline => 50,
        }
    }

    fn show_ids(&self) -> bool {
        matches!(self, ExportFormat::Report)
    }
}

/// Write one category line plus its optional description line.
fn write_entry<W: Write>(
    out: &mut W,
    indent: &str,
    name: &str,
    id: i64,
    description: Option<&str>,
    show_ids: bool,
) -> io::Result<()> {
    if show_ids {
        writeln!(out, "{}{}{} (ID: {})", indent, BRANCH, name, id)?;
    } else {
        writeln!(out, "{}{}{}", indent, BRANCH, name)?;
    }
    if let Some(description) = description {
        writeln!(out, "{}{}Description: {}", indent, INDENT, description)?;
    }
    Ok(())
}

/// Render the children of `parent_id` (all roots for `None`) depth-first.
pub fn write_tree<S: CategoryReader + ?Sized, W: Write>(store: &S, parent_id: Option<i64>, out: &mut W) -> Result<()> {
    let mut visited = HashSet::new();
    if let Some(id) = parent_id {
        visited.insert(id);
    }
    write_children(store, parent_id, 0, out, &mut visited)
}

fn write_children<S: CategoryReader + ?Sized, W: Write>(
    store: &S,
    parent_id: Option<i64>,
    level: usize,
    out: &mut W,
    visited: &mut HashSet<i64>,
) -> Result<()> {
    let indent = INDENT.repeat(level);
    for category in store.get_children(parent_id)? {
        if !visited.insert(category.id) {
            return Err(eyre::eyre!(TreeError::CycleDetected(category.id)));
        }
        write_entry(
            out,
            &indent,
            &category.name,
            category.id,
            category.description.as_deref(),
            CONSOLE_SHOWS_IDS,
        )?;
        write_children(store, Some(category.id), level + 1, out, visited)?;
    }
    Ok(())
}

/// Print the children of `parent_id` to stdout.
pub fn print_tree_to_console<S: CategoryReader + ?Sized>(store: &S, parent_id: Option<i64>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_tree(store, parent_id, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Render `id` and its whole subtree, starting at `level`.
fn write_branch<S: CategoryReader + ?Sized, W: Write>(
    store: &S,
    id: i64,
    level: usize,
    show_ids: bool,
    out: &mut W,
    visited: &mut HashSet<i64>,
) -> Result<()> {
    if !visited.insert(id) {
        return Err(eyre::eyre!(TreeError::CycleDetected(id)));
    }
    let category = store
        .get_by_id(id)?
        .ok_or_else(|| eyre::eyre!("category {} not found", id))?;

    write_entry(
        out,
        &INDENT.repeat(level),
        &category.name,
        category.id,
        category.description.as_deref(),
        show_ids,
    )?;

    for child in store.get_children(Some(id))? {
        write_branch(store, child.id, level + 1, show_ids, out, visited)?;
    }
    Ok(())
}

/// Write the full export document for the subtree rooted at `id`.
pub fn write_report<S: CategoryReader + ?Sized, W: Write>(
    store: &S,
    id: i64,
    out: &mut W,
    format: ExportFormat,
) -> Result<()> {
    let root = store
        .get_by_id(id)?
        .ok_or_else(|| eyre::eyre!("category {} not found", id))?;

    writeln!(out, "{}: {}", format.title(), root.name)?;
    writeln!(out, "{}", "=".repeat(format.rule_width()))?;
    writeln!(out)?;

    if format == ExportFormat::Outline {
        write_branch(store, id, 0, format.show_ids(), out, &mut HashSet::new())?;
        return Ok(());
    }

    if let Some(description) = &root.description {
        writeln!(out, "Root Description: {}", description)?;
        writeln!(out)?;
    }

    writeln!(out, "TREE STRUCTURE:")?;
    write_branch(store, id, 0, format.show_ids(), out, &mut HashSet::new())?;

    let stats = get_tree_statistics(store, id)?;
    writeln!(out)?;
    writeln!(out, "STATISTICS:")?;
    writeln!(out, "- Total nodes: {}", stats.node_count)?;
    writeln!(out, "- Tree depth: {}", stats.depth)?;
    writeln!(out, "- Leaf nodes: {}", stats.leaf_count)?;
    writeln!(out, "- Branch nodes: {}", stats.branch_count)?;
    Ok(())
}

/// Export the subtree rooted at `id` as a report. Returns false on any failure.
pub fn export_tree_to_text<S: CategoryReader + ?Sized>(store: &S, id: i64, path: &Path) -> bool {
    export_tree_with_format(store, id, path, ExportFormat::Report)
}

/// Export the subtree rooted at `id` in the given format. Returns false on any failure.
pub fn export_tree_with_format<S: CategoryReader + ?Sized>(
    store: &S,
    id: i64,
    path: &Path,
    format: ExportFormat,
) -> bool {
    match try_export(store, id, path, format) {
        Ok(()) => {
            log::info!("Exported category {} to {}", id, path.display());
            true
        }
        Err(e) => {
            log::error!("Failed to export category {} to {}: {:#}", id, path.display(), e);
            false
        }
    }
}

/// Sibling path the export is staged in before being renamed over `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Render the whole document first; the target is only replaced once it is complete.
fn try_export<S: CategoryReader + ?Sized>(store: &S, id: i64, path: &Path, format: ExportFormat) -> Result<()> {
    let mut buf = Vec::new();
    write_report(store, id, &mut buf, format)?;

    let staging = staging_path(path);
    fs::write(&staging, &buf).with_context(|| format!("Failed to write {}", staging.display()))?;
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}
