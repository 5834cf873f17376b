//! Knowtree CLI - browse and edit a hierarchy of knowledge categories.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use knowtree::config::default_log_path;
use knowtree::{
    Category, CategoryReader, CategoryStore, Config, ExportFormat, Storage, StoreBuilderExt, build_category_tree,
    export_tree_with_format, find_category_by_name, get_all_descendants, get_category_path, get_tree_statistics,
    is_ancestor, normalize_description, print_tree_to_console, validate_name,
};
use log::info;
use std::fs;

mod cli;

use cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    let log_file = default_log_path();
    if let Some(log_dir) = log_file.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn format_category(category: &Category) -> String {
    let description = category
        .description
        .as_ref()
        .map(|d| format!("  {}", d.dimmed()))
        .unwrap_or_default();
    format!("{} {}{}", category.id.to_string().cyan(), category.name, description)
}

fn require_category(storage: &Storage, id: i64) -> Result<Category> {
    match storage.get_by_id(id)? {
        Some(category) => Ok(category),
        None => {
            eprintln!("{} Category not found: {}", "✗".red(), id);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())
        .context("Failed to load config")?
        .with_database(cli.db);

    let mut storage = Storage::open(&config.database).context("Failed to open database")?;

    match cli.command {
        Command::Init => {
            println!(
                "{} Database ready at {}",
                "✓".green(),
                storage.path().display()
            );
        }

        Command::Add {
            name,
            description,
            parent,
        } => {
            let name = validate_name(&name)?;
            if let Some(parent_id) = parent {
                require_category(&storage, parent_id)?;
            }

            let mut builder = storage.build(name).parent_opt(parent);
            if let Some(description) = normalize_description(description.as_deref()) {
                builder = builder.description(description);
            }
            let category = builder.create()?;

            println!("{} Created: {}", "✓".green(), format_category(&category));
        }

        Command::Get { id } => {
            let category = require_category(&storage, id)?;
            println!("{}: {}", "ID".bold(), category.id.to_string().cyan());
            println!("{}: {}", "Name".bold(), category.name);
            if let Some(desc) = &category.description {
                println!("{}: {}", "Description".bold(), desc);
            }
            match category.parent_id {
                Some(parent_id) => println!("{}: {}", "Parent".bold(), parent_id),
                None => println!("{}: {}", "Parent".bold(), "(root)".dimmed()),
            }
            let children = storage.get_children(Some(id)).context("Failed to load children")?;
            println!("{}: {}", "Children".bold(), children.len());
        }

        Command::Edit { id, name, description } => {
            let existing = require_category(&storage, id)?;
            let name = match &name {
                Some(name) => validate_name(name)?,
                None => existing.name.as_str(),
            };
            let description = match &description {
                Some(d) => normalize_description(Some(d.as_str())),
                None => existing.description.clone(),
            };

            if storage
                .update(id, name, description.as_deref())
                .context("Failed to update category")?
            {
                println!("{} Updated: {} {}", "✓".green(), id.to_string().cyan(), name);
            } else {
                eprintln!("{} Category not found: {}", "✗".red(), id);
                std::process::exit(1);
            }
        }

        Command::Delete { id, recursive } => {
            let category = require_category(&storage, id)?;
            let removed = if recursive {
                storage.delete_subtree(id).context("Failed to delete subtree")?
            } else {
                let children = storage.get_children(Some(id))?.len();
                if !storage.delete(id).context("Failed to delete category")? {
                    eyre::bail!("Failed to delete category {}", id);
                }
                children + 1
            };
            println!(
                "{} Deleted: {} {} ({} categor{})",
                "✓".green(),
                id.to_string().cyan(),
                category.name,
                removed,
                if removed == 1 { "y" } else { "ies" }
            );
        }

        Command::List { parent, all } => {
            let categories = if all {
                storage.get_all().context("Failed to list categories")?
            } else {
                storage.get_children(parent).context("Failed to list categories")?
            };

            if categories.is_empty() {
                println!("{}", "No categories found".dimmed());
            } else {
                for category in &categories {
                    println!("{}", format_category(category));
                }
            }
        }

        Command::Tree { id, max_level, json } => {
            let root = match id {
                Some(id) => Some(require_category(&storage, id)?),
                None => None,
            };
            if json {
                let tree = build_category_tree(&storage, id, 0, max_level).context("Failed to build tree")?;
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                if let Some(root) = &root {
                    println!("{}", root.name.bold());
                }
                print_tree_to_console(&storage, id).context("Failed to print tree")?;
            }
        }

        Command::Path { id, exclude_self } => {
            require_category(&storage, id)?;
            let path = get_category_path(&storage, id, !exclude_self).context("Failed to resolve path")?;
            let names: Vec<String> = path.iter().map(|c| c.name.clone()).collect();
            if names.is_empty() {
                println!("{}", "(root)".dimmed());
            } else {
                let separator = format!(" {} ", "→".blue());
                println!("{}", names.join(separator.as_str()));
            }
        }

        Command::Descendants { id } => {
            require_category(&storage, id)?;
            let descendants = get_all_descendants(&storage, id).context("Failed to list descendants")?;
            if descendants.is_empty() {
                println!("{}", "No descendants".dimmed());
            } else {
                println!("{} {} descendant(s):", "→".blue(), descendants.len());
                for category in &descendants {
                    println!("  {}", format_category(category));
                }
            }
        }

        Command::Stats { id } => {
            let category = require_category(&storage, id)?;
            let stats = get_tree_statistics(&storage, id).context("Failed to compute statistics")?;
            println!("{}: {}", "Category".bold(), category.name);
            println!("{}: {}", "Total nodes".bold(), stats.node_count);
            println!("{}: {}", "Tree depth".bold(), stats.depth);
            println!("{}: {}", "Leaf nodes".bold(), stats.leaf_count);
            println!("{}: {}", "Branch nodes".bold(), stats.branch_count);
        }

        Command::Find { name, parent } => {
            match find_category_by_name(&storage, &name, parent).context("Failed to search categories")? {
                Some(category) => println!("{}", format_category(&category)),
                None => {
                    eprintln!("{} No category named: {}", "✗".red(), name);
                    std::process::exit(1);
                }
            }
        }

        Command::Ancestor { id, ancestor_id } => {
            if is_ancestor(&storage, id, ancestor_id).context("Failed to walk ancestors")? {
                println!("{} {} is an ancestor of {}", "✓".green(), ancestor_id, id);
            } else {
                println!("{} {} is not an ancestor of {}", "✗".red(), ancestor_id, id);
            }
        }

        Command::Export { id, file, format } => {
            let format = format.map(ExportFormat::from).unwrap_or(config.export_format);
            if export_tree_with_format(&storage, id, &file, format) {
                println!("{} Exported {} to {}", "✓".green(), id, file.display());
            } else {
                eprintln!("{} Failed to export category {}", "✗".red(), id);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
