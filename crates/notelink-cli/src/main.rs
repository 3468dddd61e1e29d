mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use notelink_core::render::RenderOptions;
use notelink_core::suggest::SuggestionKind;
use notelink_core::vfs::PhysicalFileSystem;
use notelink_core::{NotelinkConfig, Workspace};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("workspace root {} not found", root.display()))?;

    let config = match &cli.config {
        Some(path) => NotelinkConfig::load(path)?,
        None => NotelinkConfig::discover(&root)?,
    };
    init_logging(cli.verbose, &config);
    log::debug!(
        "Using workspace root {} with config {}",
        root.display(),
        cli.config
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "discovered from root".to_string())
    );

    let workspace = Workspace::new(root, config, Arc::new(PhysicalFileSystem));
    workspace
        .load_snapshot()
        .context("failed to scan workspace")?;

    match cli.command {
        Commands::Index { keys } => print_index(&workspace, keys),
        Commands::Resolve { token, from } => {
            let context = from
                .map(|path| absolute(&path).map(|path| workspace.context_for_path(&path)))
                .transpose()?;
            let result = workspace.parse_wiki_target(&token, context.as_ref());
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Suggest { query, json } => {
            let items = workspace.collect_wiki_suggestion_items(&query);
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for item in items {
                    let kind = match item.kind {
                        SuggestionKind::Note => "note",
                        SuggestionKind::Folder => "folder",
                    };
                    println!("{:<6}  {:<40}  [[{}]]", kind, item.display, item.target);
                }
            }
            Ok(())
        }
        Commands::Render {
            file,
            source_map,
            json,
        } => {
            let path = absolute(&file)?;
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let context = workspace.context_for_path(&path);
            let output = workspace.render_markdown_preview(
                &source,
                Some(&context),
                RenderOptions {
                    collect_source_map: source_map,
                },
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", output.html);
            }
            Ok(())
        }
        Commands::Rename {
            old_slug,
            new_name,
            write,
        } => {
            let plan = workspace.plan_wiki_link_rename(&old_slug, &new_name);
            for edit in &plan {
                let label = edit
                    .path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| edit.note_id.to_string());
                println!("{}: {} link(s)", label, edit.edits.len());
            }
            if write {
                let written = workspace
                    .apply_note_edits(&plan)
                    .context("failed to write renamed links")?;
                log::info!("Rewrote links to {} in {} file(s)", old_slug, written);
                println!("Updated {} file(s)", written);
            } else if !plan.is_empty() {
                println!("Dry run, pass --write to apply");
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool, config: &NotelinkConfig) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn absolute(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("{} not found", path.display()))
}

fn print_index(workspace: &Workspace, keys: bool) -> Result<()> {
    let index = workspace.index();
    println!("Workspace: {}", workspace.config().workspace.name);
    println!("Root:      {}", workspace.root().display());
    println!("Notes:     {}", index.notes().count());
    println!("Keys:      {}", index.len());

    if keys {
        let mut entries: Vec<_> = index.keys().collect();
        entries.sort();
        for (key, id) in entries {
            let title = index.note(id).map(|n| n.title.as_str()).unwrap_or("?");
            println!("  {key:<40} {title}");
        }
    }
    Ok(())
}
