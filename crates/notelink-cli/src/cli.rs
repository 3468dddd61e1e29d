use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notelink")]
#[command(about = "Resolve, suggest and render wikilinks in a folder of markdown notes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file path (defaults to <root>/notelink.yaml when present)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (shortcut for RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the workspace and print index statistics
    Index {
        /// Also list every lookup key
        #[arg(long)]
        keys: bool,
    },

    /// Resolve a link target, e.g. `notelink resolve "sub/Note B|alias"`
    Resolve {
        /// Text between the brackets
        token: String,

        /// Note the link is written in, for sibling resolution
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// List autocomplete suggestions for a partial target
    Suggest {
        /// Partial target; `folder/` scopes to a folder
        #[arg(default_value = "")]
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a note to sanitized HTML
    Render {
        file: PathBuf,

        /// Tag top-level blocks and report their source ranges
        #[arg(long)]
        source_map: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite links after a note rename
    Rename {
        /// Slug of the old title, e.g. `my-note`
        old_slug: String,

        /// New title as it should appear in links
        new_name: String,

        /// Write changes to disk instead of printing the plan
        #[arg(long)]
        write: bool,
    },
}
