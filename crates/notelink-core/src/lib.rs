//! Notelink Core Library
//!
//! Wikilink index, target resolution, autocomplete suggestions and markdown
//! preview rendering for a folder tree of interlinked notes.
//! Everything except `vault` and `vfs` works on in-memory snapshots.
//!

pub mod config;
pub mod error;
pub mod index;
pub mod line_map;
pub mod model;
pub mod refactor;
pub mod render;
pub mod resolve;
pub mod suggest;
pub mod syntax;
pub mod utils;
pub mod vault;
pub mod vfs;
pub mod workspace;

pub use config::NotelinkConfig;
pub use error::{ConfigError, RenderError, ScanError};
pub use index::{rebuild_wiki_index, IndexHandle, WikiIndex};
pub use model::{Note, NoteId, NoteType, TreeNode};
pub use refactor::{plan_wiki_link_rename, rename_wiki_links_in_content};
pub use render::{render_markdown_preview, MarkdownRenderer, RenderOptions, RenderOutput};
pub use resolve::{parse_wiki_target, ResolutionKind, ResolutionResult, ResolveContext};
pub use suggest::{collect_wiki_suggestion_items, SuggestionItem, SuggestionKind};
pub use utils::slugify;
pub use vault::{scan_vault, VaultSnapshot};
pub use workspace::Workspace;
