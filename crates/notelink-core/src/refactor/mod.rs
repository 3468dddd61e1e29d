//! Refactorings that rewrite note content.

pub mod model;
mod rename;

pub use model::{NoteEdit, TextEdit};
pub use rename::{plan_wiki_link_rename, rename_wiki_links_in_content, RenameOutcome};
