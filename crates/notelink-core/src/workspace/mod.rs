use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::NotelinkConfig;
use crate::error::ScanError;
use crate::index::{IndexHandle, WikiIndex};
use crate::model::{Note, TreeNode};
use crate::refactor::{plan_wiki_link_rename, NoteEdit};
use crate::render::{MarkdownRenderer, RenderOptions, RenderOutput};
use crate::resolve::{parse_wiki_target, ResolutionResult, ResolveContext};
use crate::suggest::{SuggestionCollector, SuggestionItem};
use crate::vault::scan_vault;
use crate::vfs::FileSystem;


/// Facade owning the configuration, the shared wiki index and the note tree.
///
/// Queries always run against one index snapshot; loading or rebuilding
/// swaps in a complete new index.
pub struct Workspace {
    pub(crate) root: PathBuf,
    pub(crate) config: NotelinkConfig,
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) index: IndexHandle,
    pub(crate) tree: RwLock<Option<TreeNode>>,
}

impl Workspace {
    pub fn new(root: PathBuf, config: NotelinkConfig, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root,
            config,
            fs,
            index: IndexHandle::new(),
            tree: RwLock::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &NotelinkConfig {
        &self.config
    }

    /// Scan the vault root, then rebuild the index and tree from the result.
    pub fn load_snapshot(&self) -> Result<Arc<WikiIndex>, ScanError> {
        let snapshot = scan_vault(&*self.fs, &self.root, &self.config.workspace)?;
        self.set_tree(Some(snapshot.tree));
        Ok(self.rebuild_wiki_index(&snapshot.notes, &self.root))
    }

    pub fn rebuild_wiki_index(&self, notes: &[Note], current_folder: &Path) -> Arc<WikiIndex> {
        let index = self.index.rebuild(notes, current_folder);
        if self.config.logging.show_index_stats {
            log::info!(
                "Wiki index ready: {} notes, {} keys",
                index.notes().count(),
                index.len()
            );
        }
        index
    }

    /// Re-key the current notes relative to another folder.
    pub fn set_current_folder(&self, folder: &Path) -> Arc<WikiIndex> {
        let notes = self.notes();
        self.rebuild_wiki_index(&notes, folder)
    }

    pub fn set_tree(&self, tree: Option<TreeNode>) {
        let mut guard = self.tree.write().unwrap_or_else(|e| e.into_inner());
        *guard = tree;
    }

    pub fn tree(&self) -> Option<TreeNode> {
        self.tree.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn index(&self) -> Arc<WikiIndex> {
        self.index.snapshot()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.index().notes().cloned().collect()
    }

    pub fn note_by_path(&self, path: &Path) -> Option<Note> {
        self.index()
            .notes()
            .find(|note| note.absolute_path.as_deref() == Some(path))
            .cloned()
    }

    /// Context for links written in the note stored at `path`.
    pub fn context_for_path(&self, path: &Path) -> ResolveContext {
        ResolveContext {
            note_id: self.note_by_path(path).map(|note| note.id),
        }
    }

    pub fn parse_wiki_target(
        &self,
        token: &str,
        context: Option<&ResolveContext>,
    ) -> ResolutionResult {
        parse_wiki_target(&self.index(), token, context)
    }

    pub fn collect_wiki_suggestion_items(&self, query: &str) -> Vec<SuggestionItem> {
        let index = self.index();
        let tree = self.tree();
        SuggestionCollector::new(&index, tree.as_ref())
            .collect(query, &self.config.suggestions.options())
    }

    pub fn render_markdown_preview(
        &self,
        source: &str,
        context: Option<&ResolveContext>,
        options: RenderOptions,
    ) -> RenderOutput {
        let index = self.index();
        MarkdownRenderer::new(&index, self.config.render.clone()).render(source, context, options)
    }

    pub fn plan_wiki_link_rename(&self, old_slug: &str, new_name: &str) -> Vec<NoteEdit> {
        plan_wiki_link_rename(&self.notes(), old_slug, new_name)
    }

    /// Write edited notes to disk and rebuild the index with their new content.
    /// Returns how many files were written. On a write error the index still
    /// picks up every file written before it.
    pub fn apply_note_edits(&self, edits: &[NoteEdit]) -> std::io::Result<usize> {
        let mut written: Vec<&NoteEdit> = Vec::new();
        let mut failure = None;
        for edit in edits {
            let Some(path) = &edit.path else {
                log::warn!("Note {} has no path, edit not written", edit.note_id);
                continue;
            };
            if let Err(err) = self.fs.write(path, &edit.content) {
                log::error!("Failed to write {}: {}", path.display(), err);
                failure = Some(err);
                break;
            }
            written.push(edit);
        }

        let current = self.index();
        let notes: Vec<Note> = current
            .notes()
            .map(|note| match written.iter().find(|e| e.note_id == note.id) {
                Some(edit) => note.clone().with_content(edit.content.clone()),
                None => note.clone(),
            })
            .collect();
        self.rebuild_wiki_index(&notes, current.current_folder());

        match failure {
            Some(err) => Err(err),
            None => Ok(written.len()),
        }
    }
}
