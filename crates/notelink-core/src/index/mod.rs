use crate::model::{Note, NoteId};
use crate::utils::{normalize_posix, relative_posix, slugify, split_known_extension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[cfg(test)]
mod tests;

/// Canonical lookup key → note id, built from one note-store snapshot.
///
/// The index also keeps the snapshot itself so that resolution and
/// suggestion never have to consult the live store.
#[derive(Debug, Clone, Default)]
pub struct WikiIndex {
    current_folder: PathBuf,
    keys: HashMap<String, NoteId>,
    notes: HashMap<NoteId, Note>,
    order: Vec<NoteId>,
}

/// Build a fresh index from the full note snapshot.
pub fn rebuild_wiki_index(notes: &[Note], current_folder: &Path) -> WikiIndex {
    WikiIndex::build(notes, current_folder)
}

impl WikiIndex {
    pub fn build(notes: &[Note], current_folder: &Path) -> Self {
        let mut index = Self {
            current_folder: current_folder.to_path_buf(),
            keys: HashMap::new(),
            notes: HashMap::with_capacity(notes.len()),
            order: Vec::with_capacity(notes.len()),
        };

        for note in notes {
            if index.notes.insert(note.id.clone(), note.clone()).is_none() {
                index.order.push(note.id.clone());
            }
        }

        // Pass 1: markdown-capable notes own bare and qualified keys, last writer wins.
        for note in notes.iter().filter(|n| n.note_type.is_markdown_capable()) {
            let Some(slug) = title_slug(note) else {
                continue;
            };
            let folder = index.folder_key(note);
            index.keys.insert(slug.clone(), note.id.clone());
            index
                .keys
                .insert(qualified_key(&folder, &slug), note.id.clone());
        }

        // Pass 2: extension keys for everything; other types only fill unclaimed bare keys.
        for note in notes {
            let Some(slug) = title_slug(note) else {
                continue;
            };
            let folder = index.folder_key(note);
            if let Some(ext) = note.extension() {
                let leaf = format!("{slug}.{ext}");
                index
                    .keys
                    .insert(qualified_key(&folder, &leaf), note.id.clone());
                index.keys.insert(leaf, note.id.clone());
            }
            if !note.note_type.is_markdown_capable() {
                index
                    .keys
                    .entry(qualified_key(&folder, &slug))
                    .or_insert_with(|| note.id.clone());
                index.keys.entry(slug).or_insert_with(|| note.id.clone());
            }
        }

        log::debug!(
            "Rebuilt wiki index: {} notes, {} keys, folder {:?}",
            index.notes.len(),
            index.keys.len(),
            index.current_folder
        );

        index
    }

    /// Look up a key. Entries whose note is not in the snapshot count as a miss.
    pub fn lookup(&self, key: &str) -> Option<&NoteId> {
        self.keys.get(key).filter(|id| self.notes.contains_key(*id))
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    /// Notes in snapshot order.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.order.iter().filter_map(|id| self.notes.get(id))
    }

    pub fn keys(&self) -> impl Iterator<Item = (&str, &NoteId)> {
        self.keys.iter().map(|(k, id)| (k.as_str(), id))
    }

    pub fn current_folder(&self) -> &Path {
        &self.current_folder
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Folder key of a note relative to the current folder: posix-normalized,
    /// lowercased, empty when the note sits in the current folder or has no folder.
    pub fn folder_key(&self, note: &Note) -> String {
        note.folder()
            .map(|folder| self.folder_key_of_path(&folder))
            .unwrap_or_default()
    }

    pub fn folder_key_of_path(&self, folder: &Path) -> String {
        normalize_posix(&relative_posix(&self.current_folder, folder)).to_lowercase()
    }

    /// Display form of a note's folder relative to the current folder (case kept).
    pub fn folder_label(&self, note: &Note) -> String {
        note.folder()
            .map(|folder| normalize_posix(&relative_posix(&self.current_folder, &folder)))
            .unwrap_or_default()
    }
}

/// `folder/leaf`, or `./leaf` for the current folder.
pub fn qualified_key(folder_key: &str, leaf: &str) -> String {
    if folder_key.is_empty() {
        format!("./{leaf}")
    } else {
        format!("{folder_key}/{leaf}")
    }
}

fn title_slug(note: &Note) -> Option<String> {
    let (stem, _) = split_known_extension(note.title.trim());
    let slug = slugify(stem);
    if slug.is_empty() {
        log::trace!("Note {} has an empty slug, not indexed", note.id);
        return None;
    }
    Some(slug)
}

/// Shared, swappable index. Rebuilds construct a new index and replace the
/// `Arc` in one step, so readers never observe a partially built index.
#[derive(Debug, Default)]
pub struct IndexHandle {
    current: RwLock<Arc<WikiIndex>>,
}

impl IndexHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<WikiIndex> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    pub fn rebuild(&self, notes: &[Note], current_folder: &Path) -> Arc<WikiIndex> {
        let next = Arc::new(WikiIndex::build(notes, current_folder));
        self.replace(Arc::clone(&next));
        next
    }

    pub fn replace(&self, index: Arc<WikiIndex>) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = index;
    }
}
