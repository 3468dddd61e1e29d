use crate::config::WorkspaceConfig;
use crate::error::ScanError;
use crate::model::{Note, NoteId, NoteType, TreeNode};
use crate::vfs::{FileSystem, VfsEntry};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Notes and directory tree read from one vault root.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultSnapshot {
    pub root: PathBuf,
    pub notes: Vec<Note>,
    pub tree: TreeNode,
}

/// Walk `root` and turn every recognised file into a note.
///
/// Titles are file stems, ids are derived from the path, and markdown
/// content is loaded eagerly. Files of unknown type are left out of both
/// the notes and the tree.
pub fn scan_vault(
    fs: &dyn FileSystem,
    root: &Path,
    config: &WorkspaceConfig,
) -> Result<VaultSnapshot, ScanError> {
    if !fs.is_dir(root) {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut notes = Vec::new();
    let mut children: HashMap<PathBuf, Vec<TreeNode>> = HashMap::new();
    let mut dirs: Vec<PathBuf> = Vec::new();

    for VfsEntry { path, is_dir } in fs.walk(root, &config.ignore_dirs) {
        if is_dir {
            dirs.push(path);
            continue;
        }
        let Some(note) = load_note(fs, &path) else {
            continue;
        };
        if let Some(parent) = path.parent() {
            children
                .entry(parent.to_path_buf())
                .or_default()
                .push(TreeNode::file(path.clone(), Some(note.id.clone())));
        }
        notes.push(note);
    }

    // Deepest directories first so each is complete before joining its parent.
    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
    for dir in dirs {
        let mut nodes = children.remove(&dir).unwrap_or_default();
        sort_nodes(&mut nodes);
        let node = TreeNode::directory(dir.clone(), nodes);
        if let Some(parent) = dir.parent() {
            children.entry(parent.to_path_buf()).or_default().push(node);
        }
    }

    let mut top = children.remove(root).unwrap_or_default();
    sort_nodes(&mut top);
    let tree = TreeNode::directory(root.to_path_buf(), top);

    log::info!(
        "Scanned {}: {} notes, {} folders",
        root.display(),
        notes.len(),
        tree.directories().len() - 1
    );

    Ok(VaultSnapshot {
        root: root.to_path_buf(),
        notes,
        tree,
    })
}

fn load_note(fs: &dyn FileSystem, path: &Path) -> Option<Note> {
    let ext = path.extension()?.to_string_lossy();
    let note_type = NoteType::from_extension(&ext);
    if note_type == NoteType::Other {
        return None;
    }
    let title = path.file_stem()?.to_string_lossy().into_owned();

    let mut note = Note::new(NoteId::from_path(path), title, note_type).with_path(path);
    if note_type.is_markdown_capable() {
        match fs.read_to_string(path) {
            Ok(content) => note = note.with_content(content),
            Err(err) => log::warn!("Failed to read {}: {}", path.display(), err),
        }
    }
    Some(note)
}

fn sort_nodes(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| a.path.cmp(&b.path));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeNodeKind;
    use crate::vfs::PhysicalFileSystem;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_builds_notes_and_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "Note A.md", "Links to [[Note B]]");
        write(root, "sub/Note B.md", "Body");
        write(root, "docs/manual.pdf", "%PDF");
        write(root, "docs/readme.txt", "ignored");
        write(root, "node_modules/pkg/x.md", "ignored");

        let snapshot =
            scan_vault(&PhysicalFileSystem, root, &WorkspaceConfig::default()).unwrap();

        let mut titles: Vec<_> = snapshot.notes.iter().map(|n| n.title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, vec!["Note A", "Note B", "manual"]);

        let a = snapshot.notes.iter().find(|n| n.title == "Note A").unwrap();
        assert_eq!(a.content.as_deref(), Some("Links to [[Note B]]"));
        assert_eq!(a.id, NoteId::from_path(&root.join("Note A.md")));

        let pdf = snapshot.notes.iter().find(|n| n.title == "manual").unwrap();
        assert_eq!(pdf.note_type, NoteType::Pdf);
        assert_eq!(pdf.content, None);

        assert_eq!(snapshot.tree.kind, TreeNodeKind::Directory);
        let dirs: Vec<_> = snapshot.tree.directories().into_iter().map(Path::to_path_buf).collect();
        assert!(dirs.contains(&root.join("sub")));
        assert!(dirs.contains(&root.join("docs")));
        assert!(!dirs.iter().any(|d| d.ends_with("node_modules")));

        let sub = snapshot
            .tree
            .children
            .iter()
            .find(|c| c.path == root.join("sub"))
            .unwrap();
        assert_eq!(sub.children.len(), 1);
        assert_eq!(sub.children[0].note_id, Some(NoteId::from_path(&root.join("sub/Note B.md"))));
    }

    #[test]
    fn test_scan_ids_are_stable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "x");
        let config = WorkspaceConfig::default();
        let first = scan_vault(&PhysicalFileSystem, dir.path(), &config).unwrap();
        let second = scan_vault(&PhysicalFileSystem, dir.path(), &config).unwrap();
        assert_eq!(first.notes[0].id, second.notes[0].id);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan_vault(
            &PhysicalFileSystem,
            &dir.path().join("missing"),
            &WorkspaceConfig::default(),
        );
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }
}
