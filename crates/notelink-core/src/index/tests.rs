use super::*;
use crate::model::NoteType;

fn ws_notes() -> Vec<Note> {
    vec![
        Note::markdown("a", "Note A").with_path("/tmp/workspace/a.md"),
        Note::markdown("b", "Note B").with_path("/tmp/workspace/sub/b.md"),
        Note::markdown("n1", "Notes").with_path("/tmp/workspace/a/notes.md"),
        Note::markdown("n2", "Notes").with_path("/tmp/workspace/b/notes.md"),
    ]
}

#[test]
fn test_empty_snapshot_builds_empty_index() {
    let index = rebuild_wiki_index(&[], Path::new("/tmp/workspace"));
    assert!(index.is_empty());
    assert_eq!(index.notes().count(), 0);
    assert_eq!(index.lookup("anything"), None);
}

#[test]
fn test_bare_and_qualified_keys() {
    let index = rebuild_wiki_index(&ws_notes(), Path::new("/tmp/workspace"));

    assert_eq!(index.lookup("note-a"), Some(&NoteId::from("a")));
    assert_eq!(index.lookup("./note-a"), Some(&NoteId::from("a")));
    assert_eq!(index.lookup("note-b"), Some(&NoteId::from("b")));
    assert_eq!(index.lookup("sub/note-b"), Some(&NoteId::from("b")));
    assert_eq!(index.lookup("note-b.md"), Some(&NoteId::from("b")));
    assert_eq!(index.lookup("sub/note-b.md"), Some(&NoteId::from("b")));
    // Notes in the current folder get no folder-qualified key
    assert_eq!(index.lookup("workspace/note-a"), None);
}

#[test]
fn test_bare_key_collision_last_writer_wins() {
    let index = rebuild_wiki_index(&ws_notes(), Path::new("/tmp/workspace"));

    assert_eq!(index.lookup("notes"), Some(&NoteId::from("n2")));
    assert_eq!(index.lookup("a/notes"), Some(&NoteId::from("n1")));
    assert_eq!(index.lookup("b/notes"), Some(&NoteId::from("n2")));
}

#[test]
fn test_rebuild_is_idempotent() {
    let notes = ws_notes();
    let first = rebuild_wiki_index(&notes, Path::new("/tmp/workspace"));
    let second = rebuild_wiki_index(&notes, Path::new("/tmp/workspace"));

    let mut k1: Vec<_> = first.keys().collect();
    let mut k2: Vec<_> = second.keys().collect();
    k1.sort();
    k2.sort();
    assert_eq!(k1, k2);
}

#[test]
fn test_folder_keys_are_relative_to_current_folder() {
    let notes = ws_notes();
    let index = rebuild_wiki_index(&notes, Path::new("/tmp/workspace/sub"));

    assert_eq!(index.lookup("./note-b"), Some(&NoteId::from("b")));
    assert_eq!(index.lookup("../note-a"), Some(&NoteId::from("a")));
    assert_eq!(index.lookup("../a/notes"), Some(&NoteId::from("n1")));
}

#[test]
fn test_pdf_gets_extension_key_without_stealing_bare_key() {
    let notes = vec![
        Note::markdown("target-md", "Target").with_path("/tmp/target.md"),
        Note::new("target-pdf", "Target", NoteType::Pdf),
        Note::new("manual", "Manual", NoteType::Pdf).with_path("/tmp/docs/manual.pdf"),
    ];
    let index = rebuild_wiki_index(&notes, Path::new("/tmp"));

    assert_eq!(index.lookup("target"), Some(&NoteId::from("target-md")));
    assert_eq!(index.lookup("target.md"), Some(&NoteId::from("target-md")));
    assert_eq!(index.lookup("target.pdf"), Some(&NoteId::from("target-pdf")));
    // Unclaimed bare key falls to the non-markdown note
    assert_eq!(index.lookup("manual"), Some(&NoteId::from("manual")));
    assert_eq!(index.lookup("docs/manual.pdf"), Some(&NoteId::from("manual")));
}

#[test]
fn test_untitled_notes_are_skipped() {
    let notes = vec![Note::markdown("x", "!!!"), Note::markdown("y", "Kept")];
    let index = rebuild_wiki_index(&notes, Path::new("/"));
    assert_eq!(index.notes().count(), 2);
    assert_eq!(index.lookup("kept"), Some(&NoteId::from("y")));
    assert!(index.keys().all(|(_, id)| id.as_str() == "y"));
}

#[test]
fn test_index_handle_swaps_whole_index() {
    let handle = IndexHandle::new();
    let before = handle.snapshot();
    assert!(before.is_empty());

    let notes = ws_notes();
    let after = handle.rebuild(&notes, Path::new("/tmp/workspace"));

    // Old snapshot is untouched, new readers see the complete index
    assert!(before.is_empty());
    assert_eq!(after.len(), handle.snapshot().len());
    assert_eq!(handle.snapshot().lookup("note-a"), Some(&NoteId::from("a")));
}
