use crate::line_map::LineMap;
use crate::model::Note;
use crate::refactor::model::{NoteEdit, TextEdit};
use crate::syntax::{scan_wikilinks, split_target};
use crate::utils::{slugify, split_known_extension};
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOutcome {
    pub content: String,
    pub changed: bool,
    pub edits: Vec<TextEdit>,
}

/// Point every wikilink whose target slugifies to `old_slug` at `new_name`.
///
/// The slug is taken over the whole target with its folder prefix, so
/// `[[folder/note.md]]` matches `foldernote`. Folder prefix, extension,
/// anchor, alias and embed markers are kept as written.
pub fn rename_wiki_links_in_content(markdown: &str, old_slug: &str, new_name: &str) -> RenameOutcome {
    let new_name = new_name.trim();
    if old_slug.is_empty() || new_name.is_empty() {
        return unchanged(markdown);
    }

    let replacements: Vec<(Range<usize>, String)> = scan_wikilinks(markdown)
        .into_iter()
        .filter_map(|token| {
            let raw = token.raw(markdown);
            let parts = split_target(raw);
            if parts.is_empty() {
                return None;
            }
            let written = &raw[parts.target_range.clone()];
            let (stem, ext) = split_known_extension(written);
            if slugify(stem) != old_slug {
                return None;
            }

            let prefix = stem.rfind(['/', '\\']).map(|pos| &stem[..=pos]).unwrap_or("");
            let suffix = ext.map(|_| &written[stem.len()..]).unwrap_or("");
            let start = token.inner.start + parts.target_range.start;
            let end = token.inner.start + parts.target_range.end;
            Some((start..end, format!("{prefix}{new_name}{suffix}")))
        })
        .collect();

    if replacements.is_empty() {
        return unchanged(markdown);
    }

    let lines = LineMap::new(markdown);
    let mut content = String::with_capacity(markdown.len());
    let mut edits = Vec::with_capacity(replacements.len());
    let mut cursor = 0;

    for (range, text) in replacements {
        content.push_str(&markdown[cursor..range.start]);
        content.push_str(&text);
        cursor = range.end;
        edits.push(TextEdit {
            range: lines.range(range.clone()),
            undo_text: markdown[range].to_string(),
            new_text: text,
        });
    }
    content.push_str(&markdown[cursor..]);

    let changed = content != markdown;
    RenameOutcome {
        content,
        changed,
        edits,
    }
}

/// Rewrite links in every markdown note that has content; only changed notes are returned.
pub fn plan_wiki_link_rename(notes: &[Note], old_slug: &str, new_name: &str) -> Vec<NoteEdit> {
    let plan: Vec<NoteEdit> = notes
        .iter()
        .filter(|note| note.note_type.is_markdown_capable())
        .filter_map(|note| {
            let content = note.content.as_deref()?;
            let outcome = rename_wiki_links_in_content(content, old_slug, new_name);
            outcome.changed.then(|| NoteEdit {
                note_id: note.id.clone(),
                path: note.absolute_path.clone(),
                content: outcome.content,
                edits: outcome.edits,
            })
        })
        .collect();

    log::debug!(
        "Rename {:?} -> {:?} touches {} notes",
        old_slug,
        new_name,
        plan.len()
    );
    plan
}

fn unchanged(markdown: &str) -> RenameOutcome {
    RenameOutcome {
        content: markdown.to_string(),
        changed: false,
        edits: Vec::new(),
    }
}
