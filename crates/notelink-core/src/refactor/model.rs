use crate::model::{NoteId, Point, TextRange};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Replacement of one range of a note's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: TextRange,
    pub new_text: String,
    pub undo_text: String,
}

impl TextEdit {
    /// The edit that restores the original text once this one is applied.
    pub fn invert(self) -> Self {
        // Range covered by `new_text` after the edit
        let mut end = self.range.start;
        for c in self.new_text.chars() {
            if c == '\n' {
                end = Point {
                    line: end.line + 1,
                    col: 0,
                };
            } else {
                end.col += c.len_utf16() as u32;
            }
        }

        Self {
            range: TextRange {
                start: self.range.start,
                end,
            },
            new_text: self.undo_text,
            undo_text: self.new_text,
        }
    }
}

/// New content for one note, produced by a refactoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEdit {
    pub note_id: NoteId,
    pub path: Option<PathBuf>,
    pub content: String,
    pub edits: Vec<TextEdit>,
}
