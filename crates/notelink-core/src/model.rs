use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque note identifier, owned by the note store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Stable id derived from a file path, so rescanning a vault keeps ids.
    pub fn from_path(path: &Path) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(path.to_string_lossy().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Self(digest[..32].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Markdown,
    Pdf,
    Notebook,
    Asset,
    Html,
    Other,
}

impl NoteType {
    /// Types whose content is markdown and can be rendered or transcluded.
    pub fn is_markdown_capable(self) -> bool {
        matches!(self, NoteType::Markdown)
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" | "mdown" => NoteType::Markdown,
            "pdf" => NoteType::Pdf,
            "ipynb" => NoteType::Notebook,
            "html" | "htm" => NoteType::Html,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "bmp" | "mp4" | "mov" | "webm"
            | "mp3" | "wav" | "ogg" => NoteType::Asset,
            _ => NoteType::Other,
        }
    }

    /// Extension assumed for notes that have no file path.
    pub(crate) fn default_extension(self) -> Option<&'static str> {
        match self {
            NoteType::Markdown => Some("md"),
            NoteType::Pdf => Some("pdf"),
            NoteType::Notebook => Some("ipynb"),
            NoteType::Html => Some("html"),
            NoteType::Asset | NoteType::Other => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteType::Markdown => "markdown",
            NoteType::Pdf => "pdf",
            NoteType::Notebook => "notebook",
            NoteType::Asset => "asset",
            NoteType::Html => "html",
            NoteType::Other => "other",
        }
    }
}

/// Note record as handed over by the note store. Read-only for the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub absolute_path: Option<PathBuf>,
    #[serde(default)]
    pub folder_path: Option<PathBuf>,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    #[serde(default)]
    pub content: Option<String>,
}

impl Note {
    pub fn new(id: impl Into<NoteId>, title: impl Into<String>, note_type: NoteType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            absolute_path: None,
            folder_path: None,
            note_type,
            content: None,
        }
    }

    pub fn markdown(id: impl Into<NoteId>, title: impl Into<String>) -> Self {
        Self::new(id, title, NoteType::Markdown)
    }

    /// Sets the absolute path; the folder path follows from its parent.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.folder_path = path.parent().map(Path::to_path_buf);
        self.absolute_path = Some(path);
        self
    }

    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder_path = Some(folder.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Containing directory: explicit folder path, else the parent of the absolute path.
    pub fn folder(&self) -> Option<PathBuf> {
        self.folder_path.clone().or_else(|| {
            self.absolute_path
                .as_ref()
                .and_then(|p| p.parent())
                .map(Path::to_path_buf)
        })
    }

    /// Lowercased file extension, falling back to the type's default.
    pub fn extension(&self) -> Option<String> {
        self.absolute_path
            .as_ref()
            .and_then(|p| p.extension())
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .or_else(|| self.note_type.default_extension().map(str::to_string))
    }
}

/// Core internal coordinate system (0-based, UTF-16 columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeNodeKind {
    Directory,
    File,
}

/// Directory/file tree handed over by the scanner, used for folder suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    #[serde(rename = "type")]
    pub kind: TreeNodeKind,
    pub path: PathBuf,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    #[serde(default)]
    pub note_id: Option<NoteId>,
}

impl TreeNode {
    pub fn directory(path: impl Into<PathBuf>, children: Vec<TreeNode>) -> Self {
        Self {
            kind: TreeNodeKind::Directory,
            path: path.into(),
            children,
            note_id: None,
        }
    }

    pub fn file(path: impl Into<PathBuf>, note_id: Option<NoteId>) -> Self {
        Self {
            kind: TreeNodeKind::File,
            path: path.into(),
            children: Vec::new(),
            note_id,
        }
    }

    /// All directory paths in this subtree, depth-first, including self.
    pub fn directories(&self) -> Vec<&Path> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.kind == TreeNodeKind::Directory {
                out.push(node.path.as_path());
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }
}
