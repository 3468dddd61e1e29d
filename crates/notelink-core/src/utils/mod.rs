pub mod path;

pub use path::{normalize_posix, relative_posix, to_posix};

/// File extensions that may terminate a link target (`[[Report.pdf]]`).
const KNOWN_EXTENSIONS: &[&str] = &[
    "md", "markdown", "pdf", "ipynb", "html", "htm", "png", "jpg", "jpeg", "gif", "svg", "webp",
    "bmp", "mp4", "mov", "webm", "mp3", "wav", "ogg",
];

/// Slugify a note title into its canonical index key.
///
/// Rules:
/// - Trim and convert to lowercase
/// - Collapse each whitespace run into a single hyphen
/// - Drop everything outside `[a-z0-9-]`
///
/// # Examples
///
/// ```
/// use notelink_core::slugify;
///
/// assert_eq!(slugify("Test Note 1"), "test-note-1");
/// assert_eq!(slugify("  Sub   Note "), "sub-note");
/// assert_eq!(slugify("Hello (World)!"), "hello-world");
/// assert_eq!(slugify("folder/note"), "foldernote");
/// assert_eq!(slugify("Café"), "caf");
/// assert_eq!(slugify("!!!"), "");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in text.trim().chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }

    slug
}

/// Split `name.ext` when `ext` is a known file extension.
///
/// Returns the stem and the lowercased extension.
pub fn split_known_extension(name: &str) -> (&str, Option<String>) {
    if let Some((stem, ext)) = name.rsplit_once('.') {
        let lowered = ext.to_ascii_lowercase();
        if !stem.trim().is_empty() && KNOWN_EXTENSIONS.contains(&lowered.as_str()) {
            return (stem, Some(lowered));
        }
    }
    (name, None)
}
