use std::ops::Range;

/// The pieces of a raw wikilink token (the text between `[[` and `]]`).
///
/// `sub/Note B#Intro|Shown` splits into qualifier `sub`, title `Note B`,
/// anchor `Intro` and alias `Shown`. The arrow form `Note -> #Intro` is an
/// alternative spelling of the anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetParts {
    /// Target without alias or anchor, trimmed, escapes resolved.
    pub target: String,
    /// Byte range of the trimmed target inside the raw token.
    pub target_range: Range<usize>,
    pub alias: Option<String>,
    pub anchor: Option<String>,
    /// Folder part before the last separator, if any.
    pub qualifier: Option<String>,
    pub title: String,
}

impl TargetParts {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
    }
}

pub fn split_target(raw: &str) -> TargetParts {
    let head_end = find_unescaped_pipe(raw).unwrap_or(raw.len());
    let alias = raw
        .get(head_end + 1..)
        .map(|a| unescape(a.trim()))
        .filter(|a| !a.is_empty());

    let head = &raw[..head_end];
    let (region_end, anchor) = if let Some(pos) = head.find("->") {
        (pos, Some(head[pos + 2..].trim().trim_start_matches('#')))
    } else if let Some(pos) = head.find('#') {
        (pos, Some(head[pos + 1..].trim()))
    } else {
        (head.len(), None)
    };
    let anchor = anchor.filter(|a| !a.is_empty()).map(str::to_string);

    let region = &head[..region_end];
    let leading = region.len() - region.trim_start().len();
    let trimmed = region.trim();
    let target_range = leading..leading + trimmed.len();
    let target = unescape(trimmed);

    let (qualifier, title) = match target.rfind(['/', '\\']) {
        Some(pos) => (
            Some(target[..pos].trim().to_string()),
            target[pos + 1..].trim().to_string(),
        ),
        None => (None, target.clone()),
    };

    TargetParts {
        target,
        target_range,
        alias,
        anchor,
        qualifier,
        title,
    }
}

fn find_unescaped_pipe(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'|' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn unescape(text: &str) -> String {
    text.replace("\\|", "|")
}
