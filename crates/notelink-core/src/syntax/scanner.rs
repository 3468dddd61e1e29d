use serde::Serialize;
use std::ops::Range;

/// Which of the three wikilink forms a token uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WikiLinkKind {
    /// `[[target]]`
    Reference,
    /// `![[target]]`
    Embed,
    /// `!![[target]]`
    InlineEmbed,
}

impl WikiLinkKind {
    pub fn marker(self) -> &'static str {
        match self {
            WikiLinkKind::Reference => "",
            WikiLinkKind::Embed => "!",
            WikiLinkKind::InlineEmbed => "!!",
        }
    }
}

/// A wikilink located in a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiToken {
    pub kind: WikiLinkKind,
    /// Whole token including the `!` markers and both bracket pairs.
    pub span: Range<usize>,
    /// Text between `[[` and `]]`.
    pub inner: Range<usize>,
}

impl WikiToken {
    pub fn raw<'a>(&self, text: &'a str) -> &'a str {
        &text[self.inner.clone()]
    }

    pub fn source<'a>(&self, text: &'a str) -> &'a str {
        &text[self.span.clone()]
    }
}

/// Find every well-formed wikilink in `text`, in order.
///
/// The scanner tracks bracket depth so `[[a [b] c]]` is one token, honors
/// backslash escapes, and never lets a token span a line break. Unbalanced or
/// empty tokens are skipped and stay plain text.
pub fn scan_wikilinks(text: &str) -> Vec<WikiToken> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'[' if bytes[i + 1] == b'[' => {
                let Some(close) = find_closing(bytes, i + 2) else {
                    i += 2;
                    continue;
                };

                let inner = i + 2..close;
                if is_blank_target(&text[inner.clone()]) {
                    i = close + 2;
                    continue;
                }

                let (kind, start) = embed_prefix(bytes, i);
                tokens.push(WikiToken {
                    kind,
                    span: start..close + 2,
                    inner,
                });
                i = close + 2;
            }
            _ => i += 1,
        }
    }

    tokens
}

/// Index of the first `]` of the closing `]]`, if the token is balanced.
fn find_closing(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = from;

    while j < bytes.len() {
        match bytes[j] {
            b'\\' => {
                j += 2;
                continue;
            }
            b'\n' | b'\r' => return None,
            b'[' => depth += 1,
            b']' if depth > 0 => depth -= 1,
            b']' => {
                return (j + 1 < bytes.len() && bytes[j + 1] == b']').then_some(j);
            }
            _ => {}
        }
        j += 1;
    }

    None
}

fn embed_prefix(bytes: &[u8], open: usize) -> (WikiLinkKind, usize) {
    let bang = |at: Option<usize>| at.is_some_and(|k| bytes[k] == b'!');
    let escaped = |at: Option<usize>| at.is_some_and(|k| bytes[k] == b'\\');

    let one = open.checked_sub(1);
    let two = open.checked_sub(2);
    let three = open.checked_sub(3);

    if bang(one) && bang(two) && !escaped(three) {
        (WikiLinkKind::InlineEmbed, open - 2)
    } else if bang(one) && !escaped(two) {
        (WikiLinkKind::Embed, open - 1)
    } else {
        (WikiLinkKind::Reference, open)
    }
}

// `[[]]`, `[[ ]]` and `[[|alias]]` carry no target.
fn is_blank_target(inner: &str) -> bool {
    let head = match inner.find('|') {
        Some(pos) => &inner[..pos],
        None => inner,
    };
    head.trim().is_empty()
}
