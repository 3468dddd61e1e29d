//! Wikilink extraction before markdown conversion.
//!
//! Every token is swapped for `U+E000 n U+E001` so the markdown engine sees
//! an opaque word. Private-use characters already present in the source are
//! replaced with U+FFFD first; both encode to three bytes, so token offsets
//! stay valid against the original text.

use crate::syntax::{scan_wikilinks, WikiToken};

pub(crate) const OPEN: char = '\u{E000}';
pub(crate) const CLOSE: char = '\u{E001}';

const RESERVED: std::ops::RangeInclusive<char> = '\u{E000}'..='\u{E003}';

pub(crate) struct Extracted {
    /// Source with reserved characters neutralized; token spans index into it.
    pub source: String,
    /// Text handed to the markdown engine.
    pub text: String,
    pub tokens: Vec<WikiToken>,
    pub offsets: OffsetMap,
}

pub(crate) enum Piece<'t> {
    Text(&'t str),
    Token(usize),
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    processed: usize,
    original: usize,
    processed_len: usize,
    original_len: usize,
    placeholder: bool,
}

/// Maps offsets in the processed text back to the original source.
#[derive(Debug, Clone, Default)]
pub(crate) struct OffsetMap {
    segments: Vec<Segment>,
    source_len: usize,
}

impl OffsetMap {
    /// Offsets inside a placeholder map to the token start; its end maps to the token end.
    pub fn to_original(&self, offset: usize) -> usize {
        let idx = self.segments.partition_point(|s| s.processed <= offset);
        let Some(seg) = idx.checked_sub(1).and_then(|i| self.segments.get(i)) else {
            return 0;
        };
        let delta = offset - seg.processed;
        let mapped = if !seg.placeholder {
            seg.original + delta
        } else if delta >= seg.processed_len {
            seg.original + seg.original_len
        } else {
            seg.original
        };
        mapped.min(self.source_len)
    }
}

pub(crate) fn extract(source: &str) -> Extracted {
    let source: String = source
        .chars()
        .map(|c| if RESERVED.contains(&c) { '\u{FFFD}' } else { c })
        .collect();
    let tokens = scan_wikilinks(&source);

    let mut text = String::with_capacity(source.len());
    let mut segments = Vec::with_capacity(tokens.len() * 2 + 1);
    let mut cursor = 0;

    for (n, token) in tokens.iter().enumerate() {
        let literal = &source[cursor..token.span.start];
        segments.push(Segment {
            processed: text.len(),
            original: cursor,
            processed_len: literal.len(),
            original_len: literal.len(),
            placeholder: false,
        });
        text.push_str(literal);

        let start = text.len();
        text.push(OPEN);
        text.push_str(&n.to_string());
        text.push(CLOSE);
        segments.push(Segment {
            processed: start,
            original: token.span.start,
            processed_len: text.len() - start,
            original_len: token.span.len(),
            placeholder: true,
        });
        cursor = token.span.end;
    }

    let tail = &source[cursor..];
    segments.push(Segment {
        processed: text.len(),
        original: cursor,
        processed_len: tail.len(),
        original_len: tail.len(),
        placeholder: false,
    });
    text.push_str(tail);

    let offsets = OffsetMap {
        segments,
        source_len: source.len(),
    };
    Extracted {
        source,
        text,
        tokens,
        offsets,
    }
}

/// Split processed text into literal runs and placeholder indices.
pub(crate) fn pieces(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut last = 0;
    let mut search = 0;

    while let Some(rel) = text[search..].find(OPEN) {
        let open = search + rel;
        let body = open + OPEN.len_utf8();
        let parsed = text[body..].find(CLOSE).and_then(|len| {
            let digits = &text[body..body + len];
            let valid = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
            valid
                .then(|| digits.parse::<usize>().ok())
                .flatten()
                .map(|n| (n, body + len + CLOSE.len_utf8()))
        });

        match parsed {
            Some((n, end)) => {
                if open > last {
                    pieces.push(Piece::Text(&text[last..open]));
                }
                pieces.push(Piece::Token(n));
                last = end;
                search = end;
            }
            None => search = body,
        }
    }

    if last < text.len() {
        pieces.push(Piece::Text(&text[last..]));
    }
    pieces
}

impl Extracted {
    /// Processed text with placeholders turned back into their literal tokens.
    pub fn restore(&self, text: &str) -> String {
        if !text.contains(OPEN) {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        for piece in pieces(text) {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Token(n) => match self.tokens.get(n) {
                    Some(token) => out.push_str(token.source(&self.source)),
                    None => out.push_str(&placeholder(n)),
                },
            }
        }
        out
    }
}

fn placeholder(n: usize) -> String {
    format!("{OPEN}{n}{CLOSE}")
}
