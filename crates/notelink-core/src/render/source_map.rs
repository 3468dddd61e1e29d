use crate::line_map::LineMap;
use crate::model::Point;
use serde::Serialize;
use std::ops::Range;

const MARK_OPEN: char = '\u{E002}';
const MARK_CLOSE: char = '\u{E003}';

/// Source range of one top-level rendered block.
///
/// The element carries `data-source-block="{block}"` in the output HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapEntry {
    pub block: usize,
    /// Byte offset into the original markdown.
    pub start_offset: usize,
    pub end_offset: usize,
    pub start: Point,
    pub end: Point,
}

impl SourceMapEntry {
    pub(crate) fn new(block: usize, range: Range<usize>, lines: &LineMap<'_>) -> Self {
        Self {
            block,
            start: lines.offset_to_point(range.start),
            end: lines.offset_to_point(range.end),
            start_offset: range.start,
            end_offset: range.end,
        }
    }

    /// CSS selector of the rendered element.
    pub fn selector(&self) -> String {
        format!("[data-source-block=\"{}\"]", self.block)
    }

    pub fn contains(&self, offset: usize) -> bool {
        (self.start_offset..self.end_offset).contains(&offset)
    }
}

pub(crate) fn marker(n: usize) -> String {
    format!("{MARK_OPEN}{n}{MARK_CLOSE}")
}

/// Remove block markers, tagging the element that directly follows each one.
///
/// Returns the rewritten HTML and, in attribute order, the marker numbers that
/// found an element. Markers not followed by an opening tag are dropped.
pub(crate) fn attach(html: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(html.len() + 64);
    let mut attached = Vec::new();
    let mut rest = html;

    while let Some(pos) = rest.find(MARK_OPEN) {
        out.push_str(&rest[..pos]);
        let body = &rest[pos + MARK_OPEN.len_utf8()..];
        let Some(close) = body.find(MARK_CLOSE) else {
            rest = body;
            continue;
        };
        let number = body[..close].parse::<usize>().ok();
        rest = &body[close + MARK_CLOSE.len_utf8()..];

        let Some(number) = number else {
            continue;
        };
        let ws = rest.len() - rest.trim_start().len();
        let name_len = tag_name_len(&rest[ws..]);
        if name_len == 0 {
            continue;
        }

        let head = ws + 1 + name_len;
        out.push_str(&rest[..head]);
        out.push_str(&format!(" data-source-block=\"{}\"", attached.len()));
        attached.push(number);
        rest = &rest[head..];
    }

    out.push_str(rest);
    (out, attached)
}

fn tag_name_len(text: &str) -> usize {
    let Some(name) = text.strip_prefix('<') else {
        return 0;
    };
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return 0;
    }
    name.bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
        .count()
}
