//! Wikilink syntax: locating tokens in text and splitting them into parts.

mod scanner;
mod target;

pub use scanner::{scan_wikilinks, WikiLinkKind, WikiToken};
pub use target::{split_target, TargetParts};
