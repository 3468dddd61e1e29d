use crate::index::{qualified_key, WikiIndex};
use crate::model::{NoteId, NoteType};
use crate::syntax::split_target;
use crate::utils::{normalize_posix, slugify, split_known_extension};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionKind {
    Note,
    Unresolved,
}

/// Outcome of resolving one link token. Never an error: a miss is `Unresolved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub kind: ResolutionKind,
    pub note_id: Option<NoteId>,
    pub display_target: String,
    pub alias: Option<String>,
    pub anchor: Option<String>,
    /// Page number for PDF targets written as `File.pdf#3`.
    pub page: Option<u32>,
    pub matched_key: Option<String>,
}

impl ResolutionResult {
    pub fn is_resolved(&self) -> bool {
        self.kind == ResolutionKind::Note
    }

    /// Text shown for the link: the alias when present, else the target.
    pub fn display_text(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.display_target)
    }

    fn unresolved(token: &str, alias: Option<String>, anchor: Option<String>) -> Self {
        Self {
            kind: ResolutionKind::Unresolved,
            note_id: None,
            display_target: token.to_string(),
            alias,
            anchor,
            page: None,
            matched_key: None,
        }
    }
}

/// The note a link is written in, used for sibling resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveContext {
    pub note_id: Option<NoteId>,
}

impl ResolveContext {
    pub fn for_note(id: impl Into<NoteId>) -> Self {
        Self {
            note_id: Some(id.into()),
        }
    }
}

/// Resolve a raw link token against an index snapshot.
///
/// Lookup order:
/// 1. qualified key relative to the context note's folder (when it differs
///    from the current folder), then the globally qualified key
/// 2. sibling key in the context note's folder, for unqualified tokens
/// 3. bare slug of the whole target
///
/// Titles ending in a known extension are tried through extension keys
/// first and then through their stem.
pub fn parse_wiki_target(
    index: &WikiIndex,
    token: &str,
    context: Option<&ResolveContext>,
) -> ResolutionResult {
    let parts = split_target(token);
    if parts.is_empty() {
        return ResolutionResult::unresolved(token, parts.alias, parts.anchor);
    }

    let context_folder = context
        .and_then(|ctx| ctx.note_id.as_ref())
        .and_then(|id| index.note(id))
        .map(|note| index.folder_key(note))
        .filter(|folder| !folder.is_empty());

    let (stem, ext) = split_known_extension(&parts.title);
    let slug = slugify(stem);
    let mut leaves = Vec::with_capacity(2);
    if let Some(ext) = &ext {
        leaves.push(format!("{slug}.{ext}"));
    }
    leaves.push(slug);

    let mut candidates: Vec<String> = Vec::new();
    for leaf in leaves.iter().filter(|l| !l.is_empty()) {
        match &parts.qualifier {
            Some(qualifier) => {
                let qualifier = qualifier.to_lowercase();
                if let Some(folder) = &context_folder {
                    let joined = normalize_posix(&format!("{folder}/{qualifier}"));
                    candidates.push(qualified_key(&joined, leaf));
                }
                candidates.push(qualified_key(&normalize_posix(&qualifier), leaf));
            }
            None => {
                if let Some(folder) = &context_folder {
                    candidates.push(qualified_key(folder, leaf));
                }
            }
        }
    }

    // Bare fallbacks: whole target (qualifier folded into the slug), then the plain leaves.
    let (whole_stem, whole_ext) = split_known_extension(&parts.target);
    let whole = slugify(whole_stem);
    if let Some(ext) = whole_ext {
        candidates.push(format!("{whole}.{ext}"));
    }
    candidates.push(whole);
    if parts.qualifier.is_none() {
        candidates.extend(leaves);
    }

    let mut seen = std::collections::HashSet::new();
    let hit = candidates
        .into_iter()
        .filter(|key| !key.is_empty() && seen.insert(key.clone()))
        .find_map(|key| index.lookup(&key).cloned().map(|id| (key, id)));

    let Some((key, note_id)) = hit else {
        log::trace!("Wikilink {:?} is unresolved", token);
        return ResolutionResult::unresolved(token, parts.alias, parts.anchor);
    };

    log::trace!("Wikilink {:?} resolved to {} via {:?}", token, note_id, key);

    let page = index
        .note(&note_id)
        .filter(|note| note.note_type == NoteType::Pdf)
        .and_then(|_| parts.anchor.as_deref())
        .and_then(parse_page);

    ResolutionResult {
        kind: ResolutionKind::Note,
        note_id: Some(note_id),
        display_target: display_target(token),
        alias: parts.alias,
        anchor: parts.anchor,
        page,
        matched_key: Some(key),
    }
}

/// Token without its alias, trimmed.
pub(crate) fn display_target(token: &str) -> String {
    let bytes = token.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'|' => return token[..i].trim().to_string(),
            _ => i += 1,
        }
    }
    token.trim().to_string()
}

/// `3`, `page=3` and `p3` all name page 3.
fn parse_page(anchor: &str) -> Option<u32> {
    let anchor = anchor.trim();
    let digits = anchor
        .strip_prefix("page=")
        .or_else(|| anchor.strip_prefix('p'))
        .unwrap_or(anchor);
    digits.parse().ok().filter(|page| *page > 0)
}
