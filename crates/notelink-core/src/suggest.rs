use crate::index::{qualified_key, WikiIndex};
use crate::model::{Note, NoteId, TreeNode};
use crate::utils::{normalize_posix, relative_posix, slugify, split_known_extension};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Note,
    Folder,
}

/// One autocomplete entry. `target` is what gets inserted between the brackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionItem {
    pub kind: SuggestionKind,
    pub display: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<NoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestOptions {
    /// Maximum number of items returned, applied after ranking.
    pub limit: Option<usize>,
    pub include_folders: bool,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            limit: None,
            include_folders: true,
        }
    }
}

/// Ranked, deduplicated note and folder suggestions for a partial link token.
pub fn collect_wiki_suggestion_items(
    index: &WikiIndex,
    tree: Option<&TreeNode>,
    query: &str,
) -> Vec<SuggestionItem> {
    SuggestionCollector::new(index, tree).collect(query, &SuggestOptions::default())
}

pub struct SuggestionCollector<'a> {
    index: &'a WikiIndex,
    tree: Option<&'a TreeNode>,
}

/// `folder/partial` splits into a lowercased folder scope and the partial text.
struct Query {
    scope: Option<String>,
    needle: String,
}

impl Query {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.rfind(['/', '\\']) {
            Some(pos) => Self {
                scope: Some(normalize_posix(&raw[..pos]).to_lowercase()),
                needle: raw[pos + 1..].trim().to_lowercase(),
            },
            None => Self {
                scope: None,
                needle: raw.to_lowercase(),
            },
        }
    }

    /// `Some(0)` for a prefix match, `Some(1)` for a substring match.
    fn tier(&self, label: &str) -> Option<u8> {
        if self.needle.is_empty() {
            return Some(0);
        }
        let label = label.to_lowercase();
        if label.starts_with(&self.needle) {
            Some(0)
        } else if label.contains(&self.needle) {
            Some(1)
        } else {
            None
        }
    }

    /// Whether a folder key lies directly inside the scope.
    fn in_scope(&self, folder_key: &str) -> bool {
        match &self.scope {
            None => true,
            Some(scope) if scope.is_empty() => folder_key.is_empty(),
            Some(scope) => folder_key == scope || folder_key.ends_with(&format!("/{scope}")),
        }
    }
}

impl<'a> SuggestionCollector<'a> {
    pub fn new(index: &'a WikiIndex, tree: Option<&'a TreeNode>) -> Self {
        Self { index, tree }
    }

    pub fn collect(&self, query: &str, options: &SuggestOptions) -> Vec<SuggestionItem> {
        let query = Query::parse(query);

        let mut ranked: Vec<(u8, SuggestionItem)> = self.note_items(&query);
        if options.include_folders {
            ranked.extend(self.folder_items(&query));
        }

        ranked.sort_by(|(ta, a), (tb, b)| {
            ta.cmp(tb)
                .then_with(|| a.display.to_lowercase().cmp(&b.display.to_lowercase()))
                .then_with(|| a.display.cmp(&b.display))
                .then_with(|| a.kind.cmp(&b.kind))
                .then_with(|| a.target.cmp(&b.target))
        });

        let limit = options.limit.unwrap_or(usize::MAX);
        let items: Vec<SuggestionItem> = ranked
            .into_iter()
            .map(|(_, item)| item)
            .take(limit)
            .collect();

        log::trace!(
            "Suggestions for {:?}: {} items",
            query.needle,
            items.len()
        );
        items
    }

    fn note_items(&self, query: &Query) -> Vec<(u8, SuggestionItem)> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut items = Vec::new();

        for note in self.index.notes() {
            let (stem, _) = split_known_extension(note.title.trim());
            let slug = slugify(stem);
            if slug.is_empty() {
                continue;
            }

            let folder_key = self.index.folder_key(note);
            if !query.in_scope(&folder_key) {
                continue;
            }

            let (leaf_title, leaf_key) = leaf_for(note, stem, &slug);
            let Some(tier) = query.tier(&leaf_title) else {
                continue;
            };

            let qualified = qualified_key(&folder_key, &leaf_key);
            if !seen.insert((leaf_title.clone(), qualified)) {
                continue;
            }

            let owns_bare_key = self.index.lookup(&leaf_key) == Some(&note.id);
            let label = self.index.folder_label(note);
            let target = if query.scope.is_none() && owns_bare_key {
                leaf_title.clone()
            } else if label.is_empty() {
                format!("./{leaf_title}")
            } else {
                format!("{label}/{leaf_title}")
            };

            items.push((
                tier,
                SuggestionItem {
                    kind: SuggestionKind::Note,
                    display: leaf_title,
                    target,
                    note_id: Some(note.id.clone()),
                    detail: (!label.is_empty()).then_some(label),
                },
            ));
        }

        items
    }

    fn folder_items(&self, query: &Query) -> Vec<(u8, SuggestionItem)> {
        let current = self.index.current_folder();
        let mut paths: BTreeSet<String> = BTreeSet::new();

        let tree_dirs = self.tree.map(TreeNode::directories).unwrap_or_default();
        let note_dirs = self.index.notes().filter_map(Note::folder);
        for dir in tree_dirs
            .into_iter()
            .map(Path::to_path_buf)
            .chain(note_dirs)
        {
            let rel = normalize_posix(&relative_posix(current, &dir));
            if rel.is_empty() || rel.split('/').all(|seg| seg == "..") {
                continue;
            }
            let parent = rel.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
            if query.in_scope(&parent.to_lowercase()) {
                paths.insert(rel);
            }
        }

        let mut items = Vec::new();
        for rel in canonical_folders(paths) {
            let Some(tier) = query.tier(&rel) else {
                continue;
            };
            items.push((
                tier,
                SuggestionItem {
                    kind: SuggestionKind::Folder,
                    target: format!("{rel}/"),
                    display: rel,
                    note_id: None,
                    detail: None,
                },
            ));
        }
        items
    }
}

/// Title shown and key looked up for a note. Non-markdown notes carry their extension.
fn leaf_for(note: &Note, stem: &str, slug: &str) -> (String, String) {
    if note.note_type.is_markdown_capable() {
        return (note.title.trim().to_string(), slug.to_string());
    }
    match note.extension() {
        Some(ext) => (format!("{}.{ext}", stem.trim()), format!("{slug}.{ext}")),
        None => (note.title.trim().to_string(), slug.to_string()),
    }
}

/// One folder per distinct last segment (case-insensitive): the shallowest,
/// ties broken by full path.
fn canonical_folders(paths: BTreeSet<String>) -> Vec<String> {
    let mut groups: HashMap<String, String> = HashMap::new();
    for path in paths {
        let last = path
            .trim_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if last.is_empty() {
            continue;
        }
        let replace = groups
            .get(&last)
            .map_or(true, |existing| prefer(&path, existing) == Ordering::Less);
        if replace {
            groups.insert(last, path);
        }
    }
    let mut folders: Vec<String> = groups.into_values().collect();
    folders.sort();
    folders
}

fn prefer(a: &str, b: &str) -> Ordering {
    let depth = |p: &str| p.split('/').count();
    depth(a).cmp(&depth(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::rebuild_wiki_index;
    use crate::model::NoteType;

    fn index_of(notes: &[Note]) -> WikiIndex {
        rebuild_wiki_index(notes, Path::new("/ws"))
    }

    #[test]
    fn test_folder_canonicalization() {
        let notes = vec![
            Note::markdown("a", "Intro").with_path("/ws/docs/examples/intro.md"),
            Note::markdown("b", "Widget").with_path("/ws/src/renderer/examples/widget.md"),
        ];
        let index = index_of(&notes);
        let items = collect_wiki_suggestion_items(&index, None, "");

        let folders: Vec<_> = items
            .iter()
            .filter(|i| i.kind == SuggestionKind::Folder)
            .filter(|i| i.display.ends_with("examples"))
            .collect();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].display, "docs/examples");
        assert_eq!(folders[0].target, "docs/examples/");
    }

    #[test]
    fn test_folder_canonicalization_from_tree() {
        let tree = TreeNode::directory(
            "/ws",
            vec![
                TreeNode::directory(
                    "/ws/src",
                    vec![TreeNode::directory(
                        "/ws/src/renderer",
                        vec![TreeNode::directory("/ws/src/renderer/Examples", vec![])],
                    )],
                ),
                TreeNode::directory("/ws/docs", vec![TreeNode::directory("/ws/docs/examples", vec![])]),
            ],
        );
        let index = index_of(&[]);
        let items = collect_wiki_suggestion_items(&index, Some(&tree), "exam");
        let displays: Vec<_> = items.iter().map(|i| i.display.as_str()).collect();
        assert_eq!(displays, vec!["docs/examples"]);
    }

    #[test]
    fn test_scoped_folder_survives_shallower_namesake() {
        let notes = vec![
            Note::markdown("a", "Intro").with_path("/ws/docs/examples/intro.md"),
            Note::markdown("b", "Widget").with_path("/ws/src/renderer/examples/widget.md"),
        ];
        let index = index_of(&notes);
        let items = collect_wiki_suggestion_items(&index, None, "src/renderer/");
        let folders: Vec<_> = items
            .iter()
            .map(|i| (i.kind, i.target.as_str()))
            .collect();
        assert_eq!(folders, vec![(SuggestionKind::Folder, "src/renderer/examples/")]);
    }

    #[test]
    fn test_folder_path_ranks_by_full_display() {
        let notes = vec![
            Note::markdown("e", "Extra").with_path("/ws/extra.md"),
            Note::markdown("i", "Intro").with_path("/ws/docs/examples/intro.md"),
        ];
        let index = index_of(&notes);
        let items = collect_wiki_suggestion_items(&index, None, "ex");
        let displays: Vec<_> = items.iter().map(|i| i.display.as_str()).collect();
        assert_eq!(displays, vec!["Extra", "docs/examples"]);
    }

    #[test]
    fn test_prefix_matches_rank_first() {
        let notes = vec![
            Note::markdown("1", "Beta Alpha").with_path("/ws/beta-alpha.md"),
            Note::markdown("2", "alphabet").with_path("/ws/alphabet.md"),
            Note::markdown("3", "Alpha Note").with_path("/ws/alpha-note.md"),
            Note::markdown("4", "Gamma").with_path("/ws/gamma.md"),
        ];
        let index = index_of(&notes);
        let items = collect_wiki_suggestion_items(&index, None, "ALP");
        let displays: Vec<_> = items.iter().map(|i| i.display.as_str()).collect();
        assert_eq!(displays, vec!["Alpha Note", "alphabet", "Beta Alpha"]);
    }

    #[test]
    fn test_duplicate_titles_are_disambiguated() {
        let notes = vec![
            Note::markdown("n1", "Notes").with_path("/ws/a/notes.md"),
            Note::markdown("n2", "Notes").with_path("/ws/b/notes.md"),
            Note::markdown("n3", "Notes").with_path("/ws/b/notes-copy.md"),
        ];
        let index = index_of(&notes);
        let items = SuggestionCollector::new(&index, None).collect(
            "notes",
            &SuggestOptions {
                include_folders: false,
                ..Default::default()
            },
        );

        // n3 shares display and qualified key with n2, only the first is kept
        assert_eq!(items.len(), 2);
        let targets: Vec<_> = items.iter().map(|i| i.target.as_str()).collect();
        assert!(targets.contains(&"a/Notes"));
        assert!(targets.contains(&"b/Notes") || targets.contains(&"Notes"));
        assert!(items.iter().all(|i| i.kind == SuggestionKind::Note));
    }

    #[test]
    fn test_bare_target_when_note_owns_bare_key() {
        let notes = vec![Note::markdown("x", "Only One").with_path("/ws/deep/only.md")];
        let index = index_of(&notes);
        let items = collect_wiki_suggestion_items(&index, None, "only");
        let note = items
            .iter()
            .find(|i| i.kind == SuggestionKind::Note)
            .expect("note suggestion");
        assert_eq!(note.target, "Only One");
        assert_eq!(note.detail.as_deref(), Some("deep"));
        assert_eq!(note.note_id, Some(NoteId::from("x")));
    }

    #[test]
    fn test_scoped_query_restricts_to_folder() {
        let notes = vec![
            Note::markdown("n1", "Notes").with_path("/ws/a/notes.md"),
            Note::markdown("n2", "Notes").with_path("/ws/b/notes.md"),
            Note::markdown("n3", "Nothing").with_path("/ws/a/inner/nothing.md"),
        ];
        let index = index_of(&notes);
        let items = collect_wiki_suggestion_items(&index, None, "a/no");

        let targets: Vec<_> = items.iter().map(|i| i.target.as_str()).collect();
        assert_eq!(targets, vec!["a/Notes"]);

        let items = collect_wiki_suggestion_items(&index, None, "a/");
        let targets: Vec<_> = items.iter().map(|i| i.target.as_str()).collect();
        assert_eq!(targets, vec!["a/inner/", "a/Notes"]);
    }

    #[test]
    fn test_non_markdown_targets_carry_extension() {
        let notes = vec![
            Note::markdown("md", "Manual").with_path("/ws/manual.md"),
            Note::new("pdf", "Manual", NoteType::Pdf).with_path("/ws/manual.pdf"),
        ];
        let index = index_of(&notes);
        let items = collect_wiki_suggestion_items(&index, None, "man");
        let targets: Vec<_> = items.iter().map(|i| i.target.as_str()).collect();
        assert_eq!(targets, vec!["Manual", "Manual.pdf"]);
    }

    #[test]
    fn test_limit_and_folder_switch() {
        let notes: Vec<Note> = (0..10)
            .map(|i| Note::markdown(format!("id{i}"), format!("Note {i}")).with_path(format!("/ws/f{i}/n.md")))
            .collect();
        let index = index_of(&notes);

        let all = collect_wiki_suggestion_items(&index, None, "");
        assert_eq!(all.len(), 20);

        let limited = SuggestionCollector::new(&index, None).collect(
            "",
            &SuggestOptions {
                limit: Some(3),
                include_folders: false,
            },
        );
        assert_eq!(limited.len(), 3);
        assert_eq!(limited[0].display, "Note 0");
    }

    #[test]
    fn test_no_match_is_empty() {
        let notes = vec![Note::markdown("a", "Alpha").with_path("/ws/alpha.md")];
        let index = index_of(&notes);
        assert!(collect_wiki_suggestion_items(&index, None, "zzz").is_empty());
    }

    #[test]
    fn test_suggestion_shape() {
        let item = SuggestionItem {
            kind: SuggestionKind::Folder,
            display: "docs".to_string(),
            target: "docs/".to_string(),
            note_id: None,
            detail: None,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "folder", "display": "docs", "target": "docs/"})
        );
    }
}
