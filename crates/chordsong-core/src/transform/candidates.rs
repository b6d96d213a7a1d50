// Chordsong Transform Candidates
// Exact lookup and next-token candidate aggregation over chord definitions

use indexmap::IndexMap;

use super::matcher::matches_sequence;
use crate::mapping::{ActionKind, ChordDefinition, ALL_CONTEXTS};
use crate::token::Token;

/// One possible next key while a chord is being typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Stored token that continues the chord
    pub next_token: Token,
    pub label: String,
    pub icon: String,
    pub group: String,
    pub action_kind: ActionKind,
    /// True when pressing `next_token` completes at least one definition
    pub is_final: bool,
    /// Number of definitions behind this candidate
    pub count: usize,
    /// Sorted, de-duplicated, non-empty group names of those definitions
    pub groups: Vec<String>,
}

impl Candidate {
    fn from_definition(def: &ChordDefinition, next_token: &Token, is_final: bool) -> Self {
        Self {
            next_token: next_token.clone(),
            label: def.display_label().to_string(),
            icon: def.icon.clone(),
            group: def.group.clone(),
            action_kind: def.action.kind(),
            is_final,
            count: 0,
            groups: Vec::new(),
        }
    }

    /// Whether selecting this candidate opens a further level
    pub fn is_folder(&self) -> bool {
        !self.is_final || self.count > 1
    }
}

/// Find the definition completed by the buffer
///
/// Returns the first enabled definition, in collection order, with exactly
/// as many tokens as the buffer and matching it token by token.
pub fn find_exact<'a>(
    defs: &'a [ChordDefinition],
    buffer: &[Token],
) -> Option<&'a ChordDefinition> {
    if buffer.is_empty() {
        return None;
    }
    defs.iter().find(|def| {
        def.enabled && def.len() == buffer.len() && matches_sequence(def.tokens(), buffer)
    })
}

/// List the possible next tokens for the buffer
///
/// Only enabled definitions strictly longer than the buffer whose leading
/// tokens match it contribute. Results are grouped by the stored next token
/// in first-seen order. The representative of a group is its first member,
/// unless a later member completes the chord while the current one does not.
/// At the root the built-in recents entry is left out.
pub fn candidates(defs: &[ChordDefinition], buffer: &[Token]) -> Vec<Candidate> {
    let depth = buffer.len();
    let mut grouped: IndexMap<&str, Candidate> = IndexMap::new();

    for def in defs {
        if !def.enabled || def.len() <= depth {
            continue;
        }
        if depth == 0 && def.action.is_show_recents() {
            continue;
        }
        if !matches_sequence(def.tokens(), buffer) {
            continue;
        }

        let next_token = &def.tokens()[depth];
        let is_final = def.len() == depth + 1;

        let candidate = grouped
            .entry(next_token.as_str())
            .or_insert_with(|| Candidate::from_definition(def, next_token, is_final));

        if is_final && !candidate.is_final {
            let (count, groups) = (candidate.count, std::mem::take(&mut candidate.groups));
            *candidate = Candidate::from_definition(def, next_token, true);
            candidate.count = count;
            candidate.groups = groups;
        }

        candidate.count += 1;
        if !def.group.is_empty() {
            if let Err(pos) = candidate.groups.binary_search(&def.group) {
                candidate.groups.insert(pos, def.group.clone());
            }
        }
    }

    log::trace!("{} candidates after {} buffered tokens", grouped.len(), depth);

    grouped.into_values().collect()
}

/// Presentation order: by lowercased group, then by next token
pub fn sort_for_display(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        a.group
            .to_lowercase()
            .cmp(&b.group.to_lowercase())
            .then_with(|| a.next_token.as_str().cmp(b.next_token.as_str()))
    });
}

/// Definitions active in an editor context
///
/// A definition applies when its context equals `context` or is `ALL`.
pub fn filter_by_context<'a>(
    defs: &'a [ChordDefinition],
    context: &str,
) -> impl Iterator<Item = &'a ChordDefinition> + 'a {
    let context = context.to_string();
    defs.iter().filter(move |def| def.context == context || def.context == ALL_CONTEXTS)
}
