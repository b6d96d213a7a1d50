// Chordsong Conflict Detection
// Authoring-time checks for duplicate and prefix-shadowed chords
//
// Matching itself stays first-match-wins; this module only reports what a
// user would trip over and proposes replacement chords.

use indexmap::IndexMap;
use strum_macros::{Display, EnumString};

use crate::config::token_parser::{parse_token, split_chord};
use crate::mapping::{ChordDefinition, ALL_CONTEXTS};

/// How a replacement chord is derived from a conflicting one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FixStrategy {
    /// Add one more token at the end
    Append,
    /// Replace the last token
    ChangeLast,
}

/// Several definitions bound to the same token sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateConflict {
    pub chord: String,
    /// Context name, or `ALL/<context>` for a clash between the two
    pub context: String,
    pub labels: Vec<String>,
    pub groups: Vec<String>,
    pub fixes_append: Vec<String>,
    pub fixes_change_last: Vec<String>,
}

impl DuplicateConflict {
    pub fn count(&self) -> usize {
        self.labels.len()
    }
}

/// A chord that completes before a longer one can be typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixConflict {
    pub prefix_chord: String,
    pub prefix_label: String,
    pub prefix_group: String,
    pub full_chord: String,
    pub full_label: String,
    pub full_group: String,
    pub context: String,
    pub suggested_fix: Option<String>,
}

/// All conflicts found in a definition list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    pub duplicates: Vec<DuplicateConflict>,
    pub prefix_conflicts: Vec<PrefixConflict>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty() && self.prefix_conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.duplicates.len() + self.prefix_conflicts.len()
    }
}

/// Token sequence in canonical form, see [`canonical_token`]
type ChordKey = Vec<String>;

/// Comparison form of a token: decomposed, aliases resolved, sides dropped
///
/// `A` and `+a` share a form, and so do `^a` and `<^a`, since a stored
/// `^a` already accepts a typed `<^a`. Tokens that fail to decompose are
/// kept as written.
fn canonical_token(token: &str) -> String {
    match parse_token(token) {
        Ok(combo) => combo.without_sides().to_string(),
        Err(_) => token.to_string(),
    }
}

fn canonical_chord(chord: &str) -> ChordKey {
    split_chord(chord).into_iter().map(canonical_token).collect()
}

/// Definitions of one context grouped by their canonical token sequences
struct ContextChords<'a> {
    by_chord: IndexMap<ChordKey, Vec<&'a ChordDefinition>>,
    chords: Vec<String>,
}

impl<'a> ContextChords<'a> {
    fn new(defs: &[&'a ChordDefinition]) -> Self {
        let mut by_chord: IndexMap<ChordKey, Vec<&'a ChordDefinition>> = IndexMap::new();
        let mut chords = Vec::with_capacity(defs.len());
        for def in defs {
            let key: ChordKey = def
                .tokens()
                .iter()
                .map(|t| canonical_token(t.as_str()))
                .collect();
            chords.push(def.chord());
            by_chord.entry(key).or_default().push(*def);
        }
        Self { by_chord, chords }
    }
}

/// Find duplicate and prefix conflicts among enabled definitions
///
/// Definitions are compared within each context, and definitions in the
/// `ALL` context are compared against every other context. Tokens are
/// compared in canonical form, so spellings the matcher treats as the same
/// key (`A` and `+a`, `^a` and `<^a`) clash. With `suggest_fixes` each
/// conflict carries replacement chords that clash with nothing else in its
/// context.
pub fn find_conflicts(defs: &[ChordDefinition], suggest_fixes: bool) -> ConflictReport {
    let mut by_context: IndexMap<&str, Vec<&ChordDefinition>> = IndexMap::new();
    for def in defs.iter().filter(|d| d.enabled) {
        by_context.entry(def.context.as_str()).or_default().push(def);
    }

    let grouped: IndexMap<&str, ContextChords> = by_context
        .iter()
        .map(|(ctx, defs)| (*ctx, ContextChords::new(defs)))
        .collect();

    let mut report = ConflictReport::default();

    for (ctx, chords) in &grouped {
        for (key, members) in &chords.by_chord {
            if members.len() > 1 {
                report.duplicates.push(duplicate(
                    key,
                    ctx.to_string(),
                    members,
                    &chords.chords,
                    suggest_fixes,
                ));
            }
        }

        let keys: Vec<&ChordKey> = chords.by_chord.keys().collect();
        for (i, first) in keys.iter().enumerate() {
            for second in &keys[i + 1..] {
                let Some((prefix, full)) = prefix_pair(first, second) else {
                    continue;
                };
                report.prefix_conflicts.push(prefix_conflict(
                    chords.by_chord[prefix][0],
                    chords.by_chord[full][0],
                    ctx.to_string(),
                    &chords.chords,
                    suggest_fixes,
                ));
            }
        }
    }

    if let Some(all) = grouped.get(ALL_CONTEXTS) {
        for (ctx, chords) in grouped.iter().filter(|(ctx, _)| **ctx != ALL_CONTEXTS) {
            let context = format!("{}/{}", ALL_CONTEXTS, ctx);

            for (key, all_members) in &all.by_chord {
                if let Some(ctx_members) = chords.by_chord.get(key) {
                    let members: Vec<&ChordDefinition> =
                        all_members.iter().chain(ctx_members).copied().collect();
                    report.duplicates.push(duplicate(
                        key,
                        context.clone(),
                        &members,
                        &chords.chords,
                        suggest_fixes,
                    ));
                }
            }

            for (all_key, all_members) in &all.by_chord {
                for (ctx_key, ctx_members) in &chords.by_chord {
                    let (prefix_def, full_def) = if is_strict_prefix(all_key, ctx_key) {
                        (all_members[0], ctx_members[0])
                    } else if is_strict_prefix(ctx_key, all_key) {
                        (ctx_members[0], all_members[0])
                    } else {
                        continue;
                    };
                    report.prefix_conflicts.push(prefix_conflict(
                        prefix_def,
                        full_def,
                        context.clone(),
                        &chords.chords,
                        suggest_fixes,
                    ));
                }
            }
        }
    }

    log::debug!(
        "Conflict check: {} duplicates, {} prefix conflicts",
        report.duplicates.len(),
        report.prefix_conflicts.len()
    );

    report
}

fn duplicate(
    key: &ChordKey,
    context: String,
    members: &[&ChordDefinition],
    context_chords: &[String],
    suggest_fixes: bool,
) -> DuplicateConflict {
    // Shown as the first member spells it
    let chord = members.first().map(|d| d.chord()).unwrap_or_else(|| key.join(" "));
    let fixes = |strategy| {
        fixes_for_duplicate(&chord, key, members.len(), context_chords, strategy)
    };
    let (fixes_append, fixes_change_last) = if suggest_fixes {
        (fixes(FixStrategy::Append), fixes(FixStrategy::ChangeLast))
    } else {
        (Vec::new(), Vec::new())
    };

    DuplicateConflict {
        chord,
        context,
        labels: members.iter().map(|d| d.label.clone()).collect(),
        groups: members.iter().map(|d| d.group.clone()).collect(),
        fixes_append,
        fixes_change_last,
    }
}

/// One distinct replacement per duplicated definition
fn fixes_for_duplicate(
    chord: &str,
    key: &ChordKey,
    count: usize,
    context_chords: &[String],
    strategy: FixStrategy,
) -> Vec<String> {
    let mut existing: Vec<String> = context_chords
        .iter()
        .filter(|c| !same_tokens(c, key))
        .cloned()
        .collect();
    let mut used_symbols: Vec<String> = Vec::new();
    let mut fixes = Vec::with_capacity(count);

    for _ in 0..count {
        let Some(fix) = suggest_chord(chord, &existing, strategy, None, &used_symbols) else {
            break;
        };
        let fix_tokens = split_chord(&fix);
        if strategy == FixStrategy::ChangeLast || fix_tokens.len() > key.len() {
            if let Some(last) = fix_tokens.last() {
                used_symbols.push((*last).to_string());
            }
        }
        existing.push(fix.clone());
        fixes.push(fix);
    }

    fixes
}

fn prefix_conflict(
    prefix_def: &ChordDefinition,
    full_def: &ChordDefinition,
    context: String,
    context_chords: &[String],
    suggest_fixes: bool,
) -> PrefixConflict {
    let prefix_chord = prefix_def.chord();
    let full_chord = full_def.chord();
    let suggested_fix = if suggest_fixes {
        suggest_chord(
            &prefix_chord,
            context_chords,
            FixStrategy::Append,
            Some(&full_chord),
            &[],
        )
    } else {
        None
    };

    PrefixConflict {
        prefix_label: prefix_def.label.clone(),
        prefix_group: prefix_def.group.clone(),
        full_label: full_def.label.clone(),
        full_group: full_def.group.clone(),
        prefix_chord,
        full_chord,
        context,
        suggested_fix,
    }
}

fn prefix_pair<'k>(a: &'k ChordKey, b: &'k ChordKey) -> Option<(&'k ChordKey, &'k ChordKey)> {
    if is_strict_prefix(a, b) {
        Some((a, b))
    } else if is_strict_prefix(b, a) {
        Some((b, a))
    } else {
        None
    }
}

fn is_strict_prefix<S: AsRef<str>>(prefix: &[S], full: &[S]) -> bool {
    prefix.len() < full.len()
        && prefix
            .iter()
            .zip(full)
            .all(|(a, b)| a.as_ref() == b.as_ref())
}

fn same_tokens(chord: &str, key: &[String]) -> bool {
    canonical_chord(chord).as_slice() == key
}

/// Check if a token sequence clashes with any existing chord
///
/// Equal sequences clash, and so does either being a prefix of the other.
/// Tokens are compared in canonical form.
pub fn has_conflict(tokens: &[&str], existing: &[String]) -> bool {
    let tokens: ChordKey = tokens.iter().map(|t| canonical_token(t)).collect();
    existing.iter().any(|chord| {
        let other = canonical_chord(chord);
        other == tokens || is_strict_prefix(&tokens, &other) || is_strict_prefix(&other, &tokens)
    })
}

const LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "1234567890";
const FALLBACK_SYMBOLS: &str = "abcdefghijklmnopqrstuvwxyz1234567890";

/// Suggest a chord derived from `base` that clashes with nothing in `existing`
///
/// Tries lowercase then uppercase letters, then (when appending) digits.
/// If none fit, single positions of the chord are rewritten, starting from
/// the end for `ChangeLast`. Symbols in `exclude_symbols` and the chord
/// `exclude_chord` are never returned. When appending, chords identical to
/// `base` are ignored since the suggestion replaces them.
pub fn suggest_chord(
    base: &str,
    existing: &[String],
    strategy: FixStrategy,
    exclude_chord: Option<&str>,
    exclude_symbols: &[String],
) -> Option<String> {
    let base_tokens = split_chord(base);
    if base_tokens.is_empty() {
        log::warn!("Cannot suggest a chord for empty base '{}'", base);
        return None;
    }

    let checked: Vec<String> = match strategy {
        FixStrategy::ChangeLast => existing.to_vec(),
        FixStrategy::Append => {
            let base_key = canonical_chord(base);
            existing
                .iter()
                .filter(|c| canonical_chord(c) != base_key)
                .cloned()
                .collect()
        }
    };
    let excluded = |symbol: &str| exclude_symbols.iter().any(|s| s == symbol);
    let accept = |tokens: &[&str]| {
        let chord = tokens.join(" ");
        if exclude_chord == Some(chord.as_str()) || has_conflict(tokens, &checked) {
            None
        } else {
            Some(chord)
        }
    };

    let mut symbols: Vec<String> = LETTERS.chars().map(String::from).collect();
    if strategy == FixStrategy::Append {
        symbols.extend(DIGITS.chars().map(String::from));
    }

    for symbol in &symbols {
        if excluded(symbol) {
            continue;
        }
        let mut tokens = base_tokens.clone();
        match strategy {
            FixStrategy::Append => tokens.push(symbol.as_str()),
            FixStrategy::ChangeLast => {
                if tokens.last() == Some(&symbol.as_str()) {
                    continue;
                }
                if let Some(last) = tokens.last_mut() {
                    *last = symbol.as_str();
                }
            }
        }
        if let Some(chord) = accept(tokens.as_slice()) {
            return Some(chord);
        }
    }

    let positions: Vec<usize> = match strategy {
        FixStrategy::ChangeLast => (0..base_tokens.len()).rev().collect(),
        FixStrategy::Append => (0..base_tokens.len()).collect(),
    };
    let fallback: Vec<String> = FALLBACK_SYMBOLS.chars().map(String::from).collect();
    for i in positions {
        for symbol in &fallback {
            if excluded(symbol) || base_tokens[i] == symbol.as_str() {
                continue;
            }
            let mut tokens = base_tokens.clone();
            tokens[i] = symbol.as_str();
            if let Some(chord) = accept(tokens.as_slice()) {
                return Some(chord);
            }
        }
    }

    None
}
