// Chordsong Overlay Model
// Rows, footer and header text for the which-key overlay

use crate::config::parser::OverlaySettings;
use crate::token::Token;
use crate::transform::candidates::Candidate;

/// One line of the overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRow {
    pub token: String,
    pub label: String,
    pub icon: String,
    /// Definitions behind a folder row
    pub count: Option<usize>,
}

impl OverlayRow {
    fn item(token: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            label: label.into(),
            icon: String::new(),
            count: None,
        }
    }

    /// Compact counter shown after a folder label, e.g. `+3`
    pub fn count_suffix(&self) -> Option<String> {
        self.count.map(|n| format!("+{}", n))
    }
}

/// Everything the overlay shows for one buffer state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayModel {
    pub header: String,
    pub columns: Vec<Vec<OverlayRow>>,
    pub footer: Vec<OverlayRow>,
    /// Rows dropped by the item limit
    pub hidden: usize,
}

/// Build display rows from candidates, sorted by token
///
/// A single definition that completes the chord shows its own label. A
/// folder (more keys to come, or several definitions behind one key) shows
/// `<group>...` when its definitions share one group.
pub fn build_rows(candidates: &[Candidate]) -> Vec<OverlayRow> {
    let mut rows: Vec<OverlayRow> = candidates
        .iter()
        .map(|c| {
            let label = if !c.is_final {
                folder_label(&c.groups, "More")
            } else if c.count > 1 {
                let first_word = c.label.split_whitespace().next().unwrap_or("More");
                folder_label(&c.groups, first_word)
            } else {
                c.label.clone()
            };
            OverlayRow {
                token: c.next_token.as_str().to_string(),
                label,
                icon: c.icon.clone(),
                count: c.is_folder().then_some(c.count),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.token.cmp(&b.token));
    rows
}

fn folder_label(groups: &[String], fallback: &str) -> String {
    match groups {
        [only] => format!("{}...", only),
        _ => format!("{}...", fallback),
    }
}

/// Footer entries; the recents entry only appears at the root
pub fn footer(has_buffer: bool, leader_token: &str) -> Vec<OverlayRow> {
    let mut footer = Vec::with_capacity(2);
    if !has_buffer {
        footer.push(OverlayRow::item(
            format!("{}+{}", leader_token, leader_token),
            "Recent Commands",
        ));
    }
    footer.push(OverlayRow::item("ESC", "Close"));
    if has_buffer {
        footer.push(OverlayRow::item("BS", "Back"));
    }
    footer
}

/// Header line: the typed tokens joined with `+`, or a prompt when empty
pub fn header(buffer: &[Token]) -> String {
    if buffer.is_empty() {
        return "> ...".to_string();
    }
    buffer
        .iter()
        .map(Token::as_str)
        .collect::<Vec<_>>()
        .join("+")
}

/// Split rows into columns of at most `max_rows` entries
pub fn wrap_into_columns(rows: Vec<OverlayRow>, max_rows: usize) -> Vec<Vec<OverlayRow>> {
    let max_rows = max_rows.max(1);
    let mut columns: Vec<Vec<OverlayRow>> = Vec::new();
    let mut column = Vec::with_capacity(max_rows);
    for row in rows {
        if column.len() == max_rows {
            columns.push(std::mem::replace(&mut column, Vec::with_capacity(max_rows)));
        }
        column.push(row);
    }
    if !column.is_empty() || columns.is_empty() {
        columns.push(column);
    }
    columns
}

/// Assemble the complete overlay for a buffer and its candidates
pub fn build_overlay(
    buffer: &[Token],
    candidates: &[Candidate],
    leader_token: &str,
    settings: &OverlaySettings,
) -> OverlayModel {
    let mut rows = build_rows(candidates);
    let hidden = rows.len().saturating_sub(settings.max_items);
    rows.truncate(settings.max_items);

    OverlayModel {
        header: header(buffer),
        columns: wrap_into_columns(rows, settings.column_rows),
        footer: footer(!buffer.is_empty(), leader_token),
        hidden,
    }
}
