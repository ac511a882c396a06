//! Terminal rendering of list items and snapshots.
//!
//! Items come back from the API as loosely shaped JSON objects whose field
//! names differ per list, so rows are built by probing a few well-known keys.

use owo_colors::OwoColorize;
use serde_json::{Value, json};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::catalog::ListKind;
use crate::list::{ListSnapshot, ListViewModel};

const ID_KEYS: &[&str] = &["id", "_id", "uuid", "code"];
const NAME_KEYS: &[&str] = &[
    "name",
    "title",
    "subject",
    "storeName",
    "mallName",
    "cityName",
    "invoiceNumber",
];
const DETAIL_KEYS: &[&str] = &[
    "description",
    "address",
    "message",
    "body",
    "city",
    "total",
    "amount",
    "createdAt",
];

/// Longest cell text before it is cut with an ellipsis
const MAX_CELL_CHARS: usize = 60;

/// A row in the item table
#[derive(Debug, Tabled, PartialEq, Eq)]
pub struct ItemRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Details")]
    pub details: String,
}

/// Render the first non-empty scalar under any of `keys`
fn field_text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match item.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn truncate(text: &str) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= MAX_CELL_CHARS {
        return single_line;
    }
    let cut: String = single_line.chars().take(MAX_CELL_CHARS - 3).collect();
    format!("{cut}...")
}

pub fn item_row(index: usize, item: &Value) -> ItemRow {
    let name = match item {
        Value::String(s) => Some(s.clone()),
        _ => field_text(item, NAME_KEYS),
    };
    ItemRow {
        index,
        id: field_text(item, ID_KEYS).unwrap_or_else(|| "-".to_string()),
        name: truncate(&name.unwrap_or_else(|| "(unnamed)".to_string())),
        details: truncate(&field_text(item, DETAIL_KEYS).unwrap_or_default()),
    }
}

/// Table of items, numbered from 1
pub fn items_table(items: &[Value]) -> String {
    let rows: Vec<ItemRow> = items
        .iter()
        .enumerate()
        .map(|(i, item)| item_row(i + 1, item))
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// Footer line: how much is loaded and whether more is available
pub fn summary_line(snapshot: &ListSnapshot<Value>) -> String {
    let total = snapshot
        .total_pages
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());
    let mut line = format!("{} item(s), {} page(s) total", snapshot.items.len(), total);
    if snapshot.can_load_more {
        line.push_str(", more available");
    }
    line
}

/// Human-readable rendering of a snapshot
pub fn render_snapshot(kind: ListKind, snapshot: &ListSnapshot<Value>) -> String {
    let heading = if snapshot.active_query.is_empty() {
        kind.label().to_string()
    } else {
        format!("{} matching '{}'", kind.label(), snapshot.active_query)
    };

    let mut out = format!("{}\n", heading.cyan().bold());
    match ListViewModel::from_snapshot(snapshot) {
        ListViewModel::Items { items, .. } => {
            out.push_str(&items_table(&items));
            out.push('\n');
            out.push_str(&summary_line(snapshot).dimmed().to_string());
        }
        view @ ListViewModel::Error {
            retryable,
            has_items,
            ..
        } => {
            if has_items {
                out.push_str(&items_table(&snapshot.items));
                out.push('\n');
            }
            let headline = view.headline().unwrap_or_default();
            out.push_str(&headline.red().to_string());
            if retryable {
                out.push_str(&" (enter '!' to retry)".dimmed().to_string());
            }
        }
        view => {
            out.push_str(&view.headline().unwrap_or_default().dimmed().to_string());
        }
    }
    out
}

/// JSON rendering of a snapshot
pub fn snapshot_json(kind: ListKind, snapshot: &ListSnapshot<Value>) -> Value {
    json!({
        "list": kind.to_string(),
        "query": snapshot.active_query,
        "items": snapshot.items,
        "total_pages": snapshot.total_pages,
        "can_load_more": snapshot.can_load_more,
        "error": snapshot.last_error.as_ref().map(|e| json!({
            "message": e.message,
            "retryable": e.retryable,
        })),
    })
}
