use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::CommandOutput;
use crate::catalog::ListKind;
use crate::config::Config;
use crate::error::Result;

/// A row in the list catalog table
#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "List")]
    name: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Page size")]
    page_size: u32,
    #[tabled(rename = "Debounce")]
    debounce: String,
    #[tabled(rename = "Required filters")]
    required: String,
}

/// Print every list with its effective page size and debounce interval
pub fn cmd_lists(json: bool) -> Result<()> {
    let config = Config::load()?;

    let json_output = json!(
        ListKind::ALL
            .iter()
            .map(|kind| json!({
                "name": kind.to_string(),
                "path": kind.path(),
                "items_field": kind.items_field(),
                "page_size": config.page_size(*kind),
                "debounce_ms": config.debounce(*kind).as_millis() as u64,
                "required_filters": kind.required_filters(),
            }))
            .collect::<Vec<_>>()
    );

    let rows: Vec<ListRow> = ListKind::ALL
        .iter()
        .map(|kind| ListRow {
            name: kind.to_string(),
            endpoint: format!("/{}", kind.path()),
            page_size: config.page_size(*kind),
            debounce: format!("{}ms", config.debounce(*kind).as_millis()),
            required: if kind.required_filters().is_empty() {
                "-".to_string()
            } else {
                kind.required_filters().join(", ")
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());

    CommandOutput::new(json_output)
        .with_text(table.to_string())
        .print(json)
}
