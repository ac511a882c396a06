//! Command implementations for the `nearby` binary.

mod browse;
mod config;
mod lists;
mod search;

pub use browse::{BrowseOptions, cmd_browse};
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use lists::cmd_lists;
pub use search::cmd_search;

use serde_json::Value;

use crate::catalog::ListKind;
use crate::config::Config;
use crate::error::{NearbyError, Result};
use crate::list::{ListController, ListOptions};
use crate::remote::HttpListProvider;
use crate::session::Session;

/// Output of a command: JSON for `--json`, otherwise text
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, json: bool) -> Result<()> {
        match self.text {
            Some(text) if !json => println!("{text}"),
            _ => print_json(&self.json)?,
        }
        Ok(())
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Fail early when a list is missing a filter its endpoint requires
fn check_required_filters(kind: ListKind, filters: &[(String, String)]) -> Result<()> {
    for required in kind.required_filters() {
        if !filters.iter().any(|(key, _)| key == required) {
            return Err(NearbyError::MissingFilter(
                kind.to_string(),
                required.to_string(),
            ));
        }
    }
    Ok(())
}

/// Spawn a controller for a catalog list backed by the HTTP provider
fn spawn_list(
    kind: ListKind,
    config: &Config,
    filters: Vec<(String, String)>,
) -> Result<ListController<Value>> {
    check_required_filters(kind, &filters)?;

    let session = Session::from_config(config);
    let provider = HttpListProvider::<Value>::for_list(kind, config, session)?;
    let options = ListOptions::for_list(kind, config).with_filters(filters.into_iter().collect());
    tracing::debug!(
        list = %kind,
        page_size = options.page_size,
        debounce_ms = options.debounce.as_millis() as u64,
        "spawning list controller"
    );
    Ok(ListController::spawn(provider, options))
}
