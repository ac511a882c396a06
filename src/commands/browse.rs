use owo_colors::OwoColorize;

use super::{print_json, spawn_list};
use crate::catalog::ListKind;
use crate::config::Config;
use crate::display::{render_snapshot, snapshot_json};
use crate::error::{NearbyError, Result};

/// Options for `nearby browse`
pub struct BrowseOptions {
    pub kind: ListKind,
    pub query: String,
    /// Pages to load, at least 1
    pub pages: u32,
    pub filters: Vec<(String, String)>,
    pub json: bool,
}

/// Load the first page of a list, then up to `pages - 1` more, and print
/// everything that was loaded.
///
/// Stops early when the server reports no further pages. If the very first
/// page fails the command fails; a later failure prints what was loaded
/// and a warning.
pub async fn cmd_browse(options: BrowseOptions) -> Result<()> {
    let config = Config::load()?;
    let controller = spawn_list(options.kind, &config, options.filters)?;

    // Text set before opening goes straight into the first fetch.
    controller.set_query(options.query);
    controller.open();
    let mut snapshot = controller.settled().await?;

    for _ in 1..options.pages {
        if !snapshot.can_load_more {
            break;
        }
        controller.load_more();
        snapshot = controller.settled().await?;
    }
    controller.close();

    if let Some(error) = &snapshot.last_error
        && snapshot.items.is_empty()
    {
        return Err(NearbyError::Other(error.message.clone()));
    }

    if options.json {
        if let Some(error) = &snapshot.last_error {
            eprintln!("{} stopped early: {}", "Warning:".yellow(), error.message);
        }
        print_json(&snapshot_json(options.kind, &snapshot))
    } else {
        println!("{}", render_snapshot(options.kind, &snapshot));
        Ok(())
    }
}
