use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::spawn_list;
use crate::catalog::ListKind;
use crate::config::Config;
use crate::display::{render_snapshot, snapshot_json};
use crate::error::Result;
use crate::list::{ListController, ListSnapshot};

/// Line that loads the next page instead of changing the query
const LOAD_MORE_LINE: &str = "+";
/// Line that repeats the last failed fetch
const RETRY_LINE: &str = "!";

/// Interactive search over stdin.
///
/// Every line replaces the search text, so a burst of lines (for example a
/// pasted or piped sequence of partial queries) is debounced into a single
/// request. Results are printed whenever the list settles.
pub async fn cmd_search(kind: ListKind, filters: Vec<(String, String)>, json: bool) -> Result<()> {
    let config = Config::load()?;
    let controller = spawn_list(kind, &config, filters)?;

    controller.open();
    print_snapshot(kind, &controller.settled().await?, json)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = false;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                apply_line(&controller, &line);
                pending = true;
            }
            snapshot = controller.settled(), if pending => {
                print_snapshot(kind, &snapshot?, json)?;
                pending = false;
            }
        }
    }

    if pending {
        print_snapshot(kind, &controller.settled().await?, json)?;
    }
    controller.close();
    Ok(())
}

fn apply_line(controller: &ListController<Value>, line: &str) {
    match line.trim() {
        LOAD_MORE_LINE => controller.load_more(),
        RETRY_LINE => controller.retry(),
        text => controller.set_query(text),
    }
}

fn print_snapshot(kind: ListKind, snapshot: &ListSnapshot<Value>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&snapshot_json(kind, snapshot))?);
    } else {
        println!("{}\n", render_snapshot(kind, snapshot));
    }
    Ok(())
}
