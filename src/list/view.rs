//! What a list screen should render, derived from a snapshot.

use super::state::{FetchMode, ListPhase, ListSnapshot};

/// Presenter-facing view of a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListViewModel<T> {
    /// List is closed
    Hidden,
    /// First page requested (or waiting on the debounce) with nothing to show
    Loading,
    /// Fetch succeeded with no results
    Empty { query: String },
    Items {
        items: Vec<T>,
        /// A fetch is running; show a spinner under the last row
        footer_loading: bool,
        can_load_more: bool,
    },
    /// Last fetch failed
    Error {
        message: String,
        retryable: bool,
        /// Earlier results are still held and can stay on screen
        has_items: bool,
    },
}

impl<T: Clone> ListViewModel<T> {
    pub fn from_snapshot(snapshot: &ListSnapshot<T>) -> Self {
        if !snapshot.visible {
            return ListViewModel::Hidden;
        }

        if let Some(error) = &snapshot.last_error
            && !snapshot.busy
        {
            return ListViewModel::Error {
                message: error.message.clone(),
                retryable: error.retryable,
                has_items: !snapshot.items.is_empty(),
            };
        }

        if snapshot.items.is_empty() {
            return match snapshot.phase {
                ListPhase::Loaded => ListViewModel::Empty {
                    query: snapshot.active_query.clone(),
                },
                _ => ListViewModel::Loading,
            };
        }

        ListViewModel::Items {
            items: snapshot.items.clone(),
            footer_loading: snapshot.busy,
            can_load_more: snapshot.can_load_more,
        }
    }
}

impl<T> ListViewModel<T> {
    /// One-line status text for the states that have no rows to show
    pub fn headline(&self) -> Option<String> {
        match self {
            ListViewModel::Hidden | ListViewModel::Items { .. } => None,
            ListViewModel::Loading => Some("Loading...".to_string()),
            ListViewModel::Empty { query } if query.is_empty() => {
                Some("Nothing here yet.".to_string())
            }
            ListViewModel::Empty { query } => Some(format!("No results for '{query}'.")),
            ListViewModel::Error { message, .. } => Some(message.clone()),
        }
    }
}

impl<T: Clone> From<&ListSnapshot<T>> for ListViewModel<T> {
    fn from(snapshot: &ListSnapshot<T>) -> Self {
        Self::from_snapshot(snapshot)
    }
}

/// Whether the snapshot is waiting on a page beyond the first
pub fn is_appending<T>(snapshot: &ListSnapshot<T>) -> bool {
    snapshot.phase == ListPhase::Fetching(FetchMode::Append)
}
