//! Pure state of a remote list: query, page cursor, results, busy flag.
//!
//! `ListState` holds no timers and performs no I/O. Each operation returns
//! the fetch that should be started, if any, and `complete` applies the
//! outcome of that fetch. The controller task drives it; tests can drive it
//! directly.
//!
//! Cursor rules: the cursor starts at 1 and a reset fetch loads page 1
//! without moving it. A load-more fetch requests page `max(cursor, 2)` and
//! on success moves the cursor past the page it loaded. Once the total page
//! count is known no page beyond it is requested.

use std::collections::BTreeMap;

use crate::error::NearbyError;
use crate::remote::{ListQuery, Page};

/// Whether a fetch replaces or extends the result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Reset,
    Append,
}

crate::enum_display!(FetchMode, { Reset => "reset", Append => "append" });

/// Observable lifecycle phase of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    /// Nothing requested yet
    Idle,
    /// Query changed, waiting for typing to stop
    DebouncePending,
    Fetching(FetchMode),
    Loaded,
    /// Last fetch failed; behaves like `Idle` for new triggers
    Failed,
}

/// Identifies one issued fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// Generation the fetch was issued under; bumped by every reset and close
    pub generation: u64,
    pub mode: FetchMode,
    pub page: u32,
}

/// A fetch the caller should start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub query: ListQuery,
}

/// Failure of the most recent fetch, kept for the presenter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListError {
    pub message: String,
    /// Whether repeating the fetch may succeed
    pub retryable: bool,
    /// Which kind of fetch failed, so a retry can repeat it
    pub mode: FetchMode,
}

/// Result of handing a fetch outcome to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Outcome applied to the result set
    Applied,
    /// Fetch belonged to a superseded query; outcome discarded
    Stale,
    /// Not the fetch currently in flight (already closed or aborted)
    Ignored,
}

/// State of one remote list instance
#[derive(Debug, Clone)]
pub struct ListState<T> {
    /// Text as typed
    query: String,
    /// Text the current result set belongs to
    active_query: String,
    filters: BTreeMap<String, String>,
    page_size: u32,
    cursor: u32,
    total_pages: Option<u32>,
    items: Vec<T>,
    in_flight: Option<FetchTicket>,
    generation: u64,
    debounce_pending: bool,
    reset_deferred: bool,
    loaded: bool,
    visible: bool,
    last_error: Option<ListError>,
}

impl<T> ListState<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            query: String::new(),
            active_query: String::new(),
            filters: BTreeMap::new(),
            page_size: page_size.max(1),
            cursor: 1,
            total_pages: None,
            items: Vec::new(),
            in_flight: None,
            generation: 0,
            debounce_pending: false,
            reset_deferred: false,
            loaded: false,
            visible: false,
            last_error: None,
        }
    }

    pub fn with_filters(mut self, filters: BTreeMap<String, String>) -> Self {
        self.filters = filters;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn active_query(&self) -> &str {
        &self.active_query
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_debounce_pending(&self) -> bool {
        self.debounce_pending
    }

    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    pub fn last_error(&self) -> Option<&ListError> {
        self.last_error.as_ref()
    }

    pub fn phase(&self) -> ListPhase {
        if let Some(ticket) = self.in_flight {
            ListPhase::Fetching(ticket.mode)
        } else if self.debounce_pending {
            ListPhase::DebouncePending
        } else if self.last_error.is_some() {
            ListPhase::Failed
        } else if self.loaded {
            ListPhase::Loaded
        } else {
            ListPhase::Idle
        }
    }

    /// Page a load-more fetch would request
    fn next_page(&self) -> u32 {
        self.cursor.max(2)
    }

    /// Whether `load_more` would issue a fetch right now
    pub fn can_load_more(&self) -> bool {
        self.visible
            && self.loaded
            && !self.is_busy()
            && !self.reset_deferred
            && self
                .total_pages
                .is_some_and(|total| self.next_page() <= total)
    }

    /// Store new search text.
    ///
    /// Returns `true` when the caller should (re)arm the debounce; a hidden
    /// list only remembers the text.
    pub fn set_query(&mut self, text: impl Into<String>) -> bool {
        self.query = text.into();
        if !self.visible {
            return false;
        }
        self.debounce_pending = true;
        true
    }

    /// The list became visible. The first open issues a reset immediately.
    pub fn open(&mut self) -> Option<FetchRequest> {
        if self.visible {
            return None;
        }
        self.visible = true;
        self.reset()
    }

    /// Start over from page 1 with the current query.
    ///
    /// While a fetch is in flight the reset is deferred: the in-flight fetch
    /// becomes stale and the reset is returned by
    /// [`take_deferred_reset`](Self::take_deferred_reset) once it completes.
    pub fn reset(&mut self) -> Option<FetchRequest> {
        if !self.visible {
            return None;
        }
        self.debounce_pending = false;
        self.generation += 1;
        self.cursor = 1;
        self.total_pages = None;
        self.active_query = self.query.clone();

        if self.in_flight.is_some() {
            tracing::debug!(
                generation = self.generation,
                "reset deferred until in-flight fetch returns"
            );
            self.reset_deferred = true;
            return None;
        }
        Some(self.issue(FetchMode::Reset, 1))
    }

    /// Fetch the next page of the active query.
    ///
    /// Dropped when busy or when the next page is past the known total. If
    /// no page has been loaded yet this falls back to a reset.
    pub fn load_more(&mut self) -> Option<FetchRequest> {
        if !self.visible || self.is_busy() || self.reset_deferred {
            return None;
        }

        let Some(total) = self.total_pages else {
            return self.reset();
        };

        let page = self.next_page();
        if page > total {
            return None;
        }
        Some(self.issue(FetchMode::Append, page))
    }

    /// Repeat the fetch that last failed
    pub fn retry(&mut self) -> Option<FetchRequest> {
        match self.last_error.as_ref().map(|e| e.mode) {
            Some(FetchMode::Reset) => self.reset(),
            Some(FetchMode::Append) => self.load_more(),
            None => None,
        }
    }

    /// Issue the reset that was deferred behind a superseded fetch
    pub fn take_deferred_reset(&mut self) -> Option<FetchRequest> {
        if !self.reset_deferred || self.in_flight.is_some() {
            return None;
        }
        self.reset_deferred = false;
        Some(self.issue(FetchMode::Reset, 1))
    }

    fn issue(&mut self, mode: FetchMode, page: u32) -> FetchRequest {
        let ticket = FetchTicket {
            generation: self.generation,
            mode,
            page,
        };
        self.in_flight = Some(ticket);
        FetchRequest {
            ticket,
            query: ListQuery {
                search_text: self.active_query.clone(),
                page,
                page_size: self.page_size,
                filters: self.filters.clone(),
            },
        }
    }

    /// Apply the outcome of a fetch.
    ///
    /// Only the fetch currently in flight is accepted. Its busy flag is
    /// cleared either way; the outcome itself is discarded if a reset
    /// superseded it.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Page<T>, NearbyError>,
    ) -> Completion {
        if self.in_flight != Some(ticket) {
            return Completion::Ignored;
        }
        self.in_flight = None;

        if ticket.generation != self.generation {
            return Completion::Stale;
        }

        match outcome {
            Ok(page) => {
                match ticket.mode {
                    FetchMode::Reset => self.items = page.items,
                    FetchMode::Append => {
                        self.items.extend(page.items);
                        self.cursor = ticket.page + 1;
                    }
                }
                self.total_pages = Some(page.total_pages);
                self.loaded = true;
                self.last_error = None;
            }
            Err(error) => {
                self.last_error = Some(ListError {
                    message: error.to_string(),
                    retryable: error.is_retryable(),
                    mode: ticket.mode,
                });
            }
        }
        Completion::Applied
    }

    /// The list was hidden: back to the initial state.
    ///
    /// Page size and filters are kept. Any fetch still running is no longer
    /// accepted.
    pub fn close(&mut self) {
        self.visible = false;
        self.generation += 1;
        self.query.clear();
        self.active_query.clear();
        self.cursor = 1;
        self.total_pages = None;
        self.items.clear();
        self.in_flight = None;
        self.debounce_pending = false;
        self.reset_deferred = false;
        self.loaded = false;
        self.last_error = None;
    }
}

/// Point-in-time copy of a list's state, published to presenters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot<T> {
    pub query: String,
    pub active_query: String,
    pub items: Vec<T>,
    pub cursor: u32,
    pub total_pages: Option<u32>,
    pub phase: ListPhase,
    pub busy: bool,
    pub visible: bool,
    pub can_load_more: bool,
    pub last_error: Option<ListError>,
    pub generation: u64,
    /// Number of controller commands applied when this snapshot was taken
    pub commands_applied: u64,
}

impl<T> ListSnapshot<T> {
    /// Nothing in flight and no search waiting on the debounce
    pub fn is_settled(&self) -> bool {
        !self.busy && self.phase != ListPhase::DebouncePending
    }
}

impl<T: Clone> ListState<T> {
    pub fn snapshot(&self, commands_applied: u64) -> ListSnapshot<T> {
        ListSnapshot {
            query: self.query.clone(),
            active_query: self.active_query.clone(),
            items: self.items.clone(),
            cursor: self.cursor,
            total_pages: self.total_pages,
            phase: self.phase(),
            busy: self.is_busy(),
            visible: self.visible,
            can_load_more: self.can_load_more(),
            last_error: self.last_error.clone(),
            generation: self.generation,
            commands_applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(range: std::ops::Range<u32>) -> Vec<u32> {
        range.collect()
    }

    fn opened(page_size: u32) -> (ListState<u32>, FetchRequest) {
        let mut state = ListState::new(page_size);
        let request = state.open().expect("first open fetches");
        (state, request)
    }

    fn loaded_first_page(total_pages: u32) -> ListState<u32> {
        let (mut state, request) = opened(10);
        state.complete(request.ticket, Ok(Page::new(items(0..10), total_pages)));
        state
    }

    #[test]
    fn test_open_issues_reset_for_page_one() {
        let (state, request) = opened(10);
        assert_eq!(request.ticket.mode, FetchMode::Reset);
        assert_eq!(request.query, ListQuery::new("", 1, 10));
        assert!(state.is_busy());
        assert_eq!(state.phase(), ListPhase::Fetching(FetchMode::Reset));
    }

    #[test]
    fn test_second_open_is_noop() {
        let (mut state, _) = opened(10);
        assert!(state.open().is_none());
    }

    #[test]
    fn test_reset_success_replaces_and_keeps_cursor() {
        let mut state = loaded_first_page(3);
        state.set_query("tea");
        let request = state.reset().unwrap();
        state.complete(request.ticket, Ok(Page::new(vec![100, 101, 102], 1)));

        assert_eq!(state.items(), &[100, 101, 102]);
        assert_eq!(state.cursor(), 1);
        assert_eq!(state.total_pages(), Some(1));
        assert_eq!(state.active_query(), "tea");
        assert_eq!(state.phase(), ListPhase::Loaded);
    }

    #[test]
    fn test_three_page_walkthrough() {
        let mut state = loaded_first_page(3);
        assert_eq!(state.items().len(), 10);
        assert_eq!(state.cursor(), 1);

        let second = state.load_more().unwrap();
        assert_eq!(second.ticket.page, 2);
        assert_eq!(second.ticket.mode, FetchMode::Append);
        state.complete(second.ticket, Ok(Page::new(items(10..20), 3)));
        assert_eq!(state.items().len(), 20);
        assert_eq!(state.cursor(), 3);

        let third = state.load_more().unwrap();
        assert_eq!(third.ticket.page, 3);
        state.complete(third.ticket, Ok(Page::new(items(20..25), 3)));
        assert_eq!(state.items().len(), 25);
        assert_eq!(state.cursor(), 4);
        assert_eq!(state.items(), items(0..25).as_slice());

        assert!(!state.can_load_more());
        assert!(state.load_more().is_none());
        assert_eq!(state.cursor(), 4);
        assert_eq!(state.items().len(), 25);
    }

    #[test]
    fn test_load_more_while_busy_is_noop() {
        let mut state = loaded_first_page(5);
        let first = state.load_more().unwrap();
        assert!(state.load_more().is_none());
        assert_eq!(state.in_flight(), Some(first.ticket));
        assert_eq!(state.cursor(), 1);
        assert_eq!(state.items().len(), 10);
    }

    #[test]
    fn test_single_page_result_cannot_load_more() {
        let mut state = loaded_first_page(1);
        assert!(state.load_more().is_none());
        assert!(!state.is_busy());
    }

    #[test]
    fn test_empty_result_cannot_load_more() {
        let (mut state, request) = opened(10);
        state.complete(request.ticket, Ok(Page::new(vec![], 0)));
        assert!(state.items().is_empty());
        assert!(state.load_more().is_none());
    }

    #[test]
    fn test_append_failure_keeps_items_and_cursor() {
        let mut state = loaded_first_page(3);
        let second = state.load_more().unwrap();
        state.complete(second.ticket, Ok(Page::new(items(10..20), 3)));

        let third = state.load_more().unwrap();
        let completion = state.complete(
            third.ticket,
            Err(NearbyError::Api("HTTP 503 Service Unavailable".to_string())),
        );

        assert_eq!(completion, Completion::Applied);
        assert_eq!(state.items().len(), 20);
        assert_eq!(state.cursor(), 3);
        assert!(!state.is_busy());
        assert_eq!(state.phase(), ListPhase::Failed);
        let error = state.last_error().unwrap();
        assert!(error.retryable);
        assert_eq!(error.mode, FetchMode::Append);

        // Not blocked afterwards
        let again = state.load_more().unwrap();
        assert_eq!(again.ticket.page, 3);
    }

    #[test]
    fn test_reset_failure_keeps_previous_items() {
        let mut state = loaded_first_page(2);
        state.set_query("x");
        let request = state.reset().unwrap();
        state.complete(request.ticket, Err(NearbyError::Rejected("bad".to_string())));

        assert_eq!(state.items().len(), 10);
        assert_eq!(state.total_pages(), None);
        let error = state.last_error().unwrap();
        assert!(!error.retryable);
        assert_eq!(error.mode, FetchMode::Reset);
    }

    #[test]
    fn test_retry_repeats_failed_mode() {
        let mut state = loaded_first_page(3);
        let second = state.load_more().unwrap();
        state.complete(second.ticket, Err(NearbyError::Api("timeout".to_string())));

        let retried = state.retry().unwrap();
        assert_eq!(retried.ticket.mode, FetchMode::Append);
        assert_eq!(retried.ticket.page, 2);
        state.complete(retried.ticket, Ok(Page::new(items(10..20), 3)));
        assert!(state.last_error().is_none());
        assert!(state.retry().is_none());
    }

    #[test]
    fn test_load_more_without_total_falls_back_to_reset() {
        let (mut state, request) = opened(10);
        state.complete(request.ticket, Err(NearbyError::Api("down".to_string())));
        let request = state.load_more().unwrap();
        assert_eq!(request.ticket.mode, FetchMode::Reset);
        assert_eq!(request.ticket.page, 1);
    }

    #[test]
    fn test_reset_while_busy_defers_and_discards_stale() {
        let mut state = loaded_first_page(3);
        let append = state.load_more().unwrap();

        state.set_query("new");
        assert!(state.reset().is_none());
        assert!(state.take_deferred_reset().is_none());
        assert!(state.load_more().is_none());

        let completion = state.complete(append.ticket, Ok(Page::new(items(50..60), 3)));
        assert_eq!(completion, Completion::Stale);
        assert_eq!(state.items().len(), 10);

        let deferred = state.take_deferred_reset().unwrap();
        assert_eq!(deferred.ticket.mode, FetchMode::Reset);
        assert_eq!(deferred.query.search_text, "new");
        assert!(state.take_deferred_reset().is_none());

        state.complete(deferred.ticket, Ok(Page::new(vec![7], 1)));
        assert_eq!(state.items(), &[7]);
    }

    #[test]
    fn test_repeated_resets_while_busy_coalesce() {
        let (mut state, first) = opened(10);
        state.set_query("a");
        assert!(state.reset().is_none());
        state.set_query("ab");
        assert!(state.reset().is_none());

        assert_eq!(
            state.complete(first.ticket, Ok(Page::new(vec![1], 1))),
            Completion::Stale
        );
        let deferred = state.take_deferred_reset().unwrap();
        assert_eq!(deferred.query.search_text, "ab");
        assert!(state.take_deferred_reset().is_none());
    }

    #[test]
    fn test_close_restores_initial_state() {
        let mut state = loaded_first_page(3);
        state.set_query("abc");
        let append = state.load_more().unwrap();
        state.close();

        assert!(!state.is_visible());
        assert!(state.items().is_empty());
        assert_eq!(state.query(), "");
        assert_eq!(state.cursor(), 1);
        assert_eq!(state.total_pages(), None);
        assert_eq!(state.phase(), ListPhase::Idle);
        assert_eq!(
            state.complete(append.ticket, Ok(Page::new(vec![1], 3))),
            Completion::Ignored
        );
        assert!(state.items().is_empty());
    }

    #[test]
    fn test_hidden_list_does_not_fetch() {
        let mut state: ListState<u32> = ListState::new(10);
        assert!(!state.set_query("abc"));
        assert!(state.reset().is_none());
        assert!(state.load_more().is_none());

        let request = state.open().unwrap();
        assert_eq!(request.query.search_text, "abc");
    }

    #[test]
    fn test_set_query_marks_debounce_pending() {
        let mut state = loaded_first_page(2);
        assert!(state.set_query("shoes"));
        assert_eq!(state.phase(), ListPhase::DebouncePending);
        assert_eq!(state.active_query(), "");
    }

    #[test]
    fn test_load_more_uses_active_query_not_typed_text() {
        let mut state = loaded_first_page(3);
        state.set_query("typed but not sent");
        let request = state.load_more().unwrap();
        assert_eq!(request.query.search_text, "");
    }

    #[test]
    fn test_filters_and_page_size_are_sent() {
        let filters = BTreeMap::from([("storeId".to_string(), "42".to_string())]);
        let mut state: ListState<u32> = ListState::new(25).with_filters(filters.clone());
        let request = state.open().unwrap();
        assert_eq!(request.query.page_size, 25);
        assert_eq!(request.query.filters, filters);
    }

    #[test]
    fn test_zero_page_size_clamped() {
        let state: ListState<u32> = ListState::new(0);
        assert_eq!(state.page_size(), 1);
    }
}
