//! Async controller that owns a [`ListState`] and talks to a provider.
//!
//! The controller is a small actor: handle methods send commands over an
//! unbounded channel to a background tokio task, and the task publishes a
//! fresh [`ListSnapshot`] on a watch channel after every change. The task
//! owns the debounce timer and at most one running fetch, so no two fetches
//! for the same list ever overlap.
//!
//! Dropping the handle (or calling [`ListController::close`]) aborts the
//! running fetch, so a response never lands on a list nobody is looking at.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{self, JoinError, JoinHandle, JoinSet};

use crate::catalog::{DEFAULT_PAGE_SIZE, ListKind};
use crate::config::Config;
use crate::error::{NearbyError, Result};
use crate::remote::{ListProvider, Page};

use super::debounce::Debouncer;
use super::state::{Completion, FetchRequest, FetchTicket, ListSnapshot, ListState};

/// Construction options for a [`ListController`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub page_size: u32,
    /// Quiet period after the last query change before a search is sent
    pub debounce: Duration,
    /// Extra query parameters sent with every page request
    pub filters: BTreeMap<String, String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: Duration::from_millis(1000),
            filters: BTreeMap::new(),
        }
    }
}

impl ListOptions {
    pub fn new(page_size: u32, debounce: Duration) -> Self {
        Self {
            page_size,
            debounce,
            filters: BTreeMap::new(),
        }
    }

    /// Options for a catalog list, honoring per-list config overrides
    pub fn for_list(kind: ListKind, config: &Config) -> Self {
        Self::new(config.page_size(kind), config.debounce(kind))
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn with_filters(mut self, filters: BTreeMap<String, String>) -> Self {
        self.filters.extend(filters);
        self
    }
}

#[derive(Debug)]
enum Command {
    SetQuery(String),
    Open,
    LoadMore,
    Reset,
    Retry,
    Close,
}

type FetchOutput<T> = (FetchTicket, Result<Page<T>>);

/// Handle to a running list controller
pub struct ListController<T> {
    commands: mpsc::UnboundedSender<(u64, Command)>,
    snapshots: watch::Receiver<ListSnapshot<T>>,
    sent: AtomicU64,
    task: JoinHandle<()>,
}

impl<T> ListController<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a controller task on the current tokio runtime.
    ///
    /// The list starts hidden; call [`open`](Self::open) to load page 1.
    pub fn spawn<P>(provider: P, options: ListOptions) -> Self
    where
        P: ListProvider<Item = T>,
    {
        Self::spawn_shared(Arc::new(provider), options)
    }

    /// Like [`spawn`](Self::spawn) for a provider shared with other lists
    pub fn spawn_shared<P>(provider: Arc<P>, options: ListOptions) -> Self
    where
        P: ListProvider<Item = T>,
    {
        let state = ListState::new(options.page_size).with_filters(options.filters);
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot(0));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let actor = Actor {
            provider,
            state,
            debounce: Debouncer::new(options.debounce),
            fetches: JoinSet::new(),
            fetch_task: None,
            applied: 0,
            snapshots: snapshot_tx,
        };
        let task = tokio::spawn(actor.run(command_rx));

        Self {
            commands: command_tx,
            snapshots: snapshot_rx,
            sent: AtomicU64::new(0),
            task,
        }
    }

    /// Replace the search text; the search runs once typing stops
    pub fn set_query(&self, text: impl Into<String>) {
        self.send(Command::SetQuery(text.into()));
    }

    /// Show the list. The first open loads page 1 right away.
    pub fn open(&self) {
        self.send(Command::Open);
    }

    /// Fetch the next page, if there is one and nothing is in flight
    pub fn load_more(&self) {
        self.send(Command::LoadMore);
    }

    /// Reload from page 1 with the current search text
    pub fn reset(&self) {
        self.send(Command::Reset);
    }

    /// Repeat the fetch that last failed
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    /// Hide the list, cancel pending work and clear the results
    pub fn close(&self) {
        self.send(Command::Close);
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> ListSnapshot<T> {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<T>> {
        self.snapshots.clone()
    }

    /// Wait until every command sent so far has been applied and the list
    /// has neither a fetch in flight nor a search waiting on the debounce.
    pub async fn settled(&self) -> Result<ListSnapshot<T>> {
        let sent = self.sent.load(Ordering::Acquire);
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| s.commands_applied >= sent && s.is_settled())
            .await
            .map_err(|_| NearbyError::ControllerClosed)?;
        Ok(snapshot.clone())
    }

    fn send(&self, command: Command) {
        let seq = self.sent.fetch_add(1, Ordering::AcqRel) + 1;
        if self.commands.send((seq, command)).is_err() {
            tracing::warn!("list controller task has stopped; command dropped");
        }
    }
}

impl<T> Drop for ListController<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Background task state
struct Actor<P: ListProvider> {
    provider: Arc<P>,
    state: ListState<P::Item>,
    debounce: Debouncer,
    fetches: JoinSet<FetchOutput<P::Item>>,
    /// Task id of the fetch the state currently considers in flight
    fetch_task: Option<task::Id>,
    applied: u64,
    snapshots: watch::Sender<ListSnapshot<P::Item>>,
}

impl<P: ListProvider> Actor<P> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<(u64, Command)>) {
        loop {
            let deadline = self.debounce.deadline();
            tokio::select! {
                command = commands.recv() => {
                    let Some((seq, command)) = command else {
                        break;
                    };
                    self.applied = seq;
                    self.apply(command);
                }
                () = Debouncer::sleep_until(deadline), if deadline.is_some() => {
                    self.debounce.clear();
                    tracing::debug!(query = self.state.query(), "search debounce elapsed");
                    let request = self.state.reset();
                    self.start(request);
                }
                Some(joined) = self.fetches.join_next_with_id(), if !self.fetches.is_empty() => {
                    self.finish(joined);
                }
            }
            self.snapshots.send_replace(self.state.snapshot(self.applied));
        }
        self.fetches.abort_all();
    }

    fn apply(&mut self, command: Command) {
        let request = match command {
            Command::SetQuery(text) => {
                if self.state.set_query(text) {
                    self.debounce.reset();
                }
                None
            }
            Command::Open => self.state.open(),
            Command::LoadMore => self.state.load_more(),
            Command::Reset => self.state.reset(),
            Command::Retry => self.state.retry(),
            Command::Close => {
                self.state.close();
                self.fetches.abort_all();
                self.fetch_task = None;
                None
            }
        };
        if !self.state.is_debounce_pending() {
            self.debounce.clear();
        }
        self.start(request);
    }

    fn start(&mut self, request: Option<FetchRequest>) {
        let Some(FetchRequest { ticket, query }) = request else {
            return;
        };
        tracing::debug!(
            mode = %ticket.mode,
            page = ticket.page,
            query = %query.search_text,
            "fetching list page"
        );
        let provider = Arc::clone(&self.provider);
        let handle = self.fetches.spawn(async move {
            let outcome = provider.fetch_page(&query).await;
            (ticket, outcome)
        });
        self.fetch_task = Some(handle.id());
    }

    fn finish(&mut self, joined: std::result::Result<(task::Id, FetchOutput<P::Item>), JoinError>) {
        match joined {
            Ok((id, (ticket, outcome))) => {
                if self.fetch_task == Some(id) {
                    self.fetch_task = None;
                }
                if let Err(error) = &outcome {
                    tracing::warn!(mode = %ticket.mode, page = ticket.page, %error, "list fetch failed");
                }
                match self.state.complete(ticket, outcome) {
                    Completion::Applied => {}
                    Completion::Stale => {
                        tracing::debug!(page = ticket.page, "discarding response for superseded query");
                    }
                    Completion::Ignored => {
                        tracing::debug!(page = ticket.page, "ignoring response for closed list");
                    }
                }
            }
            Err(error) if error.is_cancelled() => {}
            Err(error) => {
                if self.fetch_task != Some(error.id()) {
                    return;
                }
                self.fetch_task = None;
                tracing::warn!(%error, "list fetch task panicked");
                if let Some(ticket) = self.state.in_flight() {
                    self.state.complete(
                        ticket,
                        Err(NearbyError::Other("list fetch task panicked".to_string())),
                    );
                }
            }
        }

        let deferred = self.state.take_deferred_reset();
        self.start(deferred);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListOverrides;

    #[test]
    fn test_options_for_list_use_overrides() {
        let mut config = Config::default();
        config.lists.insert(
            ListKind::Cities,
            ListOverrides {
                page_size: Some(40),
                debounce_ms: None,
            },
        );

        let cities = ListOptions::for_list(ListKind::Cities, &config);
        assert_eq!(cities.page_size, 40);
        assert_eq!(cities.debounce, ListKind::Cities.default_debounce());

        let inbox = ListOptions::for_list(ListKind::Inbox, &config);
        assert_eq!(inbox.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(inbox.debounce, Duration::from_millis(1500));
    }

    #[test]
    fn test_filters_merge() {
        let options = ListOptions::default()
            .with_filter("lat", "1")
            .with_filters(BTreeMap::from([("lng".to_string(), "2".to_string())]));
        assert_eq!(options.filters.len(), 2);
        assert_eq!(options.filters["lng"], "2");
    }
}
