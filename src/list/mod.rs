//! The remote list controller.
//!
//! [`ListState`] is the synchronous core (query, cursor, results, busy
//! flag), [`ListController`] runs it on a tokio task with a debounce timer
//! and a provider, and [`ListViewModel`] turns a published snapshot into
//! what a screen should render.

pub mod controller;
pub mod debounce;
pub mod state;
pub mod view;

pub use controller::{ListController, ListOptions};
pub use debounce::Debouncer;
pub use state::{
    Completion, FetchMode, FetchRequest, FetchTicket, ListError, ListPhase, ListSnapshot,
    ListState,
};
pub use view::ListViewModel;
