pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod list;
pub mod macros;
pub mod paths;
pub mod remote;
pub mod session;

#[cfg(test)]
mod test_guards;

pub use catalog::{DEFAULT_PAGE_SIZE, ListKind};
pub use config::Config;
pub use error::{NearbyError, Result};
pub use list::{ListController, ListOptions, ListSnapshot, ListState, ListViewModel};
pub use remote::{FnProvider, HttpListProvider, ListProvider, ListQuery, Page};
pub use session::Session;
