use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;

use crate::catalog::ListKind;
use crate::remote::parse_filter;

#[derive(Parser)]
#[command(name = "nearby")]
#[command(about = "Browse and search the lists of the nearby commerce API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load one or more pages of a list and print them
    #[command(visible_alias = "b")]
    Browse {
        /// List to browse (stores, malls, offers, products, brands, cities, inbox, invoices)
        #[arg(value_parser = parse_list_kind)]
        list: ListKind,

        /// Search text
        #[arg(short, long, default_value = "")]
        query: String,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,

        /// Extra request parameter, repeatable (e.g. --filter storeId=42)
        #[arg(short, long = "filter", value_parser = parse_filter_arg)]
        filters: Vec<(String, String)>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search a list interactively: each stdin line is a new query,
    /// `+` loads the next page and `!` retries a failed fetch
    #[command(visible_alias = "s")]
    Search {
        /// List to search
        #[arg(value_parser = parse_list_kind)]
        list: ListKind,

        /// Extra request parameter, repeatable (e.g. --filter lat=24.7)
        #[arg(short, long = "filter", value_parser = parse_filter_arg)]
        filters: Vec<(String, String)>,

        /// Print one JSON object per result update
        #[arg(long)]
        json: bool,
    },

    /// Show the available lists and their effective settings
    Lists {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (api.base_url, auth.access_token, remote_timeout,
        /// lists.<list>.page_size, lists.<list>.debounce_ms)
        key: String,
        /// Value to set
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            BrowseOptions, cmd_browse, cmd_config_get, cmd_config_set, cmd_config_show, cmd_lists,
            cmd_search,
        };

        match self {
            Commands::Browse {
                list,
                query,
                pages,
                filters,
                json,
            } => {
                cmd_browse(BrowseOptions {
                    kind: list,
                    query,
                    pages,
                    filters,
                    json,
                })
                .await
            }

            Commands::Search {
                list,
                filters,
                json,
            } => cmd_search(list, filters, json).await,

            Commands::Lists { json } => cmd_lists(json),

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(json),
                ConfigAction::Set { key, value, json } => cmd_config_set(&key, &value, json),
                ConfigAction::Get { key, json } => cmd_config_get(&key, json),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn parse_list_kind(s: &str) -> Result<ListKind, String> {
    s.parse().map_err(|_| {
        let valid: Vec<String> = ListKind::ALL.iter().map(|k| k.to_string()).collect();
        format!("Invalid list '{s}'. Must be one of: {}", valid.join(", "))
    })
}

fn parse_filter_arg(s: &str) -> Result<(String, String), String> {
    parse_filter(s).map_err(|e| e.to_string())
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "nearby", &mut io::stdout());
}
