//! Catalog of the remote lists the client browses.
//!
//! Every list screen in the app (store finder, city picker, inbox, brand
//! tabs, invoices, ...) talks to an endpoint that follows the same
//! pagination envelope but names its item array differently. This module
//! records those per-list differences in one place.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::NearbyError;
use crate::remote::Endpoint;

/// Page size used by every list unless overridden in configuration.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A remote list that can be browsed with a list controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Stores near a coordinate ("are you here?" prompt)
    Stores,
    Malls,
    Offers,
    /// Products of a single store
    Products,
    Brands,
    /// City picker
    Cities,
    /// Communication messages
    Inbox,
    Invoices,
}

crate::enum_display_fromstr!(
    ListKind,
    NearbyError::UnknownListKind,
    {
        Stores => "stores",
        Malls => "malls",
        Offers => "offers",
        Products => "products",
        Brands => "brands",
        Cities => "cities",
        Inbox => "inbox",
        Invoices => "invoices",
    }
);

impl ListKind {
    pub const ALL: [ListKind; 8] = [
        ListKind::Stores,
        ListKind::Malls,
        ListKind::Offers,
        ListKind::Products,
        ListKind::Brands,
        ListKind::Cities,
        ListKind::Inbox,
        ListKind::Invoices,
    ];

    /// Endpoint path relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            ListKind::Stores => "stores/nearby",
            ListKind::Malls => "malls",
            ListKind::Offers => "offers",
            ListKind::Products => "products",
            ListKind::Brands => "brands",
            ListKind::Cities => "cities",
            ListKind::Inbox => "communication/messages",
            ListKind::Invoices => "invoices",
        }
    }

    /// Name of the item array inside the response envelope
    pub fn items_field(&self) -> &'static str {
        match self {
            ListKind::Stores => "stores",
            ListKind::Malls => "malls",
            ListKind::Offers => "offers",
            ListKind::Products => "products",
            ListKind::Brands => "brands",
            ListKind::Cities => "cities",
            ListKind::Inbox => "communicationMessages",
            ListKind::Invoices => "invoices",
        }
    }

    /// Filters the endpoint rejects requests without
    pub fn required_filters(&self) -> &'static [&'static str] {
        match self {
            ListKind::Stores => &["lat", "lng"],
            ListKind::Products => &["storeId"],
            _ => &[],
        }
    }

    /// Default quiet period before a search is sent.
    ///
    /// The pickers respond quickly to keep typing snappy; the heavier
    /// geo and message searches wait longer.
    pub fn default_debounce(&self) -> Duration {
        let ms = match self {
            ListKind::Brands | ListKind::Cities => 500,
            ListKind::Offers | ListKind::Products => 800,
            ListKind::Stores | ListKind::Malls | ListKind::Invoices => 1000,
            ListKind::Inbox => 1500,
        };
        Duration::from_millis(ms)
    }

    /// Build the HTTP endpoint description for this list
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.path(), self.items_field())
    }

    /// Title-cased label for table headers
    pub fn label(&self) -> &'static str {
        match self {
            ListKind::Stores => "Stores",
            ListKind::Malls => "Malls",
            ListKind::Offers => "Offers",
            ListKind::Products => "Products",
            ListKind::Brands => "Brands",
            ListKind::Cities => "Cities",
            ListKind::Inbox => "Inbox",
            ListKind::Invoices => "Invoices",
        }
    }
}
