//! Authenticated session passed explicitly to the networking layer.
//!
//! The access token is never stored in a process-wide variable; whoever
//! builds a provider hands it the session it should use.

use std::fmt;
use std::sync::Arc;

use reqwest::header;
use secrecy::{ExposeSecret, SecretBox};

use crate::config::Config;
use crate::error::{NearbyError, Result};

/// Credentials for the current user
#[derive(Clone, Default)]
pub struct Session {
    access_token: Option<Arc<SecretBox<String>>>,
}

impl Session {
    /// A session with no credentials (public lists only)
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(Arc::new(SecretBox::new(Box::new(token.into())))),
        }
    }

    /// Build the session from environment variable or config file
    pub fn from_config(config: &Config) -> Self {
        match config.access_token() {
            Some(token) => Self::with_token(token),
            None => Self::anonymous(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// `Authorization` header value for this session, if any.
    ///
    /// The value is marked sensitive so reqwest and hyper never print it.
    pub fn authorization(&self) -> Result<Option<header::HeaderValue>> {
        let Some(token) = self.access_token.as_ref() else {
            return Ok(None);
        };
        let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| {
                NearbyError::Auth("access token contains invalid header characters".to_string())
            })?;
        value.set_sensitive(true);
        Ok(Some(value))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
