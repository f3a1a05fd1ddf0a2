//! Connection settings

use std::fmt;
use url::Url;

use crate::error::{MayanError, Result};

/// Where and as whom to connect.
///
/// Loading these values from the environment is the caller's job; the
/// client only ever sees an explicit value.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Base URL of the mayan-edms instance (without the `/api/` suffix)
    pub url: String,
    /// Basic auth user
    pub user: String,
    /// Basic auth password
    pub password: String,
}

impl ConnectionConfig {
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Root every relative resource path is resolved against.
    pub fn api_root(&self) -> Result<Url> {
        let base = self.url.trim_end_matches('/');
        if base.is_empty() {
            return Err(MayanError::Config("connection url is empty".to_string()));
        }
        let root = Url::parse(&format!("{}/api/", base))?;
        if root.cannot_be_a_base() {
            return Err(MayanError::Config(format!("not a base url: {}", self.url)));
        }
        Ok(root)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}
