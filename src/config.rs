//! Support for configuration options
//!
//! Server and credentials come from the environment, see [`Config::from_env`].

use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use url::Url;

use crate::error::{Error, Result};

/// Part of the ProdID string that describes the organization (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static ORG_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("Axema booking export".to_string())));

/// Part of the ProdID string that describes the product name (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("axema-booking".to_string())));

/// Read one of the settings above
pub fn setting(value: &Lazy<Arc<Mutex<String>>>) -> String {
    match value.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub const ENDPOINT_VAR: &str = "AXEMA_ENDPOINT";
pub const USER_VAR: &str = "AXEMA_USER";
pub const PASS_VAR: &str = "AXEMA_PASS";
pub const CACHE_DIR_VAR: &str = "AXEMA_CACHE_DIR";
pub const CACHE_RESERVATIONS_VAR: &str = "AXEMA_CACHE_RESERVATIONS";


#[derive(Clone, PartialEq)]
pub struct Config {
    /// Base URL of the booking server, without trailing slash
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Where server responses are cached. `None` means the platform default
    pub cache_dir: Option<PathBuf>,
    /// Also serve the reservation list from the cache (it is fetched on every run otherwise)
    pub cache_reservations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`], with variables read from `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An empty variable is as good as a missing one
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| value.is_empty() == false)
                .ok_or(Error::MissingVariable(name))
        };

        let endpoint = required(ENDPOINT_VAR)?;
        let username = required(USER_VAR)?;
        let password = required(PASS_VAR)?;

        if let Err(source) = Url::parse(&endpoint) {
            return Err(Error::InvalidUrl { url: endpoint, source });
        }
        let endpoint = endpoint.trim_end_matches('/').to_string();

        let cache_dir = lookup(CACHE_DIR_VAR)
            .filter(|value| value.is_empty() == false)
            .map(PathBuf::from);
        let cache_reservations = match lookup(CACHE_RESERVATIONS_VAR) {
            None => false,
            Some(value) => {
                let value = value.to_ascii_lowercase();
                value == "1" || value == "true" || value == "yes"
            },
        };

        Ok(Self { endpoint, username, password, cache_dir, cache_reservations })
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("cache_dir", &self.cache_dir)
            .field("cache_reservations", &self.cache_reservations)
            .finish()
    }
}
