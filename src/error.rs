//! Errors that can abort a run
//!
//! Every error is fatal: nothing in this crate retries or skips a failed step.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration
    #[error("{0} not set")]
    MissingVariable(&'static str),

    #[error("invalid endpoint {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("unable to find a cache directory for this platform")]
    NoCacheDir,

    // Transport
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    // Protocol
    /// The server answered with a non-success status. `body` is kept verbatim, it usually explains what went wrong
    #[error("{endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint}: malformed response: {source}")]
    Json {
        endpoint: String,
        source: serde_json::Error,
    },

    #[error("login: {0}")]
    Login(String),

    #[error("not logged in")]
    NotAuthenticated,

    // Local cache
    #[error("cache file {path:?}: {source}")]
    Cache {
        path: PathBuf,
        source: io::Error,
    },

    // Resolution
    #[error("bad object {0}")]
    BadObject(i64),

    #[error("failed to get date for reservation {0}")]
    Unresolved(i64),

    #[error("bad date {date:?} for reservation {reservation}")]
    BadDate {
        reservation: i64,
        date: String,
    },

    // Output
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
