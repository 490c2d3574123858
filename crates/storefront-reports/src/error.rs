//! Error types shared by the fetcher, the forms and the sales ledger

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// A backend round trip that did not produce usable data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{url} reported the operation as unsuccessful")]
    Rejected { url: String },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A form that cannot be submitted as entered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} must be a number")]
    NotNumeric(&'static str),
    #[error("a record with id '{0}' already exists")]
    Duplicate(String),
}
