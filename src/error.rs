//! Error types shared by the token store, the dispatcher and the search driver.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// Crate-wide result alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures that abort a run.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The token file was readable but contained no tokens.
    #[error("no tokens provided")]
    NoTokens,

    /// The token file could not be opened or read.
    #[error("failed to read tokens from {}: {source}", path.display())]
    TokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Request construction or network transmission failed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A request URL could not be built.
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The search endpoint answered with a non-200 status after token rotation.
    #[error("search request failed with status {status} on page {page}")]
    Search { page: u32, status: StatusCode },

    /// The search endpoint answered 200 with a body that is not a result envelope.
    #[error("malformed search response on page {page}: {source}")]
    SearchBody {
        page: u32,
        #[source]
        source: serde_json::Error,
    },

    /// Writing decoded content to the output failed.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid progress template: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
}

/// Failures scoped to a single result item. The item is skipped and the run continues.
#[derive(Debug, ThisError)]
pub enum ItemError {
    #[error("content request returned status {0}")]
    Status(StatusCode),

    #[error("malformed content response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),
}
