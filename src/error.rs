// Error types shared by the library modules. The binary wraps these in
// `anyhow` for reporting; library code returns `crate::Result`.

use std::path::PathBuf;

use reqwest::StatusCode;

use crate::models::ModelError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The login endpoint answered but did not hand out a usable token.
    #[error("authentication failed: {reason}")]
    Auth { reason: String },

    /// Token renewal needs a stored username and password.
    #[error("no stored credentials, run `myrpl login` first")]
    MissingCredentials,

    #[error("request to {url} failed with HTTP {status}: {body}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response from {url}: {source}")]
    Deserialize {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("{} is not inside a myrpl course directory", path.display())]
    NotWorkspace { path: PathBuf },

    #[error("{} is not a myrpl activity directory", path.display())]
    NotActivityDirectory { path: PathBuf },

    #[error("invalid data from server: {0}")]
    Validation(#[from] ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("secret store error: {reason}")]
    SecretStore { reason: String },

    #[error("invalid metadata marker {}: {reason}", path.display())]
    Marker { path: PathBuf, reason: String },

    #[error("running tests for `{language}` activities is not supported")]
    UnsupportedLanguage { language: String },

    #[error("configuration error: {reason}")]
    Config { reason: String },
}
