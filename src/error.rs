use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot treat '{0}' as URL or file path")]
    Unresolvable(String),
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read schema {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schema {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("schema rejected by compiler: {0}")]
    Invalid(String),
}

/// First violation (by sorted instance path) of a record against the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct SchemaViolation {
    /// Dotted instance path, `<root>` for top-level violations.
    pub path: String,
    pub message: String,
}
