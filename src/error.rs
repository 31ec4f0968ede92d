use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The payload was not JSON, or did not resolve to a changeset object.
    #[error("invalid changeset JSON: {reason}")]
    InvalidChangesetJson { reason: String, input: String },

    /// The API answered with a non-2xx status.
    #[error("API request failed: HTTP {status} for url ({url}){}", format_message(.message))]
    HttpStatus {
        status: StatusCode,
        url: String,
        message: String,
    },

    /// The request never produced a response.
    #[error("could not reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid bounding box: {0}")]
    InvalidBbox(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A single id of a batch failed; the batch is abandoned.
    #[error("changeset {id}: {source}")]
    Changeset {
        id: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("configuration error: {0:#}")]
    Config(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn invalid_json(reason: impl Into<String>, input: impl Into<String>) -> Self {
        Error::InvalidChangesetJson {
            reason: reason.into(),
            input: input.into(),
        }
    }

    /// True for both halves of the HTTP error class (status and transport).
    pub fn is_http(&self) -> bool {
        match self {
            Error::HttpStatus { .. } | Error::Transport { .. } => true,
            Error::Changeset { source, .. } => source.is_http(),
            _ => false,
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Changeset { source, .. } => source.status(),
            _ => None,
        }
    }
}

fn format_message(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {}", message)
    }
}

/// Builds the status error for a failed response.
///
/// The OSM API reports the reason in an `Error` header on most failures and
/// falls back to a plain-text body for the rest (e.g. `404` on a changeset id).
pub(crate) fn status_error(
    status: StatusCode,
    url: &str,
    headers: &HeaderMap,
    body: &str,
) -> Error {
    let from_header = headers
        .get("error")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let message = match from_header {
        Some(m) => m.to_string(),
        None => {
            let body = body.trim();
            // HTML error pages are noise in a one-line message.
            if body.starts_with('<') {
                String::new()
            } else {
                body.lines().next().unwrap_or("").to_string()
            }
        }
    };

    Error::HttpStatus {
        status,
        url: url.to_string(),
        message,
    }
}
