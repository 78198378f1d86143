//! Error taxonomy for harvesting and checking proxies

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single unit of work: one source fetch, one parsed record,
/// or one proxy probe. Never fatal to the run; callers log and move on.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network-level failure talking to a source
    #[error("request failed: {0}")]
    Fetch(#[source] reqwest::Error),

    /// The source answered with a non-success status
    #[error("unexpected status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// A fetch or probe exceeded its deadline
    #[error("timed out")]
    Timeout,

    /// A structured API returned a document that does not match the
    /// expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// An extracted record carried a port that is not an integer in range
    #[error("malformed proxy record {token:?}")]
    MalformedRecord { token: String },
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScrapeError::Timeout
        } else {
            ScrapeError::Fetch(err)
        }
    }
}

/// Failure of the whole run. Only these abort the process.
#[derive(Debug, Error)]
pub enum RunError {
    /// The harvested (or checked) count fell below the configured minimum
    #[error("{stage} yielded too few proxies: found {found}, expected at least {required}")]
    InsufficientYield {
        stage: &'static str,
        found: usize,
        required: usize,
    },

    /// Writing the output artifact failed
    #[error("failed to write {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
