//! Error taxonomy shared by the session manager, the provider client and the
//! address store.

use thiserror::Error;

/// Errors surfaced by core operations. None of these are fatal to the poll loop.
#[derive(Debug, Error)]
pub enum Error {
    /// Domain lookup, registration or token exchange could not be completed.
    #[error("mail provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider rejected the credentials (account expired or wrong password).
    #[error("authentication rejected for {address}: {reason}")]
    Auth { address: String, reason: String },

    /// Listing, fetching or marking a message failed.
    #[error("message request failed: {0}")]
    TransientFetch(String),

    /// The backing file could not be parsed. Recovered as an empty list.
    #[error("address store at {path} is corrupt: {reason}")]
    StoreCorrupt { path: String, reason: String },

    /// The backing file could not be written.
    #[error("could not write address store: {0}")]
    StoreWrite(#[source] std::io::Error),

    /// Transport failure (connect, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("could not install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl Error {
    /// True when the provider answered and refused the request itself.
    /// Rate limiting (429) and other transient 4xx answers do not count.
    pub fn is_client_rejection(&self) -> bool {
        matches!(
            self,
            Error::Status {
                status: 400 | 401 | 403 | 404 | 422,
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
