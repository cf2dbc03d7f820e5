//! Callback relay — hands an external redirect over to the page that started
//! the flow.
//!
//! A redirect lands on `/callback` with a caller-chosen request id; the page
//! polls `/fetch-callback` with the same id and takes the target exactly once.
//! Entries are memory-resident and never expire.

use dashmap::DashMap;
use tracing::debug;
use workbench_protocol::{HostError, UriComponents};

/// Errors raised by a [`CallbackStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("invalid callback request: missing {0}")]
    InvalidRequest(&'static str),
    #[error("no pending callback for this request id")]
    NotFound,
}

impl From<RelayError> for HostError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::InvalidRequest(_) => HostError::bad_request(err.to_string()),
            RelayError::NotFound => HostError::NotFound,
        }
    }
}

/// Storage for pending callbacks.
///
/// Both operations must behave as if serialized per request id: a racing
/// `receive` and `fetch_and_clear` observe either the whole target or none.
pub trait CallbackStore: Send + Sync {
    /// Store `target` under `request_id`, replacing any pending entry.
    fn receive(&self, request_id: &str, target: UriComponents) -> Result<(), RelayError>;

    /// Remove and return the pending entry for `request_id`.
    fn fetch_and_clear(&self, request_id: &str) -> Result<UriComponents, RelayError>;
}

/// In-memory [`CallbackStore`] backed by a sharded concurrent map.
#[derive(Debug, Default)]
pub struct CallbackRelay {
    pending: DashMap<String, UriComponents>,
}

impl CallbackRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks received but not yet fetched.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl CallbackStore for CallbackRelay {
    fn receive(&self, request_id: &str, target: UriComponents) -> Result<(), RelayError> {
        if request_id.is_empty() {
            return Err(RelayError::InvalidRequest("request id"));
        }
        if target.scheme.is_empty() {
            return Err(RelayError::InvalidRequest("scheme"));
        }
        if target.authority.as_deref().is_none_or(str::is_empty) {
            return Err(RelayError::InvalidRequest("authority"));
        }

        if self.pending.insert(request_id.to_string(), target).is_some() {
            debug!("Callback for request {request_id} replaced a pending entry");
        }
        Ok(())
    }

    fn fetch_and_clear(&self, request_id: &str) -> Result<UriComponents, RelayError> {
        self.pending
            .remove(request_id)
            .map(|(_, target)| target)
            .ok_or(RelayError::NotFound)
    }
}
