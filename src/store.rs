//! Persistence collaborator seam.
//!
//! The engine never performs I/O itself; a `SessionStore` implementation
//! is handed session snapshots after mutations, outside the session lock.
//! Save failures are logged and swallowed at the call site so the
//! in-memory state change always stands.

use async_trait::async_trait;
use thiserror::Error;

use crate::session::models::Session;

#[derive(Debug, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

/// Durable storage for session snapshots
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a snapshot of the session.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;
}

/// Store that discards every snapshot; the default for tests and for
/// deployments that persist elsewhere.
#[derive(Debug, Default)]
pub struct NullStore;

#[async_trait]
impl SessionStore for NullStore {
    async fn save(&self, _session: &Session) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_null_store_accepts_everything() {
        let store = NullStore;
        let session = Session::new("ABCD".into(), "host".into(), Duration::hours(6));
        assert!(store.save(&session).await.is_ok());
    }
}
