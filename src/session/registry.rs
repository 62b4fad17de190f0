//! Session registry: concurrent map from room code to session.
//!
//! Each session sits behind its own `tokio::sync::Mutex`; that mutex is
//! the coarse exclusive lock every multi-step command runs under, so
//! commands on different sessions never block each other.

use chrono::{Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::errors::{SessionError, SessionResult};
use super::models::{ParticipantId, Session};

/// Room-code alphabet: uppercase alphanumerics without the lookalikes
/// 0/O and 1/I, matching what players can read back over a table.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Concurrent map of live sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session under a freshly generated room code.
    pub async fn create(
        &self,
        host_id: ParticipantId,
        code_length: usize,
        ttl: Duration,
    ) -> SessionResult<(String, Arc<Mutex<Session>>)> {
        if host_id.is_empty() {
            return Err(SessionError::EmptyParticipantId);
        }
        let code_length = code_length.max(4);

        let mut sessions = self.sessions.write().await;
        let code = loop {
            let candidate = generate_code(code_length);
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        let session = Arc::new(Mutex::new(Session::new(code.clone(), host_id, ttl)));
        sessions.insert(code.clone(), session.clone());
        log::info!("created session {code}");

        Ok((code, session))
    }

    /// Look up a live, unexpired session.
    pub async fn get(&self, code: &str) -> SessionResult<Arc<Mutex<Session>>> {
        if code.is_empty() {
            return Err(SessionError::EmptyRoomCode);
        }

        let sessions = self.sessions.read().await;
        let session = sessions
            .get(code)
            .cloned()
            .ok_or_else(|| SessionError::SessionNotFound(code.to_owned()))?;
        drop(sessions);

        if session.lock().await.is_expired(Utc::now()) {
            return Err(SessionError::SessionExpired(code.to_owned()));
        }
        Ok(session)
    }

    /// Look up a session without the expiry check. The sweeper uses this
    /// to reach sessions it is about to evict.
    pub async fn peek(&self, code: &str) -> Option<Arc<Mutex<Session>>> {
        let sessions = self.sessions.read().await;
        sessions.get(code).cloned()
    }

    /// Remove a session from the registry. The session itself lives on
    /// while anyone still holds its `Arc`.
    pub async fn remove(&self, code: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(code).is_some() {
            log::info!("evicted session {code}");
        }
    }

    /// Codes of every registered session.
    pub async fn codes(&self) -> Vec<String> {
        let sessions = self.sessions.read().await;
        sessions.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Generate a room code from the CSPRNG-backed thread generator.
fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = SessionRegistry::new();
        let (code, _) = registry
            .create("host".into(), 4, Duration::hours(6))
            .await
            .unwrap();

        assert_eq!(code.len(), 4);
        assert!(registry.get(&code).await.is_ok());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_code() {
        let registry = SessionRegistry::new();
        assert_eq!(
            registry.get("ZZZZ").await.unwrap_err(),
            SessionError::SessionNotFound("ZZZZ".into())
        );
    }

    #[tokio::test]
    async fn test_get_empty_code_rejected() {
        let registry = SessionRegistry::new();
        assert_eq!(
            registry.get("").await.unwrap_err(),
            SessionError::EmptyRoomCode
        );
    }

    #[tokio::test]
    async fn test_expired_session_not_returned() {
        let registry = SessionRegistry::new();
        let (code, _) = registry
            .create("host".into(), 4, Duration::seconds(-1))
            .await
            .unwrap();

        assert_eq!(
            registry.get(&code).await.unwrap_err(),
            SessionError::SessionExpired(code)
        );
    }

    #[tokio::test]
    async fn test_remove_evicts() {
        let registry = SessionRegistry::new();
        let (code, _) = registry
            .create("host".into(), 4, Duration::hours(6))
            .await
            .unwrap();

        registry.remove(&code).await;
        assert!(registry.is_empty().await);
        assert!(matches!(
            registry.get(&code).await,
            Err(SessionError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_generated_codes_use_alphabet() {
        for _ in 0..50 {
            let code = generate_code(6);
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_generated_codes_vary() {
        let a = generate_code(8);
        let b = generate_code(8);
        // 32^8 combinations; a collision here means the generator is broken
        assert_ne!(a, b);
    }
}
