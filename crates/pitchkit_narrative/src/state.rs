//! In-memory session store.

use async_trait::async_trait;
use pitchkit_config::SessionConfig;
use pitchkit_core::Session;
use pitchkit_error::{PitchkitResult, ValidationError, ValidationErrorKind};
use pitchkit_interface::SessionStore;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Stored session with its last write time.
#[derive(Debug, Clone)]
struct SessionEntry {
    session: Session,
    written_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.written_at.elapsed() > ttl)
    }
}

/// Process-local [`SessionStore`].
///
/// Without a TTL or size limit sessions live as long as the process. With a
/// TTL, a session expires that long after its last write and reads treat it
/// as absent. With `max_sessions`, writing a new key evicts the sessions
/// written longest ago.
///
/// # Example
///
/// ```
/// use pitchkit_narrative::InMemorySessionStore;
/// use std::time::Duration;
///
/// let store = InMemorySessionStore::new()
///     .with_ttl(Duration::from_secs(3600))
///     .with_max_sessions(100);
/// assert_eq!(store.max_sessions(), Some(100));
/// ```
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, SessionEntry>>,
    ttl: Option<Duration>,
    max_sessions: Option<usize>,
}

impl InMemorySessionStore {
    /// Creates a store that never evicts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from configuration.
    pub fn from_config(config: &SessionConfig) -> Self {
        tracing::debug!(
            ttl_secs = ?config.ttl_secs,
            max_sessions = ?config.max_sessions,
            "Creating InMemorySessionStore"
        );
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: config.ttl(),
            max_sessions: config.max_sessions,
        }
    }

    /// Sets the time-to-live after the last write.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the maximum number of sessions kept.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = Some(max);
        self
    }

    /// Time-to-live, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Size limit, if any.
    pub fn max_sessions(&self) -> Option<usize> {
        self.max_sessions
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries
            .values()
            .filter(|entry| !entry.is_expired(self.ttl))
            .count()
    }

    /// True when no live session is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Keys of live sessions, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(self.ttl))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Removes every session.
    pub async fn clear_all(&self) {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        tracing::info!(count, "Cleared all sessions");
    }

    fn evict_expired(&self, entries: &mut HashMap<String, SessionEntry>) {
        if self.ttl.is_none() {
            return;
        }
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(self.ttl));
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted expired sessions");
        }
    }

    fn evict_oldest(&self, entries: &mut HashMap<String, SessionEntry>, incoming: &str) {
        let Some(max) = self.max_sessions else {
            return;
        };
        while entries.len() >= max.max(1) && !entries.contains_key(incoming) {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.written_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            entries.remove(&oldest);
            tracing::debug!(session_key = %oldest, max, "Evicted oldest session");
        }
    }
}

fn require_key(key: &str) -> PitchkitResult<()> {
    if key.trim().is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::EmptySessionKey).into());
    }
    Ok(())
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> PitchkitResult<Option<Session>> {
        require_key(key)?;
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired(self.ttl) => {
                tracing::debug!("Session expired");
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.session.clone())),
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, session))]
    async fn set(&self, key: &str, session: Session) -> PitchkitResult<()> {
        require_key(key)?;
        let mut entries = self.entries.write().await;
        self.evict_expired(&mut entries);
        self.evict_oldest(&mut entries, key);
        entries.insert(
            key.to_string(),
            SessionEntry {
                session,
                written_at: Instant::now(),
            },
        );
        tracing::debug!(sessions = entries.len(), "Stored session");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn clear(&self, key: &str) -> PitchkitResult<bool> {
        require_key(key)?;
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchkit_core::{BrandInfo, ResearchResult, ScriptResult};

    fn session(name: &str) -> Session {
        Session::new(BrandInfo::Text(name.to_string()), ResearchResult::default())
    }

    #[tokio::test]
    async fn test_set_get_clear() {
        let store = InMemorySessionStore::new();
        assert!(store.get("Acme").await.unwrap().is_none());

        store.set("Acme", session("Acme")).await.unwrap();
        assert!(store.get("Acme").await.unwrap().is_some());
        assert_eq!(store.keys().await, vec!["Acme".to_string()]);

        assert!(store.clear("Acme").await.unwrap());
        assert!(!store.clear("Acme").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = InMemorySessionStore::new();
        store.set("Acme", session("Acme")).await.unwrap();

        let mut updated = session("Acme");
        updated.set_script(ScriptResult::default());
        store.set("Acme", updated).await.unwrap();

        let stored = store.get("Acme").await.unwrap().unwrap();
        assert!(stored.script.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_blank_key_is_rejected() {
        let store = InMemorySessionStore::new();
        let err = store.get("  ").await.unwrap_err();
        assert_eq!(
            err.validation_kind(),
            Some(&ValidationErrorKind::EmptySessionKey)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expires_sessions() {
        let store = InMemorySessionStore::new().with_ttl(Duration::from_secs(60));
        store.set("Acme", session("Acme")).await.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(store.get("Acme").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(store.get("Acme").await.unwrap().is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_sessions_evicts_oldest() {
        let store = InMemorySessionStore::new().with_max_sessions(2);
        store.set("a", session("a")).await.unwrap();
        tokio::time::advance(Duration::from_millis(10)).await;
        store.set("b", session("b")).await.unwrap();
        tokio::time::advance(Duration::from_millis(10)).await;
        // Rewriting an existing key never evicts
        store.set("a", session("a")).await.unwrap();
        tokio::time::advance(Duration::from_millis(10)).await;
        store.set("c", session("c")).await.unwrap();

        assert_eq!(store.keys().await, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_from_config() {
        let config = SessionConfig {
            ttl_secs: Some(120),
            max_sessions: None,
        };
        let store = InMemorySessionStore::from_config(&config);
        assert_eq!(store.ttl(), Some(Duration::from_secs(120)));
        assert_eq!(store.max_sessions(), None);
    }
}
