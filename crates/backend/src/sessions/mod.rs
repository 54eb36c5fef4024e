use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use geoguess_shared::catalog::LocationCatalog;
use geoguess_shared::models::GameRules;
use geoguess_shared::session::GameSession;
use uuid::Uuid;

pub struct SessionEntry {
    pub session: GameSession,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory registry of per-player sessions.
///
/// Each call holds the lock for exactly one core transition, so a session is
/// never driven from two requests at once. Nothing survives a restart.
pub struct Sessions {
    entries: Mutex<HashMap<Uuid, SessionEntry>>,
    rules: GameRules,
    catalog: Arc<LocationCatalog>,
    ttl: chrono::Duration,
}

impl Sessions {
    pub fn new(rules: GameRules, catalog: Arc<LocationCatalog>, ttl: chrono::Duration) -> Arc<Self> {
        Arc::new(Sessions {
            entries: Mutex::new(HashMap::new()),
            rules,
            catalog,
            ttl,
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionEntry>> {
        // Transitions are single assignments, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn catalog(&self) -> &LocationCatalog {
        &self.catalog
    }

    /// Register a new idle session and drop any that expired.
    pub fn create(&self) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut entries = self.lock();

        let before = entries.len();
        entries.retain(|_, e| now - e.updated_at < self.ttl);
        let expired = before - entries.len();
        if expired > 0 {
            tracing::info!(expired, "Dropped expired sessions");
        }

        entries.insert(
            id,
            SessionEntry {
                session: GameSession::new(self.rules, Arc::clone(&self.catalog)),
                created_at: now,
                updated_at: now,
            },
        );
        tracing::debug!(%id, active = entries.len(), "Session created");
        id
    }

    /// Run `f` against the session, returning `None` when it does not exist.
    pub fn with_session<T>(&self, id: &Uuid, f: impl FnOnce(&mut SessionEntry) -> T) -> Option<T> {
        let mut entries = self.lock();
        let entry = entries.get_mut(id)?;
        entry.updated_at = Utc::now();
        Some(f(entry))
    }

    /// Read-only access that does not refresh the session's expiry.
    pub fn inspect<T>(&self, id: &Uuid, f: impl FnOnce(&SessionEntry) -> T) -> Option<T> {
        self.lock().get(id).map(f)
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            tracing::debug!(%id, "Session ended");
        }
        removed
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoguess_shared::catalog::SystemRandom;
    use geoguess_shared::models::Variant;
    use geoguess_shared::session::RoundState;

    fn sessions(ttl: chrono::Duration) -> Arc<Sessions> {
        Sessions::new(
            GameRules::for_variant(Variant::World),
            Arc::new(LocationCatalog::world()),
            ttl,
        )
    }

    #[test]
    fn test_create_and_drive_session() {
        let s = sessions(chrono::Duration::minutes(10));
        let id = s.create();
        assert_eq!(s.count(), 1);

        let target = s
            .with_session(&id, |e| e.session.start_round(&mut SystemRandom))
            .unwrap();
        let state = s.inspect(&id, |e| *e.session.state()).unwrap();
        assert_eq!(state, RoundState::InProgress { target });
    }

    #[test]
    fn test_unknown_session() {
        let s = sessions(chrono::Duration::minutes(10));
        let missing = Uuid::new_v4();
        assert!(s.with_session(&missing, |_| ()).is_none());
        assert!(s.inspect(&missing, |_| ()).is_none());
        assert!(!s.remove(&missing));
    }

    #[test]
    fn test_remove_session() {
        let s = sessions(chrono::Duration::minutes(10));
        let id = s.create();
        assert!(s.remove(&id));
        assert_eq!(s.count(), 0);
        assert!(!s.remove(&id));
    }

    #[test]
    fn test_sessions_are_independent() {
        let s = sessions(chrono::Duration::minutes(10));
        let a = s.create();
        let b = s.create();
        s.with_session(&a, |e| e.session.start_round(&mut SystemRandom));
        assert_eq!(s.inspect(&b, |e| *e.session.state()), Some(RoundState::Idle));
    }

    #[test]
    fn test_expired_sessions_dropped_on_create() {
        let s = sessions(chrono::Duration::minutes(10));
        let old = s.create();
        {
            let mut entries = s.lock();
            let entry = entries.get_mut(&old).unwrap();
            entry.updated_at = Utc::now() - chrono::Duration::minutes(11);
        }
        let fresh = s.create();
        assert_eq!(s.count(), 1);
        assert!(s.inspect(&old, |_| ()).is_none());
        assert!(s.inspect(&fresh, |_| ()).is_some());
    }
}
