use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::Session;

/// Sessions keyed by id (the token's `jti`). Each session owns its vote record.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<Uuid, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn create(&mut self, user: &str, ttl: Duration, now: DateTime<Utc>) -> &Session {
        let session = Session {
            id: Uuid::new_v4(),
            user: user.to_string(),
            created_at: now,
            expires_at: now + ttl,
            votes: HashMap::new(),
        };
        let id = session.id;
        tracing::info!(session_id = %id, "session started");
        self.sessions.entry(id).or_insert(session)
    }

    /// Live session by id. Expired sessions are treated as absent.
    pub fn get(&self, session_id: Uuid, now: DateTime<Utc>) -> Option<&Session> {
        self.sessions
            .get(&session_id)
            .filter(|session| !session.is_expired(now))
    }

    pub fn get_mut(&mut self, session_id: Uuid, now: DateTime<Utc>) -> Option<&mut Session> {
        self.sessions
            .get_mut(&session_id)
            .filter(|session| !session.is_expired(now))
    }

    /// Ends the session and discards its vote record.
    pub fn remove(&mut self, session_id: Uuid) -> Option<Session> {
        let removed = self.sessions.remove(&session_id);
        if let Some(session) = &removed {
            tracing::info!(
                session_id = %session.id,
                votes_discarded = session.votes.len(),
                "session ended"
            );
        }
        removed
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now));
        before - self.sessions.len()
    }
}
