//! In-memory conversational sessions, one per phone, expiring after a fixed idle time.

pub mod context;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::{OwnedMutexGuard, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use cargolink_core::serde::clock_time;
use cargolink_domain::role::UserRole;

use crate::domain::repository::Notifier;
use crate::domain::types::SESSION_TTL_MINUTES;
use crate::error::ChatServiceError;
use crate::usecase::notify;

pub use context::FlowState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub phone: String,
    pub role: UserRole,
    pub user_id: Option<String>,
    pub name: String,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub last_active_at: DateTime<Utc>,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    pub active: bool,
    /// `None` when no guided dialogue is in progress.
    pub context: Option<FlowState>,
}

impl Session {
    fn new(
        phone: &str,
        role: UserRole,
        user_id: Option<String>,
        name: &str,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            phone: phone.to_owned(),
            role,
            user_id,
            name: name.to_owned(),
            created_at: now,
            last_active_at: now,
            expires_at: now + ttl,
            active: true,
            context: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.active || now >= self.expires_at
    }

    fn touch(&mut self, ttl: Duration) {
        let now = Utc::now();
        self.last_active_at = now;
        self.expires_at = now + ttl;
    }
}

/// Monitoring snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub active_count: usize,
    pub by_role: BTreeMap<UserRole, usize>,
    pub avg_duration_minutes: f64,
}

/// Session table plus the per-phone turn gates.
///
/// Table mutations take the write lock only for in-memory work; the expiry
/// notification is sent after the lock is released.
pub struct SessionStore<N: Notifier> {
    sessions: RwLock<HashMap<String, Session>>,
    gates: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    ttl: Duration,
    notifier: Arc<N>,
}

impl<N: Notifier> SessionStore<N> {
    pub fn new(notifier: Arc<N>) -> Self {
        Self::with_ttl(notifier, Duration::minutes(SESSION_TTL_MINUTES))
    }

    pub fn with_ttl(notifier: Arc<N>, ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            ttl,
            notifier,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the live session for `phone` with a refreshed TTL, or create one.
    ///
    /// An expired session still in the table is replaced and its expiry notice sent.
    pub async fn create_or_touch(
        &self,
        phone: &str,
        role: UserRole,
        user_id: Option<String>,
        name: &str,
    ) -> Session {
        let now = Utc::now();
        let (session, expired) = {
            let mut sessions = self.sessions.write().await;
            if let Some(existing) = sessions.get_mut(phone).filter(|s| !s.is_expired(now)) {
                existing.touch(self.ttl);
                return existing.clone();
            }
            let expired = sessions.remove(phone);
            let session = Session::new(phone, role, user_id, name, self.ttl);
            sessions.insert(phone.to_owned(), session.clone());
            (session, expired)
        };

        if let Some(old) = expired {
            self.notify_expired(&old).await;
        }
        debug!(phone, role = role.as_str(), session_id = %session.id, "session created");
        session
    }

    /// Live session for `phone`. Expired sessions count as absent even before a sweep.
    pub async fn get(&self, phone: &str) -> Result<Session, ChatServiceError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(phone)
            .filter(|s| !s.is_expired(Utc::now()))
            .cloned()
            .ok_or(ChatServiceError::SessionNotFound)
    }

    /// Replace the flow context and refresh the TTL.
    pub async fn update_context(
        &self,
        phone: &str,
        context: Option<FlowState>,
    ) -> Result<Session, ChatServiceError> {
        self.update(phone, |s| s.context = context).await
    }

    /// Apply `f` to the live session and refresh the TTL.
    pub async fn update<F>(&self, phone: &str, f: F) -> Result<Session, ChatServiceError>
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(phone)
            .filter(|s| !s.is_expired(Utc::now()))
            .ok_or(ChatServiceError::SessionNotFound)?;
        f(session);
        session.touch(self.ttl);
        Ok(session.clone())
    }

    /// Push the expiry out by `minutes` beyond its current value.
    pub async fn extend(&self, phone: &str, minutes: i64) -> Result<Session, ChatServiceError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(phone)
            .filter(|s| !s.is_expired(Utc::now()))
            .ok_or(ChatServiceError::SessionNotFound)?;
        session.expires_at += Duration::minutes(minutes);
        Ok(session.clone())
    }

    /// End the session now, sending the expiry notice.
    pub async fn end(&self, phone: &str) -> Result<(), ChatServiceError> {
        let mut removed = self
            .sessions
            .write()
            .await
            .remove(phone)
            .ok_or(ChatServiceError::SessionNotFound)?;
        removed.active = false;
        self.notify_expired(&removed).await;
        info!(phone, session_id = %removed.id, "session ended");
        Ok(())
    }

    /// Remove every expired session, notifying each once. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<Session> = {
            let mut sessions = self.sessions.write().await;
            let phones: Vec<String> = sessions
                .iter()
                .filter(|(_, s)| s.is_expired(now))
                .map(|(phone, _)| phone.clone())
                .collect();
            let expired = phones
                .iter()
                .filter_map(|phone| sessions.remove(phone))
                .collect();

            let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
            gates.retain(|phone, gate| Arc::strong_count(gate) > 1 || sessions.contains_key(phone));
            expired
        };

        for session in &expired {
            self.notify_expired(session).await;
        }
        expired.len()
    }

    pub async fn stats(&self) -> SessionStats {
        let now = Utc::now();
        let sessions = self.sessions.read().await;
        let live: Vec<&Session> = sessions.values().filter(|s| !s.is_expired(now)).collect();

        let mut by_role = BTreeMap::new();
        for s in &live {
            *by_role.entry(s.role).or_insert(0) += 1;
        }
        let avg_duration_minutes = if live.is_empty() {
            0.0
        } else {
            let total: f64 = live
                .iter()
                .map(|s| (now - s.created_at).num_seconds() as f64 / 60.0)
                .sum();
            total / live.len() as f64
        };

        SessionStats {
            active_count: live.len(),
            by_role,
            avg_duration_minutes,
        }
    }

    /// Live sessions, most recently active first.
    pub async fn active_sessions(&self) -> Vec<Session> {
        let now = Utc::now();
        let mut live: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| !s.is_expired(now))
            .cloned()
            .collect();
        live.sort_by(|a, b| b.last_active_at.cmp(&a.last_active_at));
        live
    }

    /// Wait for exclusive use of `phone`. Messages from one phone are handled one at a time.
    pub async fn turn(&self, phone: &str) -> OwnedMutexGuard<()> {
        let gate = {
            let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(gates.entry(phone.to_owned()).or_default())
        };
        gate.lock_owned().await
    }

    async fn notify_expired(&self, session: &Session) {
        let name = if session.name.is_empty() {
            "there".to_owned()
        } else {
            session.name.clone()
        };
        let minutes = (session.last_active_at - session.created_at).num_minutes();
        let last_activity = clock_time(&session.last_active_at);
        let params = [
            ("name", name.clone()),
            ("session_duration", format!("{minutes} minutes")),
            ("last_activity", last_activity.clone()),
        ];
        let fallback = format!(
            "⏰ Hi {name}, your session has ended after {minutes} minutes of activity \
             (last message at {last_activity}).\n\nSend any message to start again."
        );
        notify::template_or_text(
            self.notifier.as_ref(),
            &session.phone,
            "session_expired",
            &params,
            &fallback,
        )
        .await;
        info!(phone = %session.phone, session_id = %session.id, "session expired");
    }
}
