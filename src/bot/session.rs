//! Per-user session state
//!
//! One [`Session`] exists per allow-listed username for the whole process
//! lifetime. All access goes through a single store-wide lock, which also keeps
//! at most one capture in flight.

use std::collections::HashMap;
use std::future::Future;
use tokio::sync::Mutex;

/// Represents the current state of a user session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Awaiting a command
    #[default]
    Idle,
}

/// Session record of one allow-listed user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    identity: String,
    /// Current state
    pub state: SessionState,
}

impl Session {
    /// Create an idle session
    #[must_use]
    pub const fn new(identity: String) -> Self {
        Self {
            identity,
            state: SessionState::Idle,
        }
    }

    /// Owning username
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// Result of work done under the store lock: the state to persist and a value
/// handed back to the caller.
#[derive(Debug)]
pub struct Transition<R> {
    /// State persisted for the session
    pub next: SessionState,
    /// Value returned from [`SessionStore::with_lock`]
    pub outcome: R,
}

impl<R> Transition<R> {
    /// Move to `next`, returning `outcome`.
    pub const fn to(next: SessionState, outcome: R) -> Self {
        Self { next, outcome }
    }
}

/// Username -> session mapping guarded by one lock.
///
/// The key set is fixed at construction.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    /// Create one idle session per allow-listed username.
    #[must_use]
    pub fn new(identities: &[String]) -> Self {
        let sessions = identities
            .iter()
            .map(|id| (id.clone(), Session::new(id.clone())))
            .collect();
        Self {
            sessions: Mutex::new(sessions),
        }
    }

    /// Snapshot of the session for `identity`, `None` if it is not allow-listed.
    pub async fn get(&self, identity: &str) -> Option<Session> {
        self.sessions.lock().await.get(identity).cloned()
    }

    /// Run `f` against the session for `identity` while holding the store lock.
    ///
    /// `f` receives a snapshot of the session and may await I/O; its returned
    /// [`Transition::next`] becomes the session's new state before the lock is
    /// released. The lock is released on every exit path, including panics.
    ///
    /// Returns `None` without calling `f` if `identity` has no session.
    pub async fn with_lock<F, Fut, R>(&self, identity: &str, f: F) -> Option<R>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Transition<R>>,
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(identity)?;
        let transition = f(session.clone()).await;
        session.state = transition.next;
        Some(transition.outcome)
    }

    /// Number of sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// True if no user is allow-listed
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// All usernames with a session, sorted
    pub async fn identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
