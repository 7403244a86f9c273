//! Throttled logging of rejected senders
//!
//! Rejected updates never get a reply. Each one is still counted, but a sender
//! is logged at `info` again only after staying quiet for the cooldown, or once
//! the entry's TTL lapses during a continuous flood.

use crate::transport::ChatRef;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Why an update was rejected before reaching the session store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The sender has no username
    NoIdentity,
    /// The username is not on the allow-list
    NotAllowed,
}

/// Cache of recently logged rejections plus running counters
#[derive(Clone)]
pub struct RejectionLog {
    /// sender -> () mappings; presence means "logged within cooldown"
    recent: Cache<String, ()>,
    total: Arc<AtomicU64>,
    silenced: Arc<AtomicU64>,
}

impl RejectionLog {
    /// Creates a new `RejectionLog`
    ///
    /// # Arguments
    ///
    /// * `cooldown_secs` - Seconds between full log lines for the same sender
    /// * `ttl_secs` - Upper bound on how long an entry is kept
    /// * `max_capacity` - Maximum number of entries in cache
    ///
    /// # Examples
    ///
    /// ```
    /// use imagesnap_bot::bot::RejectionLog;
    ///
    /// let log = RejectionLog::new(
    ///     1200,   // 20 minutes cooldown
    ///     7200,   // 2 hours TTL
    ///     10_000  // max 10k entries
    /// );
    /// assert_eq!(log.total_count(), 0);
    /// ```
    #[must_use]
    pub fn new(cooldown_secs: u64, ttl_secs: u64, max_capacity: u64) -> Self {
        let recent = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .time_to_idle(Duration::from_secs(cooldown_secs))
            .build();

        Self {
            recent,
            total: Arc::new(AtomicU64::new(0)),
            silenced: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a rejected update.
    ///
    /// `sender` is the username, or the display name when there is none.
    /// Senders without a username are throttled per chat, since display names
    /// are not unique.
    ///
    /// Returns `true` if this rejection was logged in full, `false` if it was
    /// silenced because the same sender was logged within the cooldown.
    pub async fn record(&self, sender: &str, chat: ChatRef, reason: RejectionReason) -> bool {
        self.total.fetch_add(1, Ordering::Relaxed);
        let key = match reason {
            RejectionReason::NoIdentity => format!("~{}", chat.0),
            RejectionReason::NotAllowed => sender.to_string(),
        };

        if self.recent.get(&key).await.is_some() {
            let count = self.silenced.fetch_add(1, Ordering::Relaxed) + 1;
            // Log only every 100th silenced attempt
            if count.is_multiple_of(100) {
                debug!("⛔️ Silenced {count} rejected updates (recent: {sender})");
            }
            return false;
        }

        self.recent.insert(key, ()).await;
        match reason {
            RejectionReason::NoIdentity => {
                info!("⛔️ Not allowed (no user name): {sender} (chat {})", chat.0);
            }
            RejectionReason::NotAllowed => {
                info!("⛔️ Id not allowed: {sender}");
            }
        }
        true
    }

    /// Total number of rejected updates
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Number of rejections that were not logged in full
    #[must_use]
    pub fn silenced_count(&self) -> u64 {
        self.silenced.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: ChatRef = ChatRef(7);

    #[tokio::test]
    async fn test_first_rejection_logged() {
        let log = RejectionLog::new(60, 120, 100);
        assert!(log.record("mallory", CHAT, RejectionReason::NotAllowed).await);
        assert_eq!(log.total_count(), 1);
        assert_eq!(log.silenced_count(), 0);
    }

    #[tokio::test]
    async fn test_repeat_within_cooldown_silenced() {
        let log = RejectionLog::new(60, 120, 100);

        assert!(log.record("mallory", CHAT, RejectionReason::NotAllowed).await);
        for _ in 0..5 {
            assert!(!log.record("mallory", CHAT, RejectionReason::NotAllowed).await);
        }

        assert_eq!(log.total_count(), 6);
        assert_eq!(log.silenced_count(), 5);
    }

    #[tokio::test]
    async fn test_senders_and_reasons_independent() {
        let log = RejectionLog::new(60, 120, 100);

        assert!(log.record("mallory", CHAT, RejectionReason::NotAllowed).await);
        assert!(log.record("trudy", CHAT, RejectionReason::NotAllowed).await);
        // Same display name, different reason
        assert!(log.record("mallory", CHAT, RejectionReason::NoIdentity).await);
        assert_eq!(log.silenced_count(), 0);
    }

    #[tokio::test]
    async fn test_nameless_senders_throttled_per_chat() {
        let log = RejectionLog::new(60, 120, 100);

        // Two different people, both named "Alex", neither with a username
        assert!(log.record("Alex", ChatRef(1), RejectionReason::NoIdentity).await);
        assert!(log.record("Alex", ChatRef(2), RejectionReason::NoIdentity).await);
        assert!(!log.record("Alex", ChatRef(1), RejectionReason::NoIdentity).await);
        // Renaming does not escape the cooldown
        assert!(!log.record("Sam", ChatRef(2), RejectionReason::NoIdentity).await);

        assert_eq!(log.total_count(), 4);
        assert_eq!(log.silenced_count(), 2);
    }
}
