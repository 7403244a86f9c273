//! Per-update entry point
//!
//! Every inbound update passes the same hard gates: identity, allow-list,
//! session lookup. Routing and the resulting side effect run while the session
//! store lock is held, so dispatch bodies never overlap across users.

use crate::bot::auth::Authorizer;
use crate::bot::rejection_log::{RejectionLog, RejectionReason};
use crate::bot::router::{route, Action};
use crate::bot::session::{SessionState, SessionStore, Transition};
use crate::bot::views;
use crate::capture::ImageCapture;
use crate::config::Settings;
use crate::status::StatusReporter;
use crate::transport::{ChatRef, ChatTransport};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Transport-neutral view of an inbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    /// Sender username, `None` if the sender has none
    pub identity: Option<String>,
    /// Sender display name, for logging only
    pub display_name: String,
    /// Message text, if any
    pub text: Option<String>,
    /// Chat to reply to
    pub chat: ChatRef,
}

/// Authorizes, routes and acts on inbound updates.
pub struct UpdateDispatcher {
    authorizer: Authorizer,
    sessions: SessionStore,
    capture: Arc<dyn ImageCapture>,
    transport: Arc<dyn ChatTransport>,
    status: StatusReporter,
    rejections: RejectionLog,
    notify_capture_failure: bool,
}

impl UpdateDispatcher {
    /// Create a dispatcher with one idle session per allow-listed user.
    #[must_use]
    pub fn new(
        authorizer: Authorizer,
        capture: Arc<dyn ImageCapture>,
        transport: Arc<dyn ChatTransport>,
        rejections: RejectionLog,
    ) -> Self {
        let sessions = SessionStore::new(authorizer.allowed());
        Self {
            authorizer,
            sessions,
            capture,
            transport,
            status: StatusReporter::new(),
            rejections,
            notify_capture_failure: false,
        }
    }

    /// Create a dispatcher from loaded settings.
    #[must_use]
    pub fn from_settings(
        settings: &Settings,
        capture: Arc<dyn ImageCapture>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        let rejections = RejectionLog::new(
            settings.rejection_cooldown_secs,
            settings.rejection_cache_ttl_secs,
            settings.rejection_cache_max_size,
        );
        Self::new(
            Authorizer::new(settings.allowed_ids()),
            capture,
            transport,
            rejections,
        )
        .with_capture_failure_notice(settings.notify_capture_failure)
    }

    /// Reply with a short notice when a capture fails (off by default).
    #[must_use]
    pub const fn with_capture_failure_notice(mut self, enabled: bool) -> Self {
        self.notify_capture_failure = enabled;
        self
    }

    /// Measure uptime with the given reporter.
    #[must_use]
    pub const fn with_status(mut self, status: StatusReporter) -> Self {
        self.status = status;
        self
    }

    /// Session store, for inspection
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Rejection counters, for inspection
    #[must_use]
    pub const fn rejections(&self) -> &RejectionLog {
        &self.rejections
    }

    /// Handle one inbound update.
    ///
    /// Returns true if the reply (text or photo) was delivered. Nothing is
    /// retried.
    pub async fn dispatch(&self, update: InboundUpdate) -> bool {
        let Some(identity) = update.identity.as_deref().filter(|id| !id.is_empty()) else {
            self.rejections
                .record(&update.display_name, update.chat, RejectionReason::NoIdentity)
                .await;
            return false;
        };

        if !self.authorizer.is_authorized(identity) {
            self.rejections
                .record(identity, update.chat, RejectionReason::NotAllowed)
                .await;
            return false;
        }

        let text = update.text.as_deref().unwrap_or_default();
        let chat = update.chat;

        let handled = self
            .sessions
            .with_lock(identity, |session| async move {
                let action = route(session.state, text);
                debug!(user = %identity, ?action, "Routed command");
                let handled = self.execute(chat, action).await;
                // Every command returns to Idle
                Transition::to(SessionState::Idle, handled)
            })
            .await;

        match handled {
            Some(handled) => {
                info!(user = %identity, handled, "Update dispatched");
                handled
            }
            None => {
                error!("Session does not exist for id: {identity}");
                false
            }
        }
    }

    async fn execute(&self, chat: ChatRef, action: Action) -> bool {
        match action {
            Action::ReplyText(text) => self.reply(chat, &text).await,
            Action::ReplyStatus => self.reply(chat, &self.status_text()).await,
            Action::ReplyHelp => self.reply(chat, views::HELP_MESSAGE).await,
            Action::ReplyUnknown(text) => self.reply(chat, &views::unknown_command(&text)).await,
            Action::TriggerCapture => self.capture_and_send(chat).await,
        }
    }

    fn status_text(&self) -> String {
        views::status(
            &self.status.uptime_text(),
            &self.status.memory_text(),
            self.rejections.total_count(),
        )
    }

    async fn reply(&self, chat: ChatRef, html: &str) -> bool {
        match self.transport.send_text(chat, html).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to send message: {e}");
                false
            }
        }
    }

    async fn capture_and_send(&self, chat: ChatRef) -> bool {
        if let Err(e) = self.transport.send_typing(chat).await {
            warn!("Failed to send typing indicator: {e}");
        }

        let image = match self.capture.capture().await {
            Ok(image) => image,
            Err(e) => {
                error!("Image capture failed: {e}");
                if self.notify_capture_failure {
                    self.reply(chat, views::CAPTURE_FAILED_MESSAGE).await;
                }
                return false;
            }
        };

        let sent = match self.transport.send_photo(chat, image.path()).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to send photo: {e}");
                false
            }
        };

        let path = image.path().to_path_buf();
        if let Err(e) = image.remove().await {
            warn!("Failed to delete temp file {}: {e}", path.display());
        }

        sent
    }
}
