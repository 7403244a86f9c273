//! Messaging platform seam.
//!
//! The dispatcher only talks to [`ChatTransport`]; [`TelegramTransport`] is the
//! teloxide implementation used in production.

use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile, KeyboardButton, KeyboardMarkup, ParseMode};
use thiserror::Error;

/// Platform chat identifier replies are addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatRef(pub i64);

/// Errors returned by the messaging platform
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request failed; carries the platform's description.
    ///
    /// Unreadable photo files also end up here, reported by teloxide.
    #[error("{0}")]
    Api(String),
}

impl From<teloxide::RequestError> for TransportError {
    fn from(e: teloxide::RequestError) -> Self {
        Self::Api(e.to_string())
    }
}

/// Outgoing side of the messaging platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send an HTML formatted text reply.
    async fn send_text(
        &self,
        chat: ChatRef,
        html: &str,
    ) -> Result<(), TransportError>;

    /// Send a local image file as a photo.
    async fn send_photo(
        &self,
        chat: ChatRef,
        photo: &Path,
    ) -> Result<(), TransportError>;

    /// Show a "typing" indicator in the chat.
    async fn send_typing(&self, chat: ChatRef) -> Result<(), TransportError>;
}

/// [`ChatTransport`] backed by the Telegram Bot API.
///
/// Every text and photo reply carries the same reply keyboard.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
    keyboard: KeyboardMarkup,
}

impl TelegramTransport {
    /// Wrap a teloxide bot; `keyboard` rows are attached to every reply.
    #[must_use]
    pub fn new(bot: Bot, keyboard: &[Vec<&str>]) -> Self {
        Self {
            bot,
            keyboard: reply_keyboard(keyboard),
        }
    }
}

/// Build a resized reply keyboard from rows of labels.
#[must_use]
pub fn reply_keyboard(rows: &[Vec<&str>]) -> KeyboardMarkup {
    let keyboard: Vec<Vec<KeyboardButton>> = rows
        .iter()
        .map(|row| row.iter().map(|label| KeyboardButton::new(*label)).collect())
        .collect();
    KeyboardMarkup::new(keyboard).resize_keyboard()
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(
        &self,
        chat: ChatRef,
        html: &str,
    ) -> Result<(), TransportError> {
        self.bot
            .send_message(ChatId(chat.0), html)
            .parse_mode(ParseMode::Html)
            .reply_markup(self.keyboard.clone())
            .await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat: ChatRef,
        photo: &Path,
    ) -> Result<(), TransportError> {
        self.bot
            .send_photo(ChatId(chat.0), InputFile::file(photo))
            .reply_markup(self.keyboard.clone())
            .await?;
        Ok(())
    }

    async fn send_typing(&self, chat: ChatRef) -> Result<(), TransportError> {
        self.bot
            .send_chat_action(ChatId(chat.0), ChatAction::Typing)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_keyboard_layout() {
        let keyboard = reply_keyboard(&[vec!["/capture"], vec!["/status", "/help"]]);
        assert_eq!(keyboard.keyboard.len(), 2);
        assert_eq!(keyboard.keyboard[0][0].text, "/capture");
        assert_eq!(keyboard.keyboard[1][1].text, "/help");
    }

    #[test]
    fn test_request_error_becomes_api_error() {
        let err = TransportError::from(teloxide::RequestError::Api(
            teloxide::ApiError::BotBlocked,
        ));
        assert!(
            matches!(&err, TransportError::Api(msg) if msg.contains("bot was blocked")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_api_error_keeps_description() {
        let err = TransportError::Api("Bad Request: chat not found".to_string());
        assert_eq!(err.to_string(), "Bad Request: chat not found");
    }
}
