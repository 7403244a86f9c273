//! Command routing
//!
//! Commands are matched by raw prefix, in order, first match wins. No case
//! folding or trimming, so `/capturexyz` is still a capture.

use crate::bot::session::SessionState;
use crate::bot::views;

/// Welcome command
pub const COMMAND_START: &str = "/start";
/// Capture command
pub const COMMAND_CAPTURE: &str = "/capture";
/// Status command
pub const COMMAND_STATUS: &str = "/status";
/// Help command
pub const COMMAND_HELP: &str = "/help";

/// What the dispatcher should do with an update
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Reply with fixed text
    ReplyText(String),
    /// Reply with the current process status
    ReplyStatus,
    /// Reply with the help text
    ReplyHelp,
    /// Capture an image and reply with it
    TriggerCapture,
    /// Reply that the received text is not a command
    ReplyUnknown(String),
}

/// Map command text received in `state` to an [`Action`].
///
/// # Examples
///
/// ```
/// use imagesnap_bot::bot::{route, Action, SessionState};
///
/// assert_eq!(route(SessionState::Idle, "/capture now"), Action::TriggerCapture);
/// assert_eq!(route(SessionState::Idle, "/status extra text"), Action::ReplyStatus);
/// ```
#[must_use]
pub fn route(state: SessionState, text: &str) -> Action {
    match state {
        SessionState::Idle => route_idle(text),
    }
}

fn route_idle(text: &str) -> Action {
    if text.starts_with(COMMAND_START) {
        Action::ReplyText(views::WELCOME_MESSAGE.to_string())
    } else if text.starts_with(COMMAND_CAPTURE) {
        Action::TriggerCapture
    } else if text.starts_with(COMMAND_STATUS) {
        Action::ReplyStatus
    } else if text.starts_with(COMMAND_HELP) {
        Action::ReplyHelp
    } else {
        Action::ReplyUnknown(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_commands() {
        let idle = SessionState::Idle;
        assert_eq!(
            route(idle, "/start"),
            Action::ReplyText(views::WELCOME_MESSAGE.to_string())
        );
        assert_eq!(route(idle, "/capture"), Action::TriggerCapture);
        assert_eq!(route(idle, "/status"), Action::ReplyStatus);
        assert_eq!(route(idle, "/help"), Action::ReplyHelp);
    }

    #[test]
    fn test_prefix_match_ignores_trailing_text() {
        let idle = SessionState::Idle;
        assert_eq!(route(idle, "/capture please"), Action::TriggerCapture);
        assert_eq!(route(idle, "/capturexyz"), Action::TriggerCapture);
        assert_eq!(route(idle, "/status extra text"), Action::ReplyStatus);
        assert_eq!(route(idle, "/help@imagesnap_bot"), Action::ReplyHelp);
        assert_eq!(
            route(idle, "/start 123"),
            Action::ReplyText(views::WELCOME_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_case_and_whitespace_not_normalized() {
        let idle = SessionState::Idle;
        assert_eq!(
            route(idle, "/CAPTURE"),
            Action::ReplyUnknown("/CAPTURE".to_string())
        );
        assert_eq!(
            route(idle, " /help"),
            Action::ReplyUnknown(" /help".to_string())
        );
    }

    #[test]
    fn test_fallback_echoes_text() {
        let idle = SessionState::Idle;
        assert_eq!(route(idle, "hello"), Action::ReplyUnknown("hello".to_string()));
        assert_eq!(route(idle, ""), Action::ReplyUnknown(String::new()));
    }
}
