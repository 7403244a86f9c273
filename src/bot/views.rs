//! Reply texts and keyboards
//!
//! All texts are Telegram HTML.

use crate::bot::router::{COMMAND_CAPTURE, COMMAND_HELP, COMMAND_STATUS};

/// Reply to `/start`
pub const WELCOME_MESSAGE: &str = "Input your command:";

/// Suffix appended to unrecognized input
pub const UNKNOWN_COMMAND_MESSAGE: &str = "Not a supported bot command.";

/// Reply sent when a capture fails and failure notices are enabled
pub const CAPTURE_FAILED_MESSAGE: &str = "⚠️ Image capture failed. Please try again later.";

/// Reply to `/help`
pub const HELP_MESSAGE: &str = "Following commands are supported:\n\n\
<b>For ImageSnap</b>\n\n\
/capture : capture an image with ImageSnap\n\n\
<b>Others</b>\n\n\
/status : show this bot's status\n\
/help : show this help message";

/// Reply keyboard rows attached to every reply
#[must_use]
pub fn command_keyboard() -> Vec<Vec<&'static str>> {
    vec![vec![COMMAND_CAPTURE], vec![COMMAND_STATUS, COMMAND_HELP]]
}

/// Reply to unrecognized input: the escaped input in bold plus a fixed suffix.
///
/// # Examples
///
/// ```
/// use imagesnap_bot::bot::views::unknown_command;
///
/// assert_eq!(
///     unknown_command("<hi>"),
///     "<b>&lt;hi&gt;</b>: Not a supported bot command."
/// );
/// ```
#[must_use]
pub fn unknown_command(text: &str) -> String {
    format!(
        "<b>{}</b>: {UNKNOWN_COMMAND_MESSAGE}",
        html_escape::encode_text(text)
    )
}

/// Reply to `/status`
#[must_use]
pub fn status(uptime: &str, memory: &str, rejected: u64) -> String {
    format!(
        "<b>Uptime:</b> {uptime}\n\
        <b>Memory Usage:</b> {memory}\n\
        <b>Rejected updates:</b> {rejected}"
    )
}
