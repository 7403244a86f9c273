/// Allow-list membership checks
pub mod auth;
/// Per-update entry point tying authorization, sessions and routing together
pub mod dispatcher;
/// Throttled logging of rejected senders
pub mod rejection_log;
/// Command text to action mapping
pub mod router;
/// Per-user session state
pub mod session;
/// Reply texts and keyboards
pub mod views;

pub use auth::Authorizer;
pub use dispatcher::{InboundUpdate, UpdateDispatcher};
pub use rejection_log::RejectionLog;
pub use router::{route, Action};
pub use session::{Session, SessionState, SessionStore, Transition};
