#![deny(missing_docs)]
//! Telegram bot that captures images with an external capture tool.
//!
//! Authorized users send short text commands; `/capture` runs the capture
//! executable and the resulting image is sent back as a photo.

/// Session-gated command handling (authorization, sessions, routing, dispatch).
pub mod bot;
/// External image capture invocation.
pub mod capture;
/// Configuration management.
pub mod config;
/// Telegram runtime entrypoint.
pub mod runner;
/// Process status (uptime, memory).
pub mod status;
/// Messaging platform seam and its Telegram implementation.
pub mod transport;
