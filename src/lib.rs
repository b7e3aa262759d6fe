//! Telegram Chat Manager Library
//!
//! This library provides tools to:
//! - Load Telegram API credentials from a `.env` file
//! - Sign in with a persistent session and list every dialog of the account
//! - Split dialogs into groups, channels and private chats
//! - Leave groups and channels in bulk with a fixed throttle between requests
//! - Drive all of the above from an interactive text menu

pub mod config;
pub mod controller;
pub mod dialogs;
pub mod error;
pub mod imgtype;
pub mod manager;
pub mod session;
pub mod telegram;

// Re-export common types
pub use config::{ConfigError, Credentials};
pub use controller::{Controller, SessionEnd};
pub use dialogs::{Dialog, DialogBuckets, EntityTag, LeaveSelection};
pub use error::{Error, Result};
pub use manager::{BulkLeaveReport, ChatPlatform, LeaveOutcome, TelegramManager, LEAVE_DELAY};
pub use session::SessionLock;
