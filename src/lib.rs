//! Unread mail checker for multiple IMAP accounts
//!
//! Each account gets an [`AccountChecker`] that owns at most one
//! authenticated session and reports how many unseen messages its
//! folder holds. An [`AccountCheckOrchestrator`] runs the checks for
//! every registered account and records one [`CheckResult`] per
//! account, so a broken account never hides the others.
//!
//! ```no_run
//! use mail_unread_checker::{AccountCheckOrchestrator, AccountConfig, ImapChecker};
//!
//! # async fn run() {
//! let mut orchestrator = AccountCheckOrchestrator::new();
//! orchestrator.add_account(ImapChecker::from_config(AccountConfig::new(
//!     "imap.example.com",
//!     "alice@example.com",
//!     "app-password",
//! )));
//!
//! for result in &orchestrator.check_all().await {
//!     match &result.outcome {
//!         Ok(count) => println!("{}: {count} unread", result.account),
//!         Err(e) => println!("{}: {e}", result.account),
//!     }
//! }
//! # }
//! ```

mod checker;
mod config;
mod connection;
mod error;
mod folder;
mod orchestrator;
mod protocol;

pub use checker::{AccountChecker, ConnectionState, ImapChecker, MailboxChecker};
pub use config::{AccountConfig, TlsMode, load_accounts};
pub use connection::ImapSession;
pub use error::{Error, Result};
pub use folder::Folder;
pub use orchestrator::{AccountCheckOrchestrator, CheckResult, Report};
pub use protocol::{ImapProtocol, MailProtocol};
