//! Mailbox folder selection
//!
//! The checker counts unseen messages in one folder per account. That
//! is the inbox unless the account configuration names another one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The IMAP folder an account's unread count is taken from.
///
/// # Examples
///
/// ```
/// use mail_unread_checker::Folder;
///
/// assert_eq!(Folder::default(), Folder::Inbox);
/// assert_eq!(Folder::from("inbox").as_str(), "INBOX");
/// assert_eq!(Folder::from("Lists/rust").as_str(), "Lists/rust");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Folder {
    /// The INBOX folder. RFC 3501 treats its name case-insensitively.
    #[default]
    Inbox,
    /// Any other mailbox, named exactly as the server lists it.
    Custom(String),
}

impl Folder {
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }

    /// The folder name as sent in a SELECT command.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inbox => "INBOX",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Folder {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("inbox") {
            Self::Inbox
        } else {
            Self::Custom(s.to_string())
        }
    }
}

impl From<String> for Folder {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case("inbox") {
            Self::Inbox
        } else {
            Self::Custom(s)
        }
    }
}

impl From<Folder> for String {
    fn from(folder: Folder) -> Self {
        match folder {
            Folder::Inbox => "INBOX".to_string(),
            Folder::Custom(name) => name,
        }
    }
}
