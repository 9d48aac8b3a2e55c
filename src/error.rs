//! Error types for mail-unread-checker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport, TLS, greeting or authentication failure while connecting.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server rejected folder selection or the unseen search.
    #[error("query error: {0}")]
    Query(String),

    /// The logout exchange failed. The connection is released regardless.
    #[error("logout error: {0}")]
    Logout(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// A checker panicked while being checked.
    #[error("checker panicked: {0}")]
    Panicked(String),
}

impl Error {
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
