//! Mail-retrieval capability
//!
//! [`MailProtocol`] is the seam between an account checker and the wire
//! protocol. The checker only needs four steps: open an authenticated
//! session, select a folder, search for unseen messages and log out.
//! [`ImapProtocol`] implements them over `async-imap`.

use crate::config::AccountConfig;
use crate::connection::{self, ImapSession};
use crate::error::Result;
use crate::folder::Folder;
use async_trait::async_trait;

/// The protocol operations an account checker is built on.
#[async_trait]
pub trait MailProtocol: Send + Sync {
    /// An authenticated session. Only ever produced by a successful
    /// [`MailProtocol::connect`].
    type Session: Send;

    /// Establish and authenticate a session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Connection`] if the transport cannot be
    /// established or the login is rejected.
    async fn connect(&self, config: &AccountConfig) -> Result<Self::Session>;

    /// Select `folder` for the following search.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Query`] if the server refuses the folder.
    async fn select_folder(&self, session: &mut Self::Session, folder: &Folder) -> Result<()>;

    /// Identifiers of the unseen messages in the selected folder.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Query`] if the search fails.
    async fn search_unseen(&self, session: &mut Self::Session) -> Result<Vec<u32>>;

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Logout`] if the exchange fails. The
    /// session is consumed either way.
    async fn logout(&self, session: Self::Session) -> Result<()>;
}

/// IMAP over TLS, using implicit TLS or STARTTLS as configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImapProtocol;

#[async_trait]
impl MailProtocol for ImapProtocol {
    type Session = ImapSession;

    async fn connect(&self, config: &AccountConfig) -> Result<ImapSession> {
        connection::connect(config).await
    }

    async fn select_folder(&self, session: &mut ImapSession, folder: &Folder) -> Result<()> {
        connection::select(session, folder).await
    }

    async fn search_unseen(&self, session: &mut ImapSession) -> Result<Vec<u32>> {
        connection::search_unseen(session).await
    }

    async fn logout(&self, session: ImapSession) -> Result<()> {
        connection::logout(session).await
    }
}
