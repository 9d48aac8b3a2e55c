//! Per-account connection lifecycle
//!
//! An [`AccountChecker`] owns at most one authenticated session and
//! answers a single question over it: how many unseen messages the
//! account's folder holds.
//!
//! ```text
//!   Disconnected --connect ok--> Connected
//!   Connected --disconnect (any outcome)--> Disconnected
//!   Connected --select/search failure--> Disconnected
//! ```
//!
//! A failed `connect` leaves the checker `Disconnected`. A successful
//! unread query leaves the session open for the next check.

use crate::config::AccountConfig;
use crate::error::{Error, Result};
use crate::folder::Folder;
use crate::protocol::{ImapProtocol, MailProtocol};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Whether a checker currently holds an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// One mailbox account's connection lifecycle and unread query.
#[async_trait]
pub trait AccountChecker: Send {
    /// The identity results for this account are reported under.
    fn identity(&self) -> &str;

    fn state(&self) -> ConnectionState;

    /// Establish and authenticate a session. A no-op when already
    /// connected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the server is unreachable, the
    /// login is rejected or the attempt times out. The checker stays
    /// disconnected.
    async fn connect(&mut self) -> Result<()>;

    /// Number of unseen messages, connecting first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if connecting fails and
    /// [`Error::Query`] if folder selection or the search fails.
    async fn get_unread_count(&mut self) -> Result<usize>;

    /// Log out and release the session. A no-op when disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Logout`] if the logout exchange fails. The
    /// session is released before this returns, whatever the outcome.
    async fn disconnect(&mut self) -> Result<()>;
}

/// An [`AccountChecker`] over any [`MailProtocol`].
pub struct MailboxChecker<P: MailProtocol> {
    config: AccountConfig,
    protocol: P,
    session: Option<P::Session>,
}

/// Checker for a real IMAP account.
pub type ImapChecker = MailboxChecker<ImapProtocol>;

impl ImapChecker {
    #[must_use]
    pub const fn from_config(config: AccountConfig) -> Self {
        Self::new(config, ImapProtocol)
    }
}

impl<P: MailProtocol> MailboxChecker<P> {
    #[must_use]
    pub const fn new(config: AccountConfig, protocol: P) -> Self {
        Self {
            config,
            protocol,
            session: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AccountConfig {
        &self.config
    }
}

impl<P: MailProtocol> std::fmt::Debug for MailboxChecker<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailboxChecker")
            .field("account", &self.config.username)
            .field("host", &self.config.host)
            .field("connected", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

async fn count_unseen<P: MailProtocol>(
    protocol: &P,
    session: &mut P::Session,
    folder: &Folder,
    limit: Duration,
) -> Result<usize> {
    timeout(limit, protocol.select_folder(session, folder))
        .await
        .map_err(|_| Error::Query(format!("Timed out selecting {folder}")))??;

    let unseen = timeout(limit, protocol.search_unseen(session))
        .await
        .map_err(|_| Error::Query("Timed out searching for unseen messages".into()))??;

    Ok(unseen.len())
}

#[async_trait]
impl<P: MailProtocol> AccountChecker for MailboxChecker<P> {
    fn identity(&self) -> &str {
        self.config.identity()
    }

    fn state(&self) -> ConnectionState {
        if self.session.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    async fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            debug!("{} already connected", self.config.identity());
            return Ok(());
        }

        let session = timeout(self.config.timeout(), self.protocol.connect(&self.config))
            .await
            .map_err(|_| {
                Error::Connection(format!(
                    "Timed out connecting to {}:{}",
                    self.config.host, self.config.port
                ))
            })??;

        self.session = Some(session);
        Ok(())
    }

    async fn get_unread_count(&mut self) -> Result<usize> {
        self.connect().await?;

        let Some(session) = self.session.as_mut() else {
            return Err(Error::Connection("No session after connect".into()));
        };

        match count_unseen(
            &self.protocol,
            session,
            &self.config.folder,
            self.config.timeout(),
        )
        .await
        {
            Ok(count) => {
                info!("{}: {} unread in {}", self.config.identity(), count, self.config.folder);
                Ok(count)
            }
            Err(e) => {
                // The session may be expired or mid-command; start fresh next time.
                warn!("{}: dropping session after query failure: {}", self.config.identity(), e);
                self.session = None;
                Err(e)
            }
        }
    }

    async fn disconnect(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        match timeout(self.config.timeout(), self.protocol.logout(session)).await {
            Ok(Ok(())) => {
                debug!("{} logged out", self.config.identity());
                Ok(())
            }
            Ok(Err(e)) => {
                warn!("{}: {}", self.config.identity(), e);
                Err(e)
            }
            Err(_) => {
                warn!("{}: logout timed out", self.config.identity());
                Err(Error::Logout("Timed out logging out".into()))
            }
        }
    }
}
