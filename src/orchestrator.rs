//! Multi-account unread checks
//!
//! [`AccountCheckOrchestrator`] runs every registered checker and turns
//! each account's outcome, success or failure, into one [`CheckResult`].
//! Errors stop at the per-account boundary: a failing or panicking
//! checker never aborts the batch.

use crate::checker::{AccountChecker, ImapChecker};
use crate::config::AccountConfig;
use crate::error::{Error, Result};
use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{info, warn};

/// Outcome of checking one account.
#[derive(Debug)]
pub struct CheckResult {
    /// Identity of the account the outcome belongs to.
    pub account: String,
    pub outcome: Result<usize>,
}

impl CheckResult {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    #[must_use]
    pub fn unread(&self) -> Option<usize> {
        self.outcome.as_ref().ok().copied()
    }

    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }
}

/// Per-account outcomes of one run, in registration order.
#[derive(Debug, Default)]
pub struct Report {
    results: Vec<CheckResult>,
}

impl Report {
    #[must_use]
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    #[must_use]
    pub fn into_results(self) -> Vec<CheckResult> {
        self.results
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, CheckResult> {
        self.results.iter()
    }

    /// Sum of unread counts over the accounts that were checked
    /// successfully.
    #[must_use]
    pub fn total_unread(&self) -> usize {
        self.results.iter().filter_map(CheckResult::unread).sum()
    }

    /// Number of accounts whose check failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| !r.is_ok()).count()
    }
}

impl IntoIterator for Report {
    type Item = CheckResult;
    type IntoIter = std::vec::IntoIter<CheckResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a CheckResult;
    type IntoIter = std::slice::Iter<'a, CheckResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Runs unread checks across a registry of account checkers.
///
/// The registry keeps insertion order and does no deduplication.
#[derive(Default)]
pub struct AccountCheckOrchestrator {
    checkers: Vec<Box<dyn AccountChecker>>,
    disconnect_after_check: bool,
}

impl AccountCheckOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One [`ImapChecker`] per configuration, in the given order.
    #[must_use]
    pub fn from_configs(configs: impl IntoIterator<Item = AccountConfig>) -> Self {
        let mut orchestrator = Self::new();
        for config in configs {
            orchestrator.add_account(ImapChecker::from_config(config));
        }
        orchestrator
    }

    /// Log out of each account right after its check instead of keeping
    /// the session for the next run.
    #[must_use]
    pub const fn disconnect_after_check(mut self, enabled: bool) -> Self {
        self.disconnect_after_check = enabled;
        self
    }

    pub fn add_account(&mut self, checker: impl AccountChecker + 'static) {
        self.add_boxed(Box::new(checker));
    }

    pub fn add_boxed(&mut self, checker: Box<dyn AccountChecker>) {
        self.checkers.push(checker);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    #[must_use]
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.checkers.iter().map(|c| c.identity())
    }

    /// Check every account, one after another, in registration order.
    ///
    /// Never fails as a whole: every registered checker contributes
    /// exactly one [`CheckResult`].
    pub async fn check_all(&mut self) -> Report {
        let disconnect = self.disconnect_after_check;
        let mut results = Vec::with_capacity(self.checkers.len());
        for checker in &mut self.checkers {
            results.push(check_one(checker.as_mut(), disconnect).await);
        }
        Report { results }
    }

    /// Check every account at once.
    ///
    /// Each checker keeps exclusive ownership of its session; results
    /// still come back in registration order.
    pub async fn check_all_concurrent(&mut self) -> Report {
        let disconnect = self.disconnect_after_check;
        let results = join_all(
            self.checkers
                .iter_mut()
                .map(|checker| check_one(checker.as_mut(), disconnect)),
        )
        .await;
        Report { results }
    }

    /// Disconnect every checker, returning the accounts whose logout
    /// failed.
    pub async fn disconnect_all(&mut self) -> Vec<(String, Error)> {
        let mut failed = Vec::new();
        for checker in &mut self.checkers {
            if let Err(e) = checker.disconnect().await {
                failed.push((checker.identity().to_string(), e));
            }
        }
        failed
    }
}

async fn check_one(checker: &mut dyn AccountChecker, disconnect: bool) -> CheckResult {
    let account = checker.identity().to_string();

    let outcome = AssertUnwindSafe(checker.get_unread_count())
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(Error::Panicked(panic_message(payload.as_ref()))));

    match &outcome {
        Ok(count) => info!("{}: {} unread", account, count),
        Err(e) => warn!("{}: check failed: {}", account, e),
    }

    // One-shot mode releases the session whatever the query did, panics included.
    if disconnect {
        match AssertUnwindSafe(checker.disconnect()).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("{}: {}", account, e),
            Err(payload) => warn!(
                "{}: disconnect panicked: {}",
                account,
                panic_message(payload.as_ref())
            ),
        }
    }

    CheckResult { account, outcome }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
