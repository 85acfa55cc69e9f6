//! Last-known state of every discovered account, across poll cycles.

use crate::{
    apis::accounts::{Account, AccountIdentity},
    connector::{AccountConnector, RefreshError, RefreshStage},
    snapshot::AccountSnapshot,
    Error,
};
use chrono::{DateTime, Utc};
use retry_policies::{policies::ExponentialBackoff, RetryDecision, RetryPolicy};
use std::{collections::HashSet, future::Future, time::Duration};
use tokio::task::JoinSet;

/// State of one tracked account.
#[derive(Debug)]
pub struct TrackedAccount {
    identity: AccountIdentity,
    discovered: Option<Account>,
    snapshot: Option<AccountSnapshot>,
    last_error: Option<RefreshError>,
    consecutive_failures: u32,
    next_attempt_at: Option<DateTime<Utc>>,
}

impl TrackedAccount {
    pub fn identity(&self) -> &AccountIdentity {
        &self.identity
    }

    /// Balances reported when the account was discovered, if it was tracked from a listing.
    pub fn discovered(&self) -> Option<&Account> {
        self.discovered.as_ref()
    }

    /// Last successful snapshot. Kept when later refreshes fail.
    pub fn snapshot(&self) -> Option<&AccountSnapshot> {
        self.snapshot.as_ref()
    }

    /// Error of the most recent refresh, if it failed.
    pub fn last_error(&self) -> Option<&RefreshError> {
        self.last_error.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn next_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.next_attempt_at
    }

    /// `true` if the most recent refresh failed.
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }

    /// `true` if the account should be refreshed in a poll cycle running at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_attempt_at.map_or(true, |at| at <= now)
    }
}

impl From<AccountIdentity> for TrackedAccount {
    fn from(identity: AccountIdentity) -> Self {
        Self {
            identity,
            discovered: None,
            snapshot: None,
            last_error: None,
            consecutive_failures: 0,
            next_attempt_at: None,
        }
    }
}

impl From<Account> for TrackedAccount {
    fn from(account: Account) -> Self {
        let identity = account.identity.clone();
        Self {
            discovered: Some(account),
            ..Self::from(identity)
        }
    }
}

/// Outcome of one [`AccountTracker::refresh_due`] cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub failed: usize,
    /// Accounts still backing off from earlier failures.
    pub skipped: usize,
}

/// Keeps the last-known snapshot of every account and spaces out retries of failing ones.
///
/// A failed refresh leaves the previous snapshot in place and marks the account stale.
/// Consecutive failures make the account sit out a growing number of poll cycles, as decided
/// by the backoff policy and rounded up to whole cycles. Once the policy gives up, the account
/// is attempted again on every cycle.
///
/// The default backoff waits between one and eight poll intervals, for up to 5 consecutive
/// failures.
#[derive(Debug)]
pub struct AccountTracker<R: RetryPolicy = ExponentialBackoff> {
    accounts: Vec<TrackedAccount>,
    scan_interval: Duration,
    backoff: R,
}

impl AccountTracker<ExponentialBackoff> {
    /// Starts tracking `accounts`, keeping their order, for a host polling every
    /// `scan_interval`.
    ///
    /// Accounts can be given as bare identities or as the [`Account`]s returned by
    /// [`AccountConnector::list_accounts`], whose balances then stand in until the first
    /// successful refresh.
    pub fn new(
        accounts: impl IntoIterator<Item = impl Into<TrackedAccount>>,
        scan_interval: Duration,
    ) -> Self {
        let scan_interval = scan_interval.max(Duration::from_secs(1));
        Self {
            accounts: accounts.into_iter().map(Into::into).collect(),
            scan_interval,
            backoff: ExponentialBackoff::builder()
                .retry_bounds(scan_interval, scan_interval * 8)
                .build_with_max_retries(5),
        }
    }
}

impl<R: RetryPolicy> AccountTracker<R> {
    /// Sets the policy deciding when failing accounts are attempted again.
    pub fn with_backoff<T: RetryPolicy>(self, backoff: T) -> AccountTracker<T> {
        AccountTracker {
            accounts: self.accounts,
            scan_interval: self.scan_interval,
            backoff,
        }
    }

    pub fn accounts(&self) -> &[TrackedAccount] {
        &self.accounts
    }

    pub fn get(&self, account_id: &str) -> Option<&TrackedAccount> {
        self.accounts
            .iter()
            .find(|a| a.identity.account_id == account_id)
    }

    /// Ids of the accounts to refresh in a cycle running at `now`.
    pub fn due_accounts(&self, now: DateTime<Utc>) -> Vec<String> {
        self.accounts
            .iter()
            .filter(|a| a.is_due(now))
            .map(|a| a.identity.account_id.clone())
            .collect()
    }

    /// Records the outcome of a refresh of `account_id` that just completed.
    ///
    /// Returns `false` if the account is not tracked.
    pub fn apply(
        &mut self,
        account_id: &str,
        result: Result<AccountSnapshot, RefreshError>,
    ) -> bool {
        self.record(account_id, result, Utc::now())
    }

    /// Records a refresh outcome for the poll cycle that started at `cycle_start`.
    fn record(
        &mut self,
        account_id: &str,
        result: Result<AccountSnapshot, RefreshError>,
        cycle_start: DateTime<Utc>,
    ) -> bool {
        let tracked = match self
            .accounts
            .iter_mut()
            .find(|a| a.identity.account_id == account_id)
        {
            Some(tracked) => tracked,
            None => {
                tracing::warn!("Ignoring refresh result of untracked account {}", account_id);
                return false;
            }
        };

        match result {
            Ok(snapshot) => {
                tracked.identity = snapshot.identity.clone();
                tracked.snapshot = Some(snapshot);
                tracked.last_error = None;
                tracked.consecutive_failures = 0;
                tracked.next_attempt_at = None;
            }
            Err(e) => {
                tracked.next_attempt_at = next_attempt(
                    self.backoff.should_retry(tracked.consecutive_failures),
                    self.scan_interval,
                    cycle_start,
                );
                tracked.consecutive_failures += 1;

                tracing::warn!(
                    consecutive_failures = tracked.consecutive_failures,
                    "Keeping last-known state of account {}: {}",
                    account_id,
                    e
                );
                tracked.last_error = Some(e);
            }
        }

        true
    }
}

/// Turns a backoff decision into the start of the first cycle allowed to retry.
///
/// The delay is rounded up to whole poll intervals, at least one, and the attempt lands
/// halfway between two ticks so a late tick does not wake the account early.
fn next_attempt(
    decision: RetryDecision,
    scan_interval: Duration,
    cycle_start: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let execute_after = match decision {
        RetryDecision::Retry { execute_after } => execute_after,
        RetryDecision::DoNotRetry => return None,
    };

    let delay = (execute_after - Utc::now()).to_std().unwrap_or_default();
    let cycles = (delay.as_secs_f64() / scan_interval.as_secs_f64()).ceil().max(1.0) as u32;

    let scheduled = scan_interval
        .checked_mul(cycles)
        .and_then(|wait| wait.checked_add(scan_interval / 2))
        .and_then(|wait| chrono::Duration::from_std(wait).ok())
        .and_then(|wait| cycle_start.checked_add_signed(wait));

    Some(scheduled.unwrap_or(execute_after))
}

impl<R: RetryPolicy + Send + Sync> AccountTracker<R> {
    /// Refreshes every due account concurrently and records the outcomes.
    ///
    /// Each account is refreshed in its own task. Dropping the returned future aborts all
    /// in-flight refreshes and leaves the tracker untouched for the accounts that did not
    /// complete.
    #[tracing::instrument(name = "Refresh Due Accounts", skip_all)]
    pub async fn refresh_due(
        &mut self,
        connector: &AccountConnector,
        now: DateTime<Utc>,
    ) -> RefreshSummary {
        let connector = connector.clone();
        self.refresh_due_with(now, move |account_id| {
            let connector = connector.clone();
            async move { connector.refresh(&account_id).await }
        })
        .await
    }

    async fn refresh_due_with<F, Fut>(&mut self, now: DateTime<Utc>, refresh: F) -> RefreshSummary
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<AccountSnapshot, RefreshError>> + Send + 'static,
    {
        let due = self.due_accounts(now);
        let mut summary = RefreshSummary {
            skipped: self.accounts.len() - due.len(),
            ..RefreshSummary::default()
        };

        let mut pending = due.iter().cloned().collect::<HashSet<_>>();
        let mut workers = JoinSet::new();
        for account_id in due {
            let refresh = refresh(account_id.clone());
            workers.spawn(async move { (account_id, refresh.await) });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((account_id, result)) => {
                    pending.remove(&account_id);
                    if result.is_ok() {
                        summary.refreshed += 1;
                    } else {
                        summary.failed += 1;
                    }
                    self.record(&account_id, result, now);
                }
                Err(e) => {
                    tracing::error!("Refresh task did not complete: {}", e);
                }
            }
        }

        // Tasks that panicked never reported their account
        for account_id in pending {
            summary.failed += 1;
            let source = Error::Other(anyhow::anyhow!("Refresh task did not complete"));
            let failure = RefreshError {
                account_id: account_id.clone(),
                stage: RefreshStage::Worker,
                source,
            };
            self.record(&account_id, Err(failure), now);
        }

        tracing::info!(
            "Refreshed {} accounts, {} failed, {} backing off",
            summary.refreshed,
            summary.failed,
            summary.skipped
        );

        summary
    }
}
