//! Retry policy around remote calls
//!
//! Transient `LedgerError::Store` failures are retried with exponential
//! backoff up to a bounded number of attempts. Anything else, including an
//! absent session, is returned on the first failure.

use std::thread;
use std::time::Duration;

use tracing::warn;

use super::{Filter, Query, RemoteStore, Row};
use crate::config::settings::RetrySettings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::UserId;

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`, capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    pub fn run<T>(&self, table: &str, mut op: impl FnMut() -> LedgerResult<T>) -> LedgerResult<T> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(table, attempt, ?delay, error = %err, "store call failed, retrying");
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) if err.is_transient() => {
                    return Err(LedgerError::RetriesExhausted {
                        table: table.to_string(),
                        attempts: attempt,
                        message: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// A store whose calls go through a `RetryPolicy`
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: RemoteStore> RetryingStore<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

impl<S: RemoteStore> RemoteStore for RetryingStore<S> {
    fn select(&self, query: &Query) -> LedgerResult<Vec<Row>> {
        self.policy.run(&query.table, || self.inner.select(query))
    }

    fn insert(&self, table: &str, rows: Vec<Row>) -> LedgerResult<Vec<Row>> {
        self.policy
            .run(table, || self.inner.insert(table, rows.clone()))
    }

    fn upsert(
        &self,
        table: &str,
        rows: Vec<Row>,
        conflict_keys: &[&str],
    ) -> LedgerResult<Vec<Row>> {
        self.policy
            .run(table, || self.inner.upsert(table, rows.clone(), conflict_keys))
    }

    fn update(&self, table: &str, filters: &[Filter], patch: Row) -> LedgerResult<Vec<Row>> {
        self.policy
            .run(table, || self.inner.update(table, filters, patch.clone()))
    }

    fn delete(&self, table: &str, filters: &[Filter]) -> LedgerResult<()> {
        self.policy.run(table, || self.inner.delete(table, filters))
    }

    fn session(&self) -> Option<UserId> {
        self.inner.session()
    }
}
