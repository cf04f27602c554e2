// Feed Assembler - turns raw ledger reads into an ordered, viewer-annotated feed
//
// Candidate reads run concurrently (bounded), each with a timeout and a
// bounded number of retries. A candidate whose reads keep failing is
// dropped and reported; it never aborts the whole feed.

use crate::feed::model::{AccountProfile, Feed, FeedEntry, ReadFailure, SortBy};
use crate::feed::source::{LedgerSource, SourceError};
use crate::identity::Address;
use crate::ledger::EntryId;
use futures_util::stream::{self, StreamExt};
use std::future::Future;
use std::pin::pin;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

// ============================================================================
// FEED CONFIG
// ============================================================================

/// Configuration for feed assembly
#[derive(Clone, Debug)]
pub struct FeedConfig {
    /// Maximum number of candidate reads in flight
    pub concurrency: usize,
    /// Retries per read after the first attempt
    pub max_retries: u32,
    /// Timeout for a single read in milliseconds
    pub read_timeout_ms: u64,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            concurrency: 16,
            max_retries: 2,
            read_timeout_ms: 5_000,
            retry_delay_ms: 100,
        }
    }
}

impl FeedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_read_timeout_ms(mut self, ms: u64) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    pub fn with_retry_delay_ms(mut self, ms: u64) -> Self {
        self.retry_delay_ms = ms;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.concurrency == 0 {
            return Err(FeedError::InvalidConfig("concurrency must be > 0".to_string()));
        }
        if self.read_timeout_ms == 0 {
            return Err(FeedError::InvalidConfig("read_timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// FEED ERROR
// ============================================================================

/// Errors that abort an assembly
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FeedError {
    #[error("Ledger read failed: {0}")]
    Source(#[from] SourceError),

    #[error("Account {0} has no entries")]
    AccountNotFound(Address),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// FEED ASSEMBLER
// ============================================================================

pub struct FeedAssembler {
    config: FeedConfig,
}

impl Default for FeedAssembler {
    fn default() -> Self {
        Self {
            config: FeedConfig::default(),
        }
    }
}

impl FeedAssembler {
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Build a feed for `viewer`
    ///
    /// With `ids` the candidates are taken verbatim in the given order
    /// (typically an Account Index); without, every id from 1 to
    /// `totalEntries` is a candidate. Tombstones and failed reads are
    /// dropped, the rest is reversed into newest-first order and, for
    /// `MostVoted`, stably sorted by vote count.
    pub async fn fetch_ordered_entries<S>(
        &self,
        source: &S,
        viewer: &Address,
        sort: SortBy,
        ids: Option<&[EntryId]>,
    ) -> Result<Feed, FeedError>
    where
        S: LedgerSource + ?Sized,
    {
        // the source controls `totalEntries`, so candidates are streamed, never collected
        let (candidates, count) = match ids {
            Some(list) => (stream::iter(list.iter().copied()).left_stream(), list.len() as u64),
            None => {
                let total = self.with_retry("totalEntries", || source.total_entries()).await?;
                (stream::iter((1..=total).map(EntryId::new)).right_stream(), total)
            }
        };
        debug!(candidates = count, %sort, "assembling feed");

        let mut outcomes = pin!(candidates
            .map(|id| self.read_candidate(source, viewer, id))
            .buffered(self.config.concurrency));

        let mut feed = Feed::default();
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(Some(entry)) => feed.entries.push(entry),
                Ok(None) => {}
                Err(failure) => feed.failures.push(failure),
            }
        }

        feed.entries.reverse();
        if sort == SortBy::MostVoted {
            // sort_by is stable: ties keep newest-first order
            feed.entries.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
        }

        if !feed.failures.is_empty() {
            warn!(
                skipped = feed.failures.len(),
                shown = feed.entries.len(),
                "feed assembled with unavailable entries"
            );
        }

        Ok(feed)
    }

    /// Build the profile page of `account` as seen by `viewer`
    pub async fn account_profile<S>(
        &self,
        source: &S,
        viewer: &Address,
        account: &Address,
        sort: SortBy,
    ) -> Result<AccountProfile, FeedError>
    where
        S: LedgerSource + ?Sized,
    {
        let entry_ids = self
            .with_retry("getAccountEntries", || source.get_account_entries(account))
            .await?;
        if entry_ids.is_empty() {
            return Err(FeedError::AccountNotFound(*account));
        }

        let owner = self.with_retry("owner", || source.owner()).await?;
        let feed = self
            .fetch_ordered_entries(source, viewer, sort, Some(entry_ids.as_slice()))
            .await?;
        let first_entry_at = feed.entries.iter().map(|e| e.timestamp).min();

        Ok(AccountProfile {
            account: *account,
            is_owner: owner == *account,
            entry_ids,
            feed,
            first_entry_at,
        })
    }

    /// Read one candidate: `Ok(None)` for a tombstone, `Err` when a read failed
    async fn read_candidate<S>(
        &self,
        source: &S,
        viewer: &Address,
        id: EntryId,
    ) -> Result<Option<FeedEntry>, ReadFailure>
    where
        S: LedgerSource + ?Sized,
    {
        let slot = self
            .with_retry("getEntry", || source.get_entry(id))
            .await
            .map_err(|error| ReadFailure { id, error })?;

        let Some(entry) = slot.into_entry() else {
            return Ok(None);
        };

        let has_voted = self
            .with_retry("hasVoted", || source.has_voted(viewer, id))
            .await
            .map_err(|error| ReadFailure { id, error })?;

        Ok(Some(FeedEntry::from_entry(&entry, has_voted)))
    }

    async fn with_retry<T, F, Fut>(&self, what: &str, mut read: F) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let timeout = Duration::from_millis(self.config.read_timeout_ms);
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let error = match tokio::time::timeout(timeout, read()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => e,
                Err(_) => SourceError::Timeout,
            };

            if attempts > self.config.max_retries {
                warn!(read = what, attempts, error = %error, "read failed");
                return Err(error);
            }

            debug!(read = what, attempts, error = %error, "retrying read");
            if self.config.retry_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
            }
        }
    }
}
