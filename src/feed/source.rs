// Ledger sources - the read boundary the feed assembler depends on
//
// Every read may suspend and may fail independently; callers must not
// assume two reads observe the same ledger state.

use crate::identity::Address;
use crate::ledger::{EntryId, SharedLedger, Slot};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Errors from a single read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Read timed out")]
    Timeout,
}

/// Read-only view of a ledger, possibly across a network boundary
#[async_trait]
pub trait LedgerSource: Send + Sync {
    async fn total_entries(&self) -> Result<u64, SourceError>;

    async fn get_entry(&self, id: EntryId) -> Result<Slot, SourceError>;

    async fn has_voted(&self, viewer: &Address, id: EntryId) -> Result<bool, SourceError>;

    async fn get_account_entries(&self, account: &Address) -> Result<Vec<EntryId>, SourceError>;

    async fn owner(&self) -> Result<Address, SourceError>;
}

#[async_trait]
impl LedgerSource for SharedLedger {
    async fn total_entries(&self) -> Result<u64, SourceError> {
        Ok(SharedLedger::total_entries(self).await)
    }

    async fn get_entry(&self, id: EntryId) -> Result<Slot, SourceError> {
        Ok(SharedLedger::get_entry(self, id).await)
    }

    async fn has_voted(&self, viewer: &Address, id: EntryId) -> Result<bool, SourceError> {
        Ok(SharedLedger::has_voted(self, viewer, id).await)
    }

    async fn get_account_entries(&self, account: &Address) -> Result<Vec<EntryId>, SourceError> {
        Ok(SharedLedger::get_account_entries(self, account).await)
    }

    async fn owner(&self) -> Result<Address, SourceError> {
        Ok(SharedLedger::owner(self).await)
    }
}

// ============================================================================
// MOCK LEDGER SOURCE
// ============================================================================

/// Wraps a real ledger and injects read failures and latency, for testing
pub struct MockLedgerSource {
    ledger: SharedLedger,
    failing_entries: HashSet<EntryId>,
    flaky_entries: HashMap<EntryId, AtomicUsize>,
    stalled_entries: HashSet<EntryId>,
    failing_votes: HashSet<EntryId>,
    failing_total: bool,
    reported_total: Option<u64>,
    delay_ms: u64,
    read_count: AtomicUsize,
}

impl MockLedgerSource {
    pub fn new(ledger: SharedLedger) -> Self {
        Self {
            ledger,
            failing_entries: HashSet::new(),
            flaky_entries: HashMap::new(),
            stalled_entries: HashSet::new(),
            failing_votes: HashSet::new(),
            failing_total: false,
            reported_total: None,
            delay_ms: 0,
            read_count: AtomicUsize::new(0),
        }
    }

    /// Every `get_entry` for this id fails
    pub fn with_failing_entry(mut self, id: EntryId) -> Self {
        self.failing_entries.insert(id);
        self
    }

    /// `get_entry` for this id fails `failures` times, then succeeds
    pub fn with_flaky_entry(mut self, id: EntryId, failures: usize) -> Self {
        self.flaky_entries.insert(id, AtomicUsize::new(failures));
        self
    }

    /// `get_entry` for this id never answers in time
    pub fn with_stalled_entry(mut self, id: EntryId) -> Self {
        self.stalled_entries.insert(id);
        self
    }

    /// Every `has_voted` for this id fails
    pub fn with_failing_vote_lookup(mut self, id: EntryId) -> Self {
        self.failing_votes.insert(id);
        self
    }

    /// `total_entries` always fails
    pub fn with_failing_total(mut self) -> Self {
        self.failing_total = true;
        self
    }

    /// `total_entries` answers `total` regardless of the ledger
    pub fn with_reported_total(mut self, total: u64) -> Self {
        self.reported_total = Some(total);
        self
    }

    /// Add a delay before every read
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Number of reads served (including failed ones)
    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    async fn begin_read(&self) {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn unavailable(what: &str) -> SourceError {
        SourceError::Unavailable(format!("mock failure: {}", what))
    }
}

#[async_trait]
impl LedgerSource for MockLedgerSource {
    async fn total_entries(&self) -> Result<u64, SourceError> {
        self.begin_read().await;
        if self.failing_total {
            return Err(Self::unavailable("totalEntries"));
        }
        if let Some(total) = self.reported_total {
            return Ok(total);
        }
        Ok(self.ledger.total_entries().await)
    }

    async fn get_entry(&self, id: EntryId) -> Result<Slot, SourceError> {
        self.begin_read().await;
        if self.stalled_entries.contains(&id) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing_entries.contains(&id) {
            return Err(Self::unavailable("getEntry"));
        }
        if let Some(remaining) = self.flaky_entries.get(&id) {
            let failed = remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failed {
                return Err(Self::unavailable("getEntry (flaky)"));
            }
        }
        Ok(self.ledger.get_entry(id).await)
    }

    async fn has_voted(&self, viewer: &Address, id: EntryId) -> Result<bool, SourceError> {
        self.begin_read().await;
        if self.failing_votes.contains(&id) {
            return Err(Self::unavailable("hasVoted"));
        }
        Ok(self.ledger.has_voted(viewer, id).await)
    }

    async fn get_account_entries(&self, account: &Address) -> Result<Vec<EntryId>, SourceError> {
        self.begin_read().await;
        Ok(self.ledger.get_account_entries(account).await)
    }

    async fn owner(&self) -> Result<Address, SourceError> {
        self.begin_read().await;
        Ok(self.ledger.owner().await)
    }
}
