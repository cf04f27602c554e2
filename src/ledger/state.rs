// Ledger - the authoritative store of entries, votes and collected fees
//
// Every mutation runs a validation pass first and only then applies its
// effects, so a rejected call never leaves partial state behind.

use crate::access::{AccessError, Ownership};
use crate::fees::{Amount, FeeError, FeePolicy, WithdrawalSplit};
use crate::identity::Address;
use crate::ledger::entry::{Entry, EntryId, Slot, MAX_CONTENT_BYTES};
use crate::ledger::event::LedgerEvent;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Events kept for `poll_events` before the oldest are dropped
pub const MAX_PENDING_EVENTS: usize = 1024;

/// Errors that can occur during ledger operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Not enough paid: paid {paid}, required {required}")]
    InsufficientPayment { paid: Amount, required: Amount },

    #[error("Each kweet should have between 1 and {max} bytes, got {len}", max = MAX_CONTENT_BYTES)]
    InvalidContentLength { len: usize },

    #[error("The kweet id is not valid: {0}")]
    InvalidId(EntryId),

    #[error("The kweet author cannot vote their own kweet")]
    SelfVoteForbidden,

    #[error("Each account can only vote a kweet once")]
    AlreadyVoted,

    #[error("Only the contract owner can perform this action")]
    NotOwner,

    #[error("Fee balance would overflow")]
    BalanceOverflow,

    #[error("Invalid fee configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed")]
    DeserializationFailed,

    #[error("Corrupt ledger snapshot: {0}")]
    CorruptSnapshot(String),
}

impl From<FeeError> for LedgerError {
    fn from(err: FeeError) -> Self {
        match err {
            FeeError::InsufficientPayment { paid, required } => {
                LedgerError::InsufficientPayment { paid, required }
            }
            FeeError::InvalidConfig(msg) => LedgerError::InvalidConfig(msg),
        }
    }
}

impl From<AccessError> for LedgerError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotOwner => LedgerError::NotOwner,
        }
    }
}

/// Statistics about the ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerStatistics {
    pub total_entries: u64,
    pub live_entries: u64,
    pub tombstoned_entries: u64,
    pub total_votes: u64,
    pub unique_authors: usize,
    pub balance: Amount,
    pub total_withdrawn: Amount,
}

/// The ledger store
///
/// Slot `i` holds entry id `i + 1`. Slots are appended on creation and
/// never removed, so `slots.len()` is `totalEntries` and the next id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledger {
    ownership: Ownership,
    fees: FeePolicy,
    slots: Vec<Slot>,
    /// Account Index: author -> ids in creation order (append-only)
    accounts: HashMap<Address, Vec<EntryId>>,
    /// Vote Records: voter -> ids voted on
    votes: HashMap<Address, HashSet<EntryId>>,
    balance: Amount,
    total_withdrawn: Amount,
    /// Pending events, oldest first, capped at `MAX_PENDING_EVENTS`
    #[serde(skip)]
    events: VecDeque<LedgerEvent>,
}

impl Ledger {
    /// Create an empty ledger owned by `owner`
    pub fn new(owner: Address, fees: FeePolicy) -> Result<Self, LedgerError> {
        fees.validate()?;
        Ok(Self {
            ownership: Ownership::new(owner),
            fees,
            slots: Vec::new(),
            accounts: HashMap::new(),
            votes: HashMap::new(),
            balance: 0,
            total_withdrawn: 0,
            events: VecDeque::new(),
        })
    }

    // ========================================================================
    // CONFIGURATION READS
    // ========================================================================

    pub fn owner(&self) -> &Address {
        self.ownership.owner()
    }

    pub fn fee_policy(&self) -> &FeePolicy {
        &self.fees
    }

    pub fn post_price(&self) -> Amount {
        self.fees.post_price
    }

    pub fn vote_price(&self) -> Amount {
        self.fees.vote_price
    }

    /// Number of entries ever created (including tombstoned ones)
    pub fn total_entries(&self) -> u64 {
        self.slots.len() as u64
    }

    /// Fees currently held by the ledger
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Fees paid out to the owner so far
    pub fn total_withdrawn(&self) -> Amount {
        self.total_withdrawn
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    fn credited_balance(&self, payment: Amount) -> Result<Amount, LedgerError> {
        self.balance
            .checked_add(payment)
            .ok_or(LedgerError::BalanceOverflow)
    }

    fn check_create(&self, content: &[u8], payment: Amount) -> Result<Amount, LedgerError> {
        if content.is_empty() || content.len() > MAX_CONTENT_BYTES {
            return Err(LedgerError::InvalidContentLength { len: content.len() });
        }
        self.fees.check_post_payment(payment)?;
        self.credited_balance(payment)
    }

    fn check_vote(&self, id: EntryId, payment: Amount, voter: &Address) -> Result<Amount, LedgerError> {
        let entry = self.entry(id).ok_or(LedgerError::InvalidId(id))?;
        if entry.author() == voter {
            return Err(LedgerError::SelfVoteForbidden);
        }
        if self.has_voted(voter, id) {
            return Err(LedgerError::AlreadyVoted);
        }
        self.fees.check_vote_payment(payment)?;
        self.credited_balance(payment)
    }

    fn slot_index(&self, id: EntryId) -> Option<usize> {
        let raw = id.get();
        if raw == 0 || raw > self.total_entries() {
            return None;
        }
        Some((raw - 1) as usize)
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Publish a new entry, returning its id
    pub fn create_entry(
        &mut self,
        content: impl Into<Vec<u8>>,
        payment: Amount,
        author: Address,
        now: u64,
    ) -> Result<EntryId, LedgerError> {
        let content = content.into();
        let new_balance = self.check_create(&content, payment)?;

        let id = EntryId::new(self.total_entries() + 1);
        self.slots.push(Slot::Present(Entry::new(id, author, content, now)));
        self.accounts.entry(author).or_default().push(id);
        self.balance = new_balance;

        debug!(%id, author = %author, payment, "entry created");
        self.record(LedgerEvent::EntryCreated {
            id,
            author,
            timestamp: now,
        });

        Ok(id)
    }

    /// Vote on someone else's entry
    pub fn vote(&mut self, id: EntryId, payment: Amount, voter: Address) -> Result<(), LedgerError> {
        let new_balance = self.check_vote(id, payment, &voter)?;
        let index = self.slot_index(id).ok_or(LedgerError::InvalidId(id))?;

        let vote_count = match &mut self.slots[index] {
            Slot::Present(entry) => {
                entry.record_vote();
                entry.vote_count()
            }
            Slot::Tombstoned => return Err(LedgerError::InvalidId(id)),
        };
        self.votes.entry(voter).or_default().insert(id);
        self.balance = new_balance;

        debug!(%id, voter = %voter, vote_count, "vote recorded");
        self.record(LedgerEvent::Voted { id, voter, vote_count });

        Ok(())
    }

    /// Tombstone an entry (owner only)
    ///
    /// Returns `Ok(true)` when the entry was tombstoned by this call and
    /// `Ok(false)` when the id was out of range or already tombstoned.
    pub fn delete_entry(&mut self, id: EntryId, caller: &Address) -> Result<bool, LedgerError> {
        self.ownership.ensure_owner(caller)?;

        let Some(index) = self.slot_index(id) else {
            debug!(%id, "delete ignored: id out of range");
            return Ok(false);
        };
        if self.slots[index].is_tombstoned() {
            debug!(%id, "delete ignored: already tombstoned");
            return Ok(false);
        }

        self.slots[index] = Slot::Tombstoned;
        info!(%id, "entry tombstoned");
        self.record(LedgerEvent::EntryDeleted { id });

        Ok(true)
    }

    /// Pay the owner their share of collected fees (owner only)
    pub fn withdraw(&mut self, caller: &Address) -> Result<WithdrawalSplit, LedgerError> {
        self.ownership.ensure_owner(caller)?;

        let split = self.fees.split_withdrawal(self.balance);
        self.balance = split.retained;
        self.total_withdrawn = self.total_withdrawn.saturating_add(split.payout);

        info!(payout = split.payout, retained = split.retained, "fees withdrawn");
        self.record(LedgerEvent::Withdrawn {
            to: *caller,
            amount: split.payout,
            retained: split.retained,
        });

        Ok(split)
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Read a slot; ids never created read back as a tombstone
    pub fn get_entry(&self, id: EntryId) -> Slot {
        self.slot_index(id)
            .map(|index| self.slots[index].clone())
            .unwrap_or(Slot::Tombstoned)
    }

    /// Borrow a live entry
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.slot_index(id).and_then(|index| self.slots[index].entry())
    }

    /// Ids authored by `account`, in creation order, tombstoned ones included
    pub fn get_account_entries(&self, account: &Address) -> &[EntryId] {
        self.accounts
            .get(account)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_voted(&self, voter: &Address, id: EntryId) -> bool {
        self.votes
            .get(voter)
            .map(|ids| ids.contains(&id))
            .unwrap_or(false)
    }

    /// Iterate live entries in creation order
    pub fn live_entries(&self) -> impl Iterator<Item = &Entry> {
        self.slots.iter().filter_map(|slot| slot.entry())
    }

    /// Get statistics about the ledger
    pub fn statistics(&self) -> LedgerStatistics {
        let live_entries = self.live_entries().count() as u64;
        LedgerStatistics {
            total_entries: self.total_entries(),
            live_entries,
            tombstoned_entries: self.total_entries() - live_entries,
            total_votes: self.live_entries().map(|e| e.vote_count()).sum(),
            unique_authors: self.accounts.len(),
            balance: self.balance,
            total_withdrawn: self.total_withdrawn,
        }
    }

    /// Drain queued events
    ///
    /// Only the newest `MAX_PENDING_EVENTS` are kept between polls.
    pub fn poll_events(&mut self) -> Vec<LedgerEvent> {
        self.events.drain(..).collect()
    }

    fn record(&mut self, event: LedgerEvent) {
        if self.events.len() == MAX_PENDING_EVENTS {
            self.events.pop_front();
            warn!(cap = MAX_PENDING_EVENTS, "event queue full, dropping oldest event");
        }
        self.events.push_back(event);
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    /// Serialize to bytes (events are not included)
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        postcard::to_allocvec(self).map_err(|e| LedgerError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from bytes, rejecting snapshots that break ledger invariants
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let ledger: Ledger =
            postcard::from_bytes(bytes).map_err(|_| LedgerError::DeserializationFailed)?;
        ledger.check_snapshot()?;
        Ok(ledger)
    }

    fn check_snapshot(&self) -> Result<(), LedgerError> {
        self.fees.validate()?;

        for (index, slot) in self.slots.iter().enumerate() {
            let expected = EntryId::new(index as u64 + 1);
            if let Slot::Present(entry) = slot {
                if entry.id() != expected {
                    return Err(LedgerError::CorruptSnapshot(format!(
                        "slot {} holds entry {}",
                        expected,
                        entry.id()
                    )));
                }
            }
        }

        let in_range = |id: &EntryId| self.slot_index(*id).is_some();
        for (author, ids) in &self.accounts {
            if let Some(id) = ids.iter().find(|&id| !in_range(id)) {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "account {} lists unknown entry {}",
                    author, id
                )));
            }
            for id in ids {
                if let Some(entry) = self.entry(*id) {
                    if entry.author() != author {
                        return Err(LedgerError::CorruptSnapshot(format!(
                            "account {} lists entry {} by {}",
                            author,
                            id,
                            entry.author()
                        )));
                    }
                }
            }
        }
        for (voter, ids) in &self.votes {
            if let Some(id) = ids.iter().find(|&id| !in_range(id)) {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "voter {} recorded on unknown entry {}",
                    voter, id
                )));
            }
        }

        Ok(())
    }
}
