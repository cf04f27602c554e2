// SharedLedger - concurrent handle that serializes mutations
//
// Mutations take the write lock for their whole duration, so each one
// completes (checks included) before the next starts. Events drained from
// the ledger are re-published on a broadcast channel.

use crate::fees::{Amount, WithdrawalSplit};
use crate::identity::Address;
use crate::ledger::entry::{EntryId, Slot};
use crate::ledger::event::LedgerEvent;
use crate::ledger::state::{Ledger, LedgerError, LedgerStatistics};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
    events: broadcast::Sender<LedgerEvent>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(ledger)),
            events,
        }
    }

    /// Receive events for every mutation applied after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    fn publish(&self, ledger: &mut Ledger) {
        for event in ledger.poll_events() {
            // no subscribers is fine
            let _ = self.events.send(event);
        }
    }

    pub async fn create_entry(
        &self,
        content: impl Into<Vec<u8>>,
        payment: Amount,
        author: Address,
        now: u64,
    ) -> Result<EntryId, LedgerError> {
        let mut ledger = self.inner.write().await;
        let id = ledger.create_entry(content, payment, author, now)?;
        self.publish(&mut ledger);
        Ok(id)
    }

    pub async fn vote(&self, id: EntryId, payment: Amount, voter: Address) -> Result<(), LedgerError> {
        let mut ledger = self.inner.write().await;
        ledger.vote(id, payment, voter)?;
        self.publish(&mut ledger);
        Ok(())
    }

    pub async fn delete_entry(&self, id: EntryId, caller: &Address) -> Result<bool, LedgerError> {
        let mut ledger = self.inner.write().await;
        let deleted = ledger.delete_entry(id, caller)?;
        self.publish(&mut ledger);
        Ok(deleted)
    }

    pub async fn withdraw(&self, caller: &Address) -> Result<WithdrawalSplit, LedgerError> {
        let mut ledger = self.inner.write().await;
        let split = ledger.withdraw(caller)?;
        self.publish(&mut ledger);
        Ok(split)
    }

    pub async fn get_entry(&self, id: EntryId) -> Slot {
        self.inner.read().await.get_entry(id)
    }

    pub async fn get_account_entries(&self, account: &Address) -> Vec<EntryId> {
        self.inner.read().await.get_account_entries(account).to_vec()
    }

    pub async fn has_voted(&self, voter: &Address, id: EntryId) -> bool {
        self.inner.read().await.has_voted(voter, id)
    }

    pub async fn total_entries(&self) -> u64 {
        self.inner.read().await.total_entries()
    }

    pub async fn owner(&self) -> Address {
        *self.inner.read().await.owner()
    }

    pub async fn statistics(&self) -> LedgerStatistics {
        self.inner.read().await.statistics()
    }

    /// Clone the current ledger state (e.g. to persist it)
    pub async fn snapshot(&self) -> Ledger {
        self.inner.read().await.clone()
    }
}
