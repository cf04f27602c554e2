// Ledger events - emitted after every successful mutation

use crate::fees::Amount;
use crate::identity::Address;
use crate::ledger::entry::EntryId;

/// Events emitted by the ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A new entry was published
    EntryCreated {
        id: EntryId,
        author: Address,
        timestamp: u64,
    },
    /// A vote was recorded
    Voted {
        id: EntryId,
        voter: Address,
        vote_count: u64,
    },
    /// The owner tombstoned an entry
    EntryDeleted { id: EntryId },
    /// The owner withdrew collected fees
    Withdrawn {
        to: Address,
        amount: Amount,
        retained: Amount,
    },
}

impl LedgerEvent {
    /// The entry this event refers to, if any
    pub fn entry_id(&self) -> Option<EntryId> {
        match self {
            LedgerEvent::EntryCreated { id, .. }
            | LedgerEvent::Voted { id, .. }
            | LedgerEvent::EntryDeleted { id } => Some(*id),
            LedgerEvent::Withdrawn { .. } => None,
        }
    }
}
