// Ledger module - THE SHARED HISTORY
// Entries, votes, collected fees, and a concurrent handle over them

mod entry;
mod event;
mod shared;
mod state;

pub use entry::{remaining_bytes, Entry, EntryId, Slot, MAX_CONTENT_BYTES};
pub use event::LedgerEvent;
pub use shared::SharedLedger;
pub use state::{Ledger, LedgerError, LedgerStatistics, MAX_PENDING_EVENTS};
