// Entry - a single user-authored feed item and its storage slot

use crate::identity::Address;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Maximum content size in bytes
pub const MAX_CONTENT_BYTES: usize = 256;

/// Bytes left before content hits the size limit (negative when over)
pub fn remaining_bytes(content: &[u8]) -> i64 {
    MAX_CONTENT_BYTES as i64 - content.len() as i64
}

/// Entry identifier. Ids are assigned from 1 upward and never reused;
/// 0 is the tombstone / not-found sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(u64);

impl EntryId {
    pub const TOMBSTONE: EntryId = EntryId(0);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn is_tombstone(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for EntryId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A published entry ("kweet")
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    id: EntryId,
    author: Address,
    content: Vec<u8>,
    vote_count: u64,
    timestamp: u64,
}

impl Entry {
    pub(crate) fn new(id: EntryId, author: Address, content: Vec<u8>, timestamp: u64) -> Self {
        Self {
            id,
            author,
            content,
            vote_count: 0,
            timestamp,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn author(&self) -> &Address {
        &self.author
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content decoded as UTF-8 (lossy)
    pub fn content_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    pub fn vote_count(&self) -> u64 {
        self.vote_count
    }

    /// Creation time, seconds since the Unix epoch
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub(crate) fn record_vote(&mut self) {
        self.vote_count += 1;
    }
}

/// What a storage slot holds. Deleted slots stay allocated forever.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Present(Entry),
    Tombstoned,
}

impl Slot {
    /// The id as a reader sees it: the entry id, or 0 for a tombstone
    pub fn id(&self) -> EntryId {
        match self {
            Slot::Present(entry) => entry.id(),
            Slot::Tombstoned => EntryId::TOMBSTONE,
        }
    }

    pub fn is_tombstoned(&self) -> bool {
        matches!(self, Slot::Tombstoned)
    }

    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Slot::Present(entry) => Some(entry),
            Slot::Tombstoned => None,
        }
    }

    pub fn into_entry(self) -> Option<Entry> {
        match self {
            Slot::Present(entry) => Some(entry),
            Slot::Tombstoned => None,
        }
    }
}
